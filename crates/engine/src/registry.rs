//! `DatabaseRegistry`: tracks every registered database name durably and
//! keeps at most one open [`Database`] handle per name in memory (spec
//! §4.10).

use dashmap::DashMap;
use std::sync::Arc;
use tstore_core::{Result, TStoreError};
use tstore_storage::{IdAllocator, RawMap, ReliableMap};

use crate::database::Database;

/// Owns the durable set of registered database names plus the open
/// handles for databases a caller has actually touched. Raw map and ID
/// generators are shared by `Arc` across every database this registry
/// opens.
pub struct DatabaseRegistry {
    root: String,
    raw_map: Arc<dyn RawMap>,
    names: ReliableMap<String, bool>,
    open: DashMap<String, Arc<Database>>,
}

impl DatabaseRegistry {
    /// Open (or create) a registry rooted at `root` in `raw_map`.
    pub fn open(root: impl Into<String>, raw_map: Arc<dyn RawMap>) -> Result<Self> {
        let root = root.into();
        let ref_gen = Arc::new(IdAllocator::open_default(raw_map.clone(), format!("{root}/idGens/database-map-refs"))?);
        let names = ReliableMap::open(format!("{root}/databases/map"), raw_map.clone(), ref_gen);
        Ok(DatabaseRegistry {
            root,
            raw_map,
            names,
            open: DashMap::new(),
        })
    }

    /// Register a new database name. Fails if the name is already
    /// registered.
    pub fn create_database(&self, name: &str) -> Result<()> {
        if self.names.contain(&name.to_string())? {
            return Err(TStoreError::DatabaseAlreadyExists(name.to_string()));
        }
        self.names.set(&name.to_string(), &true)
    }

    /// Unregister a database name and drop its open handle, if any.
    /// Fails if the name is not registered. Does not delete the
    /// database's underlying data.
    pub fn delete_database(&self, name: &str) -> Result<()> {
        if !self.names.contain(&name.to_string())? {
            return Err(TStoreError::DatabaseNotFound(name.to_string()));
        }
        self.names.delete(&name.to_string())?;
        self.open.remove(name);
        Ok(())
    }

    /// Every registered database name.
    pub fn list_all_databases(&self) -> Result<Vec<String>> {
        self.names.keys()
    }

    /// The open handle for `name`, opening it on first access. Fails if
    /// `name` is not registered.
    pub fn database(&self, name: &str) -> Result<Arc<Database>> {
        if let Some(existing) = self.open.get(name) {
            return Ok(existing.clone());
        }
        if !self.names.contain(&name.to_string())? {
            return Err(TStoreError::DatabaseNotFound(name.to_string()));
        }

        let path = format!("{}/databases/data/{name}", self.root);
        let database = Arc::new(Database::open(name, path, self.raw_map.clone())?);
        self.open.insert(name.to_string(), database.clone());
        Ok(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tstore_storage::InMemoryRawMap;

    fn new_registry() -> DatabaseRegistry {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        DatabaseRegistry::open("root", raw_map).unwrap()
    }

    #[test]
    fn create_then_list_reports_the_name() {
        let registry = new_registry();
        registry.create_database("people").unwrap();
        assert_eq!(registry.list_all_databases().unwrap(), vec!["people".to_string()]);
    }

    #[test]
    fn create_twice_is_a_conflict() {
        let registry = new_registry();
        registry.create_database("people").unwrap();
        assert!(matches!(registry.create_database("people"), Err(TStoreError::DatabaseAlreadyExists(_))));
    }

    #[test]
    fn database_for_unregistered_name_fails() {
        let registry = new_registry();
        assert!(matches!(registry.database("ghost"), Err(TStoreError::DatabaseNotFound(_))));
    }

    #[tokio::test]
    async fn database_opens_and_caches_the_handle() {
        let registry = new_registry();
        registry.create_database("people").unwrap();
        let first = registry.database("people").unwrap();
        let second = registry.database("people").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn delete_database_drops_the_cached_handle() {
        let registry = new_registry();
        registry.create_database("people").unwrap();
        registry.database("people").unwrap();
        registry.delete_database("people").unwrap();
        assert!(matches!(registry.database("people"), Err(TStoreError::DatabaseNotFound(_))));
    }
}
