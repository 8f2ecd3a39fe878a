//! `ReliableMap<K, V>`: an associative structure layered over
//! [`crate::RawMap`], with a companion [`crate::ReliableList`] of keys so
//! `keys()` can enumerate.

use crate::{IdAllocator, RawMap, ReliableList};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;
use tstore_core::Result;

/// A map keyed by any `Display`-able key, persisted as a `pairs/<key>`
/// bucket plus a `keys/<key>` marker recording whether the key has been
/// registered into the companion key list.
pub struct ReliableMap<K, V> {
    path: String,
    raw_map: Arc<dyn RawMap>,
    key_list: ReliableList<String>,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> ReliableMap<K, V>
where
    K: Display,
    V: Serialize + DeserializeOwned,
{
    /// Open (or create) a map rooted at `path`.
    pub fn open(path: impl Into<String>, raw_map: Arc<dyn RawMap>, ref_gen: Arc<IdAllocator>) -> Self {
        let path = path.into();
        let key_list = ReliableList::open(format!("{path}/keylist"), raw_map.clone(), ref_gen);
        ReliableMap {
            path,
            raw_map,
            key_list,
            _marker: PhantomData,
        }
    }

    /// Fetch the value stored under `key`.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        match self.raw_map.get(&self.pair_path(key))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`, registering the key into the key list
    /// the first time it is seen.
    pub fn set(&self, key: &K, value: &V) -> Result<()> {
        let key_string = key.to_string();
        if !self.raw_map.contain(&self.key_marker_path(&key_string))? {
            self.key_list.append(key_string.clone())?;
            self.raw_map.set(&self.key_marker_path(&key_string), Vec::new())?;
        }

        self.raw_map.set(&self.pair_path(key), serde_json::to_vec(value)?)
    }

    /// Whether `key` has a stored value.
    pub fn contain(&self, key: &K) -> Result<bool> {
        self.raw_map.contain(&self.pair_path(key))
    }

    /// Remove `key`'s value. The key marker is left in place — spec §4.3
    /// does not require `keys()` to forget keys whose value was later
    /// deleted, only that it enumerate every key ever `set`.
    pub fn delete(&self, key: &K) -> Result<()> {
        self.raw_map.delete(&self.pair_path(key))
    }

    /// Every key ever `set`, in the order first seen.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.key_list.items()
    }

    fn pair_path(&self, key: &K) -> String {
        format!("{}/pairs/{key}", self.path)
    }

    fn key_marker_path(&self, key: &str) -> String {
        format!("{}/keys/{key}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryRawMap;

    fn new_map(path: &str) -> ReliableMap<String, u64> {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        let ref_gen = Arc::new(IdAllocator::open(raw_map.clone(), format!("{path}/refs"), 8).unwrap());
        ReliableMap::open(path, raw_map, ref_gen)
    }

    #[test]
    fn set_then_get_round_trips() {
        let map = new_map("m1");
        map.set(&"a".to_string(), &1).unwrap();
        assert_eq!(map.get(&"a".to_string()).unwrap(), Some(1));
    }

    #[test]
    fn keys_enumerates_every_key_once() {
        let map = new_map("m2");
        map.set(&"a".to_string(), &1).unwrap();
        map.set(&"b".to_string(), &2).unwrap();
        map.set(&"a".to_string(), &3).unwrap(); // re-set, should not duplicate
        let mut keys = map.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn delete_removes_value_but_not_key_registration() {
        let map = new_map("m3");
        map.set(&"a".to_string(), &1).unwrap();
        map.delete(&"a".to_string()).unwrap();
        assert_eq!(map.get(&"a".to_string()).unwrap(), None);
        assert!(!map.contain(&"a".to_string()).unwrap());
        assert_eq!(map.keys().unwrap(), vec!["a".to_string()]);
    }
}
