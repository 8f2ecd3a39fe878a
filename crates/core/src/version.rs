//! Version status and the `Version<V>` wrapper used by the history
//! subsystem.

use serde::{Deserialize, Serialize};

/// The lifecycle state recorded alongside a value at a given commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionStatus {
    /// First version of a key.
    Created,
    /// A later, non-deleting version.
    Updated,
    /// The key was deleted at this commit; no meaningful value follows.
    Deleted,
}

/// A `(status, value)` pair recorded at a specific commit. A `Deleted`
/// entry carries `V::default()`, not the prior value (spec §4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version<V> {
    /// The lifecycle state at this commit.
    pub status: VersionStatus,
    /// The value at this commit, or the type's default if `Deleted`.
    pub value: V,
}

impl<V> Version<V> {
    /// Build a new version record.
    pub fn new(status: VersionStatus, value: V) -> Self {
        Version { status, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_status_is_distinguishable() {
        let v = Version::new(VersionStatus::Deleted, 0i64);
        assert_eq!(v.status, VersionStatus::Deleted);
    }
}
