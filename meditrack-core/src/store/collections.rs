//! Per-entity JSON collections on top of a [`KeyValueStore`].

use tracing::{debug, warn};

use super::KeyValueStore;
use crate::entity::Entity;
use crate::error::StoreError;

/// Result of reading a collection.
#[derive(Debug, Clone)]
pub struct Loaded<E> {
    pub records: Vec<E>,
    /// True when the key had never been written and fixtures were returned.
    pub seeded: bool,
}

/// Typed access to the local fallback store.
///
/// Reads never fail: a key that was never written is seeded with the kind's
/// fixtures, and an unreadable or corrupted value reads as empty.
#[derive(Debug, Clone)]
pub struct LocalCollections<S> {
    store: S,
}

impl<S: KeyValueStore> LocalCollections<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the collection, seeding fixtures on first use.
    pub fn load<E: Entity>(&self) -> Loaded<E> {
        let key = E::KIND.storage_key();

        match self.read::<E>() {
            Ok(Some(records)) => Loaded {
                records,
                seeded: false,
            },
            Ok(None) => {
                let records = E::fixtures();
                debug!(key, count = records.len(), "seeding local store with fixtures");
                if let Err(e) = self.set(&records) {
                    warn!(key, error = %e, "failed to persist fixtures");
                }
                Loaded {
                    records,
                    seeded: true,
                }
            }
            Err(e) => {
                warn!(key, error = %e, "local data unreadable, treating as empty");
                Loaded {
                    records: Vec::new(),
                    seeded: false,
                }
            }
        }
    }

    /// Reads the collection without seeding.
    pub fn get<E: Entity>(&self) -> Vec<E> {
        self.read::<E>().ok().flatten().unwrap_or_default()
    }

    /// Replaces the whole collection.
    pub fn set<E: Entity>(&self, records: &[E]) -> Result<(), StoreError> {
        let key = E::KIND.storage_key();
        let json =
            serde_json::to_string(records).map_err(|e| StoreError::Parse(key.to_string(), e))?;
        self.store.set(key, &json)
    }

    fn read<E: Entity>(&self) -> Result<Option<Vec<E>>, StoreError> {
        let key = E::KIND.storage_key();

        match self.store.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Parse(key.to_string(), e)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::models::{Doctor, Patient};
    use crate::store::MemoryStore;

    fn collections() -> LocalCollections<MemoryStore> {
        LocalCollections::new(MemoryStore::new())
    }

    #[test]
    fn test_first_load_seeds_and_persists_fixtures() {
        let local = collections();

        let loaded = local.load::<Patient>();
        assert!(loaded.seeded);
        assert_eq!(loaded.records.len(), 5);
        assert_eq!(loaded.records[0].id, "P001");
        assert_eq!(loaded.records[0].name, "John Smith");

        let again = local.load::<Patient>();
        assert!(!again.seeded);
        assert_eq!(again.records, loaded.records);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let local = collections();
        let doctors = vec![
            Doctor::new("D010", "Ada", "King"),
            Doctor::new("D011", "Alan", "Turing").with_phone("555"),
        ];

        local.set(&doctors).unwrap();
        assert_eq!(local.get::<Doctor>(), doctors);
    }

    #[test]
    fn test_written_empty_collection_is_not_reseeded() {
        let local = collections();
        local.set::<Patient>(&[]).unwrap();

        let loaded = local.load::<Patient>();
        assert!(!loaded.seeded);
        assert!(loaded.records.is_empty());
    }

    #[test]
    fn test_corrupted_value_reads_as_empty() {
        let local = collections();
        let key = EntityKind::Patients.storage_key();
        local.store().set(key, "{not json").unwrap();

        let loaded = local.load::<Patient>();
        assert!(loaded.records.is_empty());
        assert!(!loaded.seeded);
        // the corrupted value is left alone until the next write
        assert_eq!(
            local.store().get(key).unwrap().as_deref(),
            Some("{not json")
        );
    }
}
