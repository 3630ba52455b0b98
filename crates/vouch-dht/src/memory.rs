// crates/vouch-dht/src/memory.rs
//
// In-memory DhtNode used by tests and single-node operation.
//
// Records live in a nested map: reduced key -> (sub-key -> value). The
// sub-key ordering (BTreeMap) makes `get_one` on multi-value keys
// deterministic.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use vouch_core::{DhtKey, DhtNode, VouchError};

/// A process-local [`DhtNode`] backed by maps.
#[derive(Debug)]
pub struct InMemoryDhtNode<V> {
    records: RwLock<HashMap<DhtKey, BTreeMap<DhtKey, V>>>,
}

impl<V> InMemoryDhtNode<V> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for InMemoryDhtNode<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> DhtNode<V> for InMemoryDhtNode<V>
where
    V: Clone + Send + Sync,
{
    async fn get_one(&self, key: DhtKey) -> Result<Option<V>, VouchError> {
        let records = self.records.read().await;
        Ok(records
            .get(&key)
            .and_then(|slots| slots.values().next().cloned()))
    }

    async fn get_one_sub(&self, key: DhtKey, sub_key: DhtKey) -> Result<Option<V>, VouchError> {
        let records = self.records.read().await;
        Ok(records.get(&key).and_then(|slots| slots.get(&sub_key).cloned()))
    }

    async fn get_all(&self, key: DhtKey) -> Result<Vec<V>, VouchError> {
        let records = self.records.read().await;
        Ok(records
            .get(&key)
            .map(|slots| slots.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn add(&self, key: DhtKey, sub_key: DhtKey, value: V) -> Result<bool, VouchError> {
        let mut records = self.records.write().await;
        records.entry(key).or_default().insert(sub_key, value);
        Ok(true)
    }

    async fn put(&self, key: DhtKey, value: V) -> Result<bool, VouchError> {
        let mut records = self.records.write().await;
        let slots = records.entry(key).or_default();
        slots.clear();
        slots.insert(DhtKey([0u8; 20]), value);
        Ok(true)
    }
}
