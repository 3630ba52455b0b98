// crates/vouch-dht/src/multimap.rs
//
// Typed, domain-separated multi-value map over the shared DHT key space.
//
// Each logical record type gets its own Domain; writes are gated by a
// domain-specific collision predicate so a reduced-key collision is
// refused instead of silently corrupting an unrelated record.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use vouch_core::{ContentHash, DhtKey, DhtNode, VouchError};

use crate::keyspace::{sub_key_for, Domain};

/// Maps a semantic hash to the concrete store key for one domain.
pub type KeyReducer = Box<dyn Fn(&ContentHash) -> DhtKey + Send + Sync>;

/// Decides whether a record may live at the given semantic hash. Applied
/// to the candidate and to every record already stored at the reduced key.
pub type CollisionPredicate<V> = Box<dyn Fn(&ContentHash, &V) -> bool + Send + Sync>;

/// A typed view of one domain inside the shared distributed key space.
pub struct DomainMultiMap<V> {
    node: Arc<dyn DhtNode<V>>,
    domain: Domain,
    key_reducer: KeyReducer,
    not_collision: CollisionPredicate<V>,
}

impl<V> DomainMultiMap<V>
where
    V: Clone + Serialize + Send + Sync,
{
    pub fn new(
        node: Arc<dyn DhtNode<V>>,
        domain: Domain,
        key_reducer: KeyReducer,
        not_collision: CollisionPredicate<V>,
    ) -> Self {
        Self {
            node,
            domain,
            key_reducer,
            not_collision,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Overwrite semantics: store `value` as the sole record for `hash`.
    /// Used for identities — one current record per owner key.
    pub async fn put(&self, hash: &ContentHash, value: V) -> Result<bool, VouchError> {
        let key = (self.key_reducer)(hash);
        debug!("put {} -> {} [{}]", hash, key, self.domain.name());
        self.node.put(key, value).await
    }

    /// Append semantics: store `value` as an additional record for `hash`,
    /// but only if the collision predicate accepts the candidate and every
    /// record already stored at the reduced key. Used for votes — many
    /// records per content hash.
    pub async fn add(&self, hash: &ContentHash, value: V) -> Result<bool, VouchError> {
        let key = (self.key_reducer)(hash);

        if !(self.not_collision)(hash, &value) {
            warn!(
                "refusing add at {} [{}]: candidate does not belong to this key",
                hash,
                self.domain.name()
            );
            return Ok(false);
        }

        let existing = self.node.get_all(key).await?;
        for record in &existing {
            if !(self.not_collision)(hash, record) {
                warn!(
                    "refusing add at {} [{}]: reduced-key collision with a stored record",
                    hash,
                    self.domain.name()
                );
                return Ok(false);
            }
        }

        let serialized = serde_json::to_vec(&value)?;
        let sub_key = sub_key_for(&serialized);
        debug!("add {} -> {}/{} [{}]", hash, key, sub_key, self.domain.name());
        self.node.add(key, sub_key, value).await
    }

    /// Fetch the sole (or first) record for `hash`.
    pub async fn get_one(&self, hash: &ContentHash) -> Result<Option<V>, VouchError> {
        self.node.get_one((self.key_reducer)(hash)).await
    }

    /// Fetch every record stored for `hash`.
    pub async fn get_all(&self, hash: &ContentHash) -> Result<Vec<V>, VouchError> {
        self.node.get_all((self.key_reducer)(hash)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDhtNode;
    use serde::Deserialize;
    use vouch_core::crypto;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Record {
        belongs_to: ContentHash,
        payload: String,
    }

    fn map_over(node: Arc<InMemoryDhtNode<Record>>) -> DomainMultiMap<Record> {
        let domain = Domain::new("test");
        DomainMultiMap::new(
            node,
            domain,
            Box::new(move |h| domain.reduce(h)),
            Box::new(|h, record: &Record| record.belongs_to == *h),
        )
    }

    fn record(hash: &ContentHash, payload: &str) -> Record {
        Record {
            belongs_to: hash.clone(),
            payload: payload.to_string(),
        }
    }

    #[tokio::test]
    async fn add_accepts_records_that_belong_to_the_key() {
        let map = map_over(Arc::new(InMemoryDhtNode::new()));
        let hash = crypto::hash_of(b"object");

        assert!(map.add(&hash, record(&hash, "a")).await.unwrap());
        assert!(map.add(&hash, record(&hash, "b")).await.unwrap());
        assert_eq!(map.get_all(&hash).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn add_refuses_a_candidate_keyed_elsewhere() {
        let map = map_over(Arc::new(InMemoryDhtNode::new()));
        let hash = crypto::hash_of(b"object");
        let elsewhere = crypto::hash_of(b"other object");

        assert!(!map.add(&hash, record(&elsewhere, "stray")).await.unwrap());
        assert!(map.get_all(&hash).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_refuses_when_a_stored_record_collides() {
        // Simulate a reduced-key collision by planting a foreign record
        // directly in the node, bypassing the predicate.
        let node = Arc::new(InMemoryDhtNode::new());
        let map = map_over(node.clone());
        let hash = crypto::hash_of(b"object");
        let foreign_hash = crypto::hash_of(b"foreign");

        let domain = Domain::new("test");
        node.add(
            domain.reduce(&hash),
            DhtKey([9u8; 20]),
            record(&foreign_hash, "intruder"),
        )
        .await
        .unwrap();

        assert!(!map.add(&hash, record(&hash, "victim")).await.unwrap());
    }

    #[tokio::test]
    async fn put_replaces_the_sole_record() {
        let map = map_over(Arc::new(InMemoryDhtNode::new()));
        let hash = crypto::hash_of(b"identity");

        assert!(map.put(&hash, record(&hash, "v1")).await.unwrap());
        assert!(map.put(&hash, record(&hash, "v2")).await.unwrap());

        let current = map.get_one(&hash).await.unwrap().unwrap();
        assert_eq!(current.payload, "v2");
        assert_eq!(map.get_all(&hash).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn identical_records_are_idempotent_under_add() {
        let map = map_over(Arc::new(InMemoryDhtNode::new()));
        let hash = crypto::hash_of(b"object");

        assert!(map.add(&hash, record(&hash, "same")).await.unwrap());
        assert!(map.add(&hash, record(&hash, "same")).await.unwrap());
        // Same serialized bytes -> same sub-key -> one stored record.
        assert_eq!(map.get_all(&hash).await.unwrap().len(), 1);
    }
}
