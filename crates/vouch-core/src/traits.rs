// crates/vouch-core/src/traits.rs

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VouchError;
use crate::user::User;

/// A member of the distributed map's native 160-bit key space.
///
/// Domain hashes are reduced into this space by the key-reduction function;
/// the raw bytes carry no domain information on their own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DhtKey(pub [u8; 20]);

impl DhtKey {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for DhtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}…", hex::encode(&self.0[..6]))
    }
}

/// Async get/put/add primitives over the shared numeric key space.
///
/// This is the seam to the underlying peer-to-peer store: implemented
/// in-memory for tests and single-node operation, and over Kademlia by
/// vouch-p2p. `Ok(None)` from a get means confirmed absence; store or
/// network failure is always an `Err`, never an empty result.
#[async_trait]
pub trait DhtNode<V>: Send + Sync {
    /// Fetch the sole (or first) record at `key`.
    async fn get_one(&self, key: DhtKey) -> Result<Option<V>, VouchError>;

    /// Fetch the record stored under (`key`, `sub_key`).
    async fn get_one_sub(&self, key: DhtKey, sub_key: DhtKey) -> Result<Option<V>, VouchError>;

    /// Fetch every record stored under `key`.
    async fn get_all(&self, key: DhtKey) -> Result<Vec<V>, VouchError>;

    /// Store `value` as an additional record under (`key`, `sub_key`).
    /// `Ok(true)` means the store acknowledged the write.
    async fn add(&self, key: DhtKey, sub_key: DhtKey, value: V) -> Result<bool, VouchError>;

    /// Store `value` as the sole record at `key`, replacing anything there.
    async fn put(&self, key: DhtKey, value: V) -> Result<bool, VouchError>;
}

/// Selector for alternative trust-propagation schemes.
///
/// A closed set of named strategies behind one scoring signature — new
/// schemes are new variants, not new types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustMetric {
    /// Direct assertions only: a voter the viewer has not explicitly
    /// trusted carries no weight.
    OnlyFriends,
    /// Direct assertions where present, shared-neighbor estimation
    /// otherwise.
    Network,
}

/// Similarity and propagated-trust coefficients between two identities.
///
/// Both functions are pure over the two profiles; the scoring algorithm
/// composes them per vote.
pub trait TrustGenerator: Send + Sync {
    /// Similarity between the two identities' trust/rating patterns,
    /// in [-1.0, 1.0].
    fn correlation_coefficient(&self, a: &User, b: &User) -> f64;

    /// Propagated trust weight from `viewer` to `other` under the
    /// selected metric.
    fn trust_coefficient(&self, viewer: &User, other: &User, metric: TrustMetric) -> f64;
}
