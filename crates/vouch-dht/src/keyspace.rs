// crates/vouch-dht/src/keyspace.rs
//
// Key reduction into the shared 160-bit store key space.
//
// Every domain shares one physical keyspace. The reduced key is a
// composite hash of (domain name, semantic digest), so two domains can
// never collide on a store key unless SHA-256 itself collides — an
// accidental collision would silently corrupt an unrelated record type.

use sha2::{Digest, Sha256};

use vouch_core::{ContentHash, DhtKey};

/// A named namespace inside the shared distributed key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    name: &'static str,
}

impl Domain {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Reduce a semantic hash to the concrete store key for this domain:
    /// `truncate_20(SHA-256(domain || 0x00 || digest))`. The separator
    /// keeps (`"ab"`, `"c…"`) and (`"a"`, `"bc…"`) apart.
    pub fn reduce(&self, hash: &ContentHash) -> DhtKey {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(&hash.digest);
        truncate_to_key(hasher.finalize().as_slice())
    }
}

/// Derive the sub-key distinguishing one record among many at the same
/// reduced key. Deterministic over the record's serialized bytes, so
/// re-adding an identical record lands on the same slot.
pub fn sub_key_for(serialized: &[u8]) -> DhtKey {
    let mut hasher = Sha256::new();
    hasher.update(serialized);
    truncate_to_key(hasher.finalize().as_slice())
}

fn truncate_to_key(digest: &[u8]) -> DhtKey {
    let mut key = [0u8; 20];
    key.copy_from_slice(&digest[..20]);
    DhtKey(key)
}
