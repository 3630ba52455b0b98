// crates/vouch-dht/src/lookup.rs
//
// Resolves public-key hashes to stored identities and raw keys.

use std::sync::Arc;

use tracing::debug;

use vouch_core::{ContentHash, Key, SignedUser, VouchError};

use crate::multimap::DomainMultiMap;

/// Lookup over the identity domain.
///
/// Returns `Ok(None)` for confirmed absence; store or network failure
/// propagates as `Err`, never as an empty result. Does not validate
/// signatures — callers needing integrity run the result through the
/// validation service.
pub struct KeyLookupService {
    user_map: Arc<DomainMultiMap<SignedUser>>,
}

impl KeyLookupService {
    pub fn new(user_map: Arc<DomainMultiMap<SignedUser>>) -> Self {
        Self { user_map }
    }

    /// Resolve a public-key hash to the identity record stored for it.
    pub async fn find_owner(
        &self,
        public_key_hash: &ContentHash,
    ) -> Result<Option<SignedUser>, VouchError> {
        debug!("looking up owner of key hash {}", public_key_hash);
        self.user_map.get_one(public_key_hash).await
    }

    /// Resolve a raw public key from its hash — a projection over
    /// [`KeyLookupService::find_owner`].
    pub async fn find_key(&self, hash: &ContentHash) -> Result<Option<Key>, VouchError> {
        Ok(self
            .find_owner(hash)
            .await?
            .map(|signed| signed.user.public_key))
    }
}
