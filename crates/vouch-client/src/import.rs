// crates/vouch-client/src/import.rs
//
// Signs and conditionally stores identities and votes.
//
// Every import is a network write; success means the store acknowledged
// it, not that the record has propagated network-wide.

use std::sync::Arc;

use tracing::{info, warn};

use vouch_core::{crypto, KeyPair, Signature, SignedUser, SignedVote, User, Vote, VouchError};
use vouch_dht::DomainMultiMap;

/// Publishes signed records into their domains: identities via `put`
/// (keyed by owner-key hash), votes via `add` (keyed by content hash).
pub struct ImportService {
    key_pair: KeyPair,
    user_map: Arc<DomainMultiMap<SignedUser>>,
    vote_map: Arc<DomainMultiMap<SignedVote>>,
}

impl ImportService {
    pub fn new(
        key_pair: KeyPair,
        user_map: Arc<DomainMultiMap<SignedUser>>,
        vote_map: Arc<DomainMultiMap<SignedVote>>,
    ) -> Self {
        Self {
            key_pair,
            user_map,
            vote_map,
        }
    }

    /// The key pair this service signs convenience imports with.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Produce a signature over arbitrary bytes. Pure, no storage.
    pub fn sign(&self, key_pair: &KeyPair, data: &[u8]) -> Result<Signature, VouchError> {
        crypto::sign_message(key_pair, data)
    }

    /// Wrap `user` + `signature` into a [`SignedUser`] and publish it at
    /// the owner's key hash. Write failures are logged and absorbed to
    /// `false`; the caller must not assume the write happened.
    pub async fn import_signed_user(&self, user: User, signature: Signature) -> bool {
        info!("importing user {} ({})", user.public_key, signature);
        let key_hash = user.public_key.hash.clone();
        let signed = SignedUser { user, signature };
        match self.user_map.put(&key_hash, signed).await {
            Ok(acknowledged) => acknowledged,
            Err(e) => {
                warn!("user import failed: {}", e);
                false
            }
        }
    }

    /// Wrap `vote` + `signature` into a [`SignedVote`] and append it at
    /// the content hash it rates.
    pub async fn import_signed_vote(&self, vote: Vote, signature: Signature) -> bool {
        info!("importing vote on {} ({})", vote.content_hash, signature);
        let content_hash = vote.content_hash.clone();
        let signed = SignedVote { vote, signature };
        match self.vote_map.add(&content_hash, signed).await {
            Ok(acknowledged) => acknowledged,
            Err(e) => {
                warn!("vote import failed: {}", e);
                false
            }
        }
    }

    /// Sign `user` with this service's own key pair and import it. Only
    /// meaningful when the caller owns the record being published.
    pub async fn import_user(&self, user: &User) -> bool {
        let signature = match self.sign(&self.key_pair, &user.signable_bytes()) {
            Ok(signature) => signature,
            Err(e) => {
                warn!("signing user failed: {}", e);
                return false;
            }
        };
        self.import_signed_user(user.clone(), signature).await
    }

    /// Sign `vote` with this service's own key pair and import it.
    pub async fn import_vote(&self, vote: &Vote) -> bool {
        let signature = match self.sign(&self.key_pair, &vote.signable_bytes()) {
            Ok(signature) => signature,
            Err(e) => {
                warn!("signing vote failed: {}", e);
                return false;
            }
        };
        self.import_signed_vote(vote.clone(), signature).await
    }
}
