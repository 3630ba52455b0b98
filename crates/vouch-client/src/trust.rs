// crates/vouch-client/src/trust.rs
//
// Local trust assertions, trust-network resolution, and identity
// registration.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use vouch_core::{
    crypto, ContentHash, Key, KeyPair, Trust, TrustAssertion, User, VouchError,
};
use vouch_dht::{KeyLookupService, SignatureValidationService};

use crate::import::ImportService;

/// Manages the local identity's trust list and resolves the identities it
/// points at. The local identity is the one the import service signs with.
pub struct TrustNetworkService {
    lookup: Arc<KeyLookupService>,
    validation: Arc<SignatureValidationService>,
    import: Arc<ImportService>,
}

impl TrustNetworkService {
    pub fn new(
        lookup: Arc<KeyLookupService>,
        validation: Arc<SignatureValidationService>,
        import: Arc<ImportService>,
    ) -> Self {
        Self {
            lookup,
            validation,
            import,
        }
    }

    fn local_key_pair(&self) -> &KeyPair {
        self.import.key_pair()
    }

    /// Resolve the local identity's stored profile. The signature is
    /// discarded after lookup; callers needing integrity validate first.
    pub async fn user_identity(&self) -> Result<Option<User>, VouchError> {
        let public_key = self.local_key_pair().public_key.clone();
        self.user_identity_for(&public_key).await
    }

    /// Resolve the profile stored for a given public key.
    pub async fn user_identity_for(&self, public_key: &Key) -> Result<Option<User>, VouchError> {
        Ok(self
            .lookup
            .find_owner(&public_key.hash)
            .await?
            .map(|signed| signed.user))
    }

    /// Resolve `user`'s trusted assertions to live identities.
    ///
    /// Single-hop: does not recurse into the trust lists of resolved
    /// users. Each assertion resolves concurrently; entries flagged
    /// not-trusted, unresolvable, or failing self-signed validation are
    /// dropped — a bad entry never fails the call. Order of the result is
    /// unspecified.
    pub async fn local_trust_network(&self, user: &User) -> Vec<User> {
        debug!("resolving local trust network for {}", user.public_key);
        let mut branches = JoinSet::new();
        for assertion in &user.trusted {
            if assertion.trust != Trust::Trusted {
                debug!(
                    "dropping {} ({:?}) from trust network",
                    assertion.public_key, assertion.trust
                );
                continue;
            }
            let lookup = self.lookup.clone();
            let validation = self.validation.clone();
            let target = assertion.public_key.hash.clone();
            branches.spawn(async move {
                match lookup.find_owner(&target).await {
                    Ok(Some(signed)) => match validation.validate_user(&signed) {
                        Ok(true) => Some(signed.user),
                        _ => {
                            debug!("dropping {}: failed validation", target);
                            None
                        }
                    },
                    Ok(None) => {
                        debug!("dropping {}: unresolved", target);
                        None
                    }
                    Err(e) => {
                        debug!("dropping {}: lookup failed ({})", target, e);
                        None
                    }
                }
            });
        }

        let mut resolved = Vec::new();
        while let Some(branch) = branches.join_next().await {
            if let Ok(Some(user)) = branch {
                resolved.push(user);
            }
        }
        resolved
    }

    /// Republish the local identity with a `Trusted` assertion for
    /// `public_key`, replacing any prior assertion for that key.
    pub async fn add_user_as_trusted(&self, public_key: &Key) -> Result<bool, VouchError> {
        debug!("adding to trust network: {}", public_key);
        self.republish_with_assertion(public_key, Trust::Trusted)
            .await
    }

    /// Republish the local identity with the target flagged `NotTrusted`.
    /// There is no deletion primitive; distrust is itself an assertion.
    pub async fn remove_user_as_trusted(&self, public_key: &Key) -> Result<bool, VouchError> {
        debug!("removing from trust network: {}", public_key);
        self.republish_with_assertion(public_key, Trust::NotTrusted)
            .await
    }

    /// Hash overload: resolve the key first, completing with `false` when
    /// it is unknown to the network.
    pub async fn add_user_as_trusted_by_hash(
        &self,
        public_key_hash: &ContentHash,
    ) -> Result<bool, VouchError> {
        match self.lookup.find_key(public_key_hash).await? {
            Some(key) => self.add_user_as_trusted(&key).await,
            None => Ok(false),
        }
    }

    pub async fn remove_user_as_trusted_by_hash(
        &self,
        public_key_hash: &ContentHash,
    ) -> Result<bool, VouchError> {
        match self.lookup.find_key(public_key_hash).await? {
            Some(key) => self.remove_user_as_trusted(&key).await,
            None => Ok(false),
        }
    }

    /// Fetch the current local identity, strip any existing assertion for
    /// the target key, append the fresh one, and republish wholesale.
    async fn republish_with_assertion(
        &self,
        public_key: &Key,
        trust: Trust,
    ) -> Result<bool, VouchError> {
        let local_key = self.local_key_pair().public_key.clone();
        let owner = self.lookup.find_owner(&local_key.hash).await?;
        match owner {
            Some(signed) => {
                let mut user = signed.user;
                user.trusted
                    .retain(|assertion| assertion.public_key != *public_key);
                user.trusted.push(TrustAssertion {
                    public_key: public_key.clone(),
                    trust,
                });
                Ok(self.import.import_user(&user).await)
            }
            None => {
                info!(
                    "trust update failed for {}: current user {} not found",
                    public_key, local_key
                );
                Ok(false)
            }
        }
    }

    /// Generate a fresh key pair, self-sign a profile under `handle`, and
    /// publish it. Returns the pair on success, `None` when the import or
    /// signing fails.
    pub async fn register_new_user_identity(
        &self,
        handle: &str,
    ) -> Result<Option<KeyPair>, VouchError> {
        check_handle(handle)?;
        let key_pair = crypto::generate_key_pair();
        let user = User::new(handle, key_pair.public_key.clone());
        let signature = match crypto::sign_message(&key_pair, &user.signable_bytes()) {
            Ok(signature) => signature,
            Err(e) => {
                warn!("signing new identity failed: {}", e);
                return Ok(None);
            }
        };
        if self.import.import_signed_user(user, signature).await {
            Ok(Some(key_pair))
        } else {
            Ok(None)
        }
    }

    /// Re-register under a caller-supplied key pair (e.g. after key
    /// recovery).
    pub async fn register_existing_user_identity(
        &self,
        handle: &str,
        key_pair: &KeyPair,
    ) -> Result<bool, VouchError> {
        check_handle(handle)?;
        let user = User::new(handle, key_pair.public_key.clone());
        let signature = match crypto::sign_message(key_pair, &user.signable_bytes()) {
            Ok(signature) => signature,
            Err(e) => {
                warn!("signing identity failed: {}", e);
                return Ok(false);
            }
        };
        Ok(self.import.import_signed_user(user, signature).await)
    }
}

/// Handles must be non-empty after trimming. Checked synchronously,
/// before any network operation.
fn check_handle(handle: &str) -> Result<(), VouchError> {
    if handle.trim().is_empty() {
        return Err(VouchError::InvalidArgument(
            "handle must not be empty".to_string(),
        ));
    }
    Ok(())
}
