// crates/vouch-dht/src/validation.rs
//
// Signature validation at two trust levels: self-consistency (a record's
// embedded claims match its own signature) and network-anchored trust
// (the network's copy of the identity agrees).

use std::sync::Arc;

use tracing::{debug, info};

use vouch_core::{
    crypto, Signature, SignatureAlgorithm, SignedUser, SignedVote, User, VouchError,
};

use crate::lookup::KeyLookupService;

/// Validates signatures against claimed and network-resolved owners.
pub struct SignatureValidationService {
    lookup: Arc<KeyLookupService>,
}

impl SignatureValidationService {
    pub fn new(lookup: Arc<KeyLookupService>) -> Self {
        Self { lookup }
    }

    /// Check that `signature` was produced by `user`'s own key over
    /// `payload`.
    ///
    /// `Ok(false)` when the signature's embedded public key differs from
    /// the user's, or when the cryptographic check fails. An algorithm
    /// this node does not implement is a fatal configuration error, not a
    /// validation failure.
    pub fn validate_self_signed(
        &self,
        signature: &Signature,
        user: &User,
        payload: &[u8],
    ) -> Result<bool, VouchError> {
        match signature.algorithm {
            SignatureAlgorithm::Ed25519 => {
                if user.public_key != signature.public_key {
                    info!(
                        "user {} and signature {} use different public keys",
                        user.public_key, signature.public_key
                    );
                    return Ok(false);
                }
                crypto::verify_signature(signature, payload)
            }
            other => Err(VouchError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    /// Validate `signature` against the identity the *network* has on
    /// record for its public key.
    ///
    /// Guards against a signature claiming a public key whose declared
    /// owner differs from the network's copy. Unresolved signers and
    /// lookup failures both yield `Ok(false)`.
    pub async fn validate_and_check_key_in_network(
        &self,
        signature: &Signature,
        payload: &[u8],
    ) -> Result<bool, VouchError> {
        let owner = match self.lookup.find_owner(&signature.public_key.hash).await {
            Ok(owner) => owner,
            Err(e) => {
                debug!("validation failed, owner lookup errored: {}", e);
                return Ok(false);
            }
        };
        match owner {
            Some(signed) => self.validate_self_signed(signature, &signed.user, payload),
            None => {
                debug!("validation failed, owner not found for {}", signature);
                Ok(false)
            }
        }
    }

    /// Self-signed check for a stored identity record.
    pub fn validate_user(&self, signed: &SignedUser) -> Result<bool, VouchError> {
        self.validate_self_signed(&signed.signature, &signed.user, &signed.user.signable_bytes())
    }

    /// Self-signed check for a stored vote record: the signature must
    /// embed the vote's owner key and verify over the vote's canonical
    /// digest.
    pub fn validate_vote(&self, signed: &SignedVote) -> Result<bool, VouchError> {
        match signed.signature.algorithm {
            SignatureAlgorithm::Ed25519 => {
                if signed.vote.owner_public_key != signed.signature.public_key {
                    info!(
                        "vote owner {} and signature {} use different public keys",
                        signed.vote.owner_public_key, signed.signature.public_key
                    );
                    return Ok(false);
                }
                crypto::verify_signature(&signed.signature, &signed.vote.signable_bytes())
            }
            other => Err(VouchError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::user_map;
    use crate::memory::InMemoryDhtNode;
    use crate::multimap::DomainMultiMap;
    use vouch_core::SignedUser;

    fn service() -> (Arc<DomainMultiMap<SignedUser>>, SignatureValidationService) {
        let map = Arc::new(user_map(Arc::new(InMemoryDhtNode::new())));
        let lookup = Arc::new(KeyLookupService::new(map.clone()));
        (map, SignatureValidationService::new(lookup))
    }

    fn self_signed(handle: &str) -> (vouch_core::KeyPair, SignedUser) {
        let pair = crypto::generate_key_pair();
        let user = User::new(handle, pair.public_key.clone());
        let signature = crypto::sign_message(&pair, &user.signable_bytes()).unwrap();
        (pair, SignedUser { user, signature })
    }

    #[test]
    fn valid_self_signed_payload_passes() {
        let (_, validation) = service();
        let pair = crypto::generate_key_pair();
        let user = User::new("alice", pair.public_key.clone());
        let payload = b"arbitrary payload";
        let signature = crypto::sign_message(&pair, payload).unwrap();

        assert!(validation
            .validate_self_signed(&signature, &user, payload)
            .unwrap());
    }

    #[test]
    fn mismatched_embedded_key_fails_regardless_of_payload() {
        let (_, validation) = service();
        let signer = crypto::generate_key_pair();
        let impostor = crypto::generate_key_pair();
        let user = User::new("mallory", impostor.public_key);
        let payload = b"payload";
        let signature = crypto::sign_message(&signer, payload).unwrap();

        assert!(!validation
            .validate_self_signed(&signature, &user, payload)
            .unwrap());
    }

    #[test]
    fn unsupported_algorithm_is_fatal_not_false() {
        let (_, validation) = service();
        let pair = crypto::generate_key_pair();
        let user = User::new("alice", pair.public_key.clone());
        let mut signature = crypto::sign_message(&pair, b"payload").unwrap();
        signature.algorithm = SignatureAlgorithm::Secp256k1;

        let result = validation.validate_self_signed(&signature, &user, b"payload");
        assert!(matches!(result, Err(VouchError::UnsupportedAlgorithm(_))));
    }

    #[tokio::test]
    async fn network_check_fails_for_unknown_signer() {
        let (_, validation) = service();
        let pair = crypto::generate_key_pair();
        let signature = crypto::sign_message(&pair, b"payload").unwrap();

        assert!(!validation
            .validate_and_check_key_in_network(&signature, b"payload")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn network_check_passes_once_identity_is_stored() {
        let (map, validation) = service();
        let (pair, signed) = self_signed("alice");
        map.put(&pair.public_key.hash, signed).await.unwrap();

        let payload = b"a fresh payload";
        let signature = crypto::sign_message(&pair, payload).unwrap();
        assert!(validation
            .validate_and_check_key_in_network(&signature, payload)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn network_check_rejects_when_stored_owner_differs() {
        // The network's record for this key hash declares a different
        // public key: someone claiming an address they do not own.
        let (map, validation) = service();
        let claimer = crypto::generate_key_pair();
        let (other_pair, mut stored) = self_signed("on-record");
        stored.user.public_key = other_pair.public_key.clone();
        // Plant the record at the claimer's key hash.
        map.put(&claimer.public_key.hash, stored).await.unwrap();

        let payload = b"payload";
        let signature = crypto::sign_message(&claimer, payload).unwrap();
        assert!(!validation
            .validate_and_check_key_in_network(&signature, payload)
            .await
            .unwrap());
    }

    #[test]
    fn validate_user_checks_the_canonical_digest() {
        let (_, validation) = service();
        let (_, signed) = self_signed("alice");
        assert!(validation.validate_user(&signed).unwrap());

        let mut tampered = signed;
        tampered.user.handle = "renamed".to_string();
        assert!(!validation.validate_user(&tampered).unwrap());
    }
}
