// crates/vouch-client/src/identity.rs
//
// Local identity vault: the named key pairs this node can act as, and
// which one is current.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use vouch_core::{crypto, ContentHash, KeyPair, VouchError};

const UNNAMED: &str = "Unnamed";

/// Ordered set of local identities keyed by public-key hash digest, plus
/// the currently selected one. Ordering makes iteration stable across
/// runs regardless of file order.
pub struct IdentityVault {
    identities: BTreeMap<Vec<u8>, (KeyPair, String)>,
    current: Option<Vec<u8>>,
}

/// On-disk identity file: one `[[identity]]` table per key pair, with
/// hex-encoded 32-byte ed25519 seeds, and an optional `[default]` table
/// naming the identity to select at start-up.
#[derive(Debug, Deserialize)]
struct IdentityFile {
    #[serde(default)]
    identity: Vec<IdentityEntry>,
    #[serde(default)]
    default: Option<DefaultEntry>,
}

#[derive(Debug, Deserialize)]
struct IdentityEntry {
    private_key: String,
    #[serde(default)]
    handle: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DefaultEntry {
    #[serde(default)]
    handle: Option<String>,
}

impl IdentityVault {
    fn empty() -> Self {
        Self {
            identities: BTreeMap::new(),
            current: None,
        }
    }

    /// A vault holding exactly one identity, selected as current.
    pub fn single(key_pair: KeyPair, handle: impl Into<String>) -> Self {
        let mut vault = Self::empty();
        let digest = key_pair.public_key.hash.digest.clone();
        vault.identities.insert(digest.clone(), (key_pair, handle.into()));
        vault.current = Some(digest);
        vault
    }

    /// Load identities from a TOML file.
    ///
    /// Entries with an unparseable private key are skipped with a
    /// warning. When no `[default]` section selects an identity, the
    /// first one (by key-hash order) becomes current.
    pub fn load(path: &Path) -> Result<Self, VouchError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| VouchError::InvalidArgument(format!("cannot read {:?}: {}", path, e)))?;
        let file: IdentityFile = toml::from_str(&contents)
            .map_err(|e| VouchError::Serialization(format!("bad identity file: {}", e)))?;

        let mut vault = Self::empty();
        for entry in &file.identity {
            let seed = match hex::decode(entry.private_key.trim()) {
                Ok(seed) => seed,
                Err(e) => {
                    warn!("skipping identity with invalid private key hex: {}", e);
                    continue;
                }
            };
            let key_pair = match crypto::key_pair_from_seed(&seed) {
                Ok(key_pair) => key_pair,
                Err(e) => {
                    warn!("skipping identity with invalid seed: {}", e);
                    continue;
                }
            };
            let handle = entry.handle.clone().unwrap_or_else(|| UNNAMED.to_string());
            info!("loaded identity {} [{}]", handle, key_pair.public_key);
            vault.add_identity(key_pair, handle);
        }

        if let Some(default) = &file.default {
            if let Some(handle) = &default.handle {
                let chosen = vault
                    .identities
                    .iter()
                    .find(|(_, (_, h))| h == handle)
                    .map(|(digest, _)| digest.clone());
                match chosen {
                    Some(digest) => vault.current = Some(digest),
                    None => warn!("default identity handle {:?} not found", handle),
                }
            }
        }
        if vault.current.is_none() {
            if let Some(first) = vault.identities.keys().next().cloned() {
                warn!("no default identity specified, picking the first");
                vault.current = Some(first);
            } else {
                warn!("initializing empty identity vault");
            }
        }
        Ok(vault)
    }

    /// The currently selected key pair, if any identity is loaded.
    pub fn current_key_pair(&self) -> Option<&KeyPair> {
        self.current
            .as_ref()
            .and_then(|digest| self.identities.get(digest))
            .map(|(key_pair, _)| key_pair)
    }

    /// The handle configured for an identity. May disagree with the
    /// handle stored in the network.
    pub fn configured_handle(&self, key_pair: &KeyPair) -> Option<&str> {
        self.identities
            .get(&key_pair.public_key.hash.digest)
            .map(|(_, handle)| handle.as_str())
    }

    /// Add an identity without selecting it. Does not persist anything.
    pub fn add_identity(&mut self, key_pair: KeyPair, handle: impl Into<String>) {
        self.identities.insert(
            key_pair.public_key.hash.digest.clone(),
            (key_pair, handle.into()),
        );
    }

    /// Switch to the given key pair, adopting it under an "Unnamed"
    /// handle if the vault has not seen it before.
    pub fn switch_identity(&mut self, key_pair: KeyPair) {
        let digest = key_pair.public_key.hash.digest.clone();
        if !self.identities.contains_key(&digest) {
            warn!(
                "identity {} was not in the vault, adding it",
                key_pair.public_key
            );
            self.identities.insert(digest.clone(), (key_pair, UNNAMED.to_string()));
        }
        self.current = Some(digest);
    }

    /// Switch to the identity whose public key hashes to `hash`.
    pub fn switch_identity_by_hash(&mut self, hash: &ContentHash) -> Result<(), VouchError> {
        if self.identities.contains_key(&hash.digest) {
            info!("switching to identity with key hash {}", hash);
            self.current = Some(hash.digest.clone());
            Ok(())
        } else {
            Err(VouchError::InvalidArgument(format!(
                "unknown identity hash {}",
                hash
            )))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyPair, &str)> {
        self.identities
            .values()
            .map(|(key_pair, handle)| (key_pair, handle.as_str()))
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_vault_selects_its_identity() {
        let pair = crypto::generate_key_pair();
        let vault = IdentityVault::single(pair.clone(), "alice");
        assert_eq!(vault.current_key_pair(), Some(&pair));
        assert_eq!(vault.configured_handle(&pair), Some("alice"));
    }

    #[test]
    fn switch_adopts_unknown_key_pairs() {
        let first = crypto::generate_key_pair();
        let second = crypto::generate_key_pair();
        let mut vault = IdentityVault::single(first, "alice");

        vault.switch_identity(second.clone());
        assert_eq!(vault.current_key_pair(), Some(&second));
        assert_eq!(vault.configured_handle(&second), Some(UNNAMED));
        assert_eq!(vault.len(), 2);
    }

    #[test]
    fn switch_by_hash_requires_a_known_identity() {
        let pair = crypto::generate_key_pair();
        let other = crypto::generate_key_pair();
        let mut vault = IdentityVault::single(pair.clone(), "alice");
        vault.add_identity(other.clone(), "bob");

        vault.switch_identity_by_hash(&other.public_key.hash).unwrap();
        assert_eq!(vault.current_key_pair(), Some(&other));

        let unknown = crypto::generate_key_pair();
        assert!(vault
            .switch_identity_by_hash(&unknown.public_key.hash)
            .is_err());
    }

    #[test]
    fn load_reads_identities_and_default_from_toml() {
        let alice = crypto::generate_key_pair();
        let bob = crypto::generate_key_pair();
        let contents = format!(
            "[[identity]]\nprivate_key = \"{}\"\nhandle = \"alice\"\n\n\
             [[identity]]\nprivate_key = \"{}\"\nhandle = \"bob\"\n\n\
             [default]\nhandle = \"bob\"\n",
            hex::encode(&alice.private_key.raw),
            hex::encode(&bob.private_key.raw),
        );
        let dir = std::env::temp_dir().join(format!(
            "vouch_vault_test_{}",
            hex::encode(&alice.public_key.hash.digest[..6])
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("identities.toml");
        fs::write(&path, contents).unwrap();

        let vault = IdentityVault::load(&path).unwrap();
        assert_eq!(vault.len(), 2);
        assert_eq!(
            vault.current_key_pair().map(|p| p.public_key.clone()),
            Some(bob.public_key)
        );

        fs::remove_dir_all(&dir).ok();
    }
}
