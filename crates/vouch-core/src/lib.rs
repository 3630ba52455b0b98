// crates/vouch-core/src/lib.rs
//
// vouch-core: Core types, traits, and crypto primitives for the Vouch
// reputation network.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the canonical data structures, error type, cryptographic
// helpers, and trait seams used throughout the system.

pub mod crypto;
pub mod error;
pub mod traits;
pub mod types;
pub mod user;
pub mod vote;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use vouch_core::SignedUser;`

pub use error::VouchError;

pub use types::{
    ContentHash, HashAlgorithm, Key, KeyPair, KeyType, Signature, SignatureAlgorithm,
};

pub use user::{SignedUser, Trust, TrustAssertion, User};

pub use vote::{Assertion, Rating, SignedVote, Vote};

pub use traits::{DhtKey, DhtNode, TrustGenerator, TrustMetric};
