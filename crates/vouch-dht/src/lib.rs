// crates/vouch-dht/src/lib.rs
//
// vouch-dht: Domain-separated storage and authentication over the
// distributed key space.
//
// Provides the composite key reduction into the shared 160-bit keyspace,
// the typed domain multi-map with per-domain collision gating, the
// in-memory DhtNode used by tests and single-node operation, and the key
// lookup / signature validation services built on the identity domain.

pub mod domains;
pub mod keyspace;
pub mod lookup;
pub mod memory;
pub mod multimap;
pub mod validation;

// Re-export key types for ergonomic access from downstream crates.
pub use domains::{user_map, vote_map, USER_DOMAIN, VOTE_DOMAIN};
pub use keyspace::Domain;
pub use lookup::KeyLookupService;
pub use memory::InMemoryDhtNode;
pub use multimap::DomainMultiMap;
pub use validation::SignatureValidationService;
