// crates/vouch-client/src/lib.rs
//
// vouch-client: The services a participant drives the network with.
//
// Import/publish of signed records, the local identity vault, trust-list
// management and trust-network resolution, vote casting/retrieval, and
// the trust-weighted scoring algorithm. Presentation layers call these
// directly; there is no additional business logic above them.

pub mod generator;
pub mod identity;
pub mod import;
pub mod scoring;
pub mod trust;
pub mod votes;

// Re-export key types for ergonomic access from downstream crates.
pub use generator::AssertionPatternGenerator;
pub use identity::IdentityVault;
pub use import::ImportService;
pub use scoring::TrustScoreService;
pub use trust::TrustNetworkService;
pub use votes::{VoteService, DEFAULT_CONTENT_PROPERTY};
