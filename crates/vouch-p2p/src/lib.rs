// crates/vouch-p2p/src/lib.rs
//
// vouch-p2p: libp2p networking layer for the Vouch network.
//
// Provides transport setup, the composed Kademlia/identify/mDNS
// behaviour, the managed peer (bootstrap, replication, shutdown), and
// the Kademlia-backed DhtNode adapter.

pub mod behaviour;
pub mod node;
pub mod transport;

pub use behaviour::VouchBehaviour;
pub use node::{KadDhtNode, ManagedPeer};
pub use transport::TransportConfig;
