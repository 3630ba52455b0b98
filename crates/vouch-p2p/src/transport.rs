// crates/vouch-p2p/src/transport.rs
//
// TCP/QUIC transport setup for the Vouch P2P layer.

use libp2p::identity::Keypair;
use libp2p::{Multiaddr, Swarm};
use serde::{Deserialize, Serialize};
use tracing::info;

use vouch_core::VouchError;

use crate::behaviour::VouchBehaviour;

/// Configuration for the P2P transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Multiaddr to listen on (e.g., "/ip4/0.0.0.0/tcp/1717").
    pub listen_addr: String,
    /// Kademlia replication factor; zero keeps the library default.
    pub replication_factor: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            listen_addr: "/ip4/0.0.0.0/tcp/1717".to_string(),
            replication_factor: 0,
        }
    }
}

/// Build the libp2p Swarm with the given configuration and keypair and
/// start listening.
pub fn build_swarm(
    config: &TransportConfig,
    keypair: Keypair,
) -> Result<Swarm<VouchBehaviour>, VouchError> {
    let behaviour = VouchBehaviour::new(&keypair, config.replication_factor)
        .map_err(|e| VouchError::Network(format!("Failed to create behaviour: {}", e)))?;

    let mut swarm = libp2p::SwarmBuilder::with_existing_identity(keypair)
        .with_tokio()
        .with_tcp(
            libp2p::tcp::Config::default(),
            libp2p::noise::Config::new,
            libp2p::yamux::Config::default,
        )
        .map_err(|e| VouchError::Network(format!("TCP transport error: {}", e)))?
        .with_quic()
        .with_behaviour(|_key| Ok(behaviour))
        .map_err(|e| VouchError::Network(format!("Behaviour setup error: {}", e)))?
        .build();

    let listen_addr: Multiaddr = config.listen_addr.parse().map_err(|e| {
        VouchError::Network(format!("Invalid multiaddr '{}': {}", config.listen_addr, e))
    })?;

    swarm
        .listen_on(listen_addr)
        .map_err(|e| VouchError::Network(format!("Failed to listen on {}: {}", config.listen_addr, e)))?;

    info!("P2P transport listening on {}", config.listen_addr);

    Ok(swarm)
}
