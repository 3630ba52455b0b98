// crates/vouch-p2p/src/behaviour.rs
//
// Composed NetworkBehaviour for the Vouch P2P layer.

use std::num::NonZeroUsize;
use std::time::Duration;

use libp2p::identity::Keypair;
use libp2p::kad::store::MemoryStore;
use libp2p::{identify, kad, mdns, swarm::NetworkBehaviour};

/// The composed network behaviour for a Vouch peer.
#[derive(NetworkBehaviour)]
pub struct VouchBehaviour {
    /// Kademlia DHT carrying the shared record keyspace.
    pub kademlia: kad::Behaviour<MemoryStore>,
    /// mDNS for local network peer discovery.
    pub mdns: mdns::tokio::Behaviour,
    /// Identify protocol for exchanging peer info.
    pub identify: identify::Behaviour,
}

impl VouchBehaviour {
    /// Create a new VouchBehaviour with the given keypair.
    ///
    /// `replication_factor` of zero keeps Kademlia's default; replication
    /// is fixed at construction for the lifetime of the peer.
    pub fn new(
        keypair: &Keypair,
        replication_factor: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let peer_id = keypair.public().to_peer_id();

        // Kademlia configuration, acting as a storage server.
        let mut kad_config = kad::Config::default();
        kad_config.set_query_timeout(Duration::from_secs(30));
        if let Some(factor) = NonZeroUsize::new(replication_factor) {
            kad_config.set_replication_factor(factor);
        }
        let store = MemoryStore::new(peer_id);
        let mut kademlia = kad::Behaviour::with_config(peer_id, store, kad_config);
        kademlia.set_mode(Some(kad::Mode::Server));

        // mDNS for local network discovery
        let mdns = mdns::tokio::Behaviour::new(mdns::Config::default(), peer_id)?;

        // Identify protocol
        let identify = identify::Behaviour::new(identify::Config::new(
            "/vouch/id/1.0.0".to_string(),
            keypair.public(),
        ));

        Ok(Self {
            kademlia,
            mdns,
            identify,
        })
    }
}
