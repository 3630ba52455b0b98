// crates/vouch-p2p/src/node.rs
//
// Managed DHT peer: owns the swarm behind an event loop and exposes the
// bootstrap/storage/shutdown surface other crates compose with. The
// KadDhtNode adapter at the bottom implements the DhtNode seam over
// Kademlia records.

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use futures::StreamExt;
use libp2p::identity::Keypair;
use libp2p::kad;
use libp2p::multiaddr::Protocol;
use libp2p::swarm::SwarmEvent;
use libp2p::{Multiaddr, PeerId, Swarm};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use vouch_core::{DhtKey, DhtNode, VouchError};

use crate::behaviour::{VouchBehaviour, VouchBehaviourEvent};
use crate::transport::{build_swarm, TransportConfig};

enum Command {
    AddAddress {
        peer: PeerId,
        address: Multiaddr,
    },
    Bootstrap {
        reply: oneshot::Sender<Result<(), VouchError>>,
    },
    GetRecord {
        key: Vec<u8>,
        reply: oneshot::Sender<Result<Option<Vec<u8>>, VouchError>>,
    },
    PutRecord {
        key: Vec<u8>,
        value: Vec<u8>,
        reply: oneshot::Sender<Result<bool, VouchError>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// A peer under management: external callers drive it through this handle
/// without touching the swarm.
#[derive(Clone)]
pub struct ManagedPeer {
    local_peer_id: PeerId,
    replication_factor: usize,
    command_tx: mpsc::Sender<Command>,
}

impl ManagedPeer {
    /// Build a peer from the transport configuration and spawn its event
    /// loop. Does NOT bootstrap to anyone.
    pub fn spawn(config: &TransportConfig, keypair: Keypair) -> Result<Self, VouchError> {
        let local_peer_id = keypair.public().to_peer_id();
        let swarm = build_swarm(config, keypair)?;
        let (command_tx, command_rx) = mpsc::channel(64);

        let event_loop = EventLoop::new(swarm, command_rx);
        tokio::spawn(event_loop.run());

        Ok(Self {
            local_peer_id,
            replication_factor: config.replication_factor,
            command_tx,
        })
    }

    pub fn local_peer_id(&self) -> PeerId {
        self.local_peer_id
    }

    /// Bootstrap into the network through the given peers.
    ///
    /// Addresses must carry a trailing `/p2p/<peer-id>` component. The
    /// returned future resolves when the routing-table walk completes;
    /// start-up code awaits it to sequence initialization.
    pub async fn bootstrap_to(&self, addresses: &[Multiaddr]) -> Result<(), VouchError> {
        if addresses.is_empty() {
            return Err(VouchError::InvalidArgument(
                "bootstrap addresses must be non-empty".to_string(),
            ));
        }
        for address in addresses {
            let peer = peer_id_of(address).ok_or_else(|| {
                VouchError::InvalidArgument(format!(
                    "bootstrap address {} lacks a /p2p/<peer-id> component",
                    address
                ))
            })?;
            self.send(Command::AddAddress {
                peer,
                address: address.clone(),
            })
            .await?;
        }

        let (reply, response) = oneshot::channel();
        self.send(Command::Bootstrap { reply }).await?;
        response
            .await
            .map_err(|_| VouchError::Network("peer event loop stopped".to_string()))?
    }

    /// Replication is fixed when the behaviour is constructed. This
    /// validates the argument fast and refuses a live change.
    pub fn set_replication(&self, replication_factor: i64) -> Result<(), VouchError> {
        if replication_factor < 0 {
            return Err(VouchError::InvalidArgument(
                "replication factor must be non-negative".to_string(),
            ));
        }
        if replication_factor as usize == self.replication_factor {
            return Ok(());
        }
        Err(VouchError::Network(
            "changing the replication factor requires restarting the peer".to_string(),
        ))
    }

    /// Stop the event loop and drop the swarm, closing all connections.
    pub async fn shutdown(&self) -> Result<(), VouchError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Shutdown { reply }).await?;
        response
            .await
            .map_err(|_| VouchError::Network("peer event loop stopped".to_string()))
    }

    async fn get_record(&self, key: &DhtKey) -> Result<Option<Vec<u8>>, VouchError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::GetRecord {
            key: key.as_bytes().to_vec(),
            reply,
        })
        .await?;
        response
            .await
            .map_err(|_| VouchError::Network("peer event loop stopped".to_string()))?
    }

    async fn put_record(&self, key: &DhtKey, value: Vec<u8>) -> Result<bool, VouchError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::PutRecord {
            key: key.as_bytes().to_vec(),
            value,
            reply,
        })
        .await?;
        response
            .await
            .map_err(|_| VouchError::Network("peer event loop stopped".to_string()))?
    }

    async fn send(&self, command: Command) -> Result<(), VouchError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| VouchError::Network("peer event loop stopped".to_string()))
    }
}

fn peer_id_of(address: &Multiaddr) -> Option<PeerId> {
    address.iter().find_map(|protocol| match protocol {
        Protocol::P2p(peer) => Some(peer),
        _ => None,
    })
}

struct EventLoop {
    swarm: Swarm<VouchBehaviour>,
    command_rx: mpsc::Receiver<Command>,
    pending_gets: HashMap<kad::QueryId, oneshot::Sender<Result<Option<Vec<u8>>, VouchError>>>,
    pending_puts: HashMap<kad::QueryId, oneshot::Sender<Result<bool, VouchError>>>,
    pending_bootstraps: HashMap<kad::QueryId, oneshot::Sender<Result<(), VouchError>>>,
}

impl EventLoop {
    fn new(swarm: Swarm<VouchBehaviour>, command_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            swarm,
            command_rx,
            pending_gets: HashMap::new(),
            pending_puts: HashMap::new(),
            pending_bootstraps: HashMap::new(),
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => {
                        if self.handle_command(command) {
                            break;
                        }
                    }
                    // Every handle dropped; nothing can reach us anymore.
                    None => break,
                },
                event = self.swarm.select_next_some() => self.handle_event(event),
            }
        }
        info!("peer {} event loop stopped", self.swarm.local_peer_id());
    }

    /// Returns true when the loop should stop.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::AddAddress { peer, address } => {
                self.swarm
                    .behaviour_mut()
                    .kademlia
                    .add_address(&peer, address);
                false
            }
            Command::Bootstrap { reply } => {
                match self.swarm.behaviour_mut().kademlia.bootstrap() {
                    Ok(query_id) => {
                        self.pending_bootstraps.insert(query_id, reply);
                    }
                    Err(e) => {
                        let _ = reply.send(Err(VouchError::Network(format!(
                            "bootstrap failed: {}",
                            e
                        ))));
                    }
                }
                false
            }
            Command::GetRecord { key, reply } => {
                let query_id = self
                    .swarm
                    .behaviour_mut()
                    .kademlia
                    .get_record(kad::RecordKey::new(&key));
                self.pending_gets.insert(query_id, reply);
                false
            }
            Command::PutRecord { key, value, reply } => {
                let record = kad::Record::new(kad::RecordKey::new(&key), value);
                match self
                    .swarm
                    .behaviour_mut()
                    .kademlia
                    .put_record(record, kad::Quorum::One)
                {
                    Ok(query_id) => {
                        self.pending_puts.insert(query_id, reply);
                    }
                    Err(e) => {
                        let _ = reply.send(Err(VouchError::Storage(format!(
                            "local record store refused the write: {}",
                            e
                        ))));
                    }
                }
                false
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
                true
            }
        }
    }

    fn handle_event(&mut self, event: SwarmEvent<VouchBehaviourEvent>) {
        match event {
            SwarmEvent::Behaviour(VouchBehaviourEvent::Kademlia(
                kad::Event::OutboundQueryProgressed { id, result, .. },
            )) => self.handle_query_result(id, result),
            SwarmEvent::Behaviour(VouchBehaviourEvent::Mdns(
                libp2p::mdns::Event::Discovered(peers),
            )) => {
                for (peer, address) in peers {
                    debug!("mdns discovered {} at {}", peer, address);
                    self.swarm
                        .behaviour_mut()
                        .kademlia
                        .add_address(&peer, address);
                }
            }
            SwarmEvent::NewListenAddr { address, .. } => {
                info!("listening on {}", address);
            }
            _ => {}
        }
    }

    fn handle_query_result(&mut self, id: kad::QueryId, result: kad::QueryResult) {
        match result {
            kad::QueryResult::GetRecord(Ok(kad::GetRecordOk::FoundRecord(peer_record))) => {
                if let Some(reply) = self.pending_gets.remove(&id) {
                    let _ = reply.send(Ok(Some(peer_record.record.value)));
                    // First record answers the query; stop the walk.
                    if let Some(mut query) = self.swarm.behaviour_mut().kademlia.query_mut(&id) {
                        query.finish();
                    }
                }
            }
            kad::QueryResult::GetRecord(Ok(
                kad::GetRecordOk::FinishedWithNoAdditionalRecord { .. },
            )) => {
                if let Some(reply) = self.pending_gets.remove(&id) {
                    let _ = reply.send(Ok(None));
                }
            }
            kad::QueryResult::GetRecord(Err(kad::GetRecordError::NotFound { .. })) => {
                if let Some(reply) = self.pending_gets.remove(&id) {
                    // Confirmed absent, not a failure.
                    let _ = reply.send(Ok(None));
                }
            }
            kad::QueryResult::GetRecord(Err(e)) => {
                if let Some(reply) = self.pending_gets.remove(&id) {
                    let _ = reply.send(Err(VouchError::Network(format!("get failed: {:?}", e))));
                }
            }
            kad::QueryResult::PutRecord(Ok(_)) => {
                if let Some(reply) = self.pending_puts.remove(&id) {
                    let _ = reply.send(Ok(true));
                }
            }
            kad::QueryResult::PutRecord(Err(kad::PutRecordError::QuorumFailed { .. })) => {
                if let Some(reply) = self.pending_puts.remove(&id) {
                    // The local store holds the record; replication to
                    // other peers is eventual. Acknowledge the write.
                    debug!("put quorum not met, record held locally");
                    let _ = reply.send(Ok(true));
                }
            }
            kad::QueryResult::PutRecord(Err(e)) => {
                if let Some(reply) = self.pending_puts.remove(&id) {
                    let _ = reply.send(Err(VouchError::Network(format!("put failed: {:?}", e))));
                }
            }
            kad::QueryResult::Bootstrap(Ok(kad::BootstrapOk { num_remaining, .. })) => {
                if num_remaining == 0 {
                    if let Some(reply) = self.pending_bootstraps.remove(&id) {
                        info!("bootstrap complete");
                        let _ = reply.send(Ok(()));
                    }
                }
            }
            kad::QueryResult::Bootstrap(Err(e)) => {
                if let Some(reply) = self.pending_bootstraps.remove(&id) {
                    warn!("bootstrap failed: {:?}", e);
                    let _ = reply.send(Err(VouchError::Network(format!(
                        "bootstrap failed: {:?}",
                        e
                    ))));
                }
            }
            _ => {}
        }
    }
}

/// One record slot inside a Kademlia collection record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordEntry<V> {
    sub_key: DhtKey,
    value: V,
}

/// [`DhtNode`] over Kademlia records.
///
/// All records under one reduced key live in a single collection record;
/// `add` is a read-modify-write on that record. Concurrent adders can
/// race and lose a write — the network accepts at-least-one-of,
/// last-write-wins semantics here, not linearizability.
pub struct KadDhtNode<V> {
    peer: ManagedPeer,
    _marker: PhantomData<fn() -> V>,
}

impl<V> KadDhtNode<V> {
    pub fn new(peer: ManagedPeer) -> Self {
        Self {
            peer,
            _marker: PhantomData,
        }
    }
}

impl<V> KadDhtNode<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    async fn entries(&self, key: DhtKey) -> Result<Vec<RecordEntry<V>>, VouchError> {
        match self.peer.get_record(&key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| VouchError::Serialization(format!("bad collection record: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    async fn store(&self, key: DhtKey, entries: &[RecordEntry<V>]) -> Result<bool, VouchError> {
        let bytes = serde_json::to_vec(entries)?;
        self.peer.put_record(&key, bytes).await
    }
}

#[async_trait]
impl<V> DhtNode<V> for KadDhtNode<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    async fn get_one(&self, key: DhtKey) -> Result<Option<V>, VouchError> {
        Ok(self
            .entries(key)
            .await?
            .into_iter()
            .next()
            .map(|entry| entry.value))
    }

    async fn get_one_sub(&self, key: DhtKey, sub_key: DhtKey) -> Result<Option<V>, VouchError> {
        Ok(self
            .entries(key)
            .await?
            .into_iter()
            .find(|entry| entry.sub_key == sub_key)
            .map(|entry| entry.value))
    }

    async fn get_all(&self, key: DhtKey) -> Result<Vec<V>, VouchError> {
        Ok(self
            .entries(key)
            .await?
            .into_iter()
            .map(|entry| entry.value)
            .collect())
    }

    async fn add(&self, key: DhtKey, sub_key: DhtKey, value: V) -> Result<bool, VouchError> {
        let mut entries = self.entries(key).await?;
        entries.retain(|entry| entry.sub_key != sub_key);
        entries.push(RecordEntry { sub_key, value });
        entries.sort_by(|a, b| a.sub_key.cmp(&b.sub_key));
        self.store(key, &entries).await
    }

    async fn put(&self, key: DhtKey, value: V) -> Result<bool, VouchError> {
        let entries = vec![RecordEntry {
            sub_key: DhtKey([0u8; 20]),
            value,
        }];
        self.store(key, &entries).await
    }
}
