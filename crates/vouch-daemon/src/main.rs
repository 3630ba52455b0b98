// crates/vouch-daemon/src/main.rs
//
// Binary entrypoint for the Vouch network daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration and the
// identity vault, starts the peer, performs the synchronous bootstrap
// wait, wires the client services explicitly, and runs until
// interrupted.

mod config;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use libp2p::Multiaddr;

use config::DaemonConfig;
use vouch_client::{
    AssertionPatternGenerator, IdentityVault, ImportService, TrustNetworkService,
    TrustScoreService, VoteService,
};
use vouch_core::{crypto, KeyPair, SignedUser, SignedVote};
use vouch_dht::{user_map, vote_map, KeyLookupService, SignatureValidationService};
use vouch_p2p::{KadDhtNode, ManagedPeer, TransportConfig};

/// Vouch network daemon — one peer plus the client services on top.
#[derive(Parser, Debug)]
#[command(name = "vouch-daemon", version = "0.1.0", about = "Vouch reputation network daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.vouch/config.toml")]
    config: String,

    /// Override the listen multiaddr from the config file.
    #[arg(long)]
    listen_addr: Option<String>,
}

/// The fully wired client stack, handed to whatever surface sits on top.
#[allow(dead_code)]
struct Services {
    import: Arc<ImportService>,
    trust: TrustNetworkService,
    votes: Arc<VoteService>,
    scoring: TrustScoreService,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the
    // file is not found.
    let config_path = expand_tilde(&args.config);
    let mut daemon_config = match DaemonConfig::load(&config_path) {
        Ok(config) => {
            tracing::info!("Loaded configuration from {}", config_path);
            config
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            DaemonConfig::default()
        }
    };
    if let Some(listen_addr) = args.listen_addr {
        daemon_config.listen_addr = listen_addr;
    }

    tracing::info!("Vouch Daemon v0.1.0");
    tracing::info!("Listen address: {}", daemon_config.listen_addr);
    tracing::info!("Bootstrap peers: {}", daemon_config.bootstrap_peers.len());

    // Identity vault: load from disk, or generate a fresh identity.
    let vault = load_vault(&daemon_config);
    let key_pair = vault
        .current_key_pair()
        .cloned()
        .unwrap_or_else(crypto::generate_key_pair);
    tracing::info!("Acting as {}", key_pair.public_key);

    // Start the peer and bootstrap before anything touches the network;
    // this is the one deliberate synchronous wait in the process.
    let transport_config = TransportConfig {
        listen_addr: daemon_config.listen_addr.clone(),
        replication_factor: daemon_config.replication_factor,
    };
    let peer = ManagedPeer::spawn(&transport_config, libp2p::identity::Keypair::generate_ed25519())?;
    tracing::info!("Local peer id: {}", peer.local_peer_id());

    if !daemon_config.bootstrap_peers.is_empty() {
        let addresses = parse_bootstrap_addresses(&daemon_config.bootstrap_peers)?;
        match peer.bootstrap_to(&addresses).await {
            Ok(()) => tracing::info!("Bootstrapped to {} peers", addresses.len()),
            Err(e) => tracing::warn!("Bootstrap failed: {}. Continuing standalone.", e),
        }
    }

    let services = wire_services(&peer, key_pair);
    tracing::info!("Client services ready");
    if let Ok(Some(identity)) = services.trust.user_identity().await {
        tracing::info!("Network identity resolved: {}", identity.handle);
    }

    // Run until interrupted.
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    peer.shutdown().await?;
    tracing::info!("Vouch daemon shut down gracefully");

    Ok(())
}

/// Construct every client service over the peer's DHT adapters. Explicit
/// wiring, no ambient registry.
fn wire_services(peer: &ManagedPeer, key_pair: KeyPair) -> Services {
    let user_node = Arc::new(KadDhtNode::<SignedUser>::new(peer.clone()));
    let vote_node = Arc::new(KadDhtNode::<SignedVote>::new(peer.clone()));
    let users = Arc::new(user_map(user_node));
    let votes = Arc::new(vote_map(vote_node));

    let lookup = Arc::new(KeyLookupService::new(users.clone()));
    let validation = Arc::new(SignatureValidationService::new(lookup.clone()));
    let import = Arc::new(ImportService::new(key_pair, users, votes.clone()));
    let vote_service = Arc::new(VoteService::new(votes, import.clone()));
    let scoring = TrustScoreService::new(
        vote_service.clone(),
        lookup.clone(),
        Arc::new(AssertionPatternGenerator::new()),
    );
    let trust = TrustNetworkService::new(lookup, validation, import.clone());

    Services {
        import,
        trust,
        votes: vote_service,
        scoring,
    }
}

/// Load the identity vault from the configured file, generating a single
/// fresh identity when the file is missing or unreadable.
fn load_vault(config: &DaemonConfig) -> IdentityVault {
    let path = expand_tilde(&config.identity_file);
    match IdentityVault::load(Path::new(&path)) {
        Ok(vault) if !vault.is_empty() => {
            tracing::info!("Loaded {} identities from {}", vault.len(), path);
            vault
        }
        Ok(_) => {
            tracing::warn!("Identity file {} holds no identities. Generating one.", path);
            IdentityVault::single(crypto::generate_key_pair(), config.default_handle.clone())
        }
        Err(e) => {
            tracing::warn!(
                "Could not load identities from {}: {}. Generating one.",
                path,
                e
            );
            IdentityVault::single(crypto::generate_key_pair(), config.default_handle.clone())
        }
    }
}

fn parse_bootstrap_addresses(
    addresses: &[String],
) -> Result<Vec<Multiaddr>, Box<dyn std::error::Error>> {
    addresses
        .iter()
        .map(|address| {
            address
                .parse::<Multiaddr>()
                .map_err(|e| format!("invalid bootstrap address '{}': {}", address, e).into())
        })
        .collect()
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &path[1..]);
        }
    }
    path.to_string()
}
