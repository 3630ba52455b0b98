// crates/vouch-daemon/src/config.rs
//
// Runtime configuration for the Vouch daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Multiaddr the peer listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Bootstrap peers as multiaddrs with trailing /p2p/<peer-id>.
    /// When empty (default), the node starts standalone.
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,

    /// Kademlia replication factor; zero keeps the library default.
    #[serde(default)]
    pub replication_factor: usize,

    /// Path to the identity vault TOML file.
    #[serde(default = "default_identity_file")]
    pub identity_file: String,

    /// Handle used when no identity file exists and a fresh identity is
    /// generated at start-up.
    #[serde(default = "default_handle")]
    pub default_handle: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_addr() -> String {
    "/ip4/0.0.0.0/tcp/1717".to_string()
}

fn default_identity_file() -> String {
    "~/.vouch/identities.toml".to_string()
}

fn default_handle() -> String {
    "Default".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            bootstrap_peers: Vec::new(),
            replication_factor: 0,
            identity_file: default_identity_file(),
            default_handle: default_handle(),
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_standalone() {
        let config = DaemonConfig::default();
        assert!(config.bootstrap_peers.is_empty());
        assert_eq!(config.replication_factor, 0);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: DaemonConfig =
            toml::from_str("listen_addr = \"/ip4/127.0.0.1/tcp/4004\"").unwrap();
        assert_eq!(config.listen_addr, "/ip4/127.0.0.1/tcp/4004");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.default_handle, "Default");
    }
}
