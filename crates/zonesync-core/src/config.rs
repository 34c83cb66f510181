//! Configuration types for the zonesync core
//!
//! The client registry and zone settings are fixed at process start and
//! immutable for the lifetime of a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One authenticated client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client identity; owns the `<id>.<name>` namespace in the zone
    pub name: String,

    /// Bearer token presented on every update request
    pub token: String,

    /// Per-device composer suffixes keyed by address id.
    ///
    /// An id with no configured suffix must store a complete address.
    #[serde(default)]
    pub suffixes: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Create a client with no configured suffixes
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            suffixes: BTreeMap::new(),
        }
    }

    /// Add a composer suffix for one address id
    pub fn with_suffix(mut self, address_id: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.suffixes.insert(address_id.into(), suffix.into());
        self
    }
}

/// Core sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Zone apex, e.g. "dyn.example.net"
    pub zone: String,

    /// TTL applied to rendered records
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Target path of the rendered zone file.
    ///
    /// Outside sandbox mode the file must already exist before the
    /// first update is accepted.
    pub zone_file: Option<PathBuf>,

    /// Sandbox/dev mode: skip the zone-file existence check and treat
    /// reloads as no-op successes
    #[serde(default)]
    pub sandbox: bool,

    /// Registered clients
    pub clients: Vec<ClientConfig>,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone.is_empty() {
            return Err(crate::Error::misconfigured("zone name cannot be empty"));
        }
        if self.ttl == 0 {
            return Err(crate::Error::misconfigured("ttl must be > 0"));
        }

        let mut seen_tokens = std::collections::BTreeSet::new();
        let mut seen_names = std::collections::BTreeSet::new();
        for client in &self.clients {
            if client.name.is_empty() {
                return Err(crate::Error::misconfigured("client name cannot be empty"));
            }
            if client.token.is_empty() {
                return Err(crate::Error::misconfigured(format!(
                    "client {} has an empty token",
                    client.name
                )));
            }
            if !seen_names.insert(client.name.as_str()) {
                return Err(crate::Error::misconfigured(format!(
                    "duplicate client name: {}",
                    client.name
                )));
            }
            // Token -> client resolution must be unambiguous.
            if !seen_tokens.insert(client.token.as_str()) {
                return Err(crate::Error::misconfigured(format!(
                    "duplicate token shared by client {}",
                    client.name
                )));
            }
        }

        Ok(())
    }

    /// Resolve a presented token to exactly one client, or none
    pub fn client_for_token(&self, token: &str) -> Option<&ClientConfig> {
        self.clients.iter().find(|c| c.token == token)
    }

    /// Look up the configured suffix for `(client, address_id)`
    pub fn suffix_for(&self, client: &str, address_id: &str) -> Option<&str> {
        self.clients
            .iter()
            .find(|c| c.name == client)
            .and_then(|c| c.suffixes.get(address_id))
            .map(String::as_str)
    }
}

fn default_ttl() -> u32 {
    60
}
