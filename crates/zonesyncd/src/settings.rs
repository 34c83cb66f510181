//! Daemon settings
//!
//! Loaded from a YAML file and validated before anything else starts.
//!
//! ## Example
//!
//! ```yaml
//! zone: dyn.example.net
//! ttl: 60
//! zone_file: /var/named/dyn.example.net.db
//! book_file: /var/lib/zonesync/book.json
//! listen: 127.0.0.1:8053
//! log_level: info
//! reload_program: rndc
//! clients:
//!   - name: alice
//!     token: s3cret-alice-token
//!     suffixes:
//!       eth0: "1"
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use zonesync_core::{ClientConfig, SyncConfig};

/// Daemon configuration, deserialized from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Zone apex to publish
    pub zone: String,

    /// Record TTL
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Target path of the rendered zone file
    #[serde(default)]
    pub zone_file: Option<PathBuf>,

    /// Path of the durable address book
    #[serde(default)]
    pub book_file: Option<PathBuf>,

    /// Sandbox/dev mode: no existence check on the zone file, no reload
    #[serde(default)]
    pub sandbox: bool,

    /// Listen address for the HTTP surface
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Control program invoked as `<program> reload <zone>`
    #[serde(default = "default_reload_program")]
    pub reload_program: String,

    /// Registered clients
    #[serde(default)]
    pub clients: Vec<ClientConfig>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read settings file {}: {}", path.display(), e)
        })?;
        let settings: Settings = serde_yaml::from_str(&raw).map_err(|e| {
            anyhow::anyhow!("failed to parse settings file {}: {}", path.display(), e)
        })?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        // Core invariants (zone, ttl, unique tokens) first.
        self.sync_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        self.listen
            .parse::<std::net::SocketAddr>()
            .map_err(|_| anyhow::anyhow!("listen '{}' is not a socket address", self.listen))?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "log_level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        }

        if !self.sandbox {
            let book = self.book_file.as_ref().ok_or_else(|| {
                anyhow::anyhow!("book_file is required outside sandbox mode")
            })?;
            if let Some(parent) = book.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                anyhow::bail!(
                    "book_file parent directory does not exist: {}. Create it first.",
                    parent.display()
                );
            }

            if self.zone_file.is_none() {
                anyhow::bail!("zone_file is required outside sandbox mode");
            }
            if self.reload_program.is_empty() {
                anyhow::bail!("reload_program cannot be empty outside sandbox mode");
            }
        }

        Ok(())
    }

    /// Core configuration derived from these settings
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            zone: self.zone.clone(),
            ttl: self.ttl,
            zone_file: self.zone_file.clone(),
            sandbox: self.sandbox,
            clients: self.clients.clone(),
        }
    }
}

fn default_ttl() -> u32 {
    60
}

fn default_listen() -> String {
    "127.0.0.1:8053".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_reload_program() -> String {
    "rndc".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Settings {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn minimal_sandbox_settings_validate() {
        let settings = parse(
            "zone: dyn.example.net\nsandbox: true\nclients:\n  - name: alice\n    token: T1\n",
        );
        settings.validate().unwrap();
        assert_eq!(settings.ttl, 60);
        assert_eq!(settings.listen, "127.0.0.1:8053");
        assert_eq!(settings.reload_program, "rndc");
    }

    #[test]
    fn suffixes_deserialize_per_client() {
        let settings = parse(
            "zone: dyn.example.net\nsandbox: true\nclients:\n  - name: alice\n    token: T1\n    suffixes:\n      eth0: \"1\"\n",
        );
        let config = settings.sync_config();
        assert_eq!(config.suffix_for("alice", "eth0"), Some("1"));
    }

    #[test]
    fn non_sandbox_requires_paths() {
        let settings = parse(
            "zone: dyn.example.net\nclients:\n  - name: alice\n    token: T1\n",
        );
        assert!(settings.validate().is_err());
    }

    #[test]
    fn duplicate_tokens_fail_validation() {
        let settings = parse(
            "zone: dyn.example.net\nsandbox: true\nclients:\n  - name: alice\n    token: T1\n  - name: bob\n    token: T1\n",
        );
        assert!(settings.validate().is_err());
    }

    #[test]
    fn bad_listen_address_fails_validation() {
        let settings = parse(
            "zone: dyn.example.net\nsandbox: true\nlisten: not-an-address\nclients:\n  - name: alice\n    token: T1\n",
        );
        assert!(settings.validate().is_err());
    }
}
