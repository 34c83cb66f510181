// # zonesync-reload-rndc
//
// `ZoneReloader` implementation that invokes an external reload command
// by name, `rndc reload <zone>` by default. The core never embeds shell
// invocation logic; this crate is the whole integration.
//
// The command is run once per trigger with no retries: the engine
// reports a failed invocation as the terminal outcome of the request.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};
use zonesync_core::{Error, ZoneReloader};

/// Reloader that shells out to an rndc-style control command
///
/// The program is invoked as `<program> reload <zone>`; any non-zero
/// exit status is a reload failure.
#[derive(Debug, Clone)]
pub struct RndcReloader {
    program: String,
}

impl RndcReloader {
    /// Reloader using the default `rndc` program
    pub fn new() -> Self {
        Self::with_program("rndc")
    }

    /// Reloader using a custom control program
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for RndcReloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZoneReloader for RndcReloader {
    async fn trigger_reload(&self, zone: &str) -> Result<(), Error> {
        debug!(program = %self.program, zone, "invoking zone reload");

        let output = Command::new(&self.program)
            .arg("reload")
            .arg(zone)
            .output()
            .await
            .map_err(|e| {
                Error::reload_failed(format!("failed to spawn {}: {}", self.program, e))
            })?;

        if output.status.success() {
            debug!(zone, "reload accepted");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(zone, status = ?output.status.code(), "reload command failed");
            Err(Error::reload_failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )))
        }
    }

    fn reloader_name(&self) -> &'static str {
        "rndc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn succeeding_command_reports_success() {
        let reloader = RndcReloader::with_program("true");
        reloader.trigger_reload("dyn.example.net").await.unwrap();
    }

    #[tokio::test]
    async fn failing_command_reports_reload_failure() {
        let reloader = RndcReloader::with_program("false");
        let err = reloader.trigger_reload("dyn.example.net").await.unwrap_err();
        assert!(matches!(err, Error::ReloadFailed(_)));
    }

    #[tokio::test]
    async fn missing_program_reports_reload_failure() {
        let reloader = RndcReloader::with_program("definitely-not-a-real-binary");
        let err = reloader.trigger_reload("dyn.example.net").await.unwrap_err();
        assert!(matches!(err, Error::ReloadFailed(_)));
    }
}
