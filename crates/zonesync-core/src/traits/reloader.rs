// # Zone Reloader Trait
//
// Narrow seam around the external name-server reload mechanism. The
// core only needs "reload succeeded / failed" as an outcome; how the
// reload happens (rndc, signal, systemd unit) is an implementation
// concern of the collaborator crate.
//
// Implementations must not retry: a reload failure is reported to the
// caller of the current request and never retried automatically. The
// reload itself is assumed idempotent, so the core performs no
// request-level deduplication.

use async_trait::async_trait;

/// Trait for triggering a name-server zone reload
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait ZoneReloader: Send + Sync {
    /// Ask the name server to reload the named zone.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the server accepted the reload
    /// - `Err(Error)`: the reload invocation failed; the just-written
    ///   zone file stays in place regardless
    async fn trigger_reload(&self, zone: &str) -> Result<(), crate::Error>;

    /// Name of this reloader, for logging
    fn reloader_name(&self) -> &'static str;
}

/// Reloader that does nothing and always succeeds
///
/// Used in sandbox mode and as a test double.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReloader;

#[async_trait]
impl ZoneReloader for NoopReloader {
    async fn trigger_reload(&self, zone: &str) -> Result<(), crate::Error> {
        tracing::debug!(zone, "noop reload");
        Ok(())
    }

    fn reloader_name(&self) -> &'static str {
        "noop"
    }
}
