//! Zone synchronization orchestrator
//!
//! The SyncEngine runs the whole per-request workflow:
//!
//! 1. Authenticate the presented token against the client registry
//! 2. Validate the request body shape
//! 3. Open an address book transaction and merge the submitted records
//! 4. Take a serial tick and render the full zone file
//! 5. Persist the zone file, then commit the transaction
//! 6. Trigger the external name-server reload
//!
//! ## Event Flow
//!
//! ```text
//! update request
//!      │
//!      ▼
//! ┌────────────┐   begin/commit   ┌─────────────┐
//! │ SyncEngine │◄────────────────►│ AddressBook │
//! └────────────┘                  └─────────────┘
//!      │  render(book, serial)
//!      ▼
//! zone file ──write──► disk ──trigger──► ZoneReloader
//! ```
//!
//! The book transaction spans steps 3-5, so a second request can never
//! interleave between another request's read and write. A render or
//! persist failure drops the transaction (abort) and leaves previously
//! committed state untouched. A reload failure after commit does not
//! roll anything back: the written zone file stands until the next
//! successful reload.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::book::AddressBook;
use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::serial::{Serial, SerialState};
use crate::traits::ZoneReloader;
use crate::zone;

/// Core zone synchronization engine
///
/// One engine serves all requests of a process. Collaborators are
/// injected at construction; the serial state is owned exclusively by
/// the engine and mutated under its own critical section.
pub struct SyncEngine {
    /// Zone settings and client registry, immutable during a run
    config: SyncConfig,

    /// Durable per-client address book
    book: AddressBook,

    /// Serial state; every accepted request takes one tick
    serial: Mutex<SerialState>,

    /// External reload trigger
    reloader: Box<dyn ZoneReloader>,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// Fails if the configuration does not validate.
    pub fn new(
        config: SyncConfig,
        book: AddressBook,
        serial: SerialState,
        reloader: Box<dyn ZoneReloader>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            book,
            serial: Mutex::new(serial),
            reloader,
        })
    }

    /// Zone apex this engine publishes
    pub fn zone(&self) -> &str {
        &self.config.zone
    }

    /// Handle one address update request.
    ///
    /// `token` is the caller's presented authentication token, `body`
    /// the raw request body. Success carries no content; the error
    /// taxonomy is the terminal outcome the routing layer maps to a
    /// transport status.
    pub async fn submit_update(&self, token: Option<&str>, body: &[u8]) -> Result<()> {
        self.submit_update_on(token, body, chrono::Utc::now().date_naive())
            .await
    }

    /// Handle one update with an explicit "today" for the serial date.
    ///
    /// Exposed so tests can exercise date rollover deterministically;
    /// production callers use [`SyncEngine::submit_update`].
    pub async fn submit_update_on(
        &self,
        token: Option<&str>,
        body: &[u8],
        today: NaiveDate,
    ) -> Result<()> {
        // Authenticate.
        if self.config.clients.is_empty() {
            return Err(Error::misconfigured("no clients configured"));
        }
        let client = token
            .and_then(|t| self.config.client_for_token(t))
            .ok_or(Error::Unauthorized)?;

        // Validate shape.
        let addresses = parse_update_body(body)?;
        info!(
            client = %client.name,
            records = addresses.len(),
            "accepted update request"
        );

        // Transact: merge into the authenticated client's namespace
        // only. The transaction guards the rest of the request.
        let mut tx = self.book.begin().await;
        for (address_id, value) in &addresses {
            tx.set(&client.name, address_id, value);
        }

        // A failed render still spends the tick; gaps in the published
        // sequence are benign under zone transfer semantics.
        let serial = self.next_serial(today).await;

        let text = zone::render(&self.config, tx.snapshot(), serial)?;

        // Persist before commit: the book must never get ahead of the
        // zone file on disk.
        self.persist(&text).await?;
        tx.commit().await?;
        info!(%serial, zone = %self.config.zone, "zone file published");

        // Reload. Not revocable from here on: a failure leaves the
        // committed book and written file in place.
        if self.config.sandbox {
            debug!(zone = %self.config.zone, "sandbox mode, reload skipped");
            return Ok(());
        }
        if let Err(e) = self.reloader.trigger_reload(&self.config.zone).await {
            error!(
                reloader = self.reloader.reloader_name(),
                zone = %self.config.zone,
                "reload failed: {e}"
            );
            return Err(Error::reload_failed(e.to_string()));
        }

        Ok(())
    }

    /// Take the next serial under the serial critical section
    async fn next_serial(&self, today: NaiveDate) -> Serial {
        let mut state = self.serial.lock().await;
        state.next(today)
    }

    /// Write the rendered zone text to the configured target path.
    ///
    /// Outside sandbox mode the target must be configured and already
    /// exist; overwriting an unintended path is treated as a server
    /// misconfiguration, not a create. Sandbox mode writes only when a
    /// target is configured.
    async fn persist(&self, text: &str) -> Result<()> {
        let path: &Path = match &self.config.zone_file {
            Some(path) => path,
            None if self.config.sandbox => {
                debug!("sandbox mode without zone_file, skipping write");
                return Ok(());
            }
            None => return Err(Error::misconfigured("zone_file is not configured")),
        };

        if !self.config.sandbox && !path.exists() {
            return Err(Error::misconfigured(format!(
                "zone file {} does not exist",
                path.display()
            )));
        }

        // Write-then-rename so a crash mid-write cannot leave a
        // truncated zone file behind.
        let temp = path.with_extension("tmp");
        tokio::fs::write(&temp, text).await?;
        tokio::fs::rename(&temp, path).await?;
        debug!(path = %path.display(), bytes = text.len(), "zone file written");
        Ok(())
    }
}

/// Parse and shape-check an update request body.
///
/// Malformed JSON is a bad request; well-formed JSON with a missing or
/// non-mapping `addresses` field, or blank ids/values, is unprocessable.
fn parse_update_body(body: &[u8]) -> Result<BTreeMap<String, String>> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| Error::bad_request(e.to_string()))?;

    let addresses = value
        .get("addresses")
        .ok_or_else(|| Error::unprocessable("missing addresses field"))?
        .as_object()
        .ok_or_else(|| Error::unprocessable("addresses must be a mapping"))?;

    if addresses.is_empty() {
        return Err(Error::unprocessable("addresses cannot be empty"));
    }

    let mut out = BTreeMap::new();
    for (address_id, value) in addresses {
        // Ids become zone owner-name labels, which cannot carry
        // whitespace.
        if address_id.is_empty() || address_id.chars().any(char::is_whitespace) {
            return Err(Error::unprocessable(format!(
                "invalid address id {address_id:?}"
            )));
        }
        let value = value
            .as_str()
            .ok_or_else(|| Error::unprocessable(format!("address {address_id} must be a string")))?;
        if value.trim().is_empty() {
            return Err(Error::unprocessable(format!("address {address_id} is blank")));
        }
        out.insert(address_id.clone(), value.to_string());
    }

    Ok(out)
}
