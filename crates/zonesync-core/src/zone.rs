//! Zone file rendering
//!
//! Synthesizes the full zone file text from the address book: a header
//! embedding the serial, then one resource record line per address
//! record. Rendering fails closed: a single invalid address anywhere in
//! the book aborts the whole render, so a partially valid zone file is
//! never handed to the persistence step.
//!
//! Output is byte-for-byte deterministic for identical inputs (the book
//! uses `BTreeMap` at both levels, so enumeration order is fixed).

use std::fmt::Write;

use crate::book::BookContents;
use crate::compose::compose;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::serial::Serial;

// SOA timers: refresh, retry, expire, negative-caching minimum.
const SOA_REFRESH: u32 = 3600;
const SOA_RETRY: u32 = 900;
const SOA_EXPIRE: u32 = 604_800;
const SOA_MINIMUM: u32 = 60;

/// Render the complete zone file text.
///
/// Record owner names are `<address_id>.<client_name>` relative to the
/// zone origin. Every record line corresponds to exactly one address
/// record that passed composition at render time.
pub fn render(config: &SyncConfig, book: &BookContents, serial: Serial) -> Result<String> {
    let zone = &config.zone;
    let mut out = String::new();

    // Infallible: writing to a String cannot fail.
    let _ = writeln!(out, "$ORIGIN {zone}.");
    let _ = writeln!(out, "$TTL {}", config.ttl);
    let _ = writeln!(
        out,
        "@ IN SOA ns.{zone}. hostmaster.{zone}. ( {serial} {SOA_REFRESH} {SOA_RETRY} {SOA_EXPIRE} {SOA_MINIMUM} )",
    );
    let _ = writeln!(out, "@ IN NS ns.{zone}.");

    for (client, records) in book {
        for (address_id, value) in records {
            let suffix = config.suffix_for(client, address_id);
            let composed = compose(value, suffix).inspect_err(|e| {
                tracing::warn!(client, address_id, error = %e, "render rejected record");
            })?;
            let _ = writeln!(
                out,
                "{address_id}.{client} IN {} {}",
                composed.record_type.as_str(),
                composed.addr
            );
        }
    }

    Ok(out)
}
