//! Caller origin resolution
//!
//! The service may sit behind a NAT or jail boundary, so the raw
//! transport peer address is not always the caller's real origin. A
//! forwarded-for header, when present, takes precedence.

use std::net::IpAddr;

/// Resolve the caller's apparent source address.
///
/// Takes the first entry of a comma-separated forwarded-for value when
/// one is present and non-blank, otherwise falls back to the transport
/// peer address.
pub fn client_origin(forwarded_for: Option<&str>, peer: IpAddr) -> String {
    forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.to_string())
}
