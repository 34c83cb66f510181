//! Address composition
//!
//! Builds a single validated address from a stored base (typically an
//! IPv6 prefix) and an optional per-device interface suffix. The whole
//! update is rejected upstream if any composition fails, so this module
//! never returns a partially valid result.

use std::net::IpAddr;

use crate::error::{Error, Result};

/// Resource record type derived from the address family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Zone-file mnemonic for this record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

/// A fully composed and validated network address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposedAddress {
    /// The parsed address
    pub addr: IpAddr,
    /// Record type matching the address family
    pub record_type: RecordType,
}

/// Compose a stored base and an optional suffix into a validated address.
///
/// When the suffix is itself a multi-group IPv6 fragment (more than two
/// colon separators) and the base ends in a trailing colon serving only
/// as a concatenation point, that trailing colon is dropped before
/// appending. Otherwise the concatenation of a compressed base like
/// `2001:db8::` with a near-full suffix would produce a group count the
/// `::` compression can no longer absorb.
///
/// Pure function of its two inputs.
pub fn compose(base: &str, suffix: Option<&str>) -> Result<ComposedAddress> {
    let mut candidate = base.to_string();

    if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
        if suffix.matches(':').count() > 2
            && let Some(trimmed) = candidate.strip_suffix(':')
        {
            candidate = trimmed.to_string();
        }
        candidate.push_str(suffix);
    }

    let addr: IpAddr = candidate
        .parse()
        .map_err(|_| Error::invalid_address(candidate.clone()))?;

    let record_type = match addr {
        IpAddr::V4(_) => RecordType::A,
        IpAddr::V6(_) => RecordType::Aaaa,
    };

    Ok(ComposedAddress { addr, record_type })
}
