// # zonesync-core
//
// Core library for the zonesync zone publication service.
//
// ## Architecture Overview
//
// Authenticated clients submit address fragments; the core merges them
// into a durable per-client address book, derives a monotonically
// increasing zone serial, renders a complete zone file, persists it,
// and asks the name server to reload.
//
// - **compose**: builds one validated address from a stored base and a
//   per-device suffix
// - **serial**: date-based, same-day-monotonic zone serials
// - **book**: durable address book with exclusive transactions
// - **zone**: deterministic, fail-closed zone file rendering
// - **engine**: the per-request orchestration workflow
// - **origin**: caller origin resolution behind NAT/jail boundaries
// - **ZoneReloader**: narrow seam around the external reload mechanism
//
// ## Design Principles
//
// 1. **Fail closed**: one bad address rejects the whole update; no
//    partial zone file is ever written
// 2. **All-or-nothing persistence**: book commits happen only after the
//    zone file write succeeds
// 3. **Exclusive transactions**: the book mutex spans the full
//    read-merge-render-write window of a request
// 4. **Narrow collaborators**: reload is a trait so the daemon can
//    substitute a real invoker, a no-op, or a test double

pub mod book;
pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod origin;
pub mod serial;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use book::AddressBook;
pub use compose::{ComposedAddress, RecordType, compose};
pub use config::{ClientConfig, SyncConfig};
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use origin::client_origin;
pub use serial::{Serial, SerialState};
pub use traits::{NoopReloader, ZoneReloader};
