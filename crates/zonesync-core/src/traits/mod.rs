//! Collaborator seams for the zonesync core

pub mod reloader;

pub use reloader::{NoopReloader, ZoneReloader};
