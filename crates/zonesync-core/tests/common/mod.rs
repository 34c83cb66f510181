//! Test doubles and fixtures shared by the engine contract tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use zonesync_core::{
    AddressBook, ClientConfig, Error, SerialState, SyncConfig, SyncEngine, ZoneReloader,
};

/// Reloader that counts invocations and optionally fails every call
pub struct CountingReloader {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingReloader {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                fail: false,
            },
            calls,
        )
    }

    pub fn failing() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                fail: true,
            },
            calls,
        )
    }
}

#[async_trait]
impl ZoneReloader for CountingReloader {
    async fn trigger_reload(&self, _zone: &str) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::reload_failed("simulated reload failure"))
        } else {
            Ok(())
        }
    }

    fn reloader_name(&self) -> &'static str {
        "counting"
    }
}

/// Registry with alice (T1, no suffixes) and bob (T2, eth0 suffix "1")
pub fn test_config(zone_file: Option<PathBuf>, sandbox: bool) -> SyncConfig {
    SyncConfig {
        zone: "dyn.example.net".to_string(),
        ttl: 60,
        zone_file,
        sandbox,
        clients: vec![
            ClientConfig::new("alice", "T1"),
            ClientConfig::new("bob", "T2").with_suffix("eth0", "1"),
        ],
    }
}

/// File-backed engine with a pre-existing (empty) zone file target
pub async fn file_engine(dir: &Path, reloader: Box<dyn ZoneReloader>) -> SyncEngine {
    let zone_path = dir.join("zone.db");
    tokio::fs::write(&zone_path, "").await.unwrap();
    let book = AddressBook::open(dir.join("book.json")).await.unwrap();
    SyncEngine::new(
        test_config(Some(zone_path), false),
        book,
        SerialState::new(),
        reloader,
    )
    .unwrap()
}

/// Sandbox engine with an ephemeral book and no zone file target
pub fn sandbox_engine() -> SyncEngine {
    SyncEngine::new(
        test_config(None, true),
        AddressBook::ephemeral(),
        SerialState::new(),
        Box::new(zonesync_core::NoopReloader),
    )
    .unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn read_zone(dir: &Path) -> String {
    tokio::fs::read_to_string(dir.join("zone.db")).await.unwrap()
}
