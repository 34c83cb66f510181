//! Contract: the accepted-update workflow end to end
//!
//! Constraints verified:
//! - An accepted update publishes a zone file with the expected record
//!   and a date-based serial starting at `..00`
//! - Same-day serials strictly increase; rollover resets the counter
//! - Updates merge into the book: earlier ids survive later requests
//! - Submitting the same set twice is idempotent modulo the serial
//! - The reload trigger fires once per accepted update

mod common;

use common::*;
use std::sync::atomic::Ordering;
use tempfile::tempdir;

#[tokio::test]
async fn accepted_update_publishes_zone_file() {
    let dir = tempdir().unwrap();
    let (reloader, calls) = CountingReloader::new();
    let engine = file_engine(dir.path(), Box::new(reloader)).await;

    engine
        .submit_update_on(
            Some("T1"),
            br#"{"addresses": {"eth0": "2001:db8::10"}}"#,
            day(2024, 3, 1),
        )
        .await
        .unwrap();

    let zone = read_zone(dir.path()).await;
    assert!(zone.contains("eth0.alice IN AAAA 2001:db8::10\n"));
    assert!(zone.contains("( 2024030100 "));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zone_write_replaces_the_file_and_leaves_no_temp_sibling() {
    let dir = tempdir().unwrap();
    let (reloader, _calls) = CountingReloader::new();
    let engine = file_engine(dir.path(), Box::new(reloader)).await;

    engine
        .submit_update_on(
            Some("T1"),
            br#"{"addresses": {"eth0": "2001:db8::10"}}"#,
            day(2024, 3, 1),
        )
        .await
        .unwrap();

    // The rename target holds the complete rendering; the staging file
    // is gone.
    let zone = read_zone(dir.path()).await;
    assert!(zone.starts_with("$ORIGIN dyn.example.net.\n"));
    assert!(zone.ends_with("eth0.alice IN AAAA 2001:db8::10\n"));
    assert!(!dir.path().join("zone.tmp").exists());
}

#[tokio::test]
async fn same_day_requests_increment_the_serial_and_merge() {
    let dir = tempdir().unwrap();
    let (reloader, calls) = CountingReloader::new();
    let engine = file_engine(dir.path(), Box::new(reloader)).await;
    let today = day(2024, 3, 1);

    engine
        .submit_update_on(Some("T1"), br#"{"addresses": {"eth0": "2001:db8::10"}}"#, today)
        .await
        .unwrap();
    engine
        .submit_update_on(Some("T1"), br#"{"addresses": {"wlan0": "2001:db8::11"}}"#, today)
        .await
        .unwrap();

    let zone = read_zone(dir.path()).await;
    // The book retains eth0 alongside the newly submitted wlan0.
    assert!(zone.contains("eth0.alice IN AAAA 2001:db8::10\n"));
    assert!(zone.contains("wlan0.alice IN AAAA 2001:db8::11\n"));
    assert!(zone.contains("( 2024030101 "));
    assert!(!zone.contains("( 2024030100 "));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn date_rollover_resets_the_counter() {
    let dir = tempdir().unwrap();
    let (reloader, _calls) = CountingReloader::new();
    let engine = file_engine(dir.path(), Box::new(reloader)).await;

    engine
        .submit_update_on(Some("T1"), br#"{"addresses": {"eth0": "2001:db8::10"}}"#, day(2024, 3, 1))
        .await
        .unwrap();
    engine
        .submit_update_on(Some("T1"), br#"{"addresses": {"eth0": "2001:db8::10"}}"#, day(2024, 3, 2))
        .await
        .unwrap();

    let zone = read_zone(dir.path()).await;
    assert!(zone.contains("( 2024030200 "));
}

#[tokio::test]
async fn resubmitting_the_same_set_is_idempotent_modulo_serial() {
    let dir = tempdir().unwrap();
    let (reloader, _calls) = CountingReloader::new();
    let engine = file_engine(dir.path(), Box::new(reloader)).await;
    let today = day(2024, 3, 1);
    let body: &[u8] = br#"{"addresses": {"eth0": "2001:db8::10", "cam": "192.0.2.7"}}"#;

    engine.submit_update_on(Some("T1"), body, today).await.unwrap();
    let first = read_zone(dir.path()).await;

    engine.submit_update_on(Some("T1"), body, today).await.unwrap();
    let second = read_zone(dir.path()).await;

    let strip_serial = |s: &str| {
        s.lines()
            .filter(|l| !l.contains(" SOA "))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip_serial(&first), strip_serial(&second));
    assert_ne!(first, second); // serial moved
}

#[tokio::test]
async fn clients_are_isolated_but_share_the_zone() {
    let dir = tempdir().unwrap();
    let (reloader, _calls) = CountingReloader::new();
    let engine = file_engine(dir.path(), Box::new(reloader)).await;
    let today = day(2024, 3, 1);

    engine
        .submit_update_on(Some("T1"), br#"{"addresses": {"eth0": "2001:db8::10"}}"#, today)
        .await
        .unwrap();
    // bob's eth0 has a configured suffix; he submits a prefix.
    engine
        .submit_update_on(Some("T2"), br#"{"addresses": {"eth0": "2001:db8:b::"}}"#, today)
        .await
        .unwrap();

    let zone = read_zone(dir.path()).await;
    assert!(zone.contains("eth0.alice IN AAAA 2001:db8::10\n"));
    assert!(zone.contains("eth0.bob IN AAAA 2001:db8:b::1\n"));
}

#[tokio::test]
async fn book_survives_engine_restart() {
    let dir = tempdir().unwrap();
    let today = day(2024, 3, 1);

    {
        let (reloader, _calls) = CountingReloader::new();
        let engine = file_engine(dir.path(), Box::new(reloader)).await;
        engine
            .submit_update_on(Some("T1"), br#"{"addresses": {"eth0": "2001:db8::10"}}"#, today)
            .await
            .unwrap();
    }

    // New engine over the same book file; a bob update must still
    // render alice's record.
    let (reloader, _calls) = CountingReloader::new();
    let engine = file_engine(dir.path(), Box::new(reloader)).await;
    engine
        .submit_update_on(Some("T2"), br#"{"addresses": {"eth0": "2001:db8:b::"}}"#, today)
        .await
        .unwrap();

    let zone = read_zone(dir.path()).await;
    assert!(zone.contains("eth0.alice IN AAAA 2001:db8::10\n"));
    assert!(zone.contains("eth0.bob IN AAAA 2001:db8:b::1\n"));
}
