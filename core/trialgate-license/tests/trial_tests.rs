mod common;

use chrono::Duration;
use common::epoch;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use trialgate_license::{
    parse_timestamp, ActivationConfig, MockClock, TrialClock, TrialStatus, FIRST_LAUNCH_ENTRY,
};
use trialgate_store::{MemoryStore, PersistentStore};

fn setup() -> (Arc<MemoryStore>, Arc<MockClock>, TrialClock, ActivationConfig) {
    let config = ActivationConfig::default();
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MockClock::new(epoch()));
    let trial = TrialClock::new(store.clone(), clock.clone(), &config);
    (store, clock, trial, config)
}

fn stored_first_launch(store: &MemoryStore, config: &ActivationConfig) -> Option<String> {
    store.get(&config.store_namespace, FIRST_LAUNCH_ENTRY).unwrap()
}

// ── First launch ─────────────────────────────────────────────────

#[test]
fn first_launch_until_recorded() {
    let (_, _, trial, _) = setup();
    assert!(trial.is_first_launch().unwrap());
    trial.record_first_launch().unwrap();
    assert!(!trial.is_first_launch().unwrap());
}

#[test]
fn record_writes_rfc3339_now() {
    let (store, _, trial, config) = setup();
    trial.record_first_launch().unwrap();
    assert_eq!(
        stored_first_launch(&store, &config).as_deref(),
        Some("2026-01-01T12:00:00Z")
    );
    assert_eq!(trial.first_launch().unwrap(), Some(epoch()));
}

#[test]
fn record_twice_keeps_first_timestamp() {
    let (store, clock, trial, config) = setup();
    trial.record_first_launch().unwrap();
    let first = stored_first_launch(&store, &config);

    clock.advance(Duration::days(3));
    trial.record_first_launch().unwrap();

    assert_eq!(stored_first_launch(&store, &config), first);
}

// ── Expiry ───────────────────────────────────────────────────────

#[test]
fn not_expired_without_first_launch() {
    let (_, _, trial, _) = setup();
    assert!(!trial.is_trial_expired().unwrap());
}

#[test]
fn not_expired_when_unparsable() {
    let (store, _, trial, config) = setup();
    store
        .set(&config.store_namespace, FIRST_LAUNCH_ENTRY, "not a date")
        .unwrap();
    assert!(!trial.is_first_launch().unwrap());
    assert!(!trial.is_trial_expired().unwrap());
    assert_eq!(trial.status().unwrap(), TrialStatus::Unreadable);
}

#[test]
fn expiry_boundary_is_strict() {
    let (_, clock, trial, _) = setup();
    trial.record_first_launch().unwrap();

    clock.set(epoch() + Duration::days(30));
    assert!(!trial.is_trial_expired().unwrap());

    clock.advance(Duration::seconds(1));
    assert!(trial.is_trial_expired().unwrap());
}

#[test]
fn forty_days_ago_is_expired() {
    let (store, _, trial, config) = setup();
    let forty_ago = (epoch() - Duration::days(40)).to_rfc3339();
    store
        .set(&config.store_namespace, FIRST_LAUNCH_ENTRY, &forty_ago)
        .unwrap();
    assert!(trial.is_trial_expired().unwrap());
    assert_eq!(trial.status().unwrap(), TrialStatus::Expired);
}

#[test]
fn custom_trial_length() {
    let config = ActivationConfig {
        trial_duration_days: 7,
        ..Default::default()
    };
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MockClock::new(epoch()));
    let trial = TrialClock::new(store, clock.clone(), &config);
    trial.record_first_launch().unwrap();

    clock.advance(Duration::days(8));
    assert!(trial.is_trial_expired().unwrap());
}

// ── Status ───────────────────────────────────────────────────────

#[test]
fn status_reports_days_remaining() {
    let (_, clock, trial, _) = setup();
    assert_eq!(trial.status().unwrap(), TrialStatus::NotStarted);

    trial.record_first_launch().unwrap();
    assert_eq!(trial.status().unwrap(), TrialStatus::Active { days_remaining: 30 });

    clock.advance(Duration::days(10) + Duration::hours(1));
    assert_eq!(trial.status().unwrap(), TrialStatus::Active { days_remaining: 19 });
}

#[test]
fn status_allows_use() {
    assert!(TrialStatus::NotStarted.allows_use());
    assert!(TrialStatus::Active { days_remaining: 0 }.allows_use());
    assert!(TrialStatus::Unreadable.allows_use());
    assert!(!TrialStatus::Expired.allows_use());
}

// ── Timestamp parsing ────────────────────────────────────────────

#[test]
fn parses_rfc3339_with_offset() {
    let ts = parse_timestamp("2026-01-01T14:00:00+02:00").unwrap();
    assert_eq!(ts, epoch());
}

#[test]
fn parses_legacy_layouts_as_utc() {
    assert_eq!(parse_timestamp("2026-01-01 12:00:00"), Some(epoch()));
    assert_eq!(parse_timestamp("1/1/2026 12:00:00 PM"), Some(epoch()));
    assert_eq!(parse_timestamp(" 01/01/2026 12:00:00 "), Some(epoch()));
}

#[test]
fn rejects_garbage() {
    assert_eq!(parse_timestamp(""), None);
    assert_eq!(parse_timestamp("yesterday"), None);
}

// ── Out-of-range trial lengths ───────────────────────────────────

#[test]
fn trial_past_date_range_never_expires() {
    let config = ActivationConfig {
        trial_duration_days: u32::MAX,
        ..Default::default()
    };
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MockClock::new(epoch()));
    let trial = TrialClock::new(store, clock.clone(), &config);
    trial.record_first_launch().unwrap();

    clock.advance(Duration::days(365 * 1000));
    assert!(!trial.is_trial_expired().unwrap());
    assert_eq!(
        trial.status().unwrap(),
        TrialStatus::Active { days_remaining: u32::MAX }
    );
}

#[test]
fn status_serializes_snake_case() {
    let json = serde_json::to_string(&TrialStatus::NotStarted).unwrap();
    assert_eq!(json, r#""not_started""#);
    let json = serde_json::to_string(&TrialStatus::Active { days_remaining: 3 }).unwrap();
    assert_eq!(json, r#"{"active":{"days_remaining":3}}"#);
}
