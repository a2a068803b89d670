//! Shared test doubles for license tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use trialgate_license::{
    ActivationConfig, ActivationController, ActivationUi, ConnectivityProbe, KeyAuthority,
    LicenseError, LicenseResult, MockClock, Notice, RemoteKeySet,
};
use trialgate_store::MemoryStore;

/// A fixed reference instant for clock-driven tests.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

/// Authority serving a fixed key list, counting fetches.
pub struct StaticAuthority {
    text: Option<String>,
    fetches: AtomicUsize,
}

impl StaticAuthority {
    pub fn with_keys(keys: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            text: Some(keys.join("\n")),
            fetches: AtomicUsize::new(0),
        })
    }

    /// An authority whose every fetch fails.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            text: None,
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyAuthority for StaticAuthority {
    async fn fetch_keys(&self) -> LicenseResult<RemoteKeySet> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.text {
            Some(text) => Ok(RemoteKeySet::parse(text)),
            None => Err(LicenseError::NetworkUnavailable("connection refused".into())),
        }
    }
}

/// Probe with a fixed answer, counting calls.
pub struct FixedProbe {
    available: bool,
    calls: AtomicUsize,
}

impl FixedProbe {
    pub fn up() -> Arc<Self> {
        Arc::new(Self { available: true, calls: AtomicUsize::new(0) })
    }

    pub fn down() -> Arc<Self> {
        Arc::new(Self { available: false, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for FixedProbe {
    async fn is_available(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.available
    }
}

/// UI that replays scripted prompt answers and records notices.
/// Once the script runs out, every prompt is cancelled.
#[derive(Default)]
pub struct ScriptedUi {
    answers: Mutex<VecDeque<Option<String>>>,
    notices: Mutex<Vec<Notice>>,
    prompts: AtomicUsize,
}

impl ScriptedUi {
    pub fn answering(answers: &[Option<&str>]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.map(String::from)).collect()),
            ..Default::default()
        }
    }

    pub fn cancelling() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivationUi for ScriptedUi {
    async fn prompt_for_key(&self) -> Option<String> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.answers.lock().unwrap().pop_front().flatten()
    }

    async fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Everything a controller test needs to inspect afterwards.
pub struct Harness {
    pub config: ActivationConfig,
    pub store: Arc<MemoryStore>,
    pub authority: Arc<StaticAuthority>,
    pub probe: Arc<FixedProbe>,
    pub clock: Arc<MockClock>,
}

impl Harness {
    pub fn new(authority: Arc<StaticAuthority>, probe: Arc<FixedProbe>) -> Self {
        Self {
            config: ActivationConfig::default(),
            store: Arc::new(MemoryStore::new()),
            authority,
            probe,
            clock: Arc::new(MockClock::new(epoch())),
        }
    }

    pub fn controller(&self) -> ActivationController {
        ActivationController::new(
            &self.config,
            self.store.clone(),
            self.authority.clone(),
            self.probe.clone(),
            self.clock.clone(),
        )
    }
}
