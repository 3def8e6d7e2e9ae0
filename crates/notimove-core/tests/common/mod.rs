#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use config::{SharedSettings, Settings};
use notimove_core::{
    Deps, DiscoveryStatus, LoopState, Service, ServiceHandle,
    test_support::{FakeDesktop, FakeTrust, RecordingSink, wait_until},
};

pub const WAIT: Duration = Duration::from_secs(3);

pub struct Rig {
    pub desktop: Arc<FakeDesktop>,
    pub trust: Arc<FakeTrust>,
    pub settings: SharedSettings,
    pub sink: Arc<RecordingSink>,
    pub handle: ServiceHandle,
}

impl Rig {
    /// Spawn a service over fresh fakes. Must run inside a tokio runtime.
    pub fn new(settings: Settings, trusted: bool) -> Self {
        let desktop = Arc::new(FakeDesktop::new());
        Self::with_desktop(desktop, settings, trusted)
    }

    pub fn with_desktop(desktop: Arc<FakeDesktop>, settings: Settings, trusted: bool) -> Self {
        let trust = Arc::new(FakeTrust::new(trusted));
        let settings = SharedSettings::new(settings);
        let sink = Arc::new(RecordingSink::default());
        let handle = Service::spawn(Deps {
            desktop: desktop.clone(),
            trust: trust.clone(),
            config: Arc::new(settings.clone()),
            sink: sink.clone(),
        })
        .expect("spawn service");
        Self {
            desktop,
            trust,
            settings,
            sink,
            handle,
        }
    }

    pub async fn status(&self) -> DiscoveryStatus {
        self.handle.status().await.expect("status")
    }

    /// Wait until discovery has run at least `n` timed passes.
    pub async fn passes(&self, n: u64) {
        let deadline = tokio::time::Instant::now() + WAIT;
        while self.status().await.passes < n {
            assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {n} passes");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub async fn scanning(&self) {
        let deadline = tokio::time::Instant::now() + WAIT;
        while self.status().await.state != LoopState::Scanning {
            assert!(tokio::time::Instant::now() < deadline, "timed out waiting for scanning");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub async fn until(&self, cond: impl FnMut() -> bool) -> bool {
        wait_until(WAIT, cond).await
    }
}
