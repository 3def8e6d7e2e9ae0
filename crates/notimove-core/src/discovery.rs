//! Window discovery loop.
//!
//! An actor owning the known-window set. It is Idle until it has been asked to
//! start *and* permission is granted, then Scanning on a fixed interval. Each pass
//! enumerates visible windows and hands new candidates to the [`Mover`] on the
//! worker pool. Failures are contained to the window that produced them.

use std::{sync::Arc, time::Duration};

use config::{ConfigProvider, Settings};
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, Interval, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, trace, warn};

use crate::{
    error::Error,
    events::EventSink,
    known::KnownWindows,
    mover::{MoveReport, Mover},
    permission::PermissionGate,
    platform::{Desktop, WindowInfo},
    pool::AxPool,
};

/// Discovery loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Stopped, or waiting for permission.
    Idle,
    /// Polling on the discovery interval.
    Scanning,
}

/// Point-in-time view of the discovery loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryStatus {
    /// Current state.
    pub state: LoopState,
    /// Remembered window ids.
    pub known: usize,
    /// Passes run since the service was spawned, seeding excluded.
    pub passes: u64,
}

/// Which windows a pass considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PassMode {
    /// Only windows not yet in the known set.
    NewOnly,
    /// Every visible candidate.
    All,
}

/// Messages accepted by the discovery actor.
pub(crate) enum Command {
    Start,
    Stop,
    Permission(bool),
    Rescan,
    Status {
        respond: oneshot::Sender<DiscoveryStatus>,
    },
    Shutdown,
}

/// True when `w` passes the window size and owner filters.
pub fn is_candidate(settings: &Settings, w: &WindowInfo) -> bool {
    settings.window_filter.contains(w.frame.w, w.frame.h) && settings.owner_matches(&w.app)
}

/// Discovery actor state; owned by its task.
pub(crate) struct Discovery {
    desktop: Arc<dyn Desktop>,
    config: Arc<dyn ConfigProvider>,
    gate: Arc<PermissionGate>,
    pool: Arc<AxPool>,
    sink: Arc<dyn EventSink>,
    state: LoopState,
    wanted: bool,
    seeded: bool,
    known: KnownWindows,
    passes: u64,
    period: Duration,
}

impl Discovery {
    pub(crate) fn new(
        desktop: Arc<dyn Desktop>,
        config: Arc<dyn ConfigProvider>,
        gate: Arc<PermissionGate>,
        pool: Arc<AxPool>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let settings = config.snapshot();
        Self {
            desktop,
            config,
            gate,
            pool,
            sink,
            state: LoopState::Idle,
            wanted: false,
            seeded: false,
            known: KnownWindows::new(settings.known_retain_passes),
            passes: 0,
            period: settings.discovery_interval(),
        }
    }

    fn timer(period: Duration) -> Interval {
        let mut t = interval_at(Instant::now() + period, period);
        t.set_missed_tick_behavior(MissedTickBehavior::Skip);
        t
    }

    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        let mut ticker = Self::timer(self.period);
        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    match cmd {
                        Command::Start => {
                            self.wanted = true;
                            if self.try_enter().await {
                                ticker = Self::timer(self.period);
                            }
                        }
                        Command::Stop => {
                            self.wanted = false;
                            self.enter_idle();
                        }
                        Command::Permission(true) => {
                            if self.try_enter().await {
                                ticker = Self::timer(self.period);
                            }
                        }
                        Command::Permission(false) => self.enter_idle(),
                        Command::Rescan => {
                            if self.state == LoopState::Scanning && self.seeded {
                                self.pass(PassMode::All).await;
                            } else {
                                debug!("discovery_rescan_ignored_while_idle");
                            }
                        }
                        Command::Status { respond } => {
                            let _ = respond.send(self.status());
                        }
                        Command::Shutdown => break,
                    }
                }
                _ = ticker.tick(), if self.state == LoopState::Scanning => {
                    let before = self.period;
                    if self.seeded {
                        self.pass(PassMode::NewOnly).await;
                    } else {
                        self.seed().await;
                    }
                    if self.period != before {
                        debug!(ms = self.period.as_millis() as u64, "discovery_interval_changed");
                        ticker = Self::timer(self.period);
                    }
                }
            }
        }
        trace!("discovery_actor_exit");
    }

    fn status(&self) -> DiscoveryStatus {
        DiscoveryStatus {
            state: self.state,
            known: self.known.len(),
            passes: self.passes,
        }
    }

    /// Move to Scanning if wanted, idle and permitted. Seeds the known set with one
    /// enumeration so that windows already on screen are never handled. Returns true
    /// on entry; the caller restarts the timer so the first timed pass comes one full
    /// interval later.
    async fn try_enter(&mut self) -> bool {
        if !self.wanted || self.state == LoopState::Scanning {
            return false;
        }
        if !self.gate.is_granted() {
            info!("discovery_waiting_for_permission");
            return false;
        }
        let settings = self.config.snapshot();
        self.period = settings.discovery_interval();
        self.known.set_retain(settings.known_retain_passes);
        self.state = LoopState::Scanning;
        self.sink.on_scanning_changed(true);
        self.seed().await;
        true
    }

    async fn seed(&mut self) {
        let budget = self.config.snapshot().foreign_call_timeout();
        let desktop = self.desktop.clone();
        match self.pool.run(budget, move || desktop.list_windows()).await {
            Ok(windows) => {
                self.known.seed(windows.iter().map(|w| w.id));
                self.seeded = true;
                debug!(known = self.known.len(), "discovery_seeded");
            }
            Err(e) => {
                // Stay unseeded; the next tick retries instead of running a pass.
                self.seeded = false;
                warn!(error = %e, "discovery_seed_failed");
            }
        }
    }

    fn enter_idle(&mut self) {
        if self.state == LoopState::Idle {
            return;
        }
        self.state = LoopState::Idle;
        self.seeded = false;
        self.sink.on_scanning_changed(false);
    }

    async fn pass(&mut self, mode: PassMode) {
        if !self.gate.is_granted() {
            warn!(error = %Error::PermissionDenied, "discovery_pass_skipped");
            self.enter_idle();
            return;
        }
        let settings = self.config.snapshot();
        self.period = settings.discovery_interval();
        self.known.set_retain(settings.known_retain_passes);

        let budget = settings.foreign_call_timeout();
        let desktop = self.desktop.clone();
        let windows = match self.pool.run(budget, move || desktop.list_windows()).await {
            Ok(w) => w,
            Err(e) => {
                warn!(error = %e, "discovery_enumeration_failed");
                return;
            }
        };
        self.passes += 1;
        self.known.begin_pass(windows.iter().map(|w| w.id));
        trace!(pass = self.passes, visible = windows.len(), ?mode, "discovery_pass");

        let mover = Mover::new(self.desktop.clone(), &settings);
        let mut handled = 0usize;
        for w in windows {
            if mode == PassMode::NewOnly && self.known.contains(w.id) {
                continue;
            }
            if !is_candidate(&settings, &w) {
                continue;
            }
            if handled >= settings.max_windows_per_pass {
                debug!(budget = settings.max_windows_per_pass, "discovery_pass_budget_exhausted");
                break;
            }
            handled += 1;
            self.known.insert(w.id);
            self.sink.on_window_detected(&w);
            if !settings.enabled {
                continue;
            }
            self.handle(&mover, budget, w).await;
        }
    }

    async fn handle(&self, mover: &Mover, budget: Duration, w: WindowInfo) {
        let id = w.id;
        let m = mover.clone();
        let report = self
            .pool
            .run(budget, move || m.move_window(&w))
            .await
            .unwrap_or_else(|e| MoveReport {
                stage: None,
                result: Err(e),
            });
        if let Some(stage) = report.stage {
            self.sink.on_element_resolved(id, stage);
        }
        match report.result {
            Ok(applied) => self
                .sink
                .on_window_moved(id, mover.placement(), applied.requested),
            Err(e) => self.sink.on_window_move_failed(id, &e),
        }
    }
}
