//! Widget panel monitor.
//!
//! Widgets hosted by the notification center process do not show up as ordinary
//! windows. After a trigger this loop polls the host's element tree for a widget
//! identifier for a limited time, and requests a full discovery rescan whenever the
//! panel appears or disappears.

use std::{sync::Arc, time::Duration};

use config::{ConfigProvider, WidgetCfg};
use tokio::{
    sync::mpsc,
    time::{Instant, Interval, MissedTickBehavior, interval},
};
use tracing::{debug, trace, warn};

use crate::{
    discovery,
    events::EventSink,
    permission::PermissionGate,
    platform::Desktop,
    pool::AxPool,
    walk::{Bounds, find_first},
};

/// Upper bound on nodes visited when searching the widget host.
const WIDGET_MAX_NODES: usize = 1024;

/// Edge detector over the per-tick "panel visible" boolean.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidgetPanelTracker {
    visible: bool,
}

impl WidgetPanelTracker {
    /// Tracker assuming the panel starts hidden.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed state.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Record one observation. Returns the new state on a change, `None` otherwise.
    pub fn observe(&mut self, now_visible: bool) -> Option<bool> {
        if now_visible == self.visible {
            return None;
        }
        self.visible = now_visible;
        Some(now_visible)
    }
}

/// True when the widget host currently exposes an element whose identifier starts
/// with the configured widget prefix.
pub fn panel_visible(desktop: &dyn Desktop, cfg: &WidgetCfg) -> bool {
    let Some(app) = desktop.app_element_for_bundle(&cfg.host_bundle_id) else {
        trace!(bundle = %cfg.host_bundle_id, "widget_host_not_running");
        return false;
    };
    let bounds = Bounds {
        max_depth: Some(cfg.max_depth),
        max_nodes: WIDGET_MAX_NODES,
    };
    find_first(&app, bounds, |e| {
        e.identifier()
            .is_some_and(|id| id.starts_with(cfg.identifier_prefix.as_str()))
    })
    .is_some()
}

/// Messages accepted by the widget monitor actor.
pub(crate) enum Command {
    Start,
    Stop,
    Trigger,
    Permission(bool),
    Shutdown,
}

/// Widget monitor actor state.
pub(crate) struct WidgetMonitor {
    desktop: Arc<dyn Desktop>,
    config: Arc<dyn ConfigProvider>,
    gate: Arc<PermissionGate>,
    pool: Arc<AxPool>,
    sink: Arc<dyn EventSink>,
    discovery: mpsc::UnboundedSender<discovery::Command>,
    tracker: WidgetPanelTracker,
    wanted: bool,
    active_until: Option<Instant>,
    period: Duration,
}

impl WidgetMonitor {
    pub(crate) fn new(
        desktop: Arc<dyn Desktop>,
        config: Arc<dyn ConfigProvider>,
        gate: Arc<PermissionGate>,
        pool: Arc<AxPool>,
        sink: Arc<dyn EventSink>,
        discovery: mpsc::UnboundedSender<discovery::Command>,
    ) -> Self {
        let period = config.snapshot().widget.interval();
        Self {
            desktop,
            config,
            gate,
            pool,
            sink,
            discovery,
            tracker: WidgetPanelTracker::new(),
            wanted: false,
            active_until: None,
            period,
        }
    }

    fn timer(period: Duration) -> Interval {
        let mut t = interval(period);
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
                            if self.activate() {
                                ticker = Self::timer(self.period);
                            }
                        }
                        Command::Trigger => {
                            if self.activate() {
                                ticker = Self::timer(self.period);
                            }
                        }
                        Command::Stop => {
                            self.wanted = false;
                            self.active_until = None;
                        }
                        Command::Permission(true) => {
                            if self.wanted && self.activate() {
                                ticker = Self::timer(self.period);
                            }
                        }
                        Command::Permission(false) => self.active_until = None,
                        Command::Shutdown => break,
                    }
                }
                _ = ticker.tick(), if self.active_until.is_some() => self.tick().await,
            }
        }
        trace!("widget_actor_exit");
    }

    /// Open (or extend) the activation window. Returns false when the monitor is
    /// stopped or lacks permission.
    fn activate(&mut self) -> bool {
        if !self.wanted {
            debug!("widget_trigger_ignored_while_stopped");
            return false;
        }
        if !self.gate.is_granted() {
            debug!("widget_trigger_ignored_without_permission");
            return false;
        }
        let cfg = self.config.snapshot().widget;
        self.period = cfg.interval();
        self.active_until = Some(Instant::now() + cfg.active_for());
        debug!(active_ms = cfg.active_ms, "widget_monitor_active");
        true
    }

    async fn tick(&mut self) {
        if self.active_until.is_some_and(|until| Instant::now() >= until) {
            self.active_until = None;
            debug!("widget_monitor_expired");
            return;
        }
        if !self.gate.is_granted() {
            self.active_until = None;
            debug!("widget_probe_skipped_without_permission");
            return;
        }
        let settings = self.config.snapshot();
        let budget = settings.foreign_call_timeout();
        let desktop = self.desktop.clone();
        let cfg = settings.widget;
        let visible = match self
            .pool
            .run(budget, move || panel_visible(&*desktop, &cfg))
            .await
        {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "widget_probe_failed");
                return;
            }
        };
        if let Some(now_visible) = self.tracker.observe(visible) {
            self.sink.on_widget_panel_transition(now_visible);
            if self.discovery.send(discovery::Command::Rescan).is_err() {
                debug!("widget_rescan_dropped_discovery_gone");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use config::SharedSettings;
    use proptest::prelude::*;

    use super::*;
    use crate::test_support::{
        FakeDesktop, FakeElement, FakeTrust, RecordingSink, fast_settings, run_async_test,
    };

    #[test]
    fn panel_detection_uses_prefix_and_host() {
        let desktop = FakeDesktop::new();
        let cfg = WidgetCfg::default();
        assert!(!panel_visible(&desktop, &cfg));

        let app = FakeElement::new("AXApplication")
            .with_child(FakeElement::new("AXGroup").with_identifier("banner"))
            .build();
        desktop.set_app(&cfg.host_bundle_id, Some(app));
        assert!(!panel_visible(&desktop, &cfg));

        let app = FakeElement::new("AXApplication")
            .with_child(
                FakeElement::new("AXWindow")
                    .with_child(FakeElement::new("AXGroup").with_identifier("widget-local:weather")),
            )
            .build();
        desktop.set_app(&cfg.host_bundle_id, Some(app));
        assert!(panel_visible(&desktop, &cfg));
    }

    #[test]
    fn tick_skips_probe_once_permission_is_gone() {
        run_async_test(async {
            let desktop = Arc::new(FakeDesktop::new());
            let trust = Arc::new(FakeTrust::new(true));
            let gate = PermissionGate::new(trust.clone(), Duration::from_millis(20));
            let pool = Arc::new(AxPool::new(1).expect("pool"));
            let (tx, _rx) = mpsc::unbounded_channel();
            let mut monitor = WidgetMonitor::new(
                desktop.clone(),
                Arc::new(SharedSettings::new(fast_settings())),
                gate,
                pool,
                Arc::new(RecordingSink::default()),
                tx,
            );
            monitor.wanted = true;
            assert!(monitor.activate());
            monitor.tick().await;
            assert_eq!(desktop.app_calls(), 1);

            trust.set(false);
            monitor.tick().await;
            assert_eq!(desktop.app_calls(), 1);
            assert!(monitor.active_until.is_none());
        });
    }

    proptest! {
        #[test]
        fn tracker_fires_once_per_change(seq in prop::collection::vec(any::<bool>(), 0..64)) {
            let mut t = WidgetPanelTracker::new();
            let mut prev = false;
            for v in seq {
                let fired = t.observe(v);
                if v == prev {
                    prop_assert_eq!(fired, None);
                } else {
                    prop_assert_eq!(fired, Some(v));
                }
                prev = v;
            }
        }
    }
}
