//! Wiring for the discovery loop, widget monitor and permission gate.

use std::sync::Arc;

use config::ConfigProvider;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    discovery::{self, Discovery, DiscoveryStatus},
    error::{Error, Result},
    events::EventSink,
    permission::{ObserverId, PermissionGate},
    platform::{Desktop, TrustCheck},
    pool::AxPool,
    widget::{self, WidgetMonitor},
};

/// Collaborators injected into the service.
#[derive(Clone)]
pub struct Deps {
    /// Window, element and screen access.
    pub desktop: Arc<dyn Desktop>,
    /// OS trust primitive.
    pub trust: Arc<dyn TrustCheck>,
    /// Live settings.
    pub config: Arc<dyn ConfigProvider>,
    /// Event receiver.
    pub sink: Arc<dyn EventSink>,
}

/// Entry point for spawning the core.
pub struct Service;

impl Service {
    /// Spawn both loops onto the current tokio runtime. Nothing is scanned until
    /// [`ServiceHandle::start`] is called.
    pub fn spawn(deps: Deps) -> Result<ServiceHandle> {
        let settings = deps.config.snapshot();
        let pool = Arc::new(AxPool::new(settings.workers)?);
        let pool_workers = pool.workers();
        let gate = PermissionGate::new(deps.trust.clone(), settings.permission_poll());

        let (disc_tx, disc_rx) = mpsc::unbounded_channel();
        let (widget_tx, widget_rx) = mpsc::unbounded_channel();

        let discovery = Discovery::new(
            deps.desktop.clone(),
            deps.config.clone(),
            gate.clone(),
            pool.clone(),
            deps.sink.clone(),
        );
        let monitor = WidgetMonitor::new(
            deps.desktop,
            deps.config,
            gate.clone(),
            pool,
            deps.sink,
            disc_tx.clone(),
        );
        let tasks = vec![
            tokio::spawn(discovery.run(disc_rx)),
            tokio::spawn(monitor.run(widget_rx)),
        ];

        let observer = {
            let disc_tx = disc_tx.clone();
            let widget_tx = widget_tx.clone();
            gate.observe(move |granted| {
                let _ = disc_tx.send(discovery::Command::Permission(granted));
                let _ = widget_tx.send(widget::Command::Permission(granted));
            })
        };
        info!(
            granted = gate.is_granted(),
            workers = pool_workers,
            "service_spawned"
        );

        Ok(ServiceHandle {
            discovery: disc_tx,
            widget: widget_tx,
            gate,
            observer,
            tasks,
        })
    }
}

/// Control surface for a running service.
pub struct ServiceHandle {
    discovery: mpsc::UnboundedSender<discovery::Command>,
    widget: mpsc::UnboundedSender<widget::Command>,
    gate: Arc<PermissionGate>,
    observer: ObserverId,
    tasks: Vec<JoinHandle<()>>,
}

impl ServiceHandle {
    /// Ask both loops to run. Idempotent; scanning begins once permission is granted.
    pub fn start(&self) {
        self.to_discovery(discovery::Command::Start);
        self.to_widget(widget::Command::Start);
    }

    /// Stop scheduling further polls. Idempotent.
    pub fn stop(&self) {
        self.to_discovery(discovery::Command::Stop);
        self.to_widget(widget::Command::Stop);
    }

    /// Run a full pass over every visible candidate now.
    pub fn rescan_now(&self) {
        self.to_discovery(discovery::Command::Rescan);
    }

    /// Open or extend the widget monitor's activation window.
    pub fn trigger_widget_monitor(&self) {
        self.to_widget(widget::Command::Trigger);
    }

    /// Current accessibility trust state.
    pub fn permission_granted(&self) -> bool {
        self.gate.is_granted()
    }

    /// Snapshot of the discovery loop.
    pub async fn status(&self) -> Result<DiscoveryStatus> {
        let (respond, rx) = oneshot::channel();
        self.discovery
            .send(discovery::Command::Status { respond })
            .map_err(|_| Error::ServiceStopped)?;
        rx.await.map_err(|_| Error::ServiceStopped)
    }

    /// Stop both loops and wait for their tasks to exit.
    pub async fn shutdown(self) {
        self.gate.unobserve(self.observer);
        self.to_discovery(discovery::Command::Shutdown);
        self.to_widget(widget::Command::Shutdown);
        for t in self.tasks {
            let _ = t.await;
        }
        debug!("service_shutdown");
    }

    fn to_discovery(&self, cmd: discovery::Command) {
        if self.discovery.send(cmd).is_err() {
            debug!("discovery_actor_gone");
        }
    }

    fn to_widget(&self, cmd: widget::Command) {
        if self.widget.send(cmd).is_err() {
            debug!("widget_actor_gone");
        }
    }
}
