//! Service wiring and signal handling for macOS.

use std::sync::Arc;

use config::{Settings, SharedSettings};
use mac_ax::MacDesktop;
use notimove_core::{Deps, Service, ServiceHandle, SystemTrust, TracingSink};
use tokio::signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tracing::{info, warn};

use crate::{AppError, RunOpts};

/// Run until SIGINT or SIGTERM.
///
/// SIGHUP reloads the config file and repositions every visible notification.
/// SIGUSR1 opens the widget panel monitor's activation window.
pub async fn serve(opts: &RunOpts, settings: Settings) -> Result<(), AppError> {
    if opts.prompt && !permissions::accessibility_ok() {
        permissions::request_accessibility();
    }

    let shared = SharedSettings::new(settings.clone());
    let handle = Service::spawn(Deps {
        desktop: Arc::new(MacDesktop::new(settings.foreign_call_timeout())),
        trust: Arc::new(SystemTrust),
        config: Arc::new(shared.clone()),
        sink: Arc::new(TracingSink),
    })?;
    if !handle.permission_granted() {
        warn!(
            "Accessibility permission missing; grant it in System Settings > Privacy & Security > Accessibility"
        );
    }
    handle.start();
    info!(
        placement = %settings.placement,
        config = %opts.config_path.display(),
        "notimove running"
    );

    let mut hup = signal(SignalKind::hangup())?;
    let mut term = signal(SignalKind::terminate())?;
    let mut usr1 = signal(SignalKind::user_defined1())?;
    loop {
        tokio::select! {
            _ = ctrl_c() => break,
            _ = term.recv() => break,
            _ = hup.recv() => reload(opts, &shared, &handle),
            _ = usr1.recv() => handle.trigger_widget_monitor(),
        }
    }

    info!("shutting down");
    handle.stop();
    handle.shutdown().await;
    Ok(())
}

/// Swap in freshly loaded settings and reposition everything. A broken file keeps
/// the previous settings.
fn reload(opts: &RunOpts, shared: &SharedSettings, handle: &ServiceHandle) {
    match opts.load() {
        Ok(s) => {
            info!(placement = %s.placement, "config_reloaded");
            shared.replace(s);
            handle.rescan_now();
        }
        Err(e) => warn!("config reload failed, keeping previous settings: {}", e.pretty()),
    }
}
