//! Accessibility permission gate.
//!
//! Polls the trust primitive while anyone is observing and reports transitions
//! only. Consumers start and stop their own loops in response.

use std::{
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::Mutex;
use tracing::info;

use crate::{platform::TrustCheck, ticker::Ticker};

/// Handle returned by [`PermissionGate::observe`].
pub type ObserverId = u64;

type Observer = Arc<dyn Fn(bool) + Send + Sync>;

const POLL_TICKER: &str = "permission-poll";

struct GateState {
    last: bool,
    next_id: ObserverId,
    observers: Vec<(ObserverId, Observer)>,
}

/// Shared view of whether this process may drive foreign UI.
pub struct PermissionGate {
    trust: Arc<dyn TrustCheck>,
    interval: Duration,
    state: Mutex<GateState>,
    ticker: Ticker,
}

impl fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state.lock();
        f.debug_struct("PermissionGate")
            .field("last", &s.last)
            .field("observers", &s.observers.len())
            .field("interval", &self.interval)
            .finish()
    }
}

impl PermissionGate {
    /// Gate over `trust`, polled every `interval` while observed.
    pub fn new(trust: Arc<dyn TrustCheck>, interval: Duration) -> Arc<Self> {
        let last = trust.is_trusted();
        Arc::new(Self {
            trust,
            interval,
            state: Mutex::new(GateState {
                last,
                next_id: 0,
                observers: Vec::new(),
            }),
            ticker: Ticker::new(),
        })
    }

    /// Query the trust primitive now.
    pub fn is_granted(&self) -> bool {
        self.trust.is_trusted()
    }

    /// Register `cb` for permission transitions. The first observer starts polling,
    /// which requires a tokio runtime.
    pub fn observe<F>(self: &Arc<Self>, cb: F) -> ObserverId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let (id, first) = {
            let mut s = self.state.lock();
            let id = s.next_id;
            s.next_id += 1;
            s.observers.push((id, Arc::new(cb)));
            (id, s.observers.len() == 1)
        };
        if first {
            let gate: Weak<Self> = Arc::downgrade(self);
            self.ticker
                .start(POLL_TICKER, self.interval, self.interval, move || {
                    if let Some(g) = gate.upgrade() {
                        g.poll_once();
                    }
                });
        }
        id
    }

    /// Drop an observer. Polling stops with the last one.
    pub fn unobserve(&self, id: ObserverId) {
        let empty = {
            let mut s = self.state.lock();
            s.observers.retain(|(i, _)| *i != id);
            s.observers.is_empty()
        };
        if empty {
            self.ticker.stop(POLL_TICKER);
        }
    }

    /// Check the trust primitive once. On a transition, notify observers and return
    /// the new state; otherwise return `None`.
    pub fn poll_once(&self) -> Option<bool> {
        let now = self.trust.is_trusted();
        let observers: Vec<Observer> = {
            let mut s = self.state.lock();
            if s.last == now {
                return None;
            }
            s.last = now;
            s.observers.iter().map(|(_, o)| o.clone()).collect()
        };
        info!(granted = now, "accessibility_permission_changed");
        for o in observers {
            o(now);
        }
        Some(now)
    }

    /// True while the poll timer is running.
    pub fn is_polling(&self) -> bool {
        self.ticker.is_active(POLL_TICKER)
    }
}

impl Drop for PermissionGate {
    fn drop(&mut self) {
        self.ticker.stop(POLL_TICKER);
    }
}
