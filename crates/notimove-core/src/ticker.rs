//! Keyed periodic callbacks with cancellation.
//!
//! A tick runs `on_tick` after an initial delay and then on every interval until
//! stopped. Stopping only prevents future ticks; a callback already running
//! finishes normally.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

struct TickerEntry {
    token: CancellationToken,
}

/// Set of named periodic tasks on the current tokio runtime.
#[derive(Clone, Default)]
pub struct Ticker {
    entries: Arc<Mutex<HashMap<String, TickerEntry>>>,
}

impl Ticker {
    /// Empty ticker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a ticker is active for the given id.
    pub fn is_active(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    /// Start or replace the ticker for `id`. Must be called within a tokio runtime.
    pub fn start<F>(&self, id: &str, initial: Duration, interval: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop(id);

        let token = CancellationToken::new();
        let cancel = token.clone();
        let name = id.to_string();
        tokio::spawn(async move {
            trace!(
                ticker = %name,
                init_ms = initial.as_millis() as u64,
                int_ms = interval.as_millis() as u64,
                "ticker_start"
            );
            tokio::select! {
                _ = time::sleep(initial) => {}
                _ = cancel.cancelled() => {
                    trace!(ticker = %name, "ticker_cancelled_initial");
                    return;
                }
            }
            let mut ticks = time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        trace!(ticker = %name, "ticker_cancelled");
                        return;
                    }
                    _ = ticks.tick() => on_tick(),
                }
            }
        });
        self.entries
            .lock()
            .insert(id.to_string(), TickerEntry { token });
    }

    /// Stop the ticker for `id` if present (non-blocking).
    pub fn stop(&self, id: &str) {
        if let Some(entry) = self.entries.lock().remove(id) {
            entry.token.cancel();
            trace!(ticker = %id, "ticker_stop");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::test_support::run_async_test;

    #[test]
    fn ticks_until_stopped() {
        run_async_test(async {
            let t = Ticker::new();
            let n = Arc::new(AtomicUsize::new(0));
            let c = n.clone();
            t.start("a", Duration::ZERO, Duration::from_millis(5), move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            assert!(t.is_active("a"));
            time::sleep(Duration::from_millis(60)).await;
            t.stop("a");
            assert!(!t.is_active("a"));
            let after_stop = n.load(Ordering::SeqCst);
            assert!(after_stop >= 2);
            time::sleep(Duration::from_millis(40)).await;
            assert!(n.load(Ordering::SeqCst) <= after_stop + 1);
        });
    }

    #[test]
    fn restart_replaces_previous_callback() {
        run_async_test(async {
            let t = Ticker::new();
            let first = Arc::new(AtomicUsize::new(0));
            let second = Arc::new(AtomicUsize::new(0));
            let c = first.clone();
            t.start("a", Duration::ZERO, Duration::from_millis(5), move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            time::sleep(Duration::from_millis(30)).await;
            let c = second.clone();
            t.start("a", Duration::ZERO, Duration::from_millis(5), move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            let frozen = first.load(Ordering::SeqCst);
            time::sleep(Duration::from_millis(60)).await;
            assert!(first.load(Ordering::SeqCst) <= frozen + 1);
            assert!(second.load(Ordering::SeqCst) >= 2);
            t.stop("a");
        });
    }

    #[test]
    fn stop_during_initial_delay_never_ticks() {
        run_async_test(async {
            let t = Ticker::new();
            let n = Arc::new(AtomicUsize::new(0));
            let c = n.clone();
            t.start("a", Duration::from_millis(50), Duration::from_millis(5), move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
            t.stop("a");
            assert!(!t.is_active("a"));
            time::sleep(Duration::from_millis(100)).await;
            assert_eq!(n.load(Ordering::SeqCst), 0);
        });
    }
}
