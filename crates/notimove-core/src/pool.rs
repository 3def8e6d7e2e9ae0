//! Bounded worker pool for blocking foreign UI calls.
//!
//! Accessibility calls block until the target process answers. They run on a fixed
//! set of named threads so that one hung application cannot stall the async tasks.
//! Callers await a result for at most their budget; a job still queued when its
//! deadline passes is dropped unrun.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{self as chan, Receiver, Sender};
use tokio::sync::oneshot;
use tracing::{trace, warn};

use crate::error::{Error, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct TimedJob {
    job: Job,
    deadline: Instant,
}

#[derive(Default)]
struct Metrics {
    inflight: AtomicUsize,
    peak: AtomicUsize,
    stale_drops: AtomicUsize,
}

/// Fixed-size pool of blocking workers.
pub struct AxPool {
    tx: Sender<TimedJob>,
    metrics: Arc<Metrics>,
    workers: usize,
}

impl AxPool {
    /// Start `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let (tx, rx): (Sender<TimedJob>, Receiver<TimedJob>) = chan::unbounded();
        let metrics = Arc::new(Metrics::default());
        for i in 0..workers {
            let rx = rx.clone();
            let metrics = metrics.clone();
            thread::Builder::new()
                .name(format!("ax-worker-{i}"))
                .spawn(move || worker_loop(&rx, &metrics))
                .map_err(|e| Error::Spawn(e.to_string()))?;
        }
        Ok(Self {
            tx,
            metrics,
            workers,
        })
    }

    /// Run `f` on a worker and wait at most `budget` for its result.
    ///
    /// On timeout the job is not interrupted; it either finishes in the background
    /// or is dropped unrun if no worker reached it in time.
    pub async fn run<T, F>(&self, budget: Duration, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            // The caller may have timed out already.
            let _ = done_tx.send(f());
        });
        self.tx
            .send(TimedJob {
                job,
                deadline: Instant::now() + budget,
            })
            .map_err(|_| Error::PoolClosed)?;
        match tokio::time::timeout(budget, done_rx).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(_)) => Err(Error::PoolClosed),
            Err(_) => Err(Error::Timeout {
                ms: budget.as_millis() as u64,
            }),
        }
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Jobs dropped because their deadline passed while queued.
    pub fn stale_drops(&self) -> usize {
        self.metrics.stale_drops.load(Ordering::SeqCst)
    }

    /// Highest number of jobs observed running at once.
    pub fn peak_inflight(&self) -> usize {
        self.metrics.peak.load(Ordering::SeqCst)
    }
}

fn worker_loop(rx: &Receiver<TimedJob>, metrics: &Metrics) {
    while let Ok(TimedJob { job, deadline }) = rx.recv() {
        if Instant::now() > deadline {
            metrics.stale_drops.fetch_add(1, Ordering::SeqCst);
            trace!("ax_pool_stale_drop");
            continue;
        }
        let now = metrics.inflight.fetch_add(1, Ordering::SeqCst) + 1;
        metrics.peak.fetch_max(now, Ordering::SeqCst);
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!("ax_pool_job_panicked");
        }
        metrics.inflight.fetch_sub(1, Ordering::SeqCst);
    }
    trace!("ax_pool_worker_exit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run_async_test;

    #[test]
    fn returns_job_result() {
        run_async_test(async {
            let pool = AxPool::new(2).expect("pool");
            let v = pool.run(Duration::from_secs(1), || 6 * 7).await;
            assert_eq!(v, Ok(42));
        });
    }

    #[test]
    fn slow_job_times_out_without_blocking_others() {
        run_async_test(async {
            let pool = Arc::new(AxPool::new(2).expect("pool"));
            let slow = {
                let pool = pool.clone();
                tokio::spawn(async move {
                    pool.run(Duration::from_millis(50), || {
                        thread::sleep(Duration::from_millis(400));
                    })
                    .await
                })
            };
            let fast = pool.run(Duration::from_millis(300), || "ok").await;
            assert_eq!(fast, Ok("ok"));
            let slow = slow.await.expect("join");
            assert_eq!(slow, Err(Error::Timeout { ms: 50 }));
        });
    }

    #[test]
    fn concurrency_is_bounded_and_stale_jobs_dropped() {
        run_async_test(async {
            let pool = Arc::new(AxPool::new(2).expect("pool"));
            let ran = Arc::new(AtomicUsize::new(0));
            let mut tasks = Vec::new();
            for _ in 0..6 {
                let pool = pool.clone();
                let ran = ran.clone();
                tasks.push(tokio::spawn(async move {
                    pool.run(Duration::from_millis(120), move || {
                        ran.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(100));
                    })
                    .await
                }));
            }
            for t in tasks {
                let _ = t.await;
            }
            // Let workers drain the queue so stale jobs are counted.
            tokio::time::sleep(Duration::from_millis(300)).await;
            assert!(pool.peak_inflight() <= 2);
            assert!(ran.load(Ordering::SeqCst) < 6);
            assert_eq!(ran.load(Ordering::SeqCst) + pool.stale_drops(), 6);
        });
    }
}
