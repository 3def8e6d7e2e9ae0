//! Write a position to a resolved element and confirm it took effect.

use std::{thread, time::Duration};

use tracing::{debug, trace};

use crate::{
    error::{AxError, Error, Result},
    geom::Point,
    platform::Element,
};

/// Poll cadence while waiting for a write to settle.
const SETTLE_SLEEP_MS: u64 = 15;
/// Longest a single write is given to settle before verification fails.
const SETTLE_TOTAL_MS: u64 = 60;

/// Outcome of a verified write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Applied {
    /// Origin that was written.
    pub requested: Point,
    /// Origin read back after the write settled.
    pub actual: Point,
}

/// Position writer with post-write verification.
#[derive(Debug, Clone, Copy)]
pub struct Applier {
    tolerance: f64,
    settle_sleep: Duration,
    settle_total: Duration,
}

impl Applier {
    /// Applier accepting read-backs within `tolerance` of the request.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            settle_sleep: Duration::from_millis(SETTLE_SLEEP_MS),
            settle_total: Duration::from_millis(SETTLE_TOTAL_MS),
        }
    }

    /// Override the settle polling window.
    pub fn with_settle(mut self, sleep: Duration, total: Duration) -> Self {
        self.settle_sleep = sleep;
        self.settle_total = total;
        self
    }

    /// Move `element` to `target`.
    ///
    /// Checks writability first and never writes to a read-only position. A failed OS
    /// call is a [`Error::WriteError`]; an accepted write that does not stick is a
    /// [`Error::VerificationFailed`].
    pub fn apply(&self, element: &dyn Element, target: Point) -> Result<Applied> {
        match element.position_settable() {
            Ok(true) => {}
            Ok(false) | Err(AxError::Unsupported) => return Err(Error::NotSettable),
            Err(e) => return Err(Error::Ax(e)),
        }

        debug!(x = target.x, y = target.y, "applier_set_position");
        element.set_position(target).map_err(Error::WriteError)?;

        let mut waited = Duration::ZERO;
        loop {
            let actual = element.position()?;
            if actual.approx_eq(target, self.tolerance) {
                trace!(waited_ms = waited.as_millis() as u64, "applier_verified");
                return Ok(Applied {
                    requested: target,
                    actual,
                });
            }
            if waited >= self.settle_total {
                return Err(Error::VerificationFailed {
                    expected: target,
                    actual,
                });
            }
            thread::sleep(self.settle_sleep);
            waited = waited.saturating_add(self.settle_sleep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeElement;

    fn applier() -> Applier {
        Applier::new(2.0).with_settle(Duration::from_millis(1), Duration::from_millis(3))
    }

    #[test]
    fn verified_write() {
        let el = FakeElement::new("AXGroup").at(0.0, 0.0).build_fake();
        let out = applier().apply(&*el, Point::new(100.0, 80.0)).expect("apply");
        assert_eq!(out.actual, Point::new(100.0, 80.0));
        assert_eq!(el.writes(), 1);
    }

    #[test]
    fn read_only_position_is_not_settable_and_never_written() {
        let el = FakeElement::new("AXGroup").read_only().build_fake();
        let err = applier().apply(&*el, Point::new(1.0, 1.0)).unwrap_err();
        assert_eq!(err, Error::NotSettable);
        assert_eq!(el.writes(), 0);
    }

    #[test]
    fn ignored_write_fails_verification() {
        let el = FakeElement::new("AXGroup")
            .at(5.0, 5.0)
            .ignoring_writes()
            .build_fake();
        let err = applier().apply(&*el, Point::new(100.0, 100.0)).unwrap_err();
        assert_eq!(
            err,
            Error::VerificationFailed {
                expected: Point::new(100.0, 100.0),
                actual: Point::new(5.0, 5.0),
            }
        );
    }

    #[test]
    fn failed_os_call_is_write_error() {
        let el = FakeElement::new("AXGroup").failing_writes(1).build_fake();
        let err = applier().apply(&*el, Point::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::WriteError(_)));
    }
}
