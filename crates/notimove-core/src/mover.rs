//! Resolve, place and apply for a single candidate window.
//!
//! Everything here blocks on foreign calls and is meant to run on the worker pool.

use std::sync::Arc;

use config::{Placement, Settings};
use tracing::debug;

use crate::{
    applier::{Applied, Applier},
    error::{Error, Result},
    placement::calculate_position,
    platform::{Desktop, Element, WindowInfo},
    resolver::{Resolver, Stage},
};

/// What happened to one window.
#[derive(Debug, Clone)]
pub struct MoveReport {
    /// Stage that resolved the element, if any did.
    pub stage: Option<Stage>,
    /// Final outcome.
    pub result: Result<Applied>,
}

/// One pass's worth of positioning settings bound to a desktop.
#[derive(Clone)]
pub struct Mover {
    desktop: Arc<dyn Desktop>,
    resolver: Arc<Resolver>,
    applier: Applier,
    placement: Placement,
    padding: f64,
}

impl Mover {
    /// Build from a settings snapshot.
    pub fn new(desktop: Arc<dyn Desktop>, settings: &Settings) -> Self {
        Self {
            desktop,
            resolver: Arc::new(Resolver::new(settings.resolver.clone())),
            applier: Applier::new(settings.verify_tolerance),
            placement: settings.placement,
            padding: settings.padding,
        }
    }

    /// Replace the applier, e.g. to shorten settle timing.
    pub fn with_applier(mut self, applier: Applier) -> Self {
        self.applier = applier;
        self
    }

    /// Placement this mover targets.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Resolve the element inside `window` and move it.
    pub fn move_window(&self, window: &WindowInfo) -> MoveReport {
        let Some(root) = self.desktop.window_element(window) else {
            debug!(window_id = window.id, "window_element_unavailable");
            return MoveReport {
                stage: None,
                result: Err(Error::NotFound),
            };
        };
        let os = self.desktop.os_version();
        let Some(resolved) = self.resolver.resolve(&root, os) else {
            return MoveReport {
                stage: None,
                result: Err(Error::NotFound),
            };
        };
        MoveReport {
            stage: Some(resolved.stage),
            result: self.position(&*resolved.element),
        }
    }

    fn position(&self, element: &dyn Element) -> Result<Applied> {
        let size = element.size()?;
        let screen = self.desktop.screen_bounds();
        let target = calculate_position(self.placement, size, screen, self.padding);
        match self.applier.apply(element, target) {
            Err(Error::WriteError(e)) => {
                debug!(error = %e, "position_write_retry");
                self.applier.apply(element, target)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        geom::{Point, Rect},
        placement::BOTTOM_Y,
        test_support::{FakeDesktop, FakeElement, banner, window},
    };

    fn mover(desktop: Arc<FakeDesktop>, placement: Placement) -> Mover {
        let settings = Settings {
            placement,
            padding: 20.0,
            ..Settings::default()
        };
        Mover::new(desktop, &settings).with_applier(
            Applier::new(2.0).with_settle(Duration::from_millis(1), Duration::from_millis(3)),
        )
    }

    #[test]
    fn moves_banner_bottom_right() {
        let desktop = Arc::new(FakeDesktop::new());
        desktop.add_window(window(1, 320.0, 90.0), Some(banner().build()));
        let report = mover(desktop.clone(), Placement::BottomRight).move_window(&window(1, 320.0, 90.0));
        assert_eq!(report.stage, Some(Stage::Subrole));
        let applied = report.result.expect("moved");
        assert_eq!(applied.requested, Point::new(1120.0, BOTTOM_Y));
        assert_eq!(desktop.os_calls(), 1);
    }

    #[test]
    fn screen_bounds_are_read_fresh() {
        let desktop = Arc::new(FakeDesktop::new());
        desktop.add_window(window(1, 320.0, 90.0), Some(banner().build()));
        let m = mover(desktop.clone(), Placement::TopLeft);
        let first = m.move_window(&window(1, 320.0, 90.0)).result.expect("first");
        desktop.set_screen(Rect::new(1440.0, 0.0, 1920.0, 1080.0));
        let second = m.move_window(&window(1, 320.0, 90.0)).result.expect("second");
        assert_eq!(first.requested, Point::new(20.0, 800.0));
        assert_eq!(second.requested, Point::new(1460.0, 980.0));
    }

    #[test]
    fn unreachable_window_is_not_found() {
        let desktop = Arc::new(FakeDesktop::new());
        desktop.add_window(window(1, 320.0, 90.0), None);
        let report = mover(desktop, Placement::TopLeft).move_window(&window(1, 320.0, 90.0));
        assert_eq!(report.stage, None);
        assert_eq!(report.result.unwrap_err(), Error::NotFound);
    }

    #[test]
    fn write_error_is_retried_once() {
        let desktop = Arc::new(FakeDesktop::new());
        let el = FakeElement::new("AXGroup")
            .with_subrole("AXNotificationCenterBanner")
            .with_size(300.0, 80.0)
            .failing_writes(1)
            .build_fake();
        let tree = FakeElement::new("AXWindow").with_shared_child(&el).build();
        desktop.add_window(window(1, 320.0, 90.0), Some(tree));
        let report = mover(desktop, Placement::TopLeft).move_window(&window(1, 320.0, 90.0));
        assert!(report.result.is_ok());
        assert_eq!(el.writes(), 2);
    }

    #[test]
    fn write_error_twice_is_abandoned() {
        let desktop = Arc::new(FakeDesktop::new());
        let el = FakeElement::new("AXGroup")
            .with_subrole("AXNotificationCenterBanner")
            .with_size(300.0, 80.0)
            .failing_writes(5)
            .build_fake();
        let tree = FakeElement::new("AXWindow").with_shared_child(&el).build();
        desktop.add_window(window(1, 320.0, 90.0), Some(tree));
        let report = mover(desktop, Placement::TopLeft).move_window(&window(1, 320.0, 90.0));
        assert!(matches!(report.result, Err(Error::WriteError(_))));
        assert_eq!(el.writes(), 2);
    }

    #[test]
    fn not_settable_is_not_retried() {
        let desktop = Arc::new(FakeDesktop::new());
        let el = FakeElement::new("AXGroup")
            .with_subrole("AXNotificationCenterBanner")
            .with_size(300.0, 80.0)
            .read_only()
            .build_fake();
        let tree = FakeElement::new("AXWindow").with_shared_child(&el).build();
        desktop.add_window(window(1, 320.0, 90.0), Some(tree));
        let report = mover(desktop, Placement::TopLeft).move_window(&window(1, 320.0, 90.0));
        assert_eq!(report.result.unwrap_err(), Error::NotSettable);
        assert_eq!(el.writes(), 0);
    }

    #[test]
    fn ignored_write_is_not_retried() {
        let desktop = Arc::new(FakeDesktop::new());
        let el = FakeElement::new("AXGroup")
            .with_subrole("AXNotificationCenterBanner")
            .with_size(300.0, 80.0)
            .ignoring_writes()
            .build_fake();
        let tree = FakeElement::new("AXWindow").with_shared_child(&el).build();
        desktop.add_window(window(1, 320.0, 90.0), Some(tree));
        let report = mover(desktop, Placement::TopLeft).move_window(&window(1, 320.0, 90.0));
        assert!(matches!(report.result, Err(Error::VerificationFailed { .. })));
        assert_eq!(el.writes(), 1);
    }
}
