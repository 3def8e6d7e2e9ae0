//! Discovery, element resolution and positioning of notification banners.
//!
//! The crate is platform-agnostic: window enumeration, foreign element trees and
//! the trust primitive are reached through the [`Desktop`], [`Element`] and
//! [`TrustCheck`] traits. Coordinates throughout are bottom-left origin.
//!
//! [`Service::spawn`] wires the pieces together on the current tokio runtime:
//!
//! - a [`PermissionGate`] polling trust and reporting transitions,
//! - the discovery loop, which seeds a [`KnownWindows`] set and then handles
//!   newly visible candidate windows,
//! - the widget panel monitor, which requests full rescans on panel transitions,
//! - an [`AxPool`] that bounds every blocking foreign call.
//!
//! Results are reported to an [`EventSink`].

mod applier;
mod discovery;
mod error;
mod events;
mod geom;
mod known;
mod mover;
mod permission;
mod placement;
mod platform;
mod pool;
mod resolver;
mod service;
mod ticker;
mod walk;
mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;


pub use applier::{Applied, Applier};
pub use discovery::{DiscoveryStatus, LoopState, is_candidate};
pub use error::{AxError, Error, Result};
pub use events::{EventSink, TracingSink};
pub use geom::{Point, Rect, Size, approx_eq};
pub use known::KnownWindows;
pub use mover::{MoveReport, Mover};
pub use permission::{ObserverId, PermissionGate};
pub use placement::{ABOVE_DOCK_OFFSET, BOTTOM_Y, DOCK_CLEARANCE, calculate_position};
pub use platform::{
    Desktop, Element, ElementRef, OsVersion, SystemTrust, TrustCheck, WindowId, WindowInfo,
};
pub use pool::AxPool;
pub use resolver::{Resolved, Resolver, Stage};
pub use service::{Deps, Service, ServiceHandle};
pub use widget::{WidgetPanelTracker, panel_visible};
