//! In-memory fakes for the platform seams, shared by unit and integration tests.

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use config::{Placement, Settings};
use parking_lot::Mutex;
use tokio::runtime::Builder;

use crate::{
    error::{AxError, Error},
    events::EventSink,
    geom::{Point, Rect, Size},
    platform::{Desktop, Element, ElementRef, OsVersion, TrustCheck, WindowId, WindowInfo},
    resolver::Stage,
};

/// Owner name that passes the default owner filter.
pub const NC_OWNER: &str = "Notification Center";

/// Scriptable foreign element.
#[derive(Debug)]
pub struct FakeElement {
    role: Option<String>,
    subrole: Option<String>,
    identifier: Option<String>,
    size: Option<Size>,
    pos: Mutex<Point>,
    settable: bool,
    ignore_writes: bool,
    failing_writes: AtomicUsize,
    writes: AtomicUsize,
    delay: Option<Duration>,
    children: Vec<ElementRef>,
}

impl FakeElement {
    /// Element with `role`, no size, settable position at the origin.
    pub fn new(role: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            subrole: None,
            identifier: None,
            size: None,
            pos: Mutex::new(Point::default()),
            settable: true,
            ignore_writes: false,
            failing_writes: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            delay: None,
            children: Vec::new(),
        }
    }

    /// Set the subrole.
    pub fn with_subrole(mut self, subrole: &str) -> Self {
        self.subrole = Some(subrole.to_string());
        self
    }

    /// Set the automation identifier.
    pub fn with_identifier(mut self, id: &str) -> Self {
        self.identifier = Some(id.to_string());
        self
    }

    /// Give the element a readable size.
    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.size = Some(Size::new(w, h));
        self
    }

    /// Initial position.
    pub fn at(self, x: f64, y: f64) -> Self {
        *self.pos.lock() = Point::new(x, y);
        self
    }

    /// Report the position attribute as not settable.
    pub fn read_only(mut self) -> Self {
        self.settable = false;
        self
    }

    /// Accept writes without moving.
    pub fn ignoring_writes(mut self) -> Self {
        self.ignore_writes = true;
        self
    }

    /// Fail the next `n` writes with an OS error.
    pub fn failing_writes(self, n: usize) -> Self {
        self.failing_writes.store(n, Ordering::SeqCst);
        self
    }

    /// Stall every tree read for `d`, like an unresponsive process.
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child.build());
        self
    }

    /// Append a child the caller keeps a handle to.
    pub fn with_shared_child(mut self, child: &Arc<Self>) -> Self {
        self.children.push(child.clone());
        self
    }

    /// Finish as a shared element handle.
    pub fn build(self) -> ElementRef {
        Arc::new(self)
    }

    /// Finish keeping the concrete type, for inspecting counters.
    pub fn build_fake(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of position writes attempted.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn stall(&self) {
        if let Some(d) = self.delay {
            thread::sleep(d);
        }
    }
}

impl Element for FakeElement {
    fn role(&self) -> Option<String> {
        self.role.clone()
    }

    fn subrole(&self) -> Option<String> {
        self.subrole.clone()
    }

    fn identifier(&self) -> Option<String> {
        self.identifier.clone()
    }

    fn children(&self) -> Vec<ElementRef> {
        self.stall();
        self.children.clone()
    }

    fn position(&self) -> Result<Point, AxError> {
        Ok(*self.pos.lock())
    }

    fn size(&self) -> Result<Size, AxError> {
        self.size.ok_or(AxError::Unsupported)
    }

    fn position_settable(&self) -> Result<bool, AxError> {
        Ok(self.settable)
    }

    fn set_position(&self, pos: Point) -> Result<(), AxError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AxError::Code(-25200));
        }
        if !self.ignore_writes {
            *self.pos.lock() = pos;
        }
        Ok(())
    }
}

#[derive(Default)]
struct DesktopState {
    windows: Vec<WindowInfo>,
    elements: HashMap<WindowId, ElementRef>,
    apps: HashMap<String, ElementRef>,
    screen: Rect,
    os: OsVersion,
    resolved: Vec<WindowId>,
}

/// Scriptable desktop: a window list, per-window element trees and app trees.
pub struct FakeDesktop {
    state: Mutex<DesktopState>,
    list_calls: AtomicUsize,
    os_calls: AtomicUsize,
    app_calls: AtomicUsize,
}

impl Default for FakeDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDesktop {
    /// Empty desktop with a 1440x900 screen running OS 15.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DesktopState {
                screen: Rect::new(0.0, 0.0, 1440.0, 900.0),
                os: OsVersion::new(15, 0, 0),
                ..DesktopState::default()
            }),
            list_calls: AtomicUsize::new(0),
            os_calls: AtomicUsize::new(0),
            app_calls: AtomicUsize::new(0),
        }
    }

    /// Add a visible window, optionally reachable through `element`.
    pub fn add_window(&self, info: WindowInfo, element: Option<ElementRef>) {
        let mut s = self.state.lock();
        if let Some(e) = element {
            s.elements.insert(info.id, e);
        }
        s.windows.push(info);
    }

    /// Register (or clear) the application tree for `bundle_id`.
    pub fn set_app(&self, bundle_id: &str, element: Option<ElementRef>) {
        let mut s = self.state.lock();
        match element {
            Some(e) => {
                s.apps.insert(bundle_id.to_string(), e);
            }
            None => {
                s.apps.remove(bundle_id);
            }
        }
    }

    /// Replace the screen bounds.
    pub fn set_screen(&self, r: Rect) {
        self.state.lock().screen = r;
    }

    /// Replace the reported OS version.
    pub fn set_os(&self, v: OsVersion) {
        self.state.lock().os = v;
    }

    /// Number of window enumerations so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of OS version queries so far.
    pub fn os_calls(&self) -> usize {
        self.os_calls.load(Ordering::SeqCst)
    }

    /// Number of application tree lookups so far.
    pub fn app_calls(&self) -> usize {
        self.app_calls.load(Ordering::SeqCst)
    }

    /// Ids of every window whose element tree was requested, in order.
    pub fn resolved_windows(&self) -> Vec<WindowId> {
        self.state.lock().resolved.clone()
    }
}

impl Desktop for FakeDesktop {
    fn list_windows(&self) -> Vec<WindowInfo> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().windows.clone()
    }

    fn window_element(&self, window: &WindowInfo) -> Option<ElementRef> {
        let mut s = self.state.lock();
        s.resolved.push(window.id);
        s.elements.get(&window.id).cloned()
    }

    fn app_element_for_bundle(&self, bundle_id: &str) -> Option<ElementRef> {
        self.app_calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().apps.get(bundle_id).cloned()
    }

    fn screen_bounds(&self) -> Rect {
        self.state.lock().screen
    }

    fn os_version(&self) -> OsVersion {
        self.os_calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().os
    }
}

/// Trust primitive that can be flipped from a test.
#[derive(Debug, Default)]
pub struct FakeTrust(AtomicBool);

impl FakeTrust {
    /// Start trusted or untrusted.
    pub fn new(trusted: bool) -> Self {
        Self(AtomicBool::new(trusted))
    }

    /// Grant or revoke.
    pub fn set(&self, trusted: bool) {
        self.0.store(trusted, Ordering::SeqCst);
    }
}

impl TrustCheck for FakeTrust {
    fn is_trusted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One recorded sink callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A candidate window was detected.
    Detected(WindowId),
    /// The resolver matched at a stage.
    Resolved(WindowId, Stage),
    /// A window was moved.
    Moved(WindowId, Placement, Point),
    /// Moving a window failed.
    Failed(WindowId, Error),
    /// The widget panel appeared or disappeared.
    WidgetPanel(bool),
    /// Discovery entered or left scanning.
    Scanning(bool),
}

/// Event sink that keeps everything it is told.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, e: Event) {
        self.events.lock().push(e);
    }
}

impl EventSink for RecordingSink {
    fn on_window_detected(&self, window: &WindowInfo) {
        self.push(Event::Detected(window.id));
    }

    fn on_element_resolved(&self, window_id: WindowId, stage: Stage) {
        self.push(Event::Resolved(window_id, stage));
    }

    fn on_window_moved(&self, window_id: WindowId, placement: Placement, coordinate: Point) {
        self.push(Event::Moved(window_id, placement, coordinate));
    }

    fn on_window_move_failed(&self, window_id: WindowId, reason: &Error) {
        self.push(Event::Failed(window_id, reason.clone()));
    }

    fn on_widget_panel_transition(&self, now_visible: bool) {
        self.push(Event::WidgetPanel(now_visible));
    }

    fn on_scanning_changed(&self, scanning: bool) {
        self.push(Event::Scanning(scanning));
    }
}

/// Window owned by Notification Center with the given id and size.
pub fn window(id: WindowId, w: f64, h: f64) -> WindowInfo {
    WindowInfo {
        id,
        pid: 400,
        app: NC_OWNER.to_string(),
        layer: 23,
        frame: Rect::new(1000.0, 700.0, w, h),
    }
}

/// A banner-shaped window tree matched by the subrole stage.
pub fn banner() -> FakeElement {
    FakeElement::new("AXWindow").with_child(
        FakeElement::new("AXGroup")
            .with_subrole("AXNotificationCenterBanner")
            .with_size(300.0, 80.0),
    )
}

/// Defaults with timers shortened for tests.
pub fn fast_settings() -> Settings {
    let mut s = Settings {
        discovery_interval_ms: 20,
        permission_poll_ms: 20,
        foreign_call_timeout_ms: 500,
        ..Settings::default()
    };
    s.widget.interval_ms = 10;
    s.widget.active_ms = 2_000;
    s
}

/// Poll `cond` every few milliseconds until it holds or `timeout` passes.
pub async fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

static TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Run an async test body on a dedicated multi-threaded runtime, one test at a time,
/// and shut the runtime down promptly afterwards.
pub fn run_async_test<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let _guard = TEST_LOCK.get_or_init(|| Mutex::new(())).lock();
    let rt = match Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => panic!("build test runtime: {e}"),
    };
    rt.block_on(fut);
    rt.shutdown_timeout(Duration::from_millis(100));
}
