// Defaults and constants for settings.

use crate::{Placement, SizeConstraint, SubroleTier};

pub(crate) const PLACEMENT: Placement = Placement::TopRight;
pub(crate) const PADDING: f64 = 20.0;

// Discovery loop
pub(crate) const DISCOVERY_INTERVAL_MS: u64 = 250;
pub(crate) const MAX_WINDOWS_PER_PASS: usize = 32;
pub(crate) const KNOWN_RETAIN_PASSES: u64 = 240;
pub(crate) const WINDOW_FILTER: SizeConstraint = SizeConstraint::new((100.0, 50.0), (800.0, 600.0));
pub(crate) const OWNERS: &[&str] = &["Notification Center", "NotificationCenter"];

// Element resolver
pub(crate) const ELEMENT_FILTER: SizeConstraint =
    SizeConstraint::new((200.0, 40.0), (800.0, 400.0));
pub(crate) const IDENTIFIER_PREFIXES: &[&str] = &["NotificationCenter", "notification"];
pub(crate) const GROUP_ROLES: &[&str] = &["AXGroup"];
pub(crate) const RESOLVER_MAX_DEPTH: usize = 10;
pub(crate) const RESOLVER_MAX_NODES: usize = 512;

// Widget panel monitor
pub(crate) const WIDGET_HOST_BUNDLE_ID: &str = "com.apple.notificationcenterui";
pub(crate) const WIDGET_IDENTIFIER_PREFIX: &str = "widget-local:";
pub(crate) const WIDGET_INTERVAL_MS: u64 = 250;
pub(crate) const WIDGET_ACTIVE_MS: u64 = 10_000;
pub(crate) const WIDGET_MAX_DEPTH: usize = 8;

// Runtime
pub(crate) const PERMISSION_POLL_MS: u64 = 1000;
pub(crate) const FOREIGN_CALL_TIMEOUT_MS: u64 = 750;
pub(crate) const WORKERS: usize = 4;
pub(crate) const VERIFY_TOLERANCE: f64 = 2.0;

/// Subrole tiers observed in the wild. Later tiers add names seen on newer systems.
pub(crate) fn subrole_tiers() -> Vec<SubroleTier> {
    vec![
        SubroleTier {
            min_os_major: 0,
            subroles: vec![
                "AXNotificationCenterBanner".to_string(),
                "AXNotificationCenterAlert".to_string(),
            ],
        },
        SubroleTier {
            min_os_major: 15,
            subroles: vec![
                "AXNotificationCenterBannerWindow".to_string(),
                "AXNotificationCenterAlertWindow".to_string(),
            ],
        },
        SubroleTier {
            min_os_major: 26,
            subroles: vec!["AXNotificationCenterNotification".to_string()],
        },
    ]
}

pub(crate) fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

// Serde default functions
pub(crate) const fn default_true() -> bool {
    true
}
pub(crate) const fn default_placement() -> Placement {
    PLACEMENT
}
pub(crate) const fn default_padding() -> f64 {
    PADDING
}
pub(crate) const fn default_discovery_interval_ms() -> u64 {
    DISCOVERY_INTERVAL_MS
}
pub(crate) const fn default_max_windows_per_pass() -> usize {
    MAX_WINDOWS_PER_PASS
}
pub(crate) const fn default_known_retain_passes() -> u64 {
    KNOWN_RETAIN_PASSES
}
pub(crate) const fn default_window_filter() -> SizeConstraint {
    WINDOW_FILTER
}
pub(crate) fn default_owners() -> Vec<String> {
    strings(OWNERS)
}
pub(crate) const fn default_permission_poll_ms() -> u64 {
    PERMISSION_POLL_MS
}
pub(crate) const fn default_foreign_call_timeout_ms() -> u64 {
    FOREIGN_CALL_TIMEOUT_MS
}
pub(crate) const fn default_workers() -> usize {
    WORKERS
}
pub(crate) const fn default_verify_tolerance() -> f64 {
    VERIFY_TOLERANCE
}
