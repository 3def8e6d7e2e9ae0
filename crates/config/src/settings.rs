use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Placement, SizeConstraint, SubroleTier,
    defaults::{self, *},
};

/// Element resolver tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverCfg {
    /// OS-version tiered table of notification subroles.
    pub subrole_tiers: Vec<SubroleTier>,
    /// Automation identifier prefixes that mark a notification element.
    pub identifier_prefixes: Vec<String>,
    /// Roles treated as generic containers for the role+size stage.
    pub group_roles: Vec<String>,
    /// Size box a positionable element must fit.
    pub element_filter: SizeConstraint,
    /// Depth bound for the bounded stages.
    pub max_depth: usize,
    /// Upper bound on nodes visited by any single stage.
    pub max_nodes: usize,
}

impl Default for ResolverCfg {
    fn default() -> Self {
        Self {
            subrole_tiers: defaults::subrole_tiers(),
            identifier_prefixes: strings(IDENTIFIER_PREFIXES),
            group_roles: strings(GROUP_ROLES),
            element_filter: ELEMENT_FILTER,
            max_depth: RESOLVER_MAX_DEPTH,
            max_nodes: RESOLVER_MAX_NODES,
        }
    }
}

/// Widget panel monitor tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetCfg {
    /// Bundle identifier of the process hosting the widget panel.
    pub host_bundle_id: String,
    /// Identifier prefix that marks a widget element.
    pub identifier_prefix: String,
    /// Poll cadence while active.
    pub interval_ms: u64,
    /// How long the monitor stays active after a trigger.
    pub active_ms: u64,
    /// Depth bound when searching the host's element tree.
    pub max_depth: usize,
}

impl Default for WidgetCfg {
    fn default() -> Self {
        Self {
            host_bundle_id: WIDGET_HOST_BUNDLE_ID.to_string(),
            identifier_prefix: WIDGET_IDENTIFIER_PREFIX.to_string(),
            interval_ms: WIDGET_INTERVAL_MS,
            active_ms: WIDGET_ACTIVE_MS,
            max_depth: WIDGET_MAX_DEPTH,
        }
    }
}

impl WidgetCfg {
    /// Poll cadence as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Activation window as a `Duration`.
    pub fn active_for(&self) -> Duration {
        Duration::from_millis(self.active_ms)
    }
}

/// Complete runtime settings. Every field has a default, so an empty `()` file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Master switch; when off nothing is moved.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Where notifications go.
    #[serde(default = "default_placement")]
    pub placement: Placement,
    /// Gap between a positioned element and the nearest screen edge.
    #[serde(default = "default_padding")]
    pub padding: f64,
    /// Discovery poll cadence.
    #[serde(default = "default_discovery_interval_ms")]
    pub discovery_interval_ms: u64,
    /// Most candidate windows handled in a single pass.
    #[serde(default = "default_max_windows_per_pass")]
    pub max_windows_per_pass: usize,
    /// Passes a vanished window id is remembered for.
    #[serde(default = "default_known_retain_passes")]
    pub known_retain_passes: u64,
    /// Size box a window must fit to be a candidate.
    #[serde(default = "default_window_filter")]
    pub window_filter: SizeConstraint,
    /// Owning process names a candidate must match; empty accepts any owner.
    #[serde(default = "default_owners")]
    pub owners: Vec<String>,
    /// Element resolver tuning.
    #[serde(default)]
    pub resolver: ResolverCfg,
    /// Widget panel monitor tuning.
    #[serde(default)]
    pub widget: WidgetCfg,
    /// Permission gate poll cadence.
    #[serde(default = "default_permission_poll_ms")]
    pub permission_poll_ms: u64,
    /// Budget for a single foreign UI call.
    #[serde(default = "default_foreign_call_timeout_ms")]
    pub foreign_call_timeout_ms: u64,
    /// Worker threads available for foreign UI calls.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Accepted distance between requested and re-read positions.
    #[serde(default = "default_verify_tolerance")]
    pub verify_tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            placement: PLACEMENT,
            padding: PADDING,
            discovery_interval_ms: DISCOVERY_INTERVAL_MS,
            max_windows_per_pass: MAX_WINDOWS_PER_PASS,
            known_retain_passes: KNOWN_RETAIN_PASSES,
            window_filter: WINDOW_FILTER,
            owners: default_owners(),
            resolver: ResolverCfg::default(),
            widget: WidgetCfg::default(),
            permission_poll_ms: PERMISSION_POLL_MS,
            foreign_call_timeout_ms: FOREIGN_CALL_TIMEOUT_MS,
            workers: WORKERS,
            verify_tolerance: VERIFY_TOLERANCE,
        }
    }
}

impl Settings {
    /// Discovery poll cadence as a `Duration`.
    pub fn discovery_interval(&self) -> Duration {
        Duration::from_millis(self.discovery_interval_ms)
    }

    /// Permission poll cadence as a `Duration`.
    pub fn permission_poll(&self) -> Duration {
        Duration::from_millis(self.permission_poll_ms)
    }

    /// Foreign call budget as a `Duration`.
    pub fn foreign_call_timeout(&self) -> Duration {
        Duration::from_millis(self.foreign_call_timeout_ms)
    }

    /// True when `app` passes the owner filter.
    pub fn owner_matches(&self, app: &str) -> bool {
        self.owners.is_empty() || self.owners.iter().any(|o| o == app)
    }

    /// Check ranges and cross-field consistency.
    pub fn validate(&self) -> Result<(), Error> {
        fn bad(field: &str, message: impl Into<String>) -> Error {
            Error::Validation {
                path: None,
                field: field.to_string(),
                message: message.into(),
            }
        }

        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(bad("padding", "must be a non-negative number"));
        }
        if !(self.verify_tolerance.is_finite() && self.verify_tolerance >= 0.0) {
            return Err(bad("verify_tolerance", "must be a non-negative number"));
        }
        for (field, v) in [
            ("discovery_interval_ms", self.discovery_interval_ms),
            ("permission_poll_ms", self.permission_poll_ms),
            ("foreign_call_timeout_ms", self.foreign_call_timeout_ms),
            ("widget.interval_ms", self.widget.interval_ms),
            ("known_retain_passes", self.known_retain_passes),
        ] {
            if v == 0 {
                return Err(bad(field, "must be greater than zero"));
            }
        }
        if self.workers == 0 {
            return Err(bad("workers", "at least one worker is required"));
        }
        if self.max_windows_per_pass == 0 {
            return Err(bad("max_windows_per_pass", "must be greater than zero"));
        }
        for (field, c) in [
            ("window_filter", &self.window_filter),
            ("resolver.element_filter", &self.resolver.element_filter),
        ] {
            if c.min_width < 0.0 || c.min_height < 0.0 {
                return Err(bad(field, "minimums must be non-negative"));
            }
            if c.min_width > c.max_width || c.min_height > c.max_height {
                return Err(bad(field, "minimum exceeds maximum"));
            }
        }
        if self.resolver.max_nodes == 0 {
            return Err(bad("resolver.max_nodes", "must be greater than zero"));
        }
        Ok(())
    }
}
