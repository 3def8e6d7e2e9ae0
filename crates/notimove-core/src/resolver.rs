//! Locate the element to reposition inside a candidate window.
//!
//! Five ordered stages, each more permissive than the last. The first stage that
//! finds something wins and later stages do not run.

use std::fmt;

use config::{ResolverCfg, subroles_for};
use tracing::{debug, trace};

use crate::{
    platform::{ElementRef, OsVersion},
    walk::{Bounds, find_deepest, find_first},
};

/// Resolver stage, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Known banner/alert subrole.
    Subrole,
    /// Automation identifier with a known prefix.
    Identifier,
    /// Container role whose size fits the element filter.
    RoleAndSize,
    /// Deepest node whose size fits the element filter.
    DeepestSized,
    /// First node anywhere whose size fits the element filter.
    AnySized,
}

impl Stage {
    /// All stages in evaluation order.
    pub const ALL: [Self; 5] = [
        Self::Subrole,
        Self::Identifier,
        Self::RoleAndSize,
        Self::DeepestSized,
        Self::AnySized,
    ];

    /// One-based stage number.
    pub fn number(self) -> u8 {
        match self {
            Self::Subrole => 1,
            Self::Identifier => 2,
            Self::RoleAndSize => 3,
            Self::DeepestSized => 4,
            Self::AnySized => 5,
        }
    }

    /// Stable short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Subrole => "subrole",
            Self::Identifier => "identifier",
            Self::RoleAndSize => "role_and_size",
            Self::DeepestSized => "deepest_sized",
            Self::AnySized => "any_sized",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

/// A matched element and the stage that found it.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The element to reposition.
    pub element: ElementRef,
    /// Stage that matched.
    pub stage: Stage,
}

/// Stateless element resolver configured from [`ResolverCfg`].
#[derive(Debug, Clone)]
pub struct Resolver {
    cfg: ResolverCfg,
}

impl Resolver {
    /// Build a resolver from its settings.
    pub fn new(cfg: ResolverCfg) -> Self {
        Self { cfg }
    }

    /// Find the element to move below `root`, or `None` when no stage matches.
    pub fn resolve(&self, root: &ElementRef, os: OsVersion) -> Option<Resolved> {
        self.resolve_traced(root, os, &mut |_| {})
    }

    /// Like [`resolve`](Self::resolve), calling `on_stage` as each stage is entered.
    pub fn resolve_traced(
        &self,
        root: &ElementRef,
        os: OsVersion,
        on_stage: &mut dyn FnMut(Stage),
    ) -> Option<Resolved> {
        let subroles = subroles_for(&self.cfg.subrole_tiers, os.major);
        for stage in Stage::ALL {
            on_stage(stage);
            trace!(stage = stage.name(), "resolver_stage_enter");
            if let Some(element) = self.run_stage(stage, root, &subroles) {
                debug!(stage = stage.number(), name = stage.name(), "resolver_stage_matched");
                return Some(Resolved { element, stage });
            }
        }
        debug!(os = %os, "resolver_no_match");
        None
    }

    fn run_stage(&self, stage: Stage, root: &ElementRef, subroles: &[String]) -> Option<ElementRef> {
        let bounded = Bounds {
            max_depth: Some(self.cfg.max_depth),
            max_nodes: self.cfg.max_nodes,
        };
        match stage {
            Stage::Subrole => find_first(root, bounded, |e| {
                e.subrole().is_some_and(|s| subroles.iter().any(|k| *k == s))
            }),
            Stage::Identifier => find_first(root, bounded, |e| {
                e.identifier().is_some_and(|id| {
                    self.cfg
                        .identifier_prefixes
                        .iter()
                        .any(|p| id.starts_with(p.as_str()))
                })
            }),
            Stage::RoleAndSize => find_first(root, bounded, |e| {
                e.role()
                    .is_some_and(|r| self.cfg.group_roles.iter().any(|g| *g == r))
                    && self.sized(e)
            }),
            Stage::DeepestSized => find_deepest(root, bounded, |e| self.sized(e)),
            Stage::AnySized => find_first(
                root,
                Bounds {
                    max_depth: None,
                    max_nodes: self.cfg.max_nodes,
                },
                |e| self.sized(e),
            ),
        }
    }

    fn sized(&self, e: &ElementRef) -> bool {
        e.size()
            .is_ok_and(|s| self.cfg.element_filter.contains(s.width, s.height))
    }
}
