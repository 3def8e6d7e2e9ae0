use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the nine named screen positions a notification can be moved to.
///
/// Serialized as its kebab-case name, e.g. `"bottom-right"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Placement {
    /// Top edge, left edge.
    TopLeft,
    /// Top edge, horizontally centered.
    TopMiddle,
    /// Top edge, right edge.
    TopRight,
    /// Vertically centered, left edge.
    MiddleLeft,
    /// Centered on both axes.
    DeadCenter,
    /// Vertically centered, right edge.
    MiddleRight,
    /// Bottom (above the dock), left edge.
    BottomLeft,
    /// Bottom (above the dock), horizontally centered.
    BottomMiddle,
    /// Bottom (above the dock), right edge.
    BottomRight,
}

impl TryFrom<String> for Placement {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Placement> for String {
    fn from(p: Placement) -> Self {
        p.as_str().to_string()
    }
}

/// Horizontal component of a [`Placement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    /// Against the left edge.
    Left,
    /// Centered.
    Center,
    /// Against the right edge.
    Right,
}

/// Vertical component of a [`Placement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    /// Against the top edge.
    Top,
    /// Centered.
    Middle,
    /// Above the dock.
    Bottom,
}

impl Placement {
    /// Every placement, row by row from the top.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopMiddle,
        Self::TopRight,
        Self::MiddleLeft,
        Self::DeadCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomMiddle,
        Self::BottomRight,
    ];

    /// Horizontal alignment of this placement.
    pub fn horizontal(self) -> HAlign {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => HAlign::Left,
            Self::TopMiddle | Self::DeadCenter | Self::BottomMiddle => HAlign::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => HAlign::Right,
        }
    }

    /// Vertical alignment of this placement.
    pub fn vertical(self) -> VAlign {
        match self {
            Self::TopLeft | Self::TopMiddle | Self::TopRight => VAlign::Top,
            Self::MiddleLeft | Self::DeadCenter | Self::MiddleRight => VAlign::Middle,
            Self::BottomLeft | Self::BottomMiddle | Self::BottomRight => VAlign::Bottom,
        }
    }

    /// Kebab-case name, as used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopMiddle => "top-middle",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::DeadCenter => "dead-center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomMiddle => "bottom-middle",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == norm)
            .ok_or_else(|| format!("unknown placement: {s}"))
    }
}

/// An inclusive width/height box used as a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeConstraint {
    /// Minimum accepted width.
    pub min_width: f64,
    /// Minimum accepted height.
    pub min_height: f64,
    /// Maximum accepted width.
    pub max_width: f64,
    /// Maximum accepted height.
    pub max_height: f64,
}

impl SizeConstraint {
    /// Construct a constraint from `(min_w, min_h)` and `(max_w, max_h)`.
    pub const fn new(min: (f64, f64), max: (f64, f64)) -> Self {
        Self {
            min_width: min.0,
            min_height: min.1,
            max_width: max.0,
            max_height: max.1,
        }
    }

    /// True when `width`×`height` lies inside the box (bounds inclusive).
    pub fn contains(&self, width: f64, height: f64) -> bool {
        width >= self.min_width
            && width <= self.max_width
            && height >= self.min_height
            && height <= self.max_height
    }
}

/// A group of notification subroles recognized from a given OS major version onwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubroleTier {
    /// Lowest OS major version for which these subroles apply.
    pub min_os_major: u32,
    /// Subrole strings to match exactly.
    pub subroles: Vec<String>,
}

/// Effective subrole list for `os_major`: the union of every tier at or below it.
///
/// Because tiers only ever add entries, a newer OS never recognizes fewer subroles
/// than an older one.
pub fn subroles_for(tiers: &[SubroleTier], os_major: u32) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tier in tiers.iter().filter(|t| t.min_os_major <= os_major) {
        for s in &tier.subroles {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_parses_loose_spellings() {
        assert_eq!("top-left".parse::<Placement>(), Ok(Placement::TopLeft));
        assert_eq!("Bottom_Right".parse::<Placement>(), Ok(Placement::BottomRight));
        assert_eq!("dead center".parse::<Placement>(), Ok(Placement::DeadCenter));
        assert!("middle".parse::<Placement>().is_err());
    }

    #[test]
    fn placement_axes_cover_grid() {
        for p in Placement::ALL {
            let back = Placement::ALL
                .into_iter()
                .filter(|q| q.horizontal() == p.horizontal() && q.vertical() == p.vertical())
                .count();
            assert_eq!(back, 1, "{p} is not uniquely addressed by its axes");
        }
    }

    #[test]
    fn size_constraint_is_inclusive() {
        let c = SizeConstraint::new((100.0, 50.0), (800.0, 600.0));
        assert!(c.contains(100.0, 50.0));
        assert!(c.contains(800.0, 600.0));
        assert!(!c.contains(40.0, 40.0));
        assert!(!c.contains(801.0, 100.0));
    }

    #[test]
    fn subrole_tiers_only_grow() {
        let tiers = vec![
            SubroleTier {
                min_os_major: 0,
                subroles: vec!["A".into(), "B".into()],
            },
            SubroleTier {
                min_os_major: 15,
                subroles: vec!["B".into(), "C".into()],
            },
        ];
        assert_eq!(subroles_for(&tiers, 14), vec!["A", "B"]);
        assert_eq!(subroles_for(&tiers, 15), vec!["A", "B", "C"]);
        assert_eq!(subroles_for(&tiers, 26), vec!["A", "B", "C"]);
    }
}
