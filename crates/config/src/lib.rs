//! Settings types, defaults, and RON loading for notimove.
//!
//! The core consumes settings through [`ConfigProvider`]; this crate owns the
//! types, their defaults, validation, and the on-disk format.
#![warn(unsafe_op_in_unsafe_fn)]

use std::{
    env,
    path::{Path, PathBuf},
};

mod defaults;
mod error;
mod loader;
mod provider;
mod settings;
mod types;

#[cfg(test)]
mod test_parse;

pub use error::Error;
pub use loader::{from_ron, load_from_path, load_or_default, to_ron};
pub use provider::{ConfigProvider, SharedSettings};
pub use settings::{ResolverCfg, Settings, WidgetCfg};
pub use types::{HAlign, Placement, SizeConstraint, SubroleTier, VAlign, subroles_for};

/// Determine the preferred user config path (`~/.config/notimove/config.ron`).
pub fn default_config_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".config");
    p.push("notimove");
    p.push("config.ron");
    p
}

/// Resolve the effective config path: `explicit` when provided, else the default path.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path)
}
