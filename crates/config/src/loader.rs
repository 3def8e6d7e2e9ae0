//! Parse and load settings from RON.

use std::{ffi::OsStr, fs, io::ErrorKind, path::Path};

use ron::{error::SpannedError, ser::PrettyConfig};
use tracing::debug;

use crate::{Error, Settings, error::excerpt_at};

/// Parse settings from RON text and validate them.
pub fn from_ron(source: &str) -> Result<Settings, Error> {
    let settings: Settings = ron::from_str(source).map_err(|e| parse_error(source, &e))?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a `.ron` file at `path`.
pub fn load_from_path(path: &Path) -> Result<Settings, Error> {
    if path.extension() != Some(OsStr::new("ron")) {
        return Err(Error::Read {
            path: Some(path.to_path_buf()),
            message: "Unsupported config format (expected a .ron file)".to_string(),
        });
    }
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    from_ron(&source).map_err(|e| e.with_path(path))
}

/// Load settings from `path`, falling back to defaults when the file does not exist.
pub fn load_or_default(path: &Path) -> Result<Settings, Error> {
    match fs::metadata(path) {
        Ok(_) => load_from_path(path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file; using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(Error::Read {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        }),
    }
}

/// Render settings as pretty RON.
pub fn to_ron(settings: &Settings) -> Result<String, Error> {
    ron::ser::to_string_pretty(settings, PrettyConfig::default()).map_err(|e| Error::Read {
        path: None,
        message: e.to_string(),
    })
}

fn parse_error(source: &str, err: &SpannedError) -> Error {
    let (line, col) = (err.span.start.line.max(1), err.span.start.col.max(1));
    Error::Parse {
        path: None,
        line,
        col,
        message: err.code.to_string(),
        excerpt: excerpt_at(source, line, col),
    }
}
