//! Run settings: an optional JSON file, overridden by command-line flags.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::export::ExportFormat;
use crate::table::HeaderRow;

pub const NUM_CHARS_RANGE: RangeInclusive<usize> = 1..=1000;
pub const DEFAULT_NUM_CHARS: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("character count {0} is outside 1..=1000")]
    NumCharsOutOfRange(usize),
}

/// Every field is optional in the file; missing ones take the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Characters kept after the date in each snippet.
    pub num_chars: usize,
    pub prefer_tables: bool,
    pub header_row: HeaderRow,
    /// Read 2–3 digit years below 200 as Republic of China years.
    pub roc_years: bool,
    pub format: ExportFormat,
    /// Table columns to search. Empty means the first two found.
    pub columns: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            num_chars: DEFAULT_NUM_CHARS,
            prefer_tables: true,
            header_row: HeaderRow::First,
            roc_years: true,
            format: ExportFormat::Csv,
            columns: Vec::new(),
        }
    }
}

impl Settings {
    /// Defaults, or the contents of `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Settings::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), ?settings, "settings loaded");
        Ok(settings)
    }

    /// Checked after command-line overrides are applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !NUM_CHARS_RANGE.contains(&self.num_chars) {
            return Err(ConfigError::NumCharsOutOfRange(self.num_chars));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults_without_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.num_chars, 20);
        assert!(settings.prefer_tables && settings.roc_years);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "num_chars": 40, "header_row": "densest", "format": "docx", "columns": ["交期"] }"#,
        )
        .unwrap();
        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.num_chars, 40);
        assert_eq!(settings.header_row, HeaderRow::Densest);
        assert_eq!(settings.format, ExportFormat::Docx);
        assert_eq!(settings.columns, vec!["交期"]);
        assert!(settings.roc_years);
    }

    #[test]
    fn test_load_rejects_unknown_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "num_char": 40 }"#).unwrap();
        assert!(matches!(
            Settings::load(Some(path.as_path())),
            Err(ConfigError::Parse { .. })
        ));
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Settings::load(Some(path.as_path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(dir.path().join("absent.json").as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_validate_num_chars() {
        let mut settings = Settings::default();
        for ok in [1, 20, 1000] {
            settings.num_chars = ok;
            assert!(settings.validate().is_ok());
        }
        for bad in [0, 1001] {
            settings.num_chars = bad;
            assert!(matches!(
                settings.validate(),
                Err(ConfigError::NumCharsOutOfRange(n)) if n == bad
            ));
        }
    }
}
