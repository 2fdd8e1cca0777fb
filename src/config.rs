//! Run configuration: built-in defaults, an optional TOML file, and
//! command-line overrides, in increasing order of precedence.

use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use thiserror::Error;

pub const DEFAULT_INPUT: &str = "tools/README.md";
pub const DEFAULT_OUTPUT: &str = "public_apis.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
}

/// Contents of a configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub report_format: Option<ReportFormat>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path:?}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config file at {path:?}: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
        path: PathBuf,
    },
}

pub fn load_config(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let config_text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;

    toml::from_str(&config_text).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: Option<PathBuf>,
    pub report_format: ReportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            report: None,
            report_format: ReportFormat::default(),
        }
    }
}

impl Settings {
    /// Layer a config file over the defaults.
    pub fn from_config(config: CatalogConfig) -> Self {
        let defaults = Self::default();
        Self {
            input: config.input.unwrap_or(defaults.input),
            output: config.output.unwrap_or(defaults.output),
            report: config.report,
            report_format: config.report_format.unwrap_or(defaults.report_format),
        }
    }

    /// Layer command-line values over these settings.
    pub fn with_overrides(
        mut self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        report: Option<PathBuf>,
        report_format: Option<ReportFormat>,
    ) -> Self {
        if let Some(input) = input {
            self.input = input;
        }
        if let Some(output) = output {
            self.output = output;
        }
        if report.is_some() {
            self.report = report;
        }
        if let Some(format) = report_format {
            self.report_format = format;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.input, PathBuf::from("tools/README.md"));
        assert_eq!(settings.output, PathBuf::from("public_apis.json"));
        assert_eq!(settings.report, None);
    }

    #[test]
    fn test_config_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api-catalog.toml");
        fs::write(
            &path,
            "input = \"docs/APIS.md\"\noutput = \"out.json\"\nreport_format = \"text\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        let settings = Settings::from_config(config);
        assert_eq!(settings.input, PathBuf::from("docs/APIS.md"));
        assert_eq!(settings.report_format, ReportFormat::Text);

        let settings = settings.with_overrides(None, Some(PathBuf::from("cli.json")), None, None);
        assert_eq!(settings.input, PathBuf::from("docs/APIS.md"));
        assert_eq!(settings.output, PathBuf::from("cli.json"));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "inptu = \"typo.md\"\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(load_config(&path), Err(ConfigError::Io { .. })));
    }
}
