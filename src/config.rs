use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::schema;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gnv-panel.json";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "GNV_PANEL_CONFIG";
/// Overrides `data_path`.
pub const DATA_ENV: &str = "GNV_PANEL_DATA";
/// Survey workbook read when nothing else is configured.
pub const DEFAULT_DATA_FILE: &str = "DATASET VALORES.xlsx";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Everything the dashboard reads from `gnv-panel.json`. Every field is optional.
///
/// ```json
/// {
///   "data_path": "DATASET VALORES.xlsx",
///   "filter_columns": ["Zona", "Perfil_Adopción"],
///   "market_units": 18500,
///   "market_daily_liters": 740000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Survey file; the CSV sibling is used when it cannot be read.
    pub data_path: PathBuf,
    /// Columns offered as multi-select filters, in sidebar order.
    pub filter_columns: Vec<String>,
    /// Market-sizing context: estimated units in circulation.
    pub market_units: u64,
    /// Market-sizing context: estimated daily fuel demand of that fleet (liters).
    pub market_daily_liters: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            filter_columns: schema::DEFAULT_FILTER_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            market_units: 18_500,
            market_daily_liters: 740_000.0,
        }
    }
}

impl DashboardConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config from the environment: `$GNV_PANEL_CONFIG` or
    /// `gnv-panel.json` when present, defaults otherwise, then `$GNV_PANEL_DATA`.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let data_override = std::env::var_os(DATA_ENV).map(PathBuf::from);
        Self::resolve(explicit.as_deref(), Path::new(DEFAULT_CONFIG_FILE), data_override)
    }

    fn resolve(
        explicit: Option<&Path>,
        fallback: &Path,
        data_override: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if fallback.is_file() => Self::from_file(fallback)?,
            None => {
                log::debug!("No {} found, using defaults", fallback.display());
                Self::default()
            }
        };
        if let Some(path) = data_override {
            config.data_path = path;
        }
        if config.filter_columns.is_empty() {
            config.filter_columns = Self::default().filter_columns;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("gnv-panel.json");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(json.as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::resolve(None, &dir.path().join("nope.json"), None).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.filter_columns.len(), 5);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"market_units": 42, "filter_columns": []}"#);

        let config = DashboardConfig::resolve(None, &path, None).unwrap();
        assert_eq!(config.market_units, 42);
        assert_eq!(config.data_path, PathBuf::from("DATASET VALORES.xlsx"));
        assert_eq!(config.filter_columns, DashboardConfig::default().filter_columns);
    }

    #[test]
    fn data_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"data_path": "a.csv"}"#);

        let config =
            DashboardConfig::resolve(Some(&path), Path::new("unused"), Some("b.parquet".into()))
                .unwrap();
        assert_eq!(config.data_path, PathBuf::from("b.parquet"));
    }

    #[test]
    fn malformed_or_unknown_fields_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"market_unit": 1}"#);
        assert!(DashboardConfig::resolve(Some(&path), Path::new("unused"), None).is_err());

        let path = write_config(dir.path(), "{ not json");
        assert!(DashboardConfig::resolve(None, &path, None).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(DashboardConfig::resolve(Some(&missing), Path::new("unused"), None).is_err());
    }
}
