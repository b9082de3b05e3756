use crate::error::AnalysisError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "analysis_config.json";

/// Where to read the dataset from and where to put the outputs.
///
/// Every field has a default, so a partial JSON file only overrides what it
/// names and a missing file means "all defaults".
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub reports_dir: PathBuf,
    pub charts_dir: PathBuf,
    /// First year counted as "recent" when measuring tourism growth.
    pub growth_split_year: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("real_estate_tourism_merged.csv"),
            reports_dir: PathBuf::from("reports"),
            charts_dir: PathBuf::from("charts"),
            growth_split_year: 2022,
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, AnalysisError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| AnalysisError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path().join("nope.json")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"input_path": "data/merged.csv", "growth_split_year": 2021}"#).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.input_path, PathBuf::from("data/merged.csv"));
        assert_eq!(cfg.growth_split_year, 2021);
        assert_eq!(cfg.charts_dir, PathBuf::from("charts"));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(&path), Err(AnalysisError::Config { .. })));
    }
}
