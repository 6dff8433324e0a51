//! Application configuration loaded from TOML.
//!
//! Every field carries a default so a partial (or empty) file is valid. A
//! missing file is written out with defaults on first load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GEORAG_CONFIG";
/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "georag.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub search: SearchConfig,
    pub spatial: SpatialConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Vector store snapshot.
    pub store: String,
    pub cities: String,
    pub rivers: String,
    /// JSON array of text records for bulk ingest.
    pub records: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store: "embeddings_store.json".into(),
            cities: "data/cities.geojson".into(),
            rivers: "data/rivers.geojson".into(),
            records: "data/textual_info.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Candidates pulled from the index before exact distance refinement.
    pub nearest_candidates: usize,
    /// Tolerance used for point-in-polygon lookups, in coordinate units.
    pub point_buffer: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            nearest_candidates: 5,
            point_buffer: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Log file path; empty keeps logs on stderr only.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            file: String::new(),
        }
    }
}

/// Resolve which config file to use: explicit path, then `GEORAG_CONFIG`, then `georag.toml`.
pub fn resolve_config_path(path: Option<&Path>) -> PathBuf {
    if let Some(p) = path {
        return p.to_path_buf();
    }
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the config, writing a default one first if the file does not exist.
pub fn load_or_create_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = resolve_config_path(path);
    if !path.exists() {
        let cfg = AppConfig::default();
        write_config(&path, &cfg)?;
        tracing::info!(path = %path.display(), "wrote default config");
        return Ok(cfg);
    }
    load_config(&path)
}

/// Load the config at `path`; the file must exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: AppConfig =
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating config dir {}", parent.display()))?;
    }
    let body = toml::to_string_pretty(cfg).context("serializing default config")?;
    std::fs::write(path, body).with_context(|| format!("writing config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: AppConfig = toml::from_str("[search]\ntop_k = 8\n").unwrap();
        assert_eq!(cfg.search.top_k, 8);
        assert_eq!(cfg.spatial.nearest_candidates, 5);
        assert_eq!(cfg.paths.store, "embeddings_store.json");
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn missing_file_is_created_with_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("conf").join("georag.toml");
        let cfg = load_or_create_config(Some(&path))?;
        assert!(path.exists());
        assert_eq!(cfg.search.top_k, 5);

        let reloaded = load_config(&path)?;
        assert_eq!(reloaded.paths.cities, "data/cities.geojson");
        assert!((reloaded.spatial.point_buffer - 0.01).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn invalid_toml_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[search\ntop_k = ")?;
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
        Ok(())
    }

    #[test]
    fn log_format_parses_json() {
        let cfg: AppConfig = toml::from_str("[logging]\nformat = \"json\"\nlevel = \"debug\"").unwrap();
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, "debug");
    }
}
