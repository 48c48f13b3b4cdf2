use crate::tui::components::lists::TemplateBinder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Track data source
    pub tracks: TracksConfig,

    /// Initial map viewport
    pub map: MapConfig,

    /// Track list presentation
    pub list: ListConfig,

    /// Log file for interactive mode
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracksConfig {
    /// `http(s)://` endpoint or directory holding `index.json`
    pub endpoint: String,

    /// Catalogue field holding the track id
    pub id_field: String,
}

impl Default for TracksConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost/api/tracks/".to_string(),
            id_field: "id".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub start: MapStart,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStart {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

impl Default for MapStart {
    fn default() -> Self {
        Self {
            lat: 0.0,
            lng: -180.0,
            zoom: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// One template per rendered line, `{a.b}` placeholders
    pub template: Vec<String>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            template: vec!["{name}".to_string(), "{description}".to_string()],
        }
    }
}

impl ListConfig {
    pub fn binder(&self) -> Result<TemplateBinder> {
        TemplateBinder::parse(&self.template).context("invalid list template")
    }
}

impl Config {
    /// Initialize configuration from file and environment
    pub async fn init(explicit: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match explicit {
            Some(path) => Self::load(path).await?,
            None => Self::load_from_default_locations().await?.unwrap_or_default(),
        };

        config.load_from_env();
        Ok(config)
    }

    /// Configuration file candidates in priority order
    pub fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.trackview.json"),
            PathBuf::from("./trackview.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("trackview").join("trackview.json"));
        }

        paths
    }

    async fn load_from_default_locations() -> Result<Option<Self>> {
        for path in Self::default_locations() {
            if path.exists() {
                return Self::load(&path).await.map(Some);
            }
        }
        Ok(None)
    }

    /// Load configuration from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse configuration {}", path.display()))
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        if let Ok(endpoint) = std::env::var("TRACKVIEW_ENDPOINT") {
            self.tracks.endpoint = endpoint;
        }

        if let Ok(id_field) = std::env::var("TRACKVIEW_ID_FIELD") {
            self.tracks.id_field = id_field;
        }

        if let Ok(log_file) = std::env::var("TRACKVIEW_LOG_FILE") {
            self.log_file = Some(PathBuf::from(log_file));
        }
    }

    /// Log file used in interactive mode
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("trackview")
                .join("trackview.log")
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tracks.endpoint.trim().is_empty() {
            return Err(anyhow::anyhow!("tracks.endpoint is required"));
        }

        if self.tracks.id_field.trim().is_empty() {
            return Err(anyhow::anyhow!("tracks.id_field is required"));
        }

        let start = &self.map.start;
        if start.zoom > 22 {
            return Err(anyhow::anyhow!("map.start.zoom must be between 0 and 22"));
        }
        if !(-90.0..=90.0).contains(&start.lat) {
            return Err(anyhow::anyhow!("map.start.lat must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&start.lng) {
            return Err(anyhow::anyhow!("map.start.lng must be between -180 and 180"));
        }

        if self.list.template.is_empty() {
            return Err(anyhow::anyhow!("list.template needs at least one line"));
        }
        self.list.binder()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.tracks.endpoint, "http://localhost/api/tracks/");
        assert_eq!(config.tracks.id_field, "id");
        assert_eq!(config.map.start.zoom, 3);
        assert_eq!(config.list.template.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("trackview.json");
        std::fs::write(
            &path,
            r#"{ "tracks": { "endpoint": "/srv/tracks" }, "map": { "start": { "zoom": 8 } } }"#,
        )
        .unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.tracks.endpoint, "/srv/tracks");
        assert_eq!(config.tracks.id_field, "id");
        assert_eq!(config.map.start.zoom, 8);
        assert_eq!(config.map.start.lng, -180.0);
        assert_eq!(config.list, ListConfig::default());
    }

    #[tokio::test]
    async fn test_load_errors() {
        let temp_dir = tempdir().unwrap();
        assert!(Config::load(&temp_dir.path().join("missing.json")).await.is_err());

        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::init(Some(&path)).await.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.map.start.zoom = 30;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.map.start.lat = 91.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tracks.endpoint = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.list.template = vec!["{name".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.list.template.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_path_override() {
        let mut config = Config::default();
        config.log_file = Some(PathBuf::from("/tmp/tv.log"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/tv.log"));
    }
}
