//! Track data source: the catalogue of recorded tracks and single track paths.

mod coordinate;
mod errors;

pub use coordinate::Coordinate;
pub use errors::{TrackError, TrackResult};

use crate::config::TracksConfig;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A recorded track
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: Option<String>,
    pub path: Vec<Coordinate>,
}

/// Lat/lng bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
            None,
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TrackPayload {
    Path(Vec<Coordinate>),
    Document {
        #[serde(default)]
        name: Option<String>,
        #[serde(alias = "coordinates")]
        path: Vec<Coordinate>,
    },
}

impl Track {
    /// Decode a track payload: a bare coordinate array or an object with a
    /// `path`/`coordinates` array
    pub fn from_json(id: &str, json: &str) -> TrackResult<Self> {
        let payload: TrackPayload = serde_json::from_str(json).map_err(|e| {
            TrackError::UnexpectedPayload(format!("track '{}' is not a coordinate list: {}", id, e))
        })?;

        let (name, path) = match payload {
            TrackPayload::Path(path) => (None, path),
            TrackPayload::Document { name, path } => (name, path),
        };

        Ok(Self {
            id: id.to_string(),
            name,
            path,
        })
    }

    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Total path length in kilometres
    pub fn distance_km(&self) -> f64 {
        self.path
            .windows(2)
            .map(|pair| pair[0].distance_km(&pair[1]))
            .fold(0.0, |total, d| total + d)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.path.first()?;
        let initial = Bounds {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };

        Some(self.path.iter().fold(initial, |b, c| Bounds {
            south: b.south.min(c.lat),
            west: b.west.min(c.lng),
            north: b.north.max(c.lat),
            east: b.east.max(c.lng),
        }))
    }

    /// `(distance km, elevation m)` for every point that carries an elevation
    pub fn profile(&self) -> Vec<(f64, f64)> {
        let mut distance = 0.0;
        let mut previous: Option<&Coordinate> = None;
        let mut profile = Vec::new();

        for point in &self.path {
            if let Some(prev) = previous {
                distance += prev.distance_km(point);
            }
            if let Some(elevation) = point.elevation {
                profile.push((distance, elevation));
            }
            previous = Some(point);
        }

        profile
    }

    /// Lowest and highest elevation
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.path
            .iter()
            .filter_map(|c| c.elevation)
            .fold(None, |range, e| match range {
                None => Some((e, e)),
                Some((low, high)) => Some((low.min(e), high.max(e))),
            })
    }
}

/// Where tracks come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    /// `GET endpoint + id`
    Http { endpoint: String },
    /// `index.json` catalogue next to `<id>.json` tracks
    Directory { root: PathBuf },
}

impl TrackSource {
    pub fn parse(endpoint: &str) -> TrackResult<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(TrackError::InvalidEndpoint(endpoint.to_string()));
        }

        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(Self::Http {
                endpoint: endpoint.to_string(),
            });
        }

        let root = endpoint.strip_prefix("file://").unwrap_or(endpoint);
        if root.is_empty() {
            return Err(TrackError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self::Directory {
            root: PathBuf::from(root),
        })
    }
}

/// Loads the catalogue and single tracks
#[derive(Debug, Clone)]
pub struct TrackService {
    source: TrackSource,
    client: reqwest::Client,
}

impl TrackService {
    pub fn new(config: &TracksConfig) -> TrackResult<Self> {
        Ok(Self::with_source(TrackSource::parse(&config.endpoint)?))
    }

    pub fn with_source(source: TrackSource) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
        }
    }

    /// Load every catalogue record
    pub async fn load_catalogue(&self) -> TrackResult<Vec<Value>> {
        let body = self.fetch("").await?;
        let catalogue: Value = serde_json::from_str(&body)?;
        match catalogue {
            Value::Array(items) => {
                info!(count = items.len(), "catalogue loaded");
                Ok(items)
            }
            other => Err(TrackError::UnexpectedPayload(format!(
                "catalogue must be a JSON array, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Load the path of a single track
    pub async fn load_track(&self, id: &str) -> TrackResult<Track> {
        if id.is_empty() {
            return Err(TrackError::InvalidId(id.to_string()));
        }
        let body = self.fetch(id).await?;
        let track = Track::from_json(id, &body)?;
        info!(id, points = track.path.len(), "track loaded");
        Ok(track)
    }

    async fn fetch(&self, id: &str) -> TrackResult<String> {
        match &self.source {
            TrackSource::Http { endpoint } => {
                let url = format!("{}{}", endpoint, id);
                debug!(%url, "fetching");
                let response = self.client.get(&url).send().await?;
                let status = response.status();
                if status != reqwest::StatusCode::OK {
                    return Err(TrackError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }
                Ok(response.text().await?)
            }
            TrackSource::Directory { root } => {
                let path = document_path(root, id)?;
                debug!(path = %path.display(), "reading");
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| TrackError::Io { path, source })
            }
        }
    }
}

fn document_path(root: &Path, id: &str) -> TrackResult<PathBuf> {
    if id.is_empty() {
        return Ok(root.join("index.json"));
    }
    if id == "." || id.contains(['/', '\\']) || id.contains("..") {
        return Err(TrackError::InvalidId(id.to_string()));
    }
    Ok(root.join(format!("{}.json", id)))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_track_payload_forms() {
        let bare = Track::from_json("a", "[[13.0, 52.0, 30], [13.1, 52.1, 35]]").unwrap();
        assert_eq!(bare.path.len(), 2);
        assert_eq!(bare.title(), "a");

        let document = Track::from_json(
            "b",
            r#"{"name": "Lakes", "coordinates": [{"lat": 1, "lng": 2}]}"#,
        )
        .unwrap();
        assert_eq!(document.title(), "Lakes");
        assert_eq!(document.path, vec![Coordinate::new(1.0, 2.0, None)]);

        assert!(matches!(
            Track::from_json("c", r#"{"name": "no path"}"#),
            Err(TrackError::UnexpectedPayload(_))
        ));
    }

    #[test]
    fn test_profile_and_bounds() {
        let track = Track {
            id: "t".to_string(),
            name: None,
            path: vec![
                Coordinate::new(0.0, 0.0, Some(100.0)),
                Coordinate::new(1.0, 0.0, None),
                Coordinate::new(2.0, 1.0, Some(50.0)),
            ],
        };

        let profile = track.profile();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0], (0.0, 100.0));
        assert!((profile[1].0 - track.distance_km()).abs() < 1e-9);
        assert_eq!(track.elevation_range(), Some((50.0, 100.0)));

        let bounds = track.bounds().unwrap();
        assert_eq!((bounds.south, bounds.north), (0.0, 2.0));
        assert_eq!((bounds.west, bounds.east), (0.0, 1.0));
        assert_eq!(bounds.center(), Coordinate::new(1.0, 0.5, None));

        let empty = Track {
            id: "e".to_string(),
            name: None,
            path: Vec::new(),
        };
        assert!(empty.bounds().is_none());
        assert!(empty.profile().is_empty());
        assert_eq!(empty.distance_km(), 0.0);
    }

    #[test]
    fn test_distance_of_short_tracks_is_positive_zero() {
        let single = Track {
            id: "s".to_string(),
            name: None,
            path: vec![Coordinate::new(52.0, 13.0, Some(40.0))],
        };
        assert!(single.distance_km().is_sign_positive());
        assert_eq!(format!("{:.1}", single.distance_km()), "0.0");

        let empty = Track {
            id: "e".to_string(),
            name: None,
            path: Vec::new(),
        };
        assert_eq!(format!("{:.2}", empty.distance_km()), "0.00");
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!(
            TrackSource::parse("http://localhost/api/tracks/").unwrap(),
            TrackSource::Http {
                endpoint: "http://localhost/api/tracks/".to_string()
            }
        );
        assert_eq!(
            TrackSource::parse("file:///srv/tracks").unwrap(),
            TrackSource::Directory {
                root: PathBuf::from("/srv/tracks")
            }
        );
        assert!(TrackSource::parse("  ").is_err());
        assert!(TrackSource::parse("file://").is_err());
    }

    #[test]
    fn test_document_path_rejects_traversal() {
        let root = Path::new("/data");
        assert_eq!(document_path(root, "").unwrap(), root.join("index.json"));
        assert_eq!(document_path(root, "42").unwrap(), root.join("42.json"));
        assert!(document_path(root, "../etc/passwd").is_err());
        assert!(document_path(root, "a/b").is_err());
    }

    #[tokio::test]
    async fn test_directory_source() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.json"),
            r#"[{"id": "1", "name": "Morning"}, {"id": "2", "name": "Evening"}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("1.json"), "[[13.0, 52.0, 30], [13.1, 52.1, 35]]").unwrap();

        let service = TrackService::with_source(TrackSource::Directory {
            root: dir.path().to_path_buf(),
        });

        let catalogue = service.load_catalogue().await.unwrap();
        assert_eq!(catalogue.len(), 2);

        let track = service.load_track("1").await.unwrap();
        assert_eq!(track.path.len(), 2);

        assert!(matches!(
            service.load_track("2").await,
            Err(TrackError::Io { .. })
        ));
        assert!(matches!(
            service.load_track("").await,
            Err(TrackError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_catalogue_must_be_array() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("index.json"), r#"{"tracks": []}"#).unwrap();

        let service = TrackService::with_source(TrackSource::Directory {
            root: dir.path().to_path_buf(),
        });
        assert!(matches!(
            service.load_catalogue().await,
            Err(TrackError::UnexpectedPayload(_))
        ));
    }
}
