//! Coordinates as delivered by the track endpoint.
//!
//! Endpoints disagree on the shape of a position, so every known form is
//! normalised on deserialization:
//! - `[lng, lat]` and `[lng, lat, elevation]` arrays
//! - `{ "lat": .., "lng": .. }`
//! - `{ "latitude": .., "longitude": .. }`
//!
//! Object forms accept an optional `elevation`, `ele` or `altitude`.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Position(Vec<f64>),
    LatLng {
        lat: f64,
        lng: f64,
        #[serde(default, alias = "ele", alias = "altitude")]
        elevation: Option<f64>,
    },
    Geographic {
        latitude: f64,
        longitude: f64,
        #[serde(default, alias = "ele", alias = "altitude")]
        elevation: Option<f64>,
    },
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = String;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        let coordinate = match raw {
            RawCoordinate::Position(position) => match position.as_slice() {
                [lng, lat] => Coordinate::new(*lat, *lng, None),
                [lng, lat, elevation] => Coordinate::new(*lat, *lng, Some(*elevation)),
                other => {
                    return Err(format!(
                        "position needs 2 or 3 values, got {}",
                        other.len()
                    ))
                }
            },
            RawCoordinate::LatLng {
                lat,
                lng,
                elevation,
            } => Coordinate::new(lat, lng, elevation),
            RawCoordinate::Geographic {
                latitude,
                longitude,
                elevation,
            } => Coordinate::new(latitude, longitude, elevation),
        };
        Ok(coordinate)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64, elevation: Option<f64>) -> Self {
        Self {
            lat,
            lng,
            elevation,
        }
    }

    /// Great-circle distance in kilometres (haversine)
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}
