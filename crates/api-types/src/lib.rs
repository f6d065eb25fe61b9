//! # nearby-api-types
//!
//! Wire types for the nearby-places REST service.
//!
//! Field names follow the server's snake_case JSON exactly. Conversion into
//! the app's own `Place` shape lives in `nearby-core`; nothing here renames or
//! converts units.
//!
//! ## Endpoints
//!
//! - `GET /api/places/nearby?lat&lng&type&radius&limit` -> [`NearbyPlacesResponse`]
//! - `GET /api/places/{id}` -> [`PlaceDetailsResponse`]
//! - `GET /api/health` -> [`HealthResponse`]

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const NEARBY_PATH: &str = "/api/places/nearby";
pub const PLACES_PATH: &str = "/api/places";
pub const HEALTH_PATH: &str = "/api/health";

/// Server ids show up as strings on some deployments and integers on others.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(u64),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Text(s) => f.write_str(s),
            WireId::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NearbyPlacesResponse {
    #[serde(default)]
    pub places: Option<Vec<ApiPlace>>,
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default)]
    pub place: Option<ApiPlace>,
}

/// A place as the server reports it.
///
/// `distance` is in kilometers from the query origin.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiPlace {
    pub id: WireId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub hours: Option<ApiHours>,
    #[serde(default)]
    pub reviews: Option<Vec<ApiReview>>,
}

/// Opening hours keyed by lowercase weekday name (`"monday"` .. `"sunday"`).
pub type ApiHours = BTreeMap<String, Option<ApiDayHours>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiDayHours {
    Range { open: String, close: String },
    Text(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiReview {
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub relative_time_description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_response_with_missing_places() {
        let parsed: NearbyPlacesResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.places.is_none());
    }

    #[test]
    fn test_place_accepts_numeric_id_and_type_field() {
        let json = r#"{
            "id": 42,
            "name": "Blue Bottle",
            "latitude": 37.78,
            "longitude": -122.41,
            "type": "cafe",
            "distance": 1.25
        }"#;

        let place: ApiPlace = serde_json::from_str(json).unwrap();
        assert_eq!(place.id.to_string(), "42");
        assert_eq!(place.kind.as_deref(), Some("cafe"));
        assert_eq!(place.distance, Some(1.25));
        assert!(place.hours.is_none());
    }

    #[test]
    fn test_hours_accept_ranges_text_and_null() {
        let json = r#"{
            "monday": { "open": "09:00", "close": "17:00" },
            "tuesday": "24 hours",
            "sunday": null
        }"#;

        let hours: ApiHours = serde_json::from_str(json).unwrap();
        assert_eq!(
            hours.get("monday"),
            Some(&Some(ApiDayHours::Range {
                open: "09:00".into(),
                close: "17:00".into()
            }))
        );
        assert_eq!(
            hours.get("tuesday"),
            Some(&Some(ApiDayHours::Text("24 hours".into())))
        );
        assert_eq!(hours.get("sunday"), Some(&None));
    }
}
