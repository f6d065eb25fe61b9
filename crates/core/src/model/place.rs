use crate::model::{Location, PlaceId};

/// A point of interest, immutable once built from a server response.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub address: String,
    pub location: Location,
    pub rating: Option<f32>,
    /// Category tags; the nearby endpoint reports exactly one
    pub types: Vec<String>,
    pub photos: Vec<String>,
    /// Meters from the query origin
    pub distance_m: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub price_level: Option<u8>,
    /// Human-readable weekly schedule, Monday first
    pub opening_hours: Option<Vec<String>>,
    pub reviews: Vec<Review>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Review {
    pub author: String,
    pub rating: Option<f32>,
    pub text: String,
    pub relative_time: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub status: String,
    pub version: Option<String>,
}
