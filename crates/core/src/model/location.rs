use chrono::{DateTime, Utc};
use geo::{HaversineDistance, Point};

/// Visible map span around a location, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportDelta {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// A position fix, or the fixed fallback coordinate.
///
/// Locations are replaced wholesale on every update and never mutated in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub viewport: Option<ViewportDelta>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            timestamp: None,
            viewport: None,
        }
    }

    pub fn with_accuracy(self, accuracy: f64) -> Self {
        Self {
            accuracy: Some(accuracy),
            ..self
        }
    }

    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..self
        }
    }

    pub fn with_viewport(self, viewport: ViewportDelta) -> Self {
        Self {
            viewport: Some(viewport),
            ..self
        }
    }

    /// geo points are (x = longitude, y = latitude)
    pub fn to_point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: &Location) -> f64 {
        self.to_point().haversine_distance(&other.to_point())
    }
}

/// Which source is authoritative for the current location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocationMode {
    Live,
    Default,
}
