use chrono::DateTime;
use nearby_core::location::{PositionOptions, WatchOptions};
use nearby_core::model::{
    CategoryFilter, HealthStatus, Location, LocationMode, PermissionState, PermissionStatus,
    Place, Review, ViewportDelta,
};
use nearby_core::store::{SessionPhase, SessionState};

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: Option<i64>,
    pub latitude_delta: Option<f64>,
    pub longitude_delta: Option<f64>,
}

impl From<Location> for LocationRecord {
    fn from(location: Location) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy: location.accuracy,
            timestamp_ms: location.timestamp.map(|t| t.timestamp_millis()),
            latitude_delta: location.viewport.map(|v| v.latitude_delta),
            longitude_delta: location.viewport.map(|v| v.longitude_delta),
        }
    }
}

impl From<LocationRecord> for Location {
    fn from(record: LocationRecord) -> Self {
        let viewport = match (record.latitude_delta, record.longitude_delta) {
            (Some(latitude_delta), Some(longitude_delta)) => Some(ViewportDelta {
                latitude_delta,
                longitude_delta,
            }),
            _ => None,
        };

        Location {
            latitude: record.latitude,
            longitude: record.longitude,
            accuracy: record.accuracy,
            timestamp: record.timestamp_ms.and_then(DateTime::from_timestamp_millis),
            viewport,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum PermissionKind {
    Granted,
    Denied,
    Restricted,
    NeverAskAgain,
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct PermissionRecord {
    pub kind: PermissionKind,
    pub can_ask_again: bool,
}

impl From<PermissionStatus> for PermissionRecord {
    fn from(status: PermissionStatus) -> Self {
        let kind = match status.state() {
            PermissionState::Granted => PermissionKind::Granted,
            PermissionState::Denied => PermissionKind::Denied,
            PermissionState::Restricted => PermissionKind::Restricted,
            PermissionState::NeverAskAgain => PermissionKind::NeverAskAgain,
        };
        Self {
            kind,
            can_ask_again: status.can_ask_again(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum LocationModeChoice {
    Live,
    Default,
}

impl From<LocationModeChoice> for LocationMode {
    fn from(choice: LocationModeChoice) -> Self {
        match choice {
            LocationModeChoice::Live => LocationMode::Live,
            LocationModeChoice::Default => LocationMode::Default,
        }
    }
}

impl From<LocationMode> for LocationModeChoice {
    fn from(mode: LocationMode) -> Self {
        match mode {
            LocationMode::Live => LocationModeChoice::Live,
            LocationMode::Default => LocationModeChoice::Default,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum Phase {
    Uninitialized,
    AwaitingChoice,
    LiveActive,
    DefaultActive,
}

impl From<SessionPhase> for Phase {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Uninitialized => Phase::Uninitialized,
            SessionPhase::AwaitingChoice => Phase::AwaitingChoice,
            SessionPhase::LiveActive => Phase::LiveActive,
            SessionPhase::DefaultActive => Phase::DefaultActive,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct ReviewRecord {
    pub author: String,
    pub rating: Option<f32>,
    pub text: String,
    pub relative_time: Option<String>,
}

impl From<Review> for ReviewRecord {
    fn from(review: Review) -> Self {
        Self {
            author: review.author,
            rating: review.rating,
            text: review.text,
            relative_time: review.relative_time,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: LocationRecord,
    pub rating: Option<f32>,
    pub types: Vec<String>,
    pub photos: Vec<String>,
    pub distance_m: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub price_level: Option<u8>,
    pub opening_hours: Option<Vec<String>>,
    pub reviews: Vec<ReviewRecord>,
}

impl From<Place> for PlaceRecord {
    fn from(place: Place) -> Self {
        Self {
            id: place.id.to_string(),
            name: place.name,
            address: place.address,
            location: place.location.into(),
            rating: place.rating,
            types: place.types,
            photos: place.photos,
            distance_m: place.distance_m,
            phone: place.phone,
            website: place.website,
            price_level: place.price_level,
            opening_hours: place.opening_hours,
            reviews: place.reviews.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct HealthRecord {
    pub healthy: bool,
    pub status: String,
    pub version: Option<String>,
}

impl From<HealthStatus> for HealthRecord {
    fn from(health: HealthStatus) -> Self {
        Self {
            healthy: health.healthy,
            status: health.status,
            version: health.version,
        }
    }
}

/// Full session state as the UI renders it.
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub mode: Option<LocationModeChoice>,
    pub current_location: Option<LocationRecord>,
    pub permission: Option<PermissionRecord>,
    /// `None` means every category
    pub selected_category: Option<String>,
    pub search_radius_m: u32,
    pub nearby_places: Vec<PlaceRecord>,
    pub all_places: Vec<PlaceRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_location_watching: bool,
    pub can_offer_recovery: bool,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            phase: state.phase().into(),
            mode: state.location_mode().map(Into::into),
            current_location: state.current_location().map(Into::into),
            permission: state.permission.map(Into::into),
            selected_category: match state.category {
                CategoryFilter::All => None,
                CategoryFilter::Only(category) => Some(category.to_string()),
            },
            search_radius_m: state.search_radius_m,
            nearby_places: state.nearby_places.iter().cloned().map(Into::into).collect(),
            all_places: state.all_places.iter().cloned().map(Into::into).collect(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            is_location_watching: state.is_location_watching,
            can_offer_recovery: state.can_offer_recovery(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct PositionRequest {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
}

impl From<PositionOptions> for PositionRequest {
    fn from(options: PositionOptions) -> Self {
        Self {
            high_accuracy: options.high_accuracy,
            timeout_ms: options.timeout.as_millis() as u64,
            maximum_age_ms: options.maximum_age.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct WatchRequest {
    pub high_accuracy: bool,
    pub distance_filter_m: f64,
    pub interval_ms: u64,
    pub fastest_interval_ms: u64,
}

impl From<WatchOptions> for WatchRequest {
    fn from(options: WatchOptions) -> Self {
        Self {
            high_accuracy: options.high_accuracy,
            distance_filter_m: options.distance_filter_m,
            interval_ms: options.interval.as_millis() as u64,
            fastest_interval_ms: options.fastest_interval.as_millis() as u64,
        }
    }
}
