//! Remote nearby-places service.
//!
//! [`PlacesApi`] is the seam the store talks to; [`PlacesClient`] is the HTTP
//! implementation.

use async_trait::async_trait;

use crate::model::{Category, HealthStatus, Location, Place, PlaceId};

pub mod client;
pub mod convert;

pub use client::{PlacesClient, RetryPolicy};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlacesError {
    #[error("Request timeout")]
    Timeout,

    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, PlacesError>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearbyQuery {
    pub origin: Location,
    pub category: Category,
    pub radius_m: u32,
}

#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Places of one category around `query.origin`, in server order.
    async fn nearby_places(&self, query: &NearbyQuery) -> Result<Vec<Place>>;

    /// `Ok(None)` when the server has no such place.
    async fn place_details(&self, id: &PlaceId) -> Result<Option<Place>>;

    async fn health(&self) -> Result<HealthStatus>;
}
