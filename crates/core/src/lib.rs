//! # nearby-core
//!
//! Platform-neutral core of the nearby places app: the location permission
//! flow, live versus default location, and fetching places around whichever
//! location is authoritative.
//!
//! The host app supplies the OS location surfaces through the traits in
//! [`location::platform`]; everything else is plain async Rust.

pub mod config;
pub mod location;
pub mod model;
pub mod places;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::NearbyConfig;
pub use location::{LocationError, LocationProvider};
pub use places::{PlacesApi, PlacesClient, PlacesError};
pub use store::{PlacesStore, SessionPhase, SessionState, StoreError};
