//! Value types shared by every layer of the core.

pub mod category;
pub mod identifiers;
pub mod location;
pub mod permission;
pub mod place;

pub use category::{Category, CategoryFilter};
pub use identifiers::PlaceId;
pub use location::{Location, LocationMode, ViewportDelta};
pub use permission::{PermissionState, PermissionStatus};
pub use place::{HealthStatus, Place, Review};
