//! The capability contract every platform backend fulfils, and the raw
//! device surfaces the host app exposes to reach the OS location APIs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::model::{Location, PermissionStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Ios,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// How old a cached fix may be and still be returned
    pub maximum_age: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Minimum movement in meters before an update is delivered
    pub distance_filter_m: f64,
    pub interval: Duration,
    pub fastest_interval: Duration,
}

/// W3C-style geolocation error codes as the platforms report them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PositionErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other(i32),
}

impl PositionErrorCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::PermissionDenied => 1,
            Self::PositionUnavailable => 2,
            Self::Timeout => 3,
            Self::Other(code) => *code,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionError {
    pub code: PositionErrorCode,
    pub message: String,
}

impl PositionError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: PositionErrorCode::from_code(code),
            message: message.into(),
        }
    }
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code.code())
    }
}

impl std::error::Error for PositionError {}

/// A failure inside the host bridge itself, not a location error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

/// Receives continuous position updates for one watch.
pub trait PositionSink: Send + Sync {
    fn on_position(&self, location: Location);
    fn on_error(&self, error: PositionError);
}

/// Position operations available on both platforms.
#[async_trait]
pub trait PositionHost: Send + Sync {
    async fn current_position(&self, options: PositionOptions) -> Result<Location, PositionError>;
    fn watch_position(&self, options: WatchOptions, sink: Arc<dyn PositionSink>) -> WatchId;
    fn clear_watch(&self, id: WatchId);
}

/// Raw outcome of the Android runtime permission prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AndroidPermissionResult {
    Granted,
    Denied,
    NeverAskAgain,
}

#[async_trait]
pub trait AndroidHost: PositionHost {
    async fn request_fine_location(&self) -> Result<AndroidPermissionResult, HostError>;
    /// Non-prompting check
    async fn has_fine_location(&self) -> Result<bool, HostError>;
}

/// Raw outcome of the iOS authorization request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IosAuthorization {
    Granted,
    Denied,
    /// Location services switched off device-wide
    Disabled,
    Restricted,
}

#[async_trait]
pub trait IosHost: PositionHost {
    async fn request_authorization(&self) -> Result<IosAuthorization, HostError>;
}

/// The location capability the rest of the core is written against.
#[async_trait]
pub trait Geolocation: Send + Sync {
    fn platform(&self) -> Platform;

    /// Prompts the user if the platform allows it.
    async fn request_permission(&self) -> Result<PermissionStatus, HostError>;

    /// Never prompts.
    async fn check_permission(&self) -> Result<PermissionStatus, HostError>;

    async fn current_position(&self, options: PositionOptions) -> Result<Location, PositionError>;
    fn watch_position(&self, options: WatchOptions, sink: Arc<dyn PositionSink>) -> WatchId;
    fn clear_watch(&self, id: WatchId);
}
