//! Foreign-implemented location surfaces.
//!
//! Kotlin implements [`AndroidLocationHost`] and Swift implements
//! [`IosLocationHost`]; the bridges adapt them to the core host traits.

use std::sync::Arc;

use nearby_core::location::{
    AndroidHost, AndroidPermissionResult, HostError, IosAuthorization, IosHost, PositionError,
    PositionHost, PositionOptions, PositionSink, WatchId, WatchOptions,
};
use nearby_core::model::Location;

use crate::state::records::{LocationRecord, PositionRequest, WatchRequest};

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum LocationHostError {
    #[error("{reason}")]
    Failed { reason: String },

    #[error("unexpected callback failure: {reason}")]
    Unexpected { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for LocationHostError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        LocationHostError::Unexpected { reason: e.reason }
    }
}

impl From<LocationHostError> for HostError {
    fn from(e: LocationHostError) -> Self {
        HostError(e.to_string())
    }
}

/// A failed position lookup, using the W3C geolocation codes
/// (1 denied, 2 unavailable, 3 timeout).
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PositionFailure {
    #[error("{message} (code {code})")]
    Position { code: i32, message: String },

    #[error("unexpected callback failure: {reason}")]
    Unexpected { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for PositionFailure {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        PositionFailure::Unexpected { reason: e.reason }
    }
}

impl From<PositionFailure> for PositionError {
    fn from(failure: PositionFailure) -> Self {
        match failure {
            PositionFailure::Position { code, message } => PositionError::new(code, message),
            PositionFailure::Unexpected { reason } => PositionError::new(2, reason),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum AndroidPermissionOutcome {
    Granted,
    Denied,
    /// The user ticked "don't ask again", or the system suppressed the dialog
    NeverAskAgain,
}

impl From<AndroidPermissionOutcome> for AndroidPermissionResult {
    fn from(outcome: AndroidPermissionOutcome) -> Self {
        match outcome {
            AndroidPermissionOutcome::Granted => AndroidPermissionResult::Granted,
            AndroidPermissionOutcome::Denied => AndroidPermissionResult::Denied,
            AndroidPermissionOutcome::NeverAskAgain => AndroidPermissionResult::NeverAskAgain,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum IosAuthorizationOutcome {
    Granted,
    Denied,
    ServicesDisabled,
    Restricted,
}

impl From<IosAuthorizationOutcome> for IosAuthorization {
    fn from(outcome: IosAuthorizationOutcome) -> Self {
        match outcome {
            IosAuthorizationOutcome::Granted => IosAuthorization::Granted,
            IosAuthorizationOutcome::Denied => IosAuthorization::Denied,
            IosAuthorizationOutcome::ServicesDisabled => IosAuthorization::Disabled,
            IosAuthorizationOutcome::Restricted => IosAuthorization::Restricted,
        }
    }
}

/// Handed to the host for each watch; the host calls it from any thread.
#[derive(uniffi::Object)]
pub struct PositionListener {
    sink: Arc<dyn PositionSink>,
}

#[uniffi::export]
impl PositionListener {
    pub fn on_position(&self, location: LocationRecord) {
        self.sink.on_position(location.into());
    }

    pub fn on_error(&self, code: i32, message: String) {
        self.sink.on_error(PositionError::new(code, message));
    }
}

#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait AndroidLocationHost: Send + Sync {
    /// Shows the ACCESS_FINE_LOCATION dialog.
    async fn request_fine_location(&self) -> Result<AndroidPermissionOutcome, LocationHostError>;
    async fn has_fine_location(&self) -> Result<bool, LocationHostError>;
    async fn current_position(
        &self,
        request: PositionRequest,
    ) -> Result<LocationRecord, PositionFailure>;
    /// Returns a host-chosen id for [`AndroidLocationHost::clear_watch`].
    fn watch_position(&self, request: WatchRequest, listener: Arc<PositionListener>) -> u64;
    fn clear_watch(&self, watch_id: u64);
}

#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait IosLocationHost: Send + Sync {
    /// requestWhenInUseAuthorization and wait for the delegate callback.
    async fn request_authorization(&self) -> Result<IosAuthorizationOutcome, LocationHostError>;
    async fn current_position(
        &self,
        request: PositionRequest,
    ) -> Result<LocationRecord, PositionFailure>;
    fn watch_position(&self, request: WatchRequest, listener: Arc<PositionListener>) -> u64;
    fn clear_watch(&self, watch_id: u64);
}

fn listener(sink: Arc<dyn PositionSink>) -> Arc<PositionListener> {
    Arc::new(PositionListener { sink })
}

pub(crate) struct AndroidBridge {
    host: Arc<dyn AndroidLocationHost>,
}

impl AndroidBridge {
    pub(crate) fn new(host: Arc<dyn AndroidLocationHost>) -> Self {
        Self { host }
    }
}

#[async_trait::async_trait]
impl PositionHost for AndroidBridge {
    async fn current_position(&self, options: PositionOptions) -> Result<Location, PositionError> {
        let record = self.host.current_position(options.into()).await?;
        Ok(record.into())
    }

    fn watch_position(&self, options: WatchOptions, sink: Arc<dyn PositionSink>) -> WatchId {
        WatchId(self.host.watch_position(options.into(), listener(sink)))
    }

    fn clear_watch(&self, id: WatchId) {
        self.host.clear_watch(id.0);
    }
}

#[async_trait::async_trait]
impl AndroidHost for AndroidBridge {
    async fn request_fine_location(&self) -> Result<AndroidPermissionResult, HostError> {
        Ok(self.host.request_fine_location().await?.into())
    }

    async fn has_fine_location(&self) -> Result<bool, HostError> {
        Ok(self.host.has_fine_location().await?)
    }
}

pub(crate) struct IosBridge {
    host: Arc<dyn IosLocationHost>,
}

impl IosBridge {
    pub(crate) fn new(host: Arc<dyn IosLocationHost>) -> Self {
        Self { host }
    }
}

#[async_trait::async_trait]
impl PositionHost for IosBridge {
    async fn current_position(&self, options: PositionOptions) -> Result<Location, PositionError> {
        let record = self.host.current_position(options.into()).await?;
        Ok(record.into())
    }

    fn watch_position(&self, options: WatchOptions, sink: Arc<dyn PositionSink>) -> WatchId {
        WatchId(self.host.watch_position(options.into(), listener(sink)))
    }

    fn clear_watch(&self, id: WatchId) {
        self.host.clear_watch(id.0);
    }
}

#[async_trait::async_trait]
impl IosHost for IosBridge {
    async fn request_authorization(&self) -> Result<IosAuthorization, HostError> {
        Ok(self.host.request_authorization().await?.into())
    }
}
