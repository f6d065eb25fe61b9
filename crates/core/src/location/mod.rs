//! Device location, normalized across platforms.
//!
//! [`LocationProvider`] owns the single active watch and a best-effort
//! "has permission" flag. The flag is advisory; callers decide UI from
//! [`LocationProvider::check_permission_status`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::LocationConfig;
use crate::model::{Location, PermissionStatus};

pub mod android;
pub mod ios;
pub mod platform;

pub use android::AndroidGeolocation;
pub use ios::IosGeolocation;
pub use platform::{
    AndroidHost, AndroidPermissionResult, Geolocation, HostError, IosAuthorization, IosHost,
    Platform, PositionError, PositionErrorCode, PositionHost, PositionOptions, PositionSink,
    WatchId, WatchOptions,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable")]
    Unavailable,

    #[error("Location request timed out")]
    TimedOut,

    #[error("Location error: {0}")]
    Other(String),
}

impl From<PositionError> for LocationError {
    fn from(error: PositionError) -> Self {
        match error.code {
            PositionErrorCode::PermissionDenied => LocationError::PermissionDenied,
            PositionErrorCode::PositionUnavailable => LocationError::Unavailable,
            PositionErrorCode::Timeout => LocationError::TimedOut,
            PositionErrorCode::Other(_) => LocationError::Other(error.message),
        }
    }
}

pub struct LocationProvider {
    geolocation: Arc<dyn Geolocation>,
    settings: LocationConfig,
    has_permission: Arc<AtomicBool>,
    watch: Mutex<Option<WatchId>>,
}

impl LocationProvider {
    pub fn new(geolocation: Arc<dyn Geolocation>, settings: LocationConfig) -> Self {
        Self {
            geolocation,
            settings,
            has_permission: Arc::new(AtomicBool::new(false)),
            watch: Mutex::new(None),
        }
    }

    pub fn android(host: Arc<dyn AndroidHost>, settings: LocationConfig) -> Self {
        Self::new(Arc::new(AndroidGeolocation::new(host)), settings)
    }

    pub fn ios(host: Arc<dyn IosHost>, settings: LocationConfig) -> Self {
        let probe = probe_options(&settings);
        Self::new(Arc::new(IosGeolocation::new(host, probe)), settings)
    }

    pub fn platform(&self) -> Platform {
        self.geolocation.platform()
    }

    /// Shows the platform prompt. Never fails: a broken bridge reads as a
    /// denial the user can retry.
    pub async fn request_permission(&self) -> PermissionStatus {
        let status = match self.geolocation.request_permission().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "permission request failed");
                PermissionStatus::denied(true)
            }
        };
        info!(platform = ?self.platform(), state = ?status.state(), "permission requested");
        self.has_permission.store(status.is_granted(), Ordering::Relaxed);
        status
    }

    /// Non-prompting status check.
    pub async fn check_permission_status(&self) -> PermissionStatus {
        let status = match self.geolocation.check_permission().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "permission check failed");
                PermissionStatus::denied(true)
            }
        };
        debug!(platform = ?self.platform(), state = ?status.state(), "permission checked");
        self.has_permission.store(status.is_granted(), Ordering::Relaxed);
        status
    }

    pub fn clear_permission_cache(&self) {
        self.has_permission.store(false, Ordering::Relaxed);
    }

    pub fn has_permission(&self) -> bool {
        self.has_permission.load(Ordering::Relaxed)
    }

    pub async fn get_current_location(&self) -> Result<Location, LocationError> {
        let options = PositionOptions {
            high_accuracy: true,
            timeout: Duration::from_millis(self.settings.position_timeout_ms),
            maximum_age: Duration::from_millis(self.settings.maximum_age_ms),
        };

        match self.geolocation.current_position(options).await {
            Ok(location) => {
                self.has_permission.store(true, Ordering::Relaxed);
                Ok(location)
            }
            Err(error) => {
                warn!(%error, "current position failed");
                Err(error.into())
            }
        }
    }

    /// Replaces any running watch. Errors are reported without stopping the
    /// watch; the platform keeps trying.
    pub fn start_watching<U, E>(&self, on_update: U, on_error: E)
    where
        U: Fn(Location) + Send + Sync + 'static,
        E: Fn(LocationError) + Send + Sync + 'static,
    {
        let mut watch = self.watch.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = watch.take() {
            debug!(watch = previous.0, "replacing active watch");
            self.geolocation.clear_watch(previous);
        }

        let options = WatchOptions {
            high_accuracy: true,
            distance_filter_m: self.settings.distance_filter_m,
            interval: Duration::from_millis(self.settings.watch_interval_ms),
            fastest_interval: Duration::from_millis(self.settings.fastest_interval_ms),
        };
        let sink = Arc::new(CallbackSink {
            on_update,
            on_error,
            has_permission: Arc::clone(&self.has_permission),
        });

        let id = self.geolocation.watch_position(options, sink);
        info!(watch = id.0, "location watch started");
        *watch = Some(id);
    }

    pub fn stop_watching(&self) {
        let mut watch = self.watch.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = watch.take() {
            self.geolocation.clear_watch(id);
            info!(watch = id.0, "location watch stopped");
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn default_location(&self) -> Location {
        self.settings.default_location()
    }

    /// Best-effort: a quick low-accuracy fix either arrives or it doesn't.
    pub async fn check_gps_availability(&self) -> bool {
        match self
            .geolocation
            .current_position(probe_options(&self.settings))
            .await
        {
            Ok(_) => true,
            Err(error) => {
                debug!(%error, "gps availability probe failed");
                false
            }
        }
    }
}

impl Drop for LocationProvider {
    fn drop(&mut self) {
        self.stop_watching();
    }
}

fn probe_options(settings: &LocationConfig) -> PositionOptions {
    PositionOptions {
        high_accuracy: false,
        timeout: Duration::from_millis(settings.probe_timeout_ms),
        maximum_age: Duration::from_millis(settings.maximum_age_ms),
    }
}

struct CallbackSink<U, E> {
    on_update: U,
    on_error: E,
    has_permission: Arc<AtomicBool>,
}

impl<U, E> PositionSink for CallbackSink<U, E>
where
    U: Fn(Location) + Send + Sync,
    E: Fn(LocationError) + Send + Sync,
{
    fn on_position(&self, location: Location) {
        self.has_permission.store(true, Ordering::Relaxed);
        (self.on_update)(location);
    }

    fn on_error(&self, error: PositionError) {
        warn!(%error, "location watch error");
        (self.on_error)(error.into());
    }
}
