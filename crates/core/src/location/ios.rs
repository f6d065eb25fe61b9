use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::location::platform::{
    Geolocation, HostError, IosAuthorization, IosHost, Platform, PositionError,
    PositionErrorCode, PositionOptions, PositionSink, WatchId, WatchOptions,
};
use crate::model::{Location, PermissionStatus};

/// iOS has no query-without-prompting call reachable from the host bridge,
/// so the status check infers authorization from a short position probe.
/// That is a heuristic: a probe can fail for reasons unrelated to permission.
pub struct IosGeolocation {
    host: Arc<dyn IosHost>,
    probe: PositionOptions,
}

impl IosGeolocation {
    pub fn new(host: Arc<dyn IosHost>, probe: PositionOptions) -> Self {
        Self { host, probe }
    }
}

#[async_trait]
impl Geolocation for IosGeolocation {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    async fn request_permission(&self) -> Result<PermissionStatus, HostError> {
        Ok(match self.host.request_authorization().await? {
            IosAuthorization::Granted => PermissionStatus::granted(),
            IosAuthorization::Denied | IosAuthorization::Disabled => PermissionStatus::denied(true),
            IosAuthorization::Restricted => PermissionStatus::restricted(),
        })
    }

    async fn check_permission(&self) -> Result<PermissionStatus, HostError> {
        match self.host.current_position(self.probe).await {
            Ok(_) => Ok(PermissionStatus::granted()),
            Err(error) => {
                match error.code {
                    PositionErrorCode::PermissionDenied => debug!("probe: permission denied"),
                    PositionErrorCode::PositionUnavailable => {
                        debug!("probe: position unavailable, treating as denied")
                    }
                    _ => debug!(%error, "probe failed, treating as denied"),
                }
                Ok(PermissionStatus::denied(true))
            }
        }
    }

    async fn current_position(&self, options: PositionOptions) -> Result<Location, PositionError> {
        self.host.current_position(options).await
    }

    fn watch_position(&self, options: WatchOptions, sink: Arc<dyn PositionSink>) -> WatchId {
        self.host.watch_position(options, sink)
    }

    fn clear_watch(&self, id: WatchId) {
        self.host.clear_watch(id)
    }
}
