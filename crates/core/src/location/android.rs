use std::sync::Arc;

use async_trait::async_trait;

use crate::location::platform::{
    AndroidHost, AndroidPermissionResult, Geolocation, HostError, Platform, PositionError,
    PositionOptions, PositionSink, WatchId, WatchOptions,
};
use crate::model::{Location, PermissionStatus};

/// Android exposes a direct, non-prompting permission query.
pub struct AndroidGeolocation {
    host: Arc<dyn AndroidHost>,
}

impl AndroidGeolocation {
    pub fn new(host: Arc<dyn AndroidHost>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl Geolocation for AndroidGeolocation {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    async fn request_permission(&self) -> Result<PermissionStatus, HostError> {
        Ok(match self.host.request_fine_location().await? {
            AndroidPermissionResult::Granted => PermissionStatus::granted(),
            AndroidPermissionResult::Denied => PermissionStatus::denied(true),
            AndroidPermissionResult::NeverAskAgain => PermissionStatus::never_ask_again(),
        })
    }

    async fn check_permission(&self) -> Result<PermissionStatus, HostError> {
        // the check cannot tell "denied" from "never ask again" without prompting
        Ok(if self.host.has_fine_location().await? {
            PermissionStatus::granted()
        } else {
            PermissionStatus::denied(true)
        })
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
