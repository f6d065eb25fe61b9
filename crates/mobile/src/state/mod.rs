use std::str::FromStr;
use std::sync::Arc;

use nearby_core::location::LocationProvider;
use nearby_core::model::{Category, CategoryFilter, PlaceId};
use nearby_core::{NearbyConfig, PlacesStore};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::host::{AndroidBridge, AndroidLocationHost, IosBridge, IosLocationHost};
use crate::state::records::{
    HealthRecord, LocationModeChoice, LocationRecord, PermissionRecord, PlaceRecord,
    SessionSnapshot,
};

pub mod records;

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum NearbyError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Api(String),

    #[error("unknown category: {0}")]
    InvalidCategory(String),
}

fn load_config(config_toml: Option<String>) -> Result<NearbyConfig, NearbyError> {
    match config_toml {
        Some(toml) => {
            NearbyConfig::from_toml_str(&toml).map_err(|e| NearbyError::Config(e.to_string()))
        }
        None => Ok(NearbyConfig::default()),
    }
}

fn parse_category(category: &str) -> Result<Category, NearbyError> {
    Category::from_str(category).map_err(|_| NearbyError::InvalidCategory(category.to_owned()))
}

/// Receives a fresh snapshot after every state change.
#[uniffi::export(with_foreign)]
pub trait StoreObserver: Send + Sync {
    fn on_state_changed(&self, snapshot: SessionSnapshot);
}

/// Keeps an observer attached; dropping it or calling `cancel` detaches.
#[derive(uniffi::Object)]
pub struct StoreSubscription {
    task: JoinHandle<()>,
}

#[uniffi::export]
impl StoreSubscription {
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(uniffi::Object)]
pub struct NearbyStore {
    inner: Arc<PlacesStore>,
}

impl NearbyStore {
    fn build(config: &NearbyConfig, location: LocationProvider) -> Result<Arc<Self>, NearbyError> {
        let inner =
            PlacesStore::from_config(config, location).map_err(|e| NearbyError::Api(e.to_string()))?;
        info!(base_url = %config.api.base_url, "nearby store ready");
        Ok(Arc::new(Self {
            inner: Arc::new(inner),
        }))
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl NearbyStore {
    /// `config_toml` overrides the compiled defaults; pass `None` to use them as is.
    #[uniffi::constructor]
    pub fn for_android(
        host: Arc<dyn AndroidLocationHost>,
        config_toml: Option<String>,
    ) -> Result<Arc<Self>, NearbyError> {
        let config = load_config(config_toml)?;
        let location =
            LocationProvider::android(Arc::new(AndroidBridge::new(host)), config.location.clone());
        Self::build(&config, location)
    }

    #[uniffi::constructor]
    pub fn for_ios(
        host: Arc<dyn IosLocationHost>,
        config_toml: Option<String>,
    ) -> Result<Arc<Self>, NearbyError> {
        let config = load_config(config_toml)?;
        let location =
            LocationProvider::ios(Arc::new(IosBridge::new(host)), config.location.clone());
        Self::build(&config, location)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&self.inner.snapshot())
    }

    /// Calls `observer` with the current state, then after every change.
    pub async fn observe(&self, observer: Arc<dyn StoreObserver>) -> Arc<StoreSubscription> {
        let mut receiver = self.inner.subscribe();
        let task = tokio::spawn(async move {
            loop {
                let snapshot = SessionSnapshot::from(&*receiver.borrow_and_update());
                observer.on_state_changed(snapshot);
                if receiver.changed().await.is_err() {
                    debug!("store dropped, ending observer");
                    break;
                }
            }
        });
        Arc::new(StoreSubscription { task })
    }

    pub async fn initialize(&self) -> PermissionRecord {
        self.inner.initialize().await.into()
    }

    pub async fn choose_live_location(&self) {
        self.inner.choose_live_location().await;
    }

    pub async fn choose_default_location(&self) {
        self.inner.choose_default_location().await;
    }

    pub async fn set_location_mode(&self, mode: LocationModeChoice) {
        self.inner.set_location_mode(mode.into()).await;
    }

    /// `None` selects every category.
    pub async fn select_category(&self, category: Option<String>) -> Result<(), NearbyError> {
        let filter = match category {
            Some(category) => CategoryFilter::Only(parse_category(&category)?),
            None => CategoryFilter::All,
        };
        self.inner.select_category(filter).await;
        Ok(())
    }

    pub fn set_search_radius(&self, radius_m: u32) {
        self.inner.set_search_radius(radius_m);
    }

    pub async fn refresh(&self) {
        self.inner.refresh().await;
    }

    pub async fn fetch_nearby(&self, category: String) -> Result<(), NearbyError> {
        let category = parse_category(&category)?;
        self.inner.fetch_nearby(category).await;
        Ok(())
    }

    pub async fn fetch_all_categories(&self) {
        self.inner.fetch_all_categories().await;
    }

    pub async fn recover_location_access(&self) {
        self.inner.recover_location_access().await;
    }

    pub async fn place_details(&self, place_id: String) -> Option<PlaceRecord> {
        self.inner
            .place_details(&PlaceId::new(place_id))
            .await
            .map(Into::into)
    }

    pub async fn check_api_health(&self) -> Option<HealthRecord> {
        self.inner.check_api_health().await.map(Into::into)
    }

    pub async fn check_permission_status(&self) -> PermissionRecord {
        self.inner
            .location_provider()
            .check_permission_status()
            .await
            .into()
    }

    pub async fn check_gps_availability(&self) -> bool {
        self.inner.location_provider().check_gps_availability().await
    }

    pub fn default_location(&self) -> LocationRecord {
        self.inner.location_provider().default_location().into()
    }

    pub fn clear_error(&self) {
        self.inner.clear_error();
    }

    pub fn reset(&self) {
        self.inner.reset();
    }
}
