//! The session store: permission flow, location mode and place fetching.
//!
//! State lives in a `tokio::sync::watch` channel. Each action mutates it in
//! whole steps, so a subscriber never sees half of one step. Every action
//! takes a generation ticket when it starts; once a newer action begins, the
//! older one's remaining writes are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::NearbyConfig;
use crate::location::{LocationError, LocationProvider};
use crate::model::{
    Category, CategoryFilter, HealthStatus, Location, LocationMode, PermissionStatus, Place,
    PlaceId,
};
use crate::places::{NearbyQuery, PlacesApi, PlacesClient, PlacesError};

pub mod merge;
pub mod state;

pub use merge::merge_by_distance;
pub use state::{LocationSource, SessionPhase, SessionState};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("No location available")]
    NoLocation,

    #[error("Location permission denied. Showing places near the default location.")]
    PermissionRequired,

    #[error("GPS is unavailable. Showing places near the default location.")]
    GpsUnavailable,

    #[error("Could not get your location ({0}). Showing places near the default location.")]
    LiveSwitchFailed(LocationError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Places(#[from] PlacesError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Ticket {
    generation: u64,
    /// Bumped only by `reset`
    session: u64,
}

/// A failed retry keeps what is on screen; a failed first load for a new
/// context clears it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchKind {
    Initial,
    Retry,
}

pub struct PlacesStore {
    location: LocationProvider,
    places: Arc<dyn PlacesApi>,
    state: Arc<watch::Sender<SessionState>>,
    generation: AtomicU64,
    session: AtomicU64,
}

impl PlacesStore {
    pub fn new(location: LocationProvider, places: Arc<dyn PlacesApi>, search_radius_m: u32) -> Self {
        let initial = SessionState::new(location.default_location(), search_radius_m);
        let (state, _) = watch::channel(initial);

        Self {
            location,
            places,
            state: Arc::new(state),
            generation: AtomicU64::new(0),
            session: AtomicU64::new(0),
        }
    }

    /// Wires the HTTP client to an already selected platform provider.
    pub fn from_config(
        config: &NearbyConfig,
        location: LocationProvider,
    ) -> Result<Self, PlacesError> {
        let client = PlacesClient::new(&config.api)?;
        Ok(Self::new(location, Arc::new(client), config.places.default_radius_m))
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn location_provider(&self) -> &LocationProvider {
        &self.location
    }

    fn begin(&self) -> Ticket {
        Ticket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            session: self.session.load(Ordering::SeqCst),
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    fn same_session(&self, ticket: Ticket) -> bool {
        self.session.load(Ordering::SeqCst) == ticket.session
    }

    /// Applies `update` only while `ticket` is the newest action.
    fn commit(&self, ticket: Ticket, update: impl FnOnce(&mut SessionState)) -> bool {
        let applied = self.state.send_if_modified(|state| {
            if !self.is_current(ticket) {
                return false;
            }
            update(state);
            true
        });
        if !applied {
            debug!(ticket = ticket.generation, "dropping result of superseded action");
        }
        applied
    }

    /// Launch flow: forget any cached permission, check without prompting,
    /// prompt only if that was not a grant.
    pub async fn initialize(&self) -> PermissionStatus {
        let ticket = self.begin();
        self.location.clear_permission_cache();
        self.commit(ticket, |s| {
            s.permission = None;
            s.is_loading = true;
            s.error = None;
        });

        let mut status = self.location.check_permission_status().await;
        if !status.is_granted() && status.can_ask_again() {
            status = self.location.request_permission().await;
        }

        info!(state = ?status.state(), "launch permission resolved");
        // Once superseded, the newer action owns `is_loading`; the launch
        // result still lands unless a later check already recorded one.
        self.state.send_if_modified(|s| {
            if self.is_current(ticket) {
                s.permission = Some(status);
                s.is_loading = false;
                true
            } else if self.same_session(ticket) && s.permission.is_none() {
                s.permission = Some(status);
                true
            } else {
                false
            }
        });
        status
    }

    /// "Use my location" from the choice screen. On failure the user stays on
    /// the choice screen with the error shown.
    pub async fn choose_live_location(&self) {
        let ticket = self.begin();
        self.commit(ticket, |s| {
            s.is_loading = true;
            s.error = None;
        });

        match self.location.get_current_location().await {
            Ok(location) => self.enter_live(ticket, location).await,
            Err(e) => {
                self.commit(ticket, |s| {
                    s.error = Some(StoreError::from(e).to_string());
                    s.is_loading = false;
                });
            }
        }
    }

    pub async fn choose_default_location(&self) {
        let ticket = self.begin();
        self.enter_default(ticket, None).await;
    }

    /// Explicit toggle. A failed switch to live falls back to default mode
    /// with an explanation instead of leaving the session without a location.
    pub async fn set_location_mode(&self, mode: LocationMode) {
        let ticket = self.begin();
        info!(?mode, "location mode change requested");
        match mode {
            LocationMode::Default => self.enter_default(ticket, None).await,
            LocationMode::Live => self.switch_to_live(ticket).await,
        }
    }

    async fn switch_to_live(&self, ticket: Ticket) {
        self.commit(ticket, |s| {
            s.is_loading = true;
            s.error = None;
        });

        let mut permission = self.location.check_permission_status().await;
        if !permission.is_granted() && permission.can_ask_again() {
            permission = self.location.request_permission().await;
        }
        if !self.commit(ticket, |s| s.permission = Some(permission)) {
            return;
        }
        if !permission.is_granted() {
            warn!("live mode refused: permission not granted");
            return self
                .enter_default(ticket, Some(StoreError::PermissionRequired))
                .await;
        }

        if !self.location.check_gps_availability().await {
            warn!("live mode refused: gps unavailable");
            return self
                .enter_default(ticket, Some(StoreError::GpsUnavailable))
                .await;
        }

        match self.location.get_current_location().await {
            Ok(location) => self.enter_live(ticket, location).await,
            Err(e) => {
                warn!(error = %e, "live mode refused: no position");
                self.enter_default(ticket, Some(StoreError::LiveSwitchFailed(e)))
                    .await
            }
        }
    }

    async fn enter_live(&self, ticket: Ticket, location: Location) {
        let entered = self.commit(ticket, |s| {
            s.source = LocationSource::Live(location);
            s.all_places.clear();
        });
        if !entered {
            return;
        }

        info!(lat = location.latitude, lng = location.longitude, "live location active");
        self.start_watching();

        let category = self.state.borrow().category;
        match category {
            CategoryFilter::All => self.load_all(ticket, location, FetchKind::Initial).await,
            CategoryFilter::Only(category) => {
                self.load_category(ticket, location, category, FetchKind::Initial)
                    .await
            }
        }
    }

    /// A rollback `notice` is shown for the whole load; a failed load
    /// replaces it with the fetch error.
    async fn enter_default(&self, ticket: Ticket, notice: Option<StoreError>) {
        let notice = notice.map(|n| n.to_string());
        let entered = self.commit(ticket, |s| {
            s.source = LocationSource::Default;
            s.category = CategoryFilter::All;
            s.all_places.clear();
            s.error = notice.clone();
        });
        if !entered {
            return;
        }

        self.stop_watching();
        info!("default location active");
        let fallback = self.location.default_location();
        self.load_all_with_notice(ticket, fallback, FetchKind::Initial, notice)
            .await;
    }

    fn start_watching(&self) {
        let state = Arc::clone(&self.state);
        self.location.start_watching(
            move |location| {
                state.send_if_modified(|s| match s.source {
                    LocationSource::Live(_) => {
                        s.source = LocationSource::Live(location);
                        true
                    }
                    _ => false,
                });
            },
            |error| debug!(%error, "watch reported an error; waiting for the platform to recover"),
        );
        self.state.send_modify(|s| s.is_location_watching = true);
    }

    fn stop_watching(&self) {
        self.location.stop_watching();
        self.state.send_if_modified(|s| {
            let was_watching = s.is_location_watching;
            s.is_location_watching = false;
            was_watching
        });
    }

    /// Never moves the location or changes the mode.
    pub async fn select_category(&self, filter: CategoryFilter) {
        let ticket = self.begin();
        let (source, fallback) = {
            self.state.send_modify(|s| s.category = filter);
            let state = self.state.borrow();
            (state.source, state.fallback())
        };

        match (source, filter) {
            (LocationSource::Unchosen, _) => {
                debug!(?filter, "no location chosen yet; selection stored");
                self.commit(ticket, |s| s.is_loading = false);
            }
            (LocationSource::Default, CategoryFilter::All) => {
                self.load_all(ticket, fallback, FetchKind::Initial).await
            }
            (LocationSource::Live(location), CategoryFilter::All) => {
                let cached = self.state.borrow().all_places.clone();
                if cached.is_empty() {
                    self.load_all(ticket, location, FetchKind::Initial).await
                } else {
                    debug!(count = cached.len(), "reusing merged places");
                    self.commit(ticket, |s| {
                        s.nearby_places = cached;
                        s.error = None;
                        s.is_loading = false;
                    });
                }
            }
            (LocationSource::Default, CategoryFilter::Only(category)) => {
                self.load_category(ticket, fallback, category, FetchKind::Initial)
                    .await
            }
            (LocationSource::Live(location), CategoryFilter::Only(category)) => {
                self.load_category(ticket, location, category, FetchKind::Initial)
                    .await
            }
        }
    }

    pub fn set_search_radius(&self, radius_m: u32) {
        if radius_m == 0 {
            warn!("ignoring zero search radius");
            return;
        }
        self.state.send_modify(|s| s.search_radius_m = radius_m);
    }

    /// Retry affordance: reloads the current view and keeps the places on
    /// screen if it fails again.
    pub async fn refresh(&self) {
        let ticket = self.begin();
        let (origin, filter) = {
            let state = self.state.borrow();
            (state.current_location(), state.category)
        };

        let Some(origin) = origin else {
            self.commit(ticket, |s| {
                s.error = Some(StoreError::NoLocation.to_string());
                s.is_loading = false;
            });
            return;
        };

        match filter {
            CategoryFilter::All => self.load_all(ticket, origin, FetchKind::Retry).await,
            CategoryFilter::Only(category) => {
                self.load_category(ticket, origin, category, FetchKind::Retry)
                    .await
            }
        }
    }

    /// One category at the current location, without touching the selection.
    pub async fn fetch_nearby(&self, category: Category) {
        let ticket = self.begin();
        let origin = self.state.borrow().current_location();
        match origin {
            Some(origin) => {
                self.load_category(ticket, origin, category, FetchKind::Initial)
                    .await
            }
            None => {
                self.commit(ticket, |s| {
                    s.error = Some(StoreError::NoLocation.to_string());
                    s.is_loading = false;
                });
            }
        }
    }

    /// Every category at the current location, merged.
    pub async fn fetch_all_categories(&self) {
        let ticket = self.begin();
        let origin = self.state.borrow().current_location();
        match origin {
            Some(origin) => self.load_all(ticket, origin, FetchKind::Initial).await,
            None => {
                self.commit(ticket, |s| {
                    s.error = Some(StoreError::NoLocation.to_string());
                    s.is_loading = false;
                });
            }
        }
    }

    /// "Allow location" after the user first chose default or declined.
    /// A second refusal only hides the affordance for the rest of the session.
    pub async fn recover_location_access(&self) {
        let ticket = self.begin();
        let status = self.location.request_permission().await;
        if !self.commit(ticket, |s| s.permission = Some(status)) {
            return;
        }

        if !status.is_granted() {
            info!(state = ?status.state(), "recovery declined");
            self.commit(ticket, |s| {
                s.recovery_attempted = true;
                s.is_loading = false;
            });
            return;
        }

        self.commit(ticket, |s| {
            s.is_loading = true;
            s.error = None;
        });
        match self.location.get_current_location().await {
            Ok(location) => self.enter_live(ticket, location).await,
            Err(e) => {
                self.commit(ticket, |s| {
                    s.error = Some(StoreError::from(e).to_string());
                    s.is_loading = false;
                });
            }
        }
    }

    pub async fn place_details(&self, id: &PlaceId) -> Option<Place> {
        match self.places.place_details(id).await {
            Ok(place) => place,
            Err(e) => {
                warn!(%id, error = %e, "place details failed");
                self.state
                    .send_modify(|s| s.error = Some(StoreError::from(e).to_string()));
                None
            }
        }
    }

    /// Opportunistic; failures are only logged.
    pub async fn check_api_health(&self) -> Option<HealthStatus> {
        match self.places.health().await {
            Ok(health) => Some(health),
            Err(e) => {
                debug!(error = %e, "health check failed");
                None
            }
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Back to the launch state. In-flight actions are abandoned.
    pub fn reset(&self) {
        self.session.fetch_add(1, Ordering::SeqCst);
        self.begin();
        self.location.stop_watching();
        self.location.clear_permission_cache();

        let radius = {
            let state = self.state.borrow();
            state.search_radius_m
        };
        self.state
            .send_replace(SessionState::new(self.location.default_location(), radius));
        info!("session reset");
    }

    async fn load_category(
        &self,
        ticket: Ticket,
        origin: Location,
        category: Category,
        kind: FetchKind,
    ) {
        let query = NearbyQuery {
            origin,
            category,
            radius_m: self.state.borrow().search_radius_m,
        };
        self.commit(ticket, |s| {
            s.is_loading = true;
            s.error = None;
        });

        match self.places.nearby_places(&query).await {
            Ok(places) => {
                debug!(%category, count = places.len(), "category loaded");
                self.commit(ticket, |s| {
                    s.nearby_places = places;
                    s.is_loading = false;
                });
            }
            Err(e) => {
                warn!(%category, error = %e, ?kind, "category fetch failed");
                self.commit(ticket, |s| {
                    if kind == FetchKind::Initial {
                        s.nearby_places.clear();
                    }
                    s.error = Some(StoreError::from(e).to_string());
                    s.is_loading = false;
                });
            }
        }
    }

    /// Categories are fetched one after another; one failing category does
    /// not stop the rest.
    async fn load_all(&self, ticket: Ticket, origin: Location, kind: FetchKind) {
        self.load_all_with_notice(ticket, origin, kind, None).await
    }

    async fn load_all_with_notice(
        &self,
        ticket: Ticket,
        origin: Location,
        kind: FetchKind,
        notice: Option<String>,
    ) {
        let radius_m = self.state.borrow().search_radius_m;
        self.commit(ticket, |s| {
            s.is_loading = true;
            s.error = notice;
        });

        let mut batches = Vec::new();
        let mut last_error = None;
        for category in Category::all() {
            if !self.is_current(ticket) {
                debug!(ticket = ticket.generation, "abandoning superseded all-categories fetch");
                return;
            }

            let query = NearbyQuery {
                origin,
                category,
                radius_m,
            };
            match self.places.nearby_places(&query).await {
                Ok(places) => batches.push(places),
                Err(e) => {
                    warn!(%category, error = %e, "category fetch failed, continuing");
                    last_error = Some(e);
                }
            }
        }

        match (batches.is_empty(), last_error) {
            (true, Some(e)) => {
                self.commit(ticket, |s| {
                    if kind == FetchKind::Initial {
                        s.nearby_places.clear();
                        s.all_places.clear();
                    }
                    s.error = Some(StoreError::from(e).to_string());
                    s.is_loading = false;
                });
            }
            _ => {
                let merged = merge_by_distance(batches);
                debug!(count = merged.len(), "all categories loaded");
                self.commit(ticket, |s| {
                    s.nearby_places = merged.clone();
                    s.all_places = merged;
                    s.is_loading = false;
                });
            }
        }
    }
}
