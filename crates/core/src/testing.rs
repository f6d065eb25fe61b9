//! In-memory doubles for the device and the places service.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::location::{
    AndroidHost, AndroidPermissionResult, HostError, IosAuthorization, IosHost, PositionError,
    PositionHost, PositionOptions, PositionSink, WatchId, WatchOptions,
};
use crate::model::{Category, HealthStatus, Location, Place, PlaceId};
use crate::places::{NearbyQuery, PlacesApi, PlacesError};

pub(crate) fn fix(latitude: f64, longitude: f64) -> Location {
    Location::new(latitude, longitude).with_accuracy(5.0)
}

pub(crate) fn place(id: &str, category: Category, distance_m: f64) -> Place {
    Place {
        id: PlaceId::new(id),
        name: format!("Place {id}"),
        address: "1 Main St".into(),
        location: Location::new(37.78, -122.41),
        rating: Some(4.0),
        types: vec![category.to_string()],
        photos: Vec::new(),
        distance_m: Some(distance_m),
        phone: None,
        website: None,
        price_level: None,
        opening_hours: None,
        reviews: Vec::new(),
    }
}

struct HostState {
    android_result: Result<AndroidPermissionResult, HostError>,
    android_granted: bool,
    ios_result: Result<IosAuthorization, HostError>,
    position: Result<Location, PositionError>,
    prompts: usize,
    position_requests: usize,
    last_position_options: Option<PositionOptions>,
    last_watch_options: Option<WatchOptions>,
    next_watch: u64,
    watches: BTreeMap<WatchId, Arc<dyn PositionSink>>,
    check_gate: Option<Arc<Notify>>,
}

pub(crate) struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(HostState {
                android_result: Ok(AndroidPermissionResult::Denied),
                android_granted: false,
                ios_result: Ok(IosAuthorization::Denied),
                position: Err(PositionError::new(2, "no fix")),
                prompts: 0,
                position_requests: 0,
                last_position_options: None,
                last_watch_options: None,
                next_watch: 0,
                watches: BTreeMap::new(),
                check_gate: None,
            }),
        })
    }

    pub(crate) fn set_android_result(&self, result: Result<AndroidPermissionResult, HostError>) {
        self.state.lock().unwrap().android_result = result;
    }

    pub(crate) fn set_android_granted(&self, granted: bool) {
        self.state.lock().unwrap().android_granted = granted;
    }

    pub(crate) fn set_ios_result(&self, result: Result<IosAuthorization, HostError>) {
        self.state.lock().unwrap().ios_result = result;
    }

    pub(crate) fn set_position(&self, position: Result<Location, PositionError>) {
        self.state.lock().unwrap().position = position;
    }

    /// The next non-prompting permission check waits until the returned
    /// handle is notified.
    pub(crate) fn gate_permission_check(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().check_gate = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn prompts(&self) -> usize {
        self.state.lock().unwrap().prompts
    }

    pub(crate) fn position_requests(&self) -> usize {
        self.state.lock().unwrap().position_requests
    }

    pub(crate) fn last_position_options(&self) -> Option<PositionOptions> {
        self.state.lock().unwrap().last_position_options
    }

    pub(crate) fn last_watch_options(&self) -> Option<WatchOptions> {
        self.state.lock().unwrap().last_watch_options
    }

    pub(crate) fn active_watches(&self) -> usize {
        self.state.lock().unwrap().watches.len()
    }

    pub(crate) fn emit_position(&self, location: Location) {
        let sinks: Vec<_> = self.state.lock().unwrap().watches.values().cloned().collect();
        for sink in sinks {
            sink.on_position(location);
        }
    }

    pub(crate) fn emit_error(&self, error: PositionError) {
        let sinks: Vec<_> = self.state.lock().unwrap().watches.values().cloned().collect();
        for sink in sinks {
            sink.on_error(error.clone());
        }
    }
}

#[async_trait]
impl PositionHost for FakeHost {
    async fn current_position(&self, options: PositionOptions) -> Result<Location, PositionError> {
        let mut state = self.state.lock().unwrap();
        state.position_requests += 1;
        state.last_position_options = Some(options);
        state.position.clone()
    }

    fn watch_position(&self, options: WatchOptions, sink: Arc<dyn PositionSink>) -> WatchId {
        let mut state = self.state.lock().unwrap();
        state.next_watch += 1;
        let id = WatchId(state.next_watch);
        state.last_watch_options = Some(options);
        state.watches.insert(id, sink);
        id
    }

    fn clear_watch(&self, id: WatchId) {
        self.state.lock().unwrap().watches.remove(&id);
    }
}

#[async_trait]
impl AndroidHost for FakeHost {
    async fn request_fine_location(&self) -> Result<AndroidPermissionResult, HostError> {
        let mut state = self.state.lock().unwrap();
        state.prompts += 1;
        let result = state.android_result.clone();
        if let Ok(AndroidPermissionResult::Granted) = result {
            state.android_granted = true;
        }
        result
    }

    async fn has_fine_location(&self) -> Result<bool, HostError> {
        let gate = self.state.lock().unwrap().check_gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.state.lock().unwrap().android_granted)
    }
}

#[async_trait]
impl IosHost for FakeHost {
    async fn request_authorization(&self) -> Result<IosAuthorization, HostError> {
        let mut state = self.state.lock().unwrap();
        state.prompts += 1;
        state.ios_result.clone()
    }
}

#[derive(Default)]
struct PlacesState {
    responses: HashMap<Category, Result<Vec<Place>, PlacesError>>,
    details: HashMap<PlaceId, Result<Option<Place>, PlacesError>>,
    gates: HashMap<Category, Arc<Notify>>,
    calls: Vec<NearbyQuery>,
}

/// Unconfigured categories answer with an empty list.
#[derive(Default)]
pub(crate) struct FakePlaces {
    state: Mutex<PlacesState>,
}

impl FakePlaces {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, category: Category, result: Result<Vec<Place>, PlacesError>) {
        self.state.lock().unwrap().responses.insert(category, result);
    }

    pub(crate) fn respond_details(&self, id: &str, result: Result<Option<Place>, PlacesError>) {
        self.state
            .lock()
            .unwrap()
            .details
            .insert(PlaceId::new(id), result);
    }

    /// The next query for `category` waits until the returned handle is notified.
    pub(crate) fn gate(&self, category: Category) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(category, Arc::clone(&gate));
        gate
    }

    pub(crate) fn calls(&self) -> Vec<NearbyQuery> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }
}

#[async_trait]
impl PlacesApi for FakePlaces {
    async fn nearby_places(&self, query: &NearbyQuery) -> Result<Vec<Place>, PlacesError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(*query);
            state.gates.remove(&query.category)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.state
            .lock()
            .unwrap()
            .responses
            .get(&query.category)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn place_details(&self, id: &PlaceId) -> Result<Option<Place>, PlacesError> {
        self.state
            .lock()
            .unwrap()
            .details
            .get(id)
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn health(&self) -> Result<HealthStatus, PlacesError> {
        Ok(HealthStatus {
            healthy: true,
            status: "ok".into(),
            version: None,
        })
    }
}
