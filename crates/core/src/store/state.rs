use crate::model::{CategoryFilter, Location, LocationMode, Place, PermissionStatus};

/// Where the current location comes from.
///
/// The fallback coordinate is never stored as a "current location", so default
/// mode cannot drift away from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocationSource {
    /// The user has not picked live or default yet
    Unchosen,
    Live(Location),
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Uninitialized,
    AwaitingChoice,
    LiveActive,
    DefaultActive,
}

/// Everything the presentation layer renders. Only the store mutates it.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub source: LocationSource,
    /// `None` until the launch check has run
    pub permission: Option<PermissionStatus>,
    pub category: CategoryFilter,
    pub search_radius_m: u32,
    /// What the map and list show
    pub nearby_places: Vec<Place>,
    /// Merged all-categories result for the current source
    pub all_places: Vec<Place>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_location_watching: bool,
    /// Set once the user declined again from the recovery prompt
    pub recovery_attempted: bool,
    fallback: Location,
}

impl SessionState {
    pub fn new(fallback: Location, search_radius_m: u32) -> Self {
        Self {
            source: LocationSource::Unchosen,
            permission: None,
            category: CategoryFilter::All,
            search_radius_m,
            nearby_places: Vec::new(),
            all_places: Vec::new(),
            is_loading: false,
            error: None,
            is_location_watching: false,
            recovery_attempted: false,
            fallback,
        }
    }

    pub fn fallback(&self) -> Location {
        self.fallback
    }

    pub fn current_location(&self) -> Option<Location> {
        match self.source {
            LocationSource::Unchosen => None,
            LocationSource::Live(location) => Some(location),
            LocationSource::Default => Some(self.fallback),
        }
    }

    pub fn location_mode(&self) -> Option<LocationMode> {
        match self.source {
            LocationSource::Unchosen => None,
            LocationSource::Live(_) => Some(LocationMode::Live),
            LocationSource::Default => Some(LocationMode::Default),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.permission, self.source) {
            (_, LocationSource::Live(_)) => SessionPhase::LiveActive,
            (_, LocationSource::Default) => SessionPhase::DefaultActive,
            (None, LocationSource::Unchosen) => SessionPhase::Uninitialized,
            (Some(_), LocationSource::Unchosen) => SessionPhase::AwaitingChoice,
        }
    }

    /// Whether to show the "allow location" affordance.
    pub fn can_offer_recovery(&self) -> bool {
        let granted = self.permission.is_some_and(|p| p.is_granted());
        !granted && !self.recovery_attempted && self.source == LocationSource::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> Location {
        Location::new(37.7749, -122.4194)
    }

    #[test]
    fn test_phase_follows_permission_and_source() {
        let mut state = SessionState::new(fallback(), 5_000);
        assert_eq!(state.phase(), SessionPhase::Uninitialized);
        assert_eq!(state.current_location(), None);

        state.permission = Some(PermissionStatus::denied(true));
        assert_eq!(state.phase(), SessionPhase::AwaitingChoice);

        state.source = LocationSource::Default;
        assert_eq!(state.phase(), SessionPhase::DefaultActive);
        assert_eq!(state.current_location(), Some(fallback()));
        assert_eq!(state.location_mode(), Some(LocationMode::Default));

        let here = Location::new(1.0, 2.0);
        state.source = LocationSource::Live(here);
        assert_eq!(state.phase(), SessionPhase::LiveActive);
        assert_eq!(state.current_location(), Some(here));
    }

    #[test]
    fn test_recovery_offer() {
        let mut state = SessionState::new(fallback(), 5_000);
        state.source = LocationSource::Default;
        state.permission = Some(PermissionStatus::denied(true));
        assert!(state.can_offer_recovery());

        state.recovery_attempted = true;
        assert!(!state.can_offer_recovery());

        state.recovery_attempted = false;
        state.permission = Some(PermissionStatus::granted());
        assert!(!state.can_offer_recovery());
    }
}
