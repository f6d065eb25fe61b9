/// Normalized permission vocabulary shared by both platforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PermissionState {
    Granted,
    Denied,
    Restricted,
    NeverAskAgain,
}

/// Permission state plus whether prompting again can change it.
///
/// `Restricted` and `NeverAskAgain` never allow asking again; the constructor
/// enforces this, so the fields stay private.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PermissionStatus {
    state: PermissionState,
    can_ask_again: bool,
}

impl PermissionStatus {
    pub fn new(state: PermissionState, can_ask_again: bool) -> Self {
        let can_ask_again = match state {
            PermissionState::Restricted | PermissionState::NeverAskAgain => false,
            PermissionState::Granted | PermissionState::Denied => can_ask_again,
        };
        Self {
            state,
            can_ask_again,
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionState::Granted, true)
    }

    pub fn denied(can_ask_again: bool) -> Self {
        Self::new(PermissionState::Denied, can_ask_again)
    }

    pub fn restricted() -> Self {
        Self::new(PermissionState::Restricted, false)
    }

    pub fn never_ask_again() -> Self {
        Self::new(PermissionState::NeverAskAgain, false)
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    pub fn can_ask_again(&self) -> bool {
        self.can_ask_again
    }

    pub fn is_granted(&self) -> bool {
        self.state == PermissionState::Granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_cannot_ask_again() {
        assert!(!PermissionStatus::new(PermissionState::Restricted, true).can_ask_again());
        assert!(!PermissionStatus::new(PermissionState::NeverAskAgain, true).can_ask_again());
        assert!(PermissionStatus::new(PermissionState::Denied, true).can_ask_again());
        assert!(!PermissionStatus::denied(false).can_ask_again());
    }

    #[test]
    fn test_is_granted() {
        assert!(PermissionStatus::granted().is_granted());
        assert!(!PermissionStatus::restricted().is_granted());
    }
}
