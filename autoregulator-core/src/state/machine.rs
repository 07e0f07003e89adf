//! Wake-cycle state machine definition
//!
//! Every step the controller takes is a function of the current state and
//! an event.

use super::events::CycleEvent;
use super::wake::WakeContext;

/// Wake-cycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    /// Power-on with no trusted state
    ColdBoot,
    /// Driving to the reference to re-zero the position counter
    Homing,
    /// Mapping the time to a target and moving there
    Regulating,
    /// Sleep requested; terminal for the session
    Sleeping,
}

impl CycleState {
    /// Entry state for a wake
    ///
    /// Cold boots always start over. Other wakes trust the retained position
    /// only while the confidence flag holds.
    pub fn on_wake(wake: WakeContext, confident: bool) -> Self {
        if wake.requires_homing() {
            CycleState::ColdBoot
        } else if confident {
            CycleState::Regulating
        } else {
            CycleState::Homing
        }
    }

    /// Check if this state may move the motor
    pub fn motor_allowed(&self) -> bool {
        matches!(self, CycleState::Homing | CycleState::Regulating)
    }

    /// Check if the session is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleState::Sleeping)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: CycleEvent) -> Self {
        use CycleEvent::*;
        use CycleState::*;

        match (self, event) {
            // Nothing leaves Sleeping; the next wake starts a fresh machine
            (Sleeping, _) => Sleeping,

            (ColdBoot, Booted) => Homing,

            (Homing, Homed) => Regulating,
            (Homing, HomingFailed) => Sleeping,

            (Regulating, Regulated) => Sleeping,
            (Regulating, RetryAfterHoming) => Homing,
            (Regulating, RetryClockRead) => Regulating,

            (_, Abandon) => Sleeping,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_states() {
        assert_eq!(
            CycleState::on_wake(WakeContext::ColdBoot, true),
            CycleState::ColdBoot
        );
        assert_eq!(
            CycleState::on_wake(WakeContext::ColdBoot, false),
            CycleState::ColdBoot
        );
        assert_eq!(
            CycleState::on_wake(WakeContext::PeriodicWake, true),
            CycleState::Regulating
        );
        assert_eq!(
            CycleState::on_wake(WakeContext::PeriodicWake, false),
            CycleState::Homing
        );
        assert_eq!(
            CycleState::on_wake(WakeContext::ManualInterrupt, false),
            CycleState::Homing
        );
    }

    #[test]
    fn test_cold_boot_flow() {
        let homing = CycleState::ColdBoot.transition(CycleEvent::Booted);
        assert_eq!(homing, CycleState::Homing);

        let regulating = homing.transition(CycleEvent::Homed);
        assert_eq!(regulating, CycleState::Regulating);

        let sleeping = regulating.transition(CycleEvent::Regulated);
        assert_eq!(sleeping, CycleState::Sleeping);
    }

    #[test]
    fn test_retry_flows() {
        assert_eq!(
            CycleState::Regulating.transition(CycleEvent::RetryAfterHoming),
            CycleState::Homing
        );
        assert_eq!(
            CycleState::Regulating.transition(CycleEvent::RetryClockRead),
            CycleState::Regulating
        );
        assert_eq!(
            CycleState::Homing.transition(CycleEvent::HomingFailed),
            CycleState::Sleeping
        );
    }

    #[test]
    fn test_abandon_from_any_awake_state() {
        for state in [
            CycleState::ColdBoot,
            CycleState::Homing,
            CycleState::Regulating,
        ] {
            assert_eq!(state.transition(CycleEvent::Abandon), CycleState::Sleeping);
        }
    }

    #[test]
    fn test_sleeping_is_terminal() {
        let events = [
            CycleEvent::Booted,
            CycleEvent::Homed,
            CycleEvent::Regulated,
            CycleEvent::RetryAfterHoming,
            CycleEvent::RetryClockRead,
        ];
        for event in events {
            assert_eq!(CycleState::Sleeping.transition(event), CycleState::Sleeping);
        }
        assert!(CycleState::Sleeping.is_terminal());
    }

    #[test]
    fn test_unrelated_events_are_ignored() {
        assert_eq!(
            CycleState::ColdBoot.transition(CycleEvent::Regulated),
            CycleState::ColdBoot
        );
        assert_eq!(
            CycleState::Homing.transition(CycleEvent::RetryClockRead),
            CycleState::Homing
        );
    }

    #[test]
    fn test_motor_allowed() {
        assert!(CycleState::Homing.motor_allowed());
        assert!(CycleState::Regulating.motor_allowed());
        assert!(!CycleState::ColdBoot.motor_allowed());
        assert!(!CycleState::Sleeping.motor_allowed());
    }
}
