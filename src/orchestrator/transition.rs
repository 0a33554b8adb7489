//! State transitions applied by the owner task.
//!
//! Every change to `SosState` is one `Transition`, applied in arrival order.
//! Guarded transitions report whether they were accepted, so a caller can
//! check-and-set a flag without racing another task.

use crate::model::{Hospital, Position, SosEvent, SosState};

#[derive(Debug, Clone)]
pub(super) enum Transition {
    /// A facility lookup begins. With `skip_if_located`, rejected when a
    /// position is already cached.
    HospitalsRequested { skip_if_located: bool },
    HospitalsLoaded {
        position: Position,
        hospitals: Vec<Hospital>,
    },
    HospitalsFailed(String),

    /// An SOS submission begins. Rejected while another is in flight.
    SendStarted,
    SendFailed(String),

    /// A submission succeeded: a new episode starts and polling begins.
    EventCreated { event: SosEvent, position: Position },

    StatusReceived(SosEvent),
    StatusFailed { id: u64, message: String },

    /// Calling the primary contact for episode `event_id` begins. Rejected
    /// unless that episode is current, and once its primary has been reached
    /// or while a call for it is already being placed.
    ContactStarted { event_id: u64 },
    /// Dropped when the episode has since been replaced.
    ContactFinished { event_id: u64, opened: bool },

    PollingStopped,
}

impl Transition {
    /// Apply to `state`, returning whether the transition was accepted.
    pub(super) fn apply(self, state: &mut SosState) -> bool {
        match self {
            Self::HospitalsRequested { skip_if_located } => {
                if skip_if_located && state.user_position.is_some() {
                    return false;
                }
                state.is_fetching_hospitals = true;
                state.error_message = None;
            }
            Self::HospitalsLoaded {
                position,
                hospitals,
            } => {
                state.user_position = Some(position);
                state.hospitals = hospitals;
                state.is_fetching_hospitals = false;
            }
            Self::HospitalsFailed(message) => {
                state.is_fetching_hospitals = false;
                state.error_message = Some(message);
            }
            Self::SendStarted => {
                if state.is_sending {
                    return false;
                }
                state.is_sending = true;
                state.error_message = None;
            }
            Self::SendFailed(message) => {
                state.is_sending = false;
                state.error_message = Some(message);
            }
            Self::EventCreated { event, position } => {
                state.is_polling = !event.is_resolved();
                state.current_event = Some(event);
                state.user_position = Some(position);
                state.is_sending = false;
                state.has_contacted_primary = false;
                state.is_contacting = false;
            }
            Self::StatusReceived(event) => {
                let Some(current) = &state.current_event else {
                    return false;
                };
                // Replies for an earlier episode, or ones that would un-resolve
                // the event, are dropped.
                if current.id != event.id || (current.is_resolved() && !event.is_resolved()) {
                    return false;
                }
                if event.is_resolved() {
                    state.is_polling = false;
                }
                state.current_event = Some(event);
                state.error_message = None;
            }
            Self::StatusFailed { id, message } => {
                if !is_current(state, id) {
                    return false;
                }
                state.error_message = Some(message);
            }
            Self::ContactStarted { event_id } => {
                if !is_current(state, event_id)
                    || state.has_contacted_primary
                    || state.is_contacting
                {
                    return false;
                }
                state.is_contacting = true;
            }
            Self::ContactFinished { event_id, opened } => {
                if !is_current(state, event_id) {
                    return false;
                }
                state.is_contacting = false;
                if opened {
                    state.has_contacted_primary = true;
                }
            }
            Self::PollingStopped => state.is_polling = false,
        }
        true
    }
}

fn is_current(state: &SosState, event_id: u64) -> bool {
    state.current_event.as_ref().map(|e| e.id) == Some(event_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::SosStatus;

    fn event(id: u64, status: SosStatus) -> SosEvent {
        SosEvent {
            id,
            user_id: "guest".into(),
            latitude: 12.97,
            longitude: 77.59,
            emergency_type: "Medical".into(),
            status,
            timestamp: None,
            ambulance: None,
        }
    }

    fn in_episode(id: u64) -> SosState {
        let mut state = SosState::default();
        Transition::EventCreated {
            event: event(id, SosStatus::Triggered),
            position: Position::now(12.97, 77.59),
        }
        .apply(&mut state);
        state
    }

    #[test]
    fn prepare_skips_when_position_cached() {
        let mut state = SosState {
            user_position: Some(Position::now(1.0, 2.0)),
            ..SosState::default()
        };

        let accepted = Transition::HospitalsRequested {
            skip_if_located: true,
        }
        .apply(&mut state);

        assert!(!accepted);
        assert!(!state.is_fetching_hospitals);
    }

    #[test]
    fn refresh_runs_with_position_cached() {
        let mut state = SosState {
            user_position: Some(Position::now(1.0, 2.0)),
            error_message: Some("old".into()),
            ..SosState::default()
        };

        let accepted = Transition::HospitalsRequested {
            skip_if_located: false,
        }
        .apply(&mut state);

        assert!(accepted);
        assert!(state.is_fetching_hospitals);
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn second_send_is_rejected_while_first_in_flight() {
        let mut state = SosState::default();

        assert!(Transition::SendStarted.apply(&mut state));
        assert!(!Transition::SendStarted.apply(&mut state));
        assert!(state.is_sending);
    }

    #[test]
    fn new_episode_replaces_event_and_resets_contact_flag() {
        let mut state = in_episode(1);
        state.has_contacted_primary = true;

        Transition::EventCreated {
            event: event(2, SosStatus::Triggered),
            position: Position::now(0.0, 0.0),
        }
        .apply(&mut state);

        assert_eq!(state.current_event.as_ref().unwrap().id, 2);
        assert!(!state.has_contacted_primary);
        assert!(state.is_polling);
    }

    #[test]
    fn stale_episode_status_is_dropped() {
        let mut state = in_episode(2);

        let accepted = Transition::StatusReceived(event(1, SosStatus::Resolved)).apply(&mut state);

        assert!(!accepted);
        assert_eq!(state.current_event.as_ref().unwrap().id, 2);
        assert!(state.is_polling);
    }

    #[test]
    fn resolved_event_stops_polling_and_stays_resolved() {
        let mut state = in_episode(1);

        Transition::StatusReceived(event(1, SosStatus::Resolved)).apply(&mut state);
        let accepted = Transition::StatusReceived(event(1, SosStatus::OnTheWay)).apply(&mut state);

        assert!(!accepted);
        assert!(!state.is_polling);
        assert!(state.current_event.as_ref().unwrap().is_resolved());
    }

    #[test]
    fn status_success_clears_error() {
        let mut state = in_episode(1);
        Transition::StatusFailed {
            id: 1,
            message: "offline".into(),
        }
        .apply(&mut state);
        assert_eq!(state.error_message.as_deref(), Some("offline"));

        Transition::StatusReceived(event(1, SosStatus::Acknowledged)).apply(&mut state);

        assert_eq!(state.error_message, None);
        assert!(state.is_polling);
    }

    #[test]
    fn status_without_event_is_ignored() {
        let mut state = SosState::default();

        assert!(!Transition::StatusReceived(event(1, SosStatus::Triggered)).apply(&mut state));
        assert!(
            !Transition::StatusFailed {
                id: 1,
                message: "offline".into()
            }
            .apply(&mut state)
        );
        assert_eq!(state, SosState::default());
    }

    #[test]
    fn contact_is_guarded_once_reached() {
        let mut state = in_episode(1);

        assert!(Transition::ContactStarted { event_id: 1 }.apply(&mut state));
        assert!(!Transition::ContactStarted { event_id: 1 }.apply(&mut state));
        Transition::ContactFinished {
            event_id: 1,
            opened: true,
        }
        .apply(&mut state);

        assert!(!state.is_contacting);
        assert!(state.has_contacted_primary);
        assert!(!Transition::ContactStarted { event_id: 1 }.apply(&mut state));
    }

    #[test]
    fn failed_contact_can_be_retried() {
        let mut state = in_episode(1);

        Transition::ContactStarted { event_id: 1 }.apply(&mut state);
        Transition::ContactFinished {
            event_id: 1,
            opened: false,
        }
        .apply(&mut state);

        assert!(!state.is_contacting);
        assert!(!state.has_contacted_primary);
        assert_eq!(state.error_message, None);
        assert!(Transition::ContactStarted { event_id: 1 }.apply(&mut state));
    }

    #[test]
    fn contact_is_scoped_to_its_episode() {
        let mut state = in_episode(1);
        assert!(Transition::ContactStarted { event_id: 1 }.apply(&mut state));

        // Episode 2 starts while episode 1's call is still being placed.
        Transition::EventCreated {
            event: event(2, SosStatus::Triggered),
            position: Position::now(12.97, 77.59),
        }
        .apply(&mut state);
        assert!(!state.is_contacting);
        assert!(Transition::ContactStarted { event_id: 2 }.apply(&mut state));

        let stale = Transition::ContactFinished {
            event_id: 1,
            opened: true,
        }
        .apply(&mut state);

        assert!(!stale);
        assert!(state.is_contacting);
        assert!(!state.has_contacted_primary);
    }

    #[test]
    fn contact_without_current_episode_is_rejected() {
        let mut state = in_episode(2);

        assert!(!Transition::ContactStarted { event_id: 1 }.apply(&mut state));
        assert!(!Transition::ContactStarted { event_id: 7 }.apply(&mut SosState::default()));
        assert!(!state.is_contacting);
    }
}
