//! The orchestrator's state as seen by observers.

use serde::Serialize;

use super::{Hospital, Position, SosEvent};

/// Everything the UI needs to render the SOS screen.
///
/// Owned and mutated by the orchestrator's owner task only. Observers get
/// clones through a watch channel and may lag behind by one update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SosState {
    /// An SOS submission is in flight.
    pub is_sending: bool,

    /// A status poller is running.
    pub is_polling: bool,

    /// The primary contact is being called.
    pub is_contacting: bool,

    /// A nearby-facility lookup is in flight.
    pub is_fetching_hospitals: bool,

    /// The latest known server record of the current episode's event.
    pub current_event: Option<SosEvent>,

    /// Last known position, reused by `prepare` and `refresh_hospitals`.
    pub user_position: Option<Position>,

    /// Last known nearby facilities, in the order the service returned them.
    pub hospitals: Vec<Hospital>,

    /// Most recent user-facing failure.
    pub error_message: Option<String>,

    /// The primary contact has been called this episode.
    pub has_contacted_primary: bool,
}
