//! SOS event types: what gets submitted and what the service reports back.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Emergency type used when the caller doesn't name one.
pub const DEFAULT_EMERGENCY_TYPE: &str = "Medical";

/// A request to open a new emergency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSosEvent {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub emergency_type: String,
}

/// The service's record of an emergency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosEvent {
    /// Assigned by the service; never changes for the life of the event.
    pub id: u64,
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub emergency_type: String,
    pub status: SosStatus,

    /// When the service recorded the event, if it said.
    pub timestamp: Option<Timestamp>,

    pub ambulance: Option<Ambulance>,
}

impl SosEvent {
    /// Whether the emergency has been closed out. Terminal.
    pub fn is_resolved(&self) -> bool {
        self.status == SosStatus::Resolved
    }
}

/// Where an emergency stands on the service side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SosStatus {
    /// Received, no responder yet.
    Triggered,

    /// A responder has been assigned.
    Acknowledged,

    /// The responder is en route.
    OnTheWay,

    /// Closed out.
    Resolved,
}

/// The responder assigned to an event, with its last reported location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ambulance {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: SosStatus) -> SosEvent {
        SosEvent {
            id: 7,
            user_id: "guest".into(),
            latitude: 12.97,
            longitude: 77.59,
            emergency_type: DEFAULT_EMERGENCY_TYPE.into(),
            status,
            timestamp: None,
            ambulance: None,
        }
    }

    #[test]
    fn only_resolved_status_is_resolved() {
        assert!(!event(SosStatus::Triggered).is_resolved());
        assert!(!event(SosStatus::Acknowledged).is_resolved());
        assert!(!event(SosStatus::OnTheWay).is_resolved());
        assert!(event(SosStatus::Resolved).is_resolved());
    }
}
