//! Collaborator contracts consumed by the orchestrator.
//!
//! Each trait is the narrow surface of something outside the SOS core:
//! the device's location service, the remote SOS service, the local
//! contact list, the phone dialer, and the signed-in user.
//! The CLI wires in host implementations; tests wire in fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Contact, Hospital, NewSosEvent, Position, SosEvent};

/// Location permission as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Never asked.
    Undetermined,

    /// Refused for now; asking again may succeed.
    Denied,

    /// Refused permanently; only the system settings can change it.
    DeniedForever,

    /// Granted while the app is in use.
    WhileInUse,

    /// Granted unconditionally.
    Always,
}

impl Permission {
    pub fn is_denied(self) -> bool {
        matches!(self, Self::Denied | Self::DeniedForever)
    }
}

/// The device's location service.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Whether the location service is switched on.
    async fn is_service_enabled(&self) -> bool;

    /// The current permission, without prompting.
    async fn permission(&self) -> Permission;

    /// Prompt the user for permission and return the answer.
    async fn request_permission(&self) -> Permission;

    /// Read the sensor.
    async fn current_position(&self) -> Result<Position>;
}

/// The remote SOS service.
#[async_trait]
pub trait SosBackend: Send + Sync {
    /// Open a new emergency. The returned event is unresolved.
    async fn create_event(&self, event: &NewSosEvent) -> Result<SosEvent>;

    /// Fetch the latest record of an event.
    async fn event_status(&self, id: u64) -> Result<SosEvent>;

    /// Facilities near the given coordinates, nearest-first or as the service orders them.
    async fn nearby_hospitals(&self, latitude: f64, longitude: f64) -> Result<Vec<Hospital>>;
}

/// The locally persisted, user-ordered list of emergency contacts.
#[async_trait]
pub trait EmergencyContactStore: Send + Sync {
    /// All contacts, first = primary.
    async fn contacts(&self) -> Result<Vec<Contact>>;
}

/// The device's call interface.
#[async_trait]
pub trait ContactLauncher: Send + Sync {
    /// Try to open the dialer for `phone`. Returns whether it opened.
    async fn call(&self, phone: &str) -> bool;
}

/// Who is signed in, if anyone.
pub trait AuthContext: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}
