//! Errors surfaced by the SOS core.

use std::fmt;

/// Failures of an orchestrator operation or one of its collaborators.
///
/// An empty contact list is not an error; the contact step just skips.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SosError {
    #[error("location services are disabled")]
    LocationServiceDisabled,

    #[error("location permission denied")]
    LocationPermissionDenied,

    /// Network or server failure. Opaque; carries the transport's message.
    #[error("SOS service error: {0}")]
    Backend(String),

    #[error("contact store error: {0}")]
    Store(String),

    #[error("{operation} timed out")]
    Timeout { operation: Operation },

    #[error("an SOS is already being sent")]
    TriggerInFlight,

    #[error("SOS session has ended")]
    Disposed,
}

/// A collaborator call that can time out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Locate,
    CreateEvent,
    FetchStatus,
    FetchHospitals,
    ListContacts,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Locate => "location lookup",
            Self::CreateEvent => "SOS submission",
            Self::FetchStatus => "status check",
            Self::FetchHospitals => "hospital lookup",
            Self::ListContacts => "contact lookup",
        };
        f.write_str(name)
    }
}

pub type Result<T> = core::result::Result<T, SosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_names_the_operation() {
        let err = SosError::Timeout {
            operation: Operation::FetchHospitals,
        };
        assert_eq!(err.to_string(), "hospital lookup timed out");
    }

    #[test]
    fn service_disabled_message_mentions_disabled() {
        let msg = SosError::LocationServiceDisabled.to_string();
        assert!(msg.contains("disabled"));
    }
}
