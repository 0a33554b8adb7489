//! Output formatting for CLI display.

use crate::model::{Contact, Hospital, SosEvent, SosState, SosStatus};

pub(super) fn format_hospital(hospital: &Hospital) -> String {
    format!(
        "{:>5.1} km  {}  ({:.4}, {:.4})",
        hospital.distance_km, hospital.name, hospital.latitude, hospital.longitude
    )
}

pub(super) fn format_contact(contact: &Contact, primary: bool) -> String {
    let short_id = &contact.id.to_string()[..8];
    let marker = if primary { "  [primary]" } else { "" };
    format!("{short_id}  {}  {}{marker}", contact.name, contact.phone)
}

pub(super) fn format_event(event: &SosEvent) -> String {
    let status = match event.status {
        SosStatus::Triggered => "sent, waiting for a responder",
        SosStatus::Acknowledged => "acknowledged",
        SosStatus::OnTheWay => "help is on the way",
        SosStatus::Resolved => "resolved",
    };
    match &event.ambulance {
        Some(ambulance) => format!("SOS #{}: {status} (ambulance {})", event.id, ambulance.id),
        None => format!("SOS #{}: {status}", event.id),
    }
}

/// One line summarizing where the session stands.
pub(super) fn format_progress(state: &SosState) -> String {
    let mut line = match &state.current_event {
        Some(event) => format_event(event),
        None if state.is_sending => "Sending SOS...".to_string(),
        None => "No SOS sent".to_string(),
    };
    if state.is_contacting {
        line.push_str(" | calling primary contact");
    } else if state.has_contacted_primary {
        line.push_str(" | primary contact called");
    }
    if let Some(message) = &state.error_message {
        line.push_str(" | ");
        line.push_str(message);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    use uuid::Uuid;

    use crate::model::Ambulance;

    fn sample_event(status: SosStatus) -> SosEvent {
        SosEvent {
            id: 12,
            user_id: "guest".into(),
            latitude: 12.97,
            longitude: 77.59,
            emergency_type: "Medical".into(),
            status,
            timestamp: None,
            ambulance: None,
        }
    }

    #[test]
    fn hospital_line() {
        let hospital = Hospital {
            id: 1,
            name: "City General".into(),
            latitude: 12.98,
            longitude: 77.6,
            distance_km: 1.2,
        };
        assert_eq!(
            format_hospital(&hospital),
            "  1.2 km  City General  (12.9800, 77.6000)"
        );
    }

    #[test]
    fn primary_contact_is_marked() {
        let contact = Contact {
            id: Uuid::nil(),
            name: "Asha".into(),
            phone: "+919800000001".into(),
        };
        assert_eq!(
            format_contact(&contact, true),
            "00000000  Asha  +919800000001  [primary]"
        );
        assert!(!format_contact(&contact, false).contains("primary"));
    }

    #[test]
    fn event_with_ambulance() {
        let mut event = sample_event(SosStatus::OnTheWay);
        event.ambulance = Some(Ambulance {
            id: "AMB-417".into(),
            latitude: None,
            longitude: None,
        });
        assert_eq!(
            format_event(&event),
            "SOS #12: help is on the way (ambulance AMB-417)"
        );
    }

    #[test]
    fn progress_before_send() {
        assert_eq!(format_progress(&SosState::default()), "No SOS sent");
    }

    #[test]
    fn progress_includes_contact_and_error() {
        let state = SosState {
            current_event: Some(sample_event(SosStatus::Acknowledged)),
            has_contacted_primary: true,
            error_message: Some("SOS service error: timeout".into()),
            ..SosState::default()
        };
        assert_eq!(
            format_progress(&state),
            "SOS #12: acknowledged | primary contact called | SOS service error: timeout"
        );
    }
}
