//! Core data model for Beacon.
//!
//! Positions, facilities, contacts, SOS events, and the aggregate state
//! the orchestrator publishes.

mod contact;
mod event;
mod hospital;
mod position;
mod state;

pub use contact::Contact;
pub use event::{Ambulance, DEFAULT_EMERGENCY_TYPE, NewSosEvent, SosEvent, SosStatus};
pub use hospital::Hospital;
pub use position::Position;
pub use state::SosState;
