//! Beacon: emergency SOS orchestration.
//!
//! The [`orchestrator`] is the core. It drives the collaborators defined in
//! [`ports`]; the remaining modules are the host implementations and the
//! command-line front end.

pub mod backend;
pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod identity;
pub mod locate;
pub mod model;
pub mod orchestrator;
pub mod ports;
pub mod storage;
