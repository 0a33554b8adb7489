//! Hospital: a nearby medical facility as reported by the SOS service.

use serde::{Deserialize, Serialize};

/// A nearby medical facility.
///
/// Sourced entirely from the backend response; never constructed locally
/// except in tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Distance from the user's position, in kilometers.
    pub distance_km: f64,
}
