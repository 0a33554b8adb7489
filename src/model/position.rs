//! Position: a single reading of the device's coordinates.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Geographic coordinates captured from the device.
///
/// Immutable once read. A fresh reading is a new `Position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,

    /// When the reading was taken.
    pub captured_at: Timestamp,
}

impl Position {
    /// A reading taken now.
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            captured_at: Timestamp::now(),
        }
    }
}
