//! Emergency contacts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person to call when an SOS goes out.
///
/// Contacts are kept in an ordered list; the first one is the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,

    /// Dialable number, E.164 or close to it.
    pub phone: String,
}
