//! Identity resolution for SOS submissions.
//!
//! The user an SOS is sent on behalf of is resolved through a chain:
//!
//! 1. `--as <user-id>` — explicit per-command override
//! 2. `BEACON_USER_ID` env var — process/session level
//! 3. `user-id` in `~/.beacon/config.toml`
//!
//! When none yields a value the orchestrator submits as the guest id.

use std::env;

use crate::ports::AuthContext;

/// The resolved signed-in user, or nobody.
pub struct SignedInUser(Option<String>);

impl SignedInUser {
    /// Resolve from the chain above.
    pub fn resolve(explicit: Option<&str>, configured: Option<&str>) -> Self {
        let from_env = env::var("BEACON_USER_ID").ok();
        Self(pick(explicit, from_env.as_deref(), configured))
    }
}

impl AuthContext for SignedInUser {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// First non-empty value in resolution order.
fn pick(explicit: Option<&str>, env: Option<&str>, configured: Option<&str>) -> Option<String> {
    [explicit, env, configured]
        .into_iter()
        .flatten()
        .find(|id| !id.is_empty())
        .map(String::from)
}
