//! Host implementations of the device collaborators.
//!
//! On a workstation there is no location sensor or phone: the position
//! comes from flags or config, and "calling" runs a configurable command
//! (by default `xdg-open tel:<number>`, which hands off to whatever
//! handles `tel:` links).

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, SosError};
use crate::model::Position;
use crate::ports::{ContactLauncher, Permission, PositionProvider};

/// Reports a known, fixed position.
///
/// With no coordinates the location service reads as disabled.
pub struct FixedLocator {
    coordinates: Option<(f64, f64)>,
}

impl FixedLocator {
    pub fn new(coordinates: Option<(f64, f64)>) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl PositionProvider for FixedLocator {
    async fn is_service_enabled(&self) -> bool {
        self.coordinates.is_some()
    }

    async fn permission(&self) -> Permission {
        Permission::Always
    }

    async fn request_permission(&self) -> Permission {
        Permission::Always
    }

    async fn current_position(&self) -> Result<Position> {
        let (latitude, longitude) = self
            .coordinates
            .ok_or(SosError::LocationServiceDisabled)?;
        Ok(Position::now(latitude, longitude))
    }
}

/// Opens the dialer by running a command template.
pub struct DialerLauncher {
    template: Vec<String>,
}

impl DialerLauncher {
    /// `template` is a program and its arguments; `{number}` in any of them
    /// is replaced with the phone number.
    pub fn new(template: Vec<String>) -> Self {
        Self { template }
    }

    fn command_for(&self, phone: &str) -> Option<(String, Vec<String>)> {
        let mut parts = self
            .template
            .iter()
            .map(|part| part.replace("{number}", phone));
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}

#[async_trait]
impl ContactLauncher for DialerLauncher {
    async fn call(&self, phone: &str) -> bool {
        let Some((program, args)) = self.command_for(phone) else {
            warn!("no dialer configured");
            return false;
        };

        debug!(%program, ?args, "opening dialer");
        match Command::new(&program)
            .args(&args)
            .kill_on_drop(true)
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(e) => {
                warn!(%program, "failed to run dialer: {e}");
                false
            }
        }
    }
}
