//! Position acquisition policy shared by every orchestrator operation.
//!
//! 1. Location service off → `LocationServiceDisabled`.
//! 2. Permission never asked → ask once.
//! 3. Permission denied (now or forever) → `LocationPermissionDenied`.
//! 4. Otherwise read the sensor.
//!
//! No retries. The caller decides whether to ask the user to try again.
//!
//! Each device query is bounded by the caller's deadline. The permission
//! prompt in step 2 waits on the user and is not.

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::error::{Operation, Result, SosError};
use crate::model::Position;
use crate::ports::{Permission, PositionProvider};

/// Acquire the device's current position under the policy above.
pub async fn acquire(provider: &dyn PositionProvider, deadline: Duration) -> Result<Position> {
    if !within(deadline, provider.is_service_enabled()).await? {
        return Err(SosError::LocationServiceDisabled);
    }

    let mut permission = within(deadline, provider.permission()).await?;
    if permission == Permission::Undetermined {
        permission = provider.request_permission().await;
    }
    if permission.is_denied() {
        return Err(SosError::LocationPermissionDenied);
    }

    within(deadline, provider.current_position()).await?
}

async fn within<T>(deadline: Duration, query: impl Future<Output = T>) -> Result<T> {
    time::timeout(deadline, query)
        .await
        .map_err(|_| SosError::Timeout {
            operation: Operation::Locate,
        })
}
