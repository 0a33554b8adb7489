//! SOS orchestration: turn a distress tap into a located, submitted,
//! tracked emergency, with nearby facilities and a call to the primary
//! contact.
//!
//! An [`Orchestrator`] lives for one SOS session. Its state is owned by a
//! dedicated task (see `owner`); the handle's operations do their I/O on
//! the caller's task and report each step to the owner as a transition.
//! Observers follow along through [`Orchestrator::subscribe`].
//!
//! Failure handling differs per operation:
//!
//! - `prepare`, `refresh_hospitals`, and status checks record the failure
//!   in `error_message` and return normally.
//! - `trigger` records the failure and also returns it.
//! - The contact step is advisory: failures are logged and nothing else.

mod owner;
mod transition;


use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::error::{Operation, Result, SosError};
use crate::locate;
use crate::model::{Hospital, NewSosEvent, Position, SosEvent, SosState};
use crate::ports::{
    AuthContext, ContactLauncher, EmergencyContactStore, PositionProvider, SosBackend,
};

use owner::{Message, Owner};
use transition::Transition;

/// The collaborators an orchestrator drives.
pub struct Collaborators {
    pub locator: Box<dyn PositionProvider>,
    pub backend: Box<dyn SosBackend>,
    pub contacts: Box<dyn EmergencyContactStore>,
    pub launcher: Box<dyn ContactLauncher>,
    pub auth: Box<dyn AuthContext>,
}

/// Timing and identity knobs.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Time between status checks while an event is open.
    pub poll_interval: Duration,

    /// Upper bound on any single collaborator call.
    pub call_timeout: Duration,

    /// User id submitted when nobody is signed in.
    pub guest_id: String,
}

/// Shortest accepted poll interval; anything below is raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            call_timeout: Duration::from_secs(15),
            guest_id: "guest".to_string(),
        }
    }
}

/// Handle to one SOS session.
///
/// Dropping the handle ends the session, same as [`Orchestrator::dispose`].
pub struct Orchestrator {
    shared: Arc<Shared>,
    /// The latest episode's background contact step.
    contact_step: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Start a session. Must be called from within a tokio runtime.
    ///
    /// A poll interval below [`MIN_POLL_INTERVAL`] is raised to it.
    pub fn new(collaborators: Collaborators, mut settings: Settings) -> Self {
        if settings.poll_interval < MIN_POLL_INTERVAL {
            warn!(
                requested = ?settings.poll_interval,
                "poll interval too short, using {MIN_POLL_INTERVAL:?}"
            );
            settings.poll_interval = MIN_POLL_INTERVAL;
        }

        let (outbox, inbox) = mpsc::unbounded_channel();
        let (publish, state) = watch::channel(SosState::default());

        let shared = Arc::new(Shared {
            collaborators,
            settings,
            outbox,
            state,
        });
        tokio::spawn(Owner::new(inbox, publish, Arc::downgrade(&shared)).run());

        Self {
            shared,
            contact_step: Mutex::new(None),
        }
    }

    /// Follow state changes. Intermediate states may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<SosState> {
        self.shared.state.clone()
    }

    /// The latest published state.
    pub fn state(&self) -> SosState {
        self.shared.state.borrow().clone()
    }

    /// Locate the user and load nearby facilities, unless already located.
    pub async fn prepare(&self) {
        match self
            .shared
            .apply(Transition::HospitalsRequested {
                skip_if_located: true,
            })
            .await
        {
            Ok(true) => self.shared.load_hospitals(None).await,
            Ok(false) => debug!("position cached, skipping prepare"),
            Err(_) => {}
        }
    }

    /// Reload nearby facilities, reusing the cached position if there is one.
    pub async fn refresh_hospitals(&self) {
        let cached = self.state().user_position;
        if let Ok(true) = self
            .shared
            .apply(Transition::HospitalsRequested {
                skip_if_located: false,
            })
            .await
        {
            self.shared.load_hospitals(cached).await;
        }
    }

    /// Send an SOS from a freshly read position.
    ///
    /// On success a new episode begins: status polling starts and the
    /// primary contact is called in the background. Returns the event as
    /// the service recorded it.
    ///
    /// # Errors
    ///
    /// [`SosError::TriggerInFlight`] if a submission is already under way;
    /// otherwise whatever stopped the submission (location or service).
    pub async fn trigger(&self, emergency_type: &str) -> Result<SosEvent> {
        if !self.shared.apply(Transition::SendStarted).await? {
            return Err(SosError::TriggerInFlight);
        }

        match self.shared.submit(emergency_type).await {
            Ok((event, position)) => {
                info!(event_id = event.id, emergency_type, "SOS submitted");
                self.shared
                    .apply(Transition::EventCreated {
                        event: event.clone(),
                        position,
                    })
                    .await?;

                let shared = Arc::clone(&self.shared);
                let event_id = event.id;
                let step = tokio::spawn(async move { shared.contact_primary(event_id).await });
                *self
                    .contact_step
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(step);

                Ok(event)
            }
            Err(err) => {
                warn!(%err, "SOS submission failed");
                self.shared
                    .apply(Transition::SendFailed(err.to_string()))
                    .await?;
                Err(err)
            }
        }
    }

    /// Check the current event's status now, outside the poll schedule.
    ///
    /// Does nothing when there is no open event.
    pub async fn poll_once(&self) {
        let Some(event) = self.state().current_event else {
            return;
        };
        if event.is_resolved() {
            return;
        }
        let _ = self.shared.check_status(event.id).await;
    }

    /// Call the primary contact of the current episode, once per episode.
    ///
    /// Runs automatically after a successful trigger. Does nothing when no
    /// SOS has been sent.
    pub async fn contact_primary(&self) {
        let Some(event) = self.state().current_event else {
            return;
        };
        self.shared.contact_primary(event.id).await;
    }

    /// Wait for the contact step started by the latest trigger to finish.
    ///
    /// Returns at once if no trigger has succeeded or the step already
    /// finished. The step is bounded by the call timeout.
    pub async fn contact_step_done(&self) {
        let step = self
            .contact_step
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(step) = step
            && let Err(err) = step.await
        {
            warn!(%err, "contact step did not finish");
        }
    }

    /// End the session: stop polling and refuse further operations.
    pub fn dispose(&self) {
        // Already gone if the owner has exited.
        let _ = self.shared.outbox.send(Message::Shutdown);
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// What operations, the poller, and background steps share.
struct Shared {
    collaborators: Collaborators,
    settings: Settings,
    outbox: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<SosState>,
}

impl Shared {
    /// Hand a transition to the owner and wait until it has been applied.
    async fn apply(&self, transition: Transition) -> Result<bool> {
        let (reply, accepted) = oneshot::channel();
        self.outbox
            .send(Message::Apply(transition, reply))
            .map_err(|_| SosError::Disposed)?;
        accepted.await.map_err(|_| SosError::Disposed)
    }

    /// Run a collaborator call under the call timeout.
    async fn bounded<T>(
        &self,
        operation: Operation,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        time::timeout(self.settings.call_timeout, call)
            .await
            .map_err(|_| SosError::Timeout { operation })?
    }

    async fn locate(&self) -> Result<Position> {
        locate::acquire(
            self.collaborators.locator.as_ref(),
            self.settings.call_timeout,
        )
        .await
    }

    async fn load_hospitals(&self, cached: Option<Position>) {
        let transition = match self.fetch_hospitals(cached).await {
            Ok((position, hospitals)) => {
                debug!(count = hospitals.len(), "loaded nearby hospitals");
                Transition::HospitalsLoaded {
                    position,
                    hospitals,
                }
            }
            Err(err) => {
                warn!(%err, "hospital lookup failed");
                Transition::HospitalsFailed(err.to_string())
            }
        };
        let _ = self.apply(transition).await;
    }

    async fn fetch_hospitals(&self, cached: Option<Position>) -> Result<(Position, Vec<Hospital>)> {
        let position = match cached {
            Some(position) => position,
            None => self.locate().await?,
        };
        let hospitals = self
            .bounded(
                Operation::FetchHospitals,
                self.collaborators
                    .backend
                    .nearby_hospitals(position.latitude, position.longitude),
            )
            .await?;
        Ok((position, hospitals))
    }

    async fn submit(&self, emergency_type: &str) -> Result<(SosEvent, Position)> {
        let position = self.locate().await?;
        let user_id = self
            .collaborators
            .auth
            .current_user_id()
            .unwrap_or_else(|| self.settings.guest_id.clone());

        let request = NewSosEvent {
            user_id,
            latitude: position.latitude,
            longitude: position.longitude,
            emergency_type: emergency_type.to_string(),
        };
        let event = self
            .bounded(
                Operation::CreateEvent,
                self.collaborators.backend.create_event(&request),
            )
            .await?;
        Ok((event, position))
    }

    /// One status check for event `id`. Returns whether it is now resolved.
    ///
    /// A failed check is recorded, not returned: only a closed session
    /// is an error here.
    async fn check_status(&self, id: u64) -> Result<bool> {
        let fetched = self
            .bounded(
                Operation::FetchStatus,
                self.collaborators.backend.event_status(id),
            )
            .await;

        match fetched {
            Ok(event) => {
                let resolved = event.is_resolved();
                self.apply(Transition::StatusReceived(event)).await?;
                Ok(resolved)
            }
            Err(err) => {
                warn!(event_id = id, %err, "status check failed");
                self.apply(Transition::StatusFailed {
                    id,
                    message: err.to_string(),
                })
                .await?;
                Ok(false)
            }
        }
    }

    /// The contact step for episode `event_id`. Failures are only logged.
    async fn contact_primary(&self, event_id: u64) {
        let contacts = match self
            .bounded(
                Operation::ListContacts,
                self.collaborators.contacts.contacts(),
            )
            .await
        {
            Ok(contacts) => contacts,
            Err(err) => {
                warn!(%err, "could not read emergency contacts");
                return;
            }
        };

        // First in the list is the primary.
        let Some(primary) = contacts.first() else {
            debug!("no emergency contacts");
            return;
        };

        if !matches!(
            self.apply(Transition::ContactStarted { event_id }).await,
            Ok(true)
        ) {
            return;
        }

        let opened = time::timeout(
            self.settings.call_timeout,
            self.collaborators.launcher.call(&primary.phone),
        )
        .await
        .unwrap_or(false);

        if opened {
            info!(contact = %primary.name, "called primary contact");
        } else {
            warn!(contact = %primary.name, "could not open dialer for primary contact");
        }
        let _ = self
            .apply(Transition::ContactFinished { event_id, opened })
            .await;
    }
}
