//! The task that owns `SosState`.
//!
//! Operations and the poller never touch the state directly: they send
//! transitions here and wait for the answer. The owner applies them one at
//! a time, publishes each new state, and starts or stops the poller.

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::model::SosState;

use super::Shared;
use super::transition::Transition;

pub(super) enum Message {
    Apply(Transition, oneshot::Sender<bool>),
    Shutdown,
}

pub(super) struct Owner {
    state: SosState,
    inbox: mpsc::UnboundedReceiver<Message>,
    publish: watch::Sender<SosState>,
    shared: Weak<Shared>,
    poller: Option<JoinHandle<()>>,
}

impl Owner {
    pub(super) fn new(
        inbox: mpsc::UnboundedReceiver<Message>,
        publish: watch::Sender<SosState>,
        shared: Weak<Shared>,
    ) -> Self {
        Self {
            state: SosState::default(),
            inbox,
            publish,
            shared,
            poller: None,
        }
    }

    pub(super) async fn run(mut self) {
        while let Some(message) = self.inbox.recv().await {
            match message {
                Message::Apply(transition, reply) => {
                    let new_episode = match &transition {
                        Transition::EventCreated { event, .. } => Some(event.id),
                        _ => None,
                    };

                    let accepted = transition.apply(&mut self.state);

                    if let Some(id) = new_episode
                        && self.state.is_polling
                    {
                        self.start_poller(id);
                    }
                    if !self.state.is_polling {
                        self.stop_poller();
                    }

                    self.publish.send_replace(self.state.clone());
                    // The sender may have given up waiting; the transition stands.
                    let _ = reply.send(accepted);
                }
                Message::Shutdown => break,
            }
        }

        self.stop_poller();
        if self.state.is_polling {
            Transition::PollingStopped.apply(&mut self.state);
            self.publish.send_replace(self.state.clone());
        }
        debug!("SOS session closed");
    }

    /// Start polling event `id`, replacing any running poller.
    fn start_poller(&mut self, id: u64) {
        self.stop_poller();
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        info!(event_id = id, "polling SOS status");
        self.poller = Some(tokio::spawn(poll(shared, id)));
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

/// Check the status of event `id` every poll interval until it resolves.
///
/// The first check happens one interval after start. Failed checks are
/// recorded and polling carries on.
async fn poll(shared: Arc<Shared>, id: u64) {
    let period = shared.settings.poll_interval;
    let mut ticks = time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;
        match shared.check_status(id).await {
            Ok(false) => {}
            Ok(true) => {
                info!(event_id = id, "SOS resolved");
                return;
            }
            Err(_) => return,
        }
    }
}
