use crate::provider::ProviderError;
use kairos_core::{AgentAction, NotificationKind, NotificationQueue};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, warn};

pub const STARTED_MESSAGE: &str = "Kairos Agent Started Successfully";
pub const STOPPED_MESSAGE: &str = "Kairos Agent Stopped";
pub const START_FAILED_MESSAGE: &str = "Failed to start agent";
pub const STOP_FAILED_MESSAGE: &str = "Failed to stop agent";

/// Tracks start/stop commands and turns their outcome into operator feedback.
///
/// The controller never writes agent state: `running` only changes when the
/// refresh it requests lands.
#[derive(Debug, Default)]
pub struct AgentController {
    in_flight: HashSet<AgentAction>,
}

impl AgentController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `action` as sent. Returns `false` if the same action is still
    /// awaiting a reply.
    pub fn begin(&mut self, action: AgentAction) -> bool {
        self.in_flight.insert(action)
    }

    pub fn is_pending(&self, action: AgentAction) -> bool {
        self.in_flight.contains(&action)
    }

    /// Records the reply, enqueues the notification, and reports whether an
    /// immediate status refresh is due.
    pub fn finish(
        &mut self,
        action: AgentAction,
        result: &Result<(), ProviderError>,
        notifications: &mut NotificationQueue,
        now: Instant,
    ) -> bool {
        self.in_flight.remove(&action);
        match result {
            Ok(()) => {
                info!("agent_command_ok: action={action}");
                notifications.enqueue(success_message(action), NotificationKind::Success, now);
                true
            }
            Err(err) => {
                warn!("agent_command_error: action={action} error={err}");
                notifications.enqueue(failure_message(action), NotificationKind::Failure, now);
                false
            }
        }
    }
}

pub fn success_message(action: AgentAction) -> &'static str {
    match action {
        AgentAction::Start => STARTED_MESSAGE,
        AgentAction::Stop => STOPPED_MESSAGE,
    }
}

pub fn failure_message(action: AgentAction) -> &'static str {
    match action {
        AgentAction::Start => START_FAILED_MESSAGE,
        AgentAction::Stop => STOP_FAILED_MESSAGE,
    }
}
