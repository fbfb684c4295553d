//! Session runtime: the timers and in-flight provider requests behind one
//! dashboard session.
//!
//! Everything runs on a single task. Timers and request completions surface
//! as [`Wake`] values and are applied to the [`App`] one at a time, so state
//! is never touched concurrently. Requests run in a [`JoinSet`] and are
//! aborted when the session shuts down.

use crate::app::{App, Intent};
use crate::config::Config;
use crate::provider::{ProviderError, StatusProvider};
use chrono::Local;
use kairos_core::{AgentAction, AgentState, RequestSeq, SequenceCounter};
use std::collections::HashMap;
use std::future;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tokio::task::{self, JoinSet};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Result of one provider request, tagged with what was asked.
#[derive(Debug)]
pub enum Completion {
    Status {
        seq: RequestSeq,
        result: Result<AgentState, ProviderError>,
    },
    Command {
        action: AgentAction,
        result: Result<(), ProviderError>,
    },
}

#[derive(Debug)]
pub enum Wake {
    PollDue,
    CountdownTick,
    NotificationDeadline,
    Completed(task::Id, Completion),
    RequestAborted { id: task::Id, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<P: StatusProvider + 'static> {
    provider: Arc<P>,
    app: App,
    requests: JoinSet<Completion>,
    commands: HashMap<task::Id, AgentAction>,
    sequence: SequenceCounter,
    poll_ticker: Interval,
    countdown_ticker: Interval,
}

impl<P: StatusProvider + 'static> Session<P> {
    /// Must be called inside a tokio runtime. The first poll fires
    /// immediately, the first countdown tick one interval later.
    pub fn new(provider: Arc<P>, config: &Config) -> Self {
        let mut poll_ticker = time::interval(config.poll_interval);
        poll_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let countdown_ticker = time::interval_at(
            Instant::now() + config.countdown_interval,
            config.countdown_interval,
        );
        Self {
            provider,
            app: App::new(config.api_url.clone()),
            requests: JoinSet::new(),
            commands: HashMap::new(),
            sequence: SequenceCounter::new(),
            poll_ticker,
            countdown_ticker,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn in_flight(&self) -> usize {
        self.requests.len()
    }

    /// Waits for the next timer or request completion. Cancel safe: dropping
    /// the future loses no wake-up.
    pub async fn next_wake(&mut self) -> Wake {
        let deadline = self
            .app
            .notifications
            .next_deadline()
            .map(Instant::from_std);
        tokio::select! {
            _ = self.poll_ticker.tick() => Wake::PollDue,
            _ = self.countdown_ticker.tick() => Wake::CountdownTick,
            _ = sleep_until_deadline(deadline) => Wake::NotificationDeadline,
            Some(joined) = self.requests.join_next_with_id() => match joined {
                Ok((id, completion)) => Wake::Completed(id, completion),
                Err(err) => Wake::RequestAborted {
                    id: err.id(),
                    reason: err.to_string(),
                },
            },
        }
    }

    pub fn apply_wake(&mut self, wake: Wake) {
        match wake {
            Wake::PollDue => self.request_status(),
            Wake::CountdownTick => {
                self.app.tick_countdown();
            }
            Wake::NotificationDeadline => {
                let expired = self.app.expire_notifications(now());
                debug!("notifications_expired: count={expired}");
            }
            Wake::Completed(_, Completion::Status { seq, result }) => {
                self.app.apply_status(seq, result, Local::now());
            }
            Wake::Completed(id, Completion::Command { action, result }) => {
                self.commands.remove(&id);
                self.finish_command(action, result);
            }
            Wake::RequestAborted { id, reason } => {
                warn!("provider_request_aborted: {reason}");
                // A command task that never replied still has to release its action.
                if let Some(action) = self.commands.remove(&id) {
                    self.finish_command(action, Err(ProviderError::TaskFailed(reason)));
                }
            }
        }
    }

    fn finish_command(&mut self, action: AgentAction, result: Result<(), ProviderError>) {
        let refresh = self.app.controller.finish(
            action,
            &result,
            &mut self.app.notifications,
            now(),
        );
        if refresh {
            self.request_status();
        }
    }

    pub fn apply_intent(&mut self, intent: Intent) -> Flow {
        match intent {
            Intent::None => {}
            Intent::Quit => return Flow::Quit,
            Intent::Refresh => {
                self.app.status_note = Some("refresh requested".to_string());
                self.request_status();
            }
            Intent::Command(action) => self.request_command(action),
            Intent::Open(url) => {
                self.app.status_note = Some(match open_external(&url) {
                    Ok(()) => format!("opened {url}"),
                    Err(err) => {
                        warn!("open_url_error: url={url} error={err}");
                        format!("could not open {url}: {err}")
                    }
                });
            }
        }
        Flow::Continue
    }

    /// Issues one `GET /status`, tagged with a fresh sequence number.
    pub fn request_status(&mut self) {
        let seq = self.sequence.issue();
        let provider = Arc::clone(&self.provider);
        debug!("status_poll_issued: seq={seq}");
        self.requests.spawn(async move {
            let result = provider.fetch_status().await;
            Completion::Status { seq, result }
        });
    }

    pub fn request_command(&mut self, action: AgentAction) {
        if !self.app.controller.begin(action) {
            self.app.status_note = Some(format!("{action} already in progress"));
            return;
        }
        info!("agent_command_issued: action={action}");
        self.app.status_note = Some(format!("{action} requested"));
        let provider = Arc::clone(&self.provider);
        let handle = self.requests.spawn(async move {
            let result = provider.send_command(action).await;
            Completion::Command { action, result }
        });
        self.commands.insert(handle.id(), action);
    }

    /// Cancels every in-flight request. Timers stop with the session; the
    /// `JoinSet` also aborts its tasks if the session is dropped without this.
    pub fn shutdown(&mut self) {
        let pending = self.requests.len();
        self.requests.abort_all();
        self.commands.clear();
        info!("session_shutdown: aborted_requests={pending}");
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending::<()>().await,
    }
}

fn open_external(url: &str) -> Result<(), String> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    Command::new(opener)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|err| format!("{opener} not available ({err})"))
}
