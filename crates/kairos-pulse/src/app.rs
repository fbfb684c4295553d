use crate::controller::AgentController;
use crate::provider::ProviderError;
use chrono::{DateTime, Local};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use kairos_core::display::explorer_url;
use kairos_core::{
    AgentAction, AgentState, DashboardState, NotificationQueue, PollOutcome, RequestSeq, Trade,
};
use std::time::Instant;
use tracing::{debug, warn};

/// What the operator asked for; carried out by the session runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    None,
    Quit,
    Refresh,
    Command(AgentAction),
    Open(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollHealth {
    pub last_success: Option<DateTime<Local>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub stale_discarded: u64,
}

pub struct App {
    pub api_url: String,
    pub dashboard: DashboardState,
    pub notifications: NotificationQueue,
    pub controller: AgentController,
    pub poll_health: PollHealth,
    pub selected_trade: usize,
    pub help_open: bool,
    pub status_note: Option<String>,
}

impl App {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            dashboard: DashboardState::new(),
            notifications: NotificationQueue::new(),
            controller: AgentController::new(),
            poll_health: PollHealth::default(),
            selected_trade: 0,
            help_open: false,
            status_note: None,
        }
    }

    pub fn agent(&self) -> &AgentState {
        self.dashboard.agent()
    }

    /// Applies a poll completion. Failures keep the last good snapshot.
    pub fn apply_status(
        &mut self,
        seq: RequestSeq,
        result: Result<AgentState, ProviderError>,
        at: DateTime<Local>,
    ) {
        match result {
            Ok(snapshot) => match self.dashboard.apply_poll(seq, snapshot) {
                PollOutcome::Applied => {
                    self.poll_health.last_success = Some(at);
                    self.poll_health.consecutive_failures = 0;
                    self.poll_health.last_error = None;
                    self.clamp_trade_selection();
                }
                PollOutcome::Stale { applied } => {
                    debug!("status_poll_stale: seq={seq} applied={applied}");
                    self.poll_health.stale_discarded += 1;
                }
            },
            Err(err) => {
                warn!("status_poll_error: seq={seq} error={err}");
                self.poll_health.consecutive_failures += 1;
                self.poll_health.last_error = Some(err.to_string());
            }
        }
    }

    pub fn tick_countdown(&mut self) -> bool {
        self.dashboard.tick_countdown()
    }

    pub fn expire_notifications(&mut self, now: Instant) -> usize {
        self.notifications.expire(now)
    }

    /// Dismisses the visible notification at `position` (0 = oldest shown).
    pub fn dismiss_visible(&mut self, position: usize) -> bool {
        let Some(id) = self.notifications.visible().get(position).map(|note| note.id) else {
            return false;
        };
        self.notifications.dismiss(id)
    }

    pub fn dismiss_newest(&mut self) -> bool {
        let Some(id) = self.notifications.visible().last().map(|note| note.id) else {
            return false;
        };
        self.notifications.dismiss(id)
    }

    pub fn move_trade_selection(&mut self, delta: isize) {
        let total = self.agent().recent_trades.len();
        if total == 0 {
            self.selected_trade = 0;
            return;
        }
        let max = total as isize - 1;
        let next = (self.selected_trade as isize + delta).clamp(0, max);
        self.selected_trade = next as usize;
    }

    pub fn selected_trade(&self) -> Option<&Trade> {
        self.agent().recent_trades.get(self.selected_trade)
    }

    pub fn selected_trade_url(&self) -> Option<String> {
        let trade = self.selected_trade()?;
        explorer_url(&trade.network, &trade.tx_hash)
    }

    /// One-line poll summary for the status bar.
    pub fn poll_summary(&self) -> String {
        let health = &self.poll_health;
        match (&health.last_error, health.last_success) {
            (Some(err), Some(at)) => format!(
                "last poll failed ({err}); holding snapshot from {}",
                at.format("%H:%M:%S")
            ),
            (Some(err), None) => format!("waiting for provider ({err})"),
            (None, Some(at)) => format!("synced {}", at.format("%H:%M:%S")),
            (None, None) => "connecting...".to_string(),
        }
    }

    fn clamp_trade_selection(&mut self) {
        let total = self.agent().recent_trades.len();
        if self.selected_trade >= total {
            self.selected_trade = total.saturating_sub(1);
        }
    }
}

pub fn handle_input(event: Event, app: &mut App) -> Intent {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(key, app),
        _ => Intent::None,
    }
}

pub fn handle_key(key: KeyEvent, app: &mut App) -> Intent {
    if matches!(key.code, KeyCode::Char('?') | KeyCode::F(1)) {
        app.help_open = !app.help_open;
        return Intent::None;
    }
    if key.code == KeyCode::Esc && app.help_open {
        app.help_open = false;
        return Intent::None;
    }
    if app.help_open {
        return Intent::None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Intent::Quit,
        KeyCode::Char('s') => Intent::Command(AgentAction::Start),
        KeyCode::Char('x') => Intent::Command(AgentAction::Stop),
        KeyCode::Enter | KeyCode::Char(' ') => {
            Intent::Command(AgentAction::toggle_for(app.agent().running))
        }
        KeyCode::Char('r') => Intent::Refresh,
        KeyCode::Char(digit @ '1'..='3') => {
            let position = digit as usize - '1' as usize;
            app.dismiss_visible(position);
            Intent::None
        }
        KeyCode::Char('d') => {
            app.dismiss_newest();
            Intent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_trade_selection(1);
            Intent::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_trade_selection(-1);
            Intent::None
        }
        KeyCode::Char('g') => {
            app.selected_trade = 0;
            Intent::None
        }
        KeyCode::Char('o') => match app.selected_trade_url() {
            Some(url) => Intent::Open(url),
            None => {
                app.status_note = Some("no explorer link for the selected trade".to_string());
                Intent::None
            }
        },
        _ => Intent::None,
    }
}
