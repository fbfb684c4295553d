//! Formatting rules shared by every view of the dashboard.

use crate::{LogLevel, Network, TradeStatus};

pub const POLYGON_EXPLORER_TX: &str = "https://amoy.polygonscan.com/tx/";
pub const HEDERA_EXPLORER_TX: &str = "https://hashscan.io/testnet/transaction/";
/// Rendered in place of a link when the network has no explorer.
pub const EXPLORER_PLACEHOLDER: &str = "#";

/// Semantic colour slot; views map it onto their own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Warn,
    Critical,
    Neutral,
}

/// `m:ss` countdown, e.g. `125 -> "2:05"`.
pub fn format_time(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{mins}:{secs:02}")
}

/// Signed profit with four decimals: `+0.0000`, `-0.5000`.
pub fn format_profit(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    if value >= 0.0 {
        // abs() folds -0.0 into +0.0000.
        format!("+{:.4}", value.abs())
    } else {
        format!("{value:.4}")
    }
}

pub fn profit_tone(value: f64) -> Tone {
    if !value.is_finite() || value >= 0.0 {
        Tone::Ok
    } else {
        Tone::Critical
    }
}

pub fn explorer_url(network: &Network, tx_hash: &str) -> Option<String> {
    match network {
        Network::Polygon => Some(format!("{POLYGON_EXPLORER_TX}{tx_hash}")),
        Network::Hedera => Some(format!("{HEDERA_EXPLORER_TX}{tx_hash}")),
        Network::Unknown(_) => None,
    }
}

pub fn log_tone(level: &LogLevel) -> Tone {
    match level {
        LogLevel::Error => Tone::Critical,
        LogLevel::Warning => Tone::Warn,
        LogLevel::Success => Tone::Ok,
        LogLevel::Info | LogLevel::Unknown(_) => Tone::Neutral,
    }
}

pub fn trade_status_tone(status: &TradeStatus) -> Tone {
    match status {
        TradeStatus::Confirmed => Tone::Ok,
        TradeStatus::Pending => Tone::Warn,
        TradeStatus::Failed | TradeStatus::Unknown(_) => Tone::Critical,
    }
}

pub fn activity_label(running: bool) -> &'static str {
    if running {
        "ACTIVE"
    } else {
        "INACTIVE"
    }
}

/// Countdown text, shown only while the agent runs.
pub fn countdown_label(running: bool, seconds: u64) -> Option<String> {
    running.then(|| format_time(seconds))
}
