use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

pub mod display;
pub mod notifications;
pub mod session;

pub use notifications::{
    Notification, NotificationId, NotificationKind, NotificationQueue, NOTIFICATION_TTL,
    VISIBLE_NOTIFICATIONS,
};
pub use session::{DashboardState, PollOutcome, RequestSeq, SequenceCounter};

/// Full agent snapshot as served by `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub running: bool,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub next_run: String,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub time_until_next: u64,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub polygon_balance: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub hedera_balance: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub total_profit: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_list")]
    pub recent_trades: Vec<Trade>,
    #[serde(default, deserialize_with = "deserialize_lenient_list")]
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub id: String,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub status: TradeStatus,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub amount: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub profit: f64,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub tx_hash: String,
    #[serde(default, rename = "type", deserialize_with = "deserialize_optional_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub timestamp: String,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    Polygon,
    Hedera,
    Unknown(String),
}

impl Network {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "polygon" => Network::Polygon,
            "hedera" => Network::Hedera,
            _ => Network::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Network::Polygon => "polygon",
            Network::Hedera => "hedera",
            Network::Unknown(raw) => raw,
        }
    }

    /// Human label, first letter capitalized.
    pub fn label(&self) -> String {
        match self {
            Network::Polygon => "Polygon".to_string(),
            Network::Hedera => "Hedera".to_string(),
            Network::Unknown(raw) if raw.trim().is_empty() => "Unknown".to_string(),
            Network::Unknown(raw) => capitalize(raw.trim()),
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Unknown(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeStatus {
    Pending,
    Confirmed,
    Failed,
    Unknown(String),
}

impl TradeStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => TradeStatus::Pending,
            "confirmed" => TradeStatus::Confirmed,
            "failed" => TradeStatus::Failed,
            _ => TradeStatus::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Confirmed => "confirmed",
            TradeStatus::Failed => "failed",
            TradeStatus::Unknown(raw) => raw,
        }
    }
}

impl Default for TradeStatus {
    fn default() -> Self {
        TradeStatus::Unknown(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
    Unknown(String),
}

impl LogLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "info" => LogLevel::Info,
            "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            "success" => LogLevel::Success,
            _ => LogLevel::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Success => "success",
            LogLevel::Unknown(raw) => raw,
        }
    }

    /// Bracket tag shown in the log panel, e.g. `WARNING`.
    pub fn tag(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

macro_rules! label_serde {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = deserialize_text(deserializer)?;
                Ok(<$ty>::parse(&raw))
            }
        }
    };
}

label_serde!(Network);
label_serde!(TradeStatus);
label_serde!(LogLevel);

/// Start/stop commands accepted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentAction {
    Start,
    Stop,
}

impl AgentAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentAction::Start => "start",
            AgentAction::Stop => "stop",
        }
    }

    /// Provider path relative to the API base.
    pub fn path(self) -> &'static str {
        match self {
            AgentAction::Start => "/start",
            AgentAction::Stop => "/stop",
        }
    }

    /// Action offered by the toggle control for the given `running` flag.
    pub fn toggle_for(running: bool) -> Self {
        if running {
            AgentAction::Stop
        } else {
            AgentAction::Start
        }
    }
}

impl fmt::Display for AgentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = deserialize_text(deserializer)?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(number)) => number.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(text)) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    })
}

fn value_as_f64(value: Option<Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value_as_f64(value).unwrap_or(0.0))
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    if let Some(Value::Number(number)) = &value {
        if let Some(whole) = number.as_u64() {
            return Ok(whole);
        }
    }
    Ok(value_as_f64(value)
        .filter(|seconds| *seconds > 0.0)
        .map(|seconds| seconds as u64)
        .unwrap_or(0))
}

// Entries that fail to decode are dropped instead of failing the whole snapshot.
fn deserialize_lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_provider_snapshot() {
        let state: AgentState = serde_json::from_value(json!({
            "running": true,
            "nextRun": "12:05:00",
            "timeUntilNext": 125,
            "polygonBalance": "1.0",
            "hederaBalance": "880.0",
            "totalProfit": 0.35,
            "recentTrades": [{
                "id": "1",
                "network": "hedera",
                "type": "transfer",
                "amount": "10 HBAR",
                "profit": 0.3,
                "txHash": "0.0.6914928@1759014422.389000593",
                "timestamp": "2025-09-27 10:00:00",
                "status": "confirmed"
            }],
            "logs": [{
                "timestamp": "2025-09-27 10:00:00",
                "level": "success",
                "message": "Best arbitrage: Hedera"
            }]
        }))
        .expect("decode");

        assert!(state.running);
        assert_eq!(state.next_run, "12:05:00");
        assert_eq!(state.time_until_next, 125);
        assert_eq!(state.recent_trades.len(), 1);
        let trade = &state.recent_trades[0];
        assert_eq!(trade.network, Network::Hedera);
        assert_eq!(trade.status, TradeStatus::Confirmed);
        assert_eq!(trade.kind.as_deref(), Some("transfer"));
        assert_eq!(trade.tx_hash, "0.0.6914928@1759014422.389000593");
        assert_eq!(state.logs[0].level, LogLevel::Success);
    }

    #[test]
    fn unknown_labels_are_kept_verbatim() {
        let entry: LogEntry = serde_json::from_value(json!({
            "timestamp": "t",
            "level": "debug",
            "message": "m"
        }))
        .expect("decode");
        assert_eq!(entry.level, LogLevel::Unknown("debug".to_string()));
        assert_eq!(entry.level.tag(), "DEBUG");

        let trade: Trade = serde_json::from_value(json!({
            "id": 7,
            "network": "solana",
            "status": null,
            "profit": "-0.25"
        }))
        .expect("decode");
        assert_eq!(trade.id, "7");
        assert_eq!(trade.network, Network::Unknown("solana".to_string()));
        assert_eq!(trade.network.label(), "Solana");
        assert_eq!(trade.status, TradeStatus::Unknown(String::new()));
        assert_eq!(trade.profit, -0.25);
    }

    #[test]
    fn sparse_snapshot_falls_back_to_defaults() {
        let state: AgentState = serde_json::from_value(json!({
            "running": "true",
            "timeUntilNext": -12,
            "polygonBalance": null,
            "hederaBalance": 1000.5,
            "recentTrades": null,
            "logs": [42, {"level": "info", "message": "ok"}]
        }))
        .expect("decode");
        assert!(state.running);
        assert_eq!(state.time_until_next, 0);
        assert_eq!(state.polygon_balance, "");
        assert_eq!(state.hedera_balance, "1000.5");
        assert_eq!(state.total_profit, 0.0);
        assert!(state.recent_trades.is_empty());
        assert_eq!(state.logs.len(), 1);
        assert_eq!(state.logs[0].message, "ok");
    }

    #[test]
    fn fractional_countdown_is_truncated() {
        let state: AgentState =
            serde_json::from_value(json!({ "timeUntilNext": 59.9 })).expect("decode");
        assert_eq!(state.time_until_next, 59);
    }

    #[test]
    fn toggle_action_follows_running_flag() {
        assert_eq!(AgentAction::toggle_for(true), AgentAction::Stop);
        assert_eq!(AgentAction::toggle_for(false), AgentAction::Start);
        assert_eq!(AgentAction::Start.path(), "/start");
    }
}
