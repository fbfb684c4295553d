use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug, Clone)]
#[command(name = "kairos-pulse", about = "Live status dashboard for the Kairos agent")]
pub struct Args {
    /// Base URL of the status provider (serves /status, /start, /stop).
    #[arg(long, env = "KAIROS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    #[arg(long, env = "KAIROS_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
    #[arg(long, env = "KAIROS_REQUEST_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,
    /// Directory for kairos-pulse.log; empty disables file logging.
    #[arg(long, env = "KAIROS_LOG_DIR", default_value = "")]
    pub log_dir: String,
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid api url {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub poll_interval: Duration,
    pub countdown_interval: Duration,
    pub request_timeout: Duration,
    pub log_dir: Option<PathBuf>,
    pub debug: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(&args.api_url)?;
        if args.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "poll interval",
            });
        }
        if args.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "request timeout",
            });
        }
        let log_dir = match args.log_dir.trim() {
            "" => None,
            dir => Some(PathBuf::from(dir)),
        };
        Ok(Self {
            api_url,
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            countdown_interval: COUNTDOWN_INTERVAL,
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            log_dir,
            debug: args.debug,
        })
    }

    /// Absolute URL for a provider path such as `/status`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            countdown_interval: COUNTDOWN_INTERVAL,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            log_dir: None,
            debug: false,
        }
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|err| ConfigError::InvalidApiUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(api_url: &str) -> Args {
        Args {
            api_url: api_url.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            log_dir: String::new(),
            debug: false,
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = Config::from_args(args("http://127.0.0.1:8000/api/")).expect("config");
        assert_eq!(config.api_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.endpoint("/status"), "http://127.0.0.1:8000/api/status");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = Config::from_args(args("ftp://example.com")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));
        assert!(Config::from_args(args("not a url")).is_err());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let mut raw = args(DEFAULT_API_URL);
        raw.poll_interval_ms = 0;
        assert_eq!(
            Config::from_args(raw).unwrap_err(),
            ConfigError::ZeroInterval {
                name: "poll interval"
            }
        );
    }

    #[test]
    fn parses_cli_flags() {
        let args = Args::try_parse_from([
            "kairos-pulse",
            "--api-url",
            "https://agent.example/api",
            "--poll-interval-ms",
            "2500",
            "--log-dir",
            "/tmp/kairos",
        ])
        .expect("parse");
        let config = Config::from_args(args).expect("config");
        assert_eq!(config.poll_interval, Duration::from_millis(2_500));
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/kairos")));
    }
}
