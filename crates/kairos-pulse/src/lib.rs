//! Terminal dashboard for the Kairos trading agent.
//!
//! Polls the agent's status provider, keeps a local countdown between polls,
//! and shows start/stop feedback as short-lived notifications.

pub mod app;
pub mod config;
pub mod controller;
pub mod logging;
pub mod provider;
pub mod runtime;
pub mod theme;
pub mod ui;

pub use app::{App, Intent};
pub use config::{Args, Config, ConfigError};
pub use provider::{HttpStatusProvider, ProviderError, StatusProvider};
pub use runtime::{Completion, Flow, Session, Wake};
