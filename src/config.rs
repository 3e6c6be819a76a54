//! Server configuration.
//!
//! Loaded from an optional YAML file (`HTTPD_CONFIG`) with every field
//! defaulted, then overridden by the `LISTEN` environment variable.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listening endpoint binds to
    pub listen_addr: String,

    /// Value of the `Server` response header
    pub name: String,

    /// Access log path; `None` disables the log sink
    pub access_log: Option<String>,
}

/// Buffer capacities and timing of the connection core.
///
/// Every parsed request field is bounded by one of these; a request that
/// exceeds a capacity is rejected rather than truncated.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Bytes read from a connection per dispatch
    pub message_buffer: usize,
    pub method: usize,
    pub target: usize,
    pub query: usize,
    pub cookie: usize,
    pub body: usize,
    /// Rendered HTML page
    pub page: usize,
    /// Size of the connection table
    pub connections: usize,
    pub idle_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            name: concat!("httpd/", env!("CARGO_PKG_VERSION")).to_string(),
            access_log: Some("httpd.log".to_string()),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            message_buffer: 512,
            method: 8,
            target: 100,
            query: 1000,
            cookie: 1000,
            body: 6000,
            page: 99999,
            connections: 5,
            idle_timeout_ms: 10_000,
            poll_interval_ms: 5_000,
        }
    }
}

impl Limits {
    /// Time a connection may stay without a successful read.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Maximum time one readiness wait blocks.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        let sizes = [
            ("message_buffer", self.message_buffer),
            ("method", self.method),
            ("target", self.target),
            ("page", self.page),
            ("connections", self.connections),
        ];

        for (name, value) in sizes {
            if value == 0 {
                anyhow::bail!("limits.{} must be greater than zero", name);
            }
        }

        if self.poll_interval_ms == 0 {
            anyhow::bail!("limits.poll_interval_ms must be greater than zero");
        }

        Ok(())
    }
}

impl Config {
    /// Loads the configuration from `HTTPD_CONFIG` (if set) and the environment.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var("HTTPD_CONFIG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::from_yaml(&text)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = addr;
        }

        Ok(cfg)
    }

    /// Parses a YAML document; missing fields keep their defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(text).context("parsing YAML config")?;
        cfg.limits.validate()?;
        Ok(cfg)
    }

    /// Rebinds the listening endpoint to all interfaces on `port`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.listen_addr = format!("0.0.0.0:{}", port);
        self
    }
}
