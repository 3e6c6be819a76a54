//! Append-only access log.
//!
//! One entry per answered request:
//!
//! ```text
//! 2011-10-08T07:07:09Z : 127.0.0.1:51234 GET
//! /index?bg=red : 200
//! ```

use std::net::SocketAddr;
use std::time::SystemTime;

use anyhow::{Context, Result};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::http::date;
use crate::http::request::Method;
use crate::http::response::StatusCode;

pub struct AccessLog {
    file: Option<File>,
}

impl AccessLog {
    /// Opens (creating if needed) the log file for appending.
    pub async fn open(path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("opening access log {}", path))?;

        Ok(Self { file: Some(file) })
    }

    /// A sink that discards every entry.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub async fn record(
        &mut self,
        time: SystemTime,
        peer: SocketAddr,
        method: Method,
        target: &str,
        status: StatusCode,
    ) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        let entry = format_entry(time, peer, method, target, status);
        let written = async {
            file.write_all(entry.as_bytes()).await?;
            file.flush().await
        };

        if let Err(e) = written.await {
            tracing::warn!(error = %e, "failed to write access log entry");
        }
    }
}

pub fn format_entry(
    time: SystemTime,
    peer: SocketAddr,
    method: Method,
    target: &str,
    status: StatusCode,
) -> String {
    format!(
        "{} : {}:{} {}\n{} : {}\n",
        date::iso8601(time),
        peer.ip(),
        peer.port(),
        method,
        target,
        status.as_u16()
    )
}
