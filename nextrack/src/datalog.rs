//! Request data logging
//!
//! Appends one JSON line per recommendation request to a data file for
//! offline analysis (model evaluation, experiment readouts). Logging
//! failures are reported through tracing but never fail the request.

use chrono::Utc;
use nextrack_common::Result;
use serde::Serialize;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// One logged request.
#[derive(Debug, Serialize)]
pub struct Datum {
    /// Wall-clock timestamp, milliseconds since the epoch.
    pub timestamp: i64,
    pub user: i64,
    pub track: i64,
    pub time: f64,
    /// Server-side processing latency in seconds.
    pub latency: f64,
    /// The recommendation produced; absent for session-end events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<i64>,
}

impl Datum {
    pub fn new(user: i64, track: i64, time: f64, latency: f64, recommendation: Option<i64>) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            user,
            track,
            time,
            latency,
            recommendation,
        }
    }
}

/// Append-only JSON-lines writer.
pub struct DataLogger {
    file: Mutex<File>,
}

impl DataLogger {
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Log one event. `event` names the endpoint ("next" or "last").
    pub async fn log(&self, event: &str, datum: Datum) {
        #[derive(Serialize)]
        struct Line<'a> {
            event: &'a str,
            #[serde(flatten)]
            datum: Datum,
        }

        let line = match serde_json::to_string(&Line { event, datum }) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize data log entry: {}", e);
                return;
            }
        };

        let mut file = self.file.lock().await;
        if let Err(e) = file.write_all(format!("{}\n", line).as_bytes()).await {
            warn!("Failed to write data log entry: {}", e);
        } else if let Err(e) = file.flush().await {
            warn!("Failed to flush data log entry: {}", e);
        }
    }
}
