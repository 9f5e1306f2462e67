use crate::config::Settings;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Unknown or missing levels fall back to `info`.
    pub fn parse_lossy(level: Option<&str>) -> Self {
        match level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("debug") => LogLevel::Debug,
            Some("warn") | Some("warning") => LogLevel::Warn,
            Some("error") => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire format of the remote sink.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub dt: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
}

impl LogRecord {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            dt: Utc::now(),
            message: message.into(),
            level,
        }
    }
}

/// Forwards log records to a remote HTTP sink with bearer authentication.
///
/// Delivery never fails outward: every record is also written to the local
/// `tracing` output when the sink is missing or rejects it.
pub struct LogRelay {
    client: reqwest::Client,
    endpoint: Option<String>,
    token: Option<String>,
}

impl LogRelay {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(settings.http_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.logtail_url.clone(),
            token: settings.logtail_token.clone(),
        })
    }

    /// A relay that only writes locally.
    pub fn local_only() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: None,
            token: None,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Send one record. Returns `true` when the sink accepted it, or when no
    /// sink is configured and the record went to the local log instead.
    pub async fn send(&self, message: &str, level: LogLevel) -> bool {
        let record = LogRecord::new(message, level);

        let Some(endpoint) = self.endpoint.as_deref() else {
            emit_locally(&record);
            return true;
        };

        let mut request = self.client.post(endpoint).json(&record);
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!(
                    status = %response.status(),
                    "Failed to send log to remote sink"
                );
                emit_locally(&record);
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Error sending log to remote sink");
                emit_locally(&record);
                false
            }
        }
    }

    /// Fire-and-forget variant for server-side events.
    pub fn spawn_send(self: &Arc<Self>, message: impl Into<String>, level: LogLevel) {
        let relay = Arc::clone(self);
        let message = message.into();
        tokio::spawn(async move {
            relay.send(&message, level).await;
        });
    }
}

fn emit_locally(record: &LogRecord) {
    match record.level {
        LogLevel::Debug => tracing::debug!(target: "remote_log", dt = %record.dt, "{}", record.message),
        LogLevel::Info => tracing::info!(target: "remote_log", dt = %record.dt, "{}", record.message),
        LogLevel::Warn => tracing::warn!(target: "remote_log", dt = %record.dt, "{}", record.message),
        LogLevel::Error => tracing::error!(target: "remote_log", dt = %record.dt, "{}", record.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, header, method},
        Mock, MockServer, ResponseTemplate,
    };

    fn relay_for(url: String) -> LogRelay {
        LogRelay {
            client: reqwest::Client::new(),
            endpoint: Some(url),
            token: Some("sink-token".to_string()),
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(LogLevel::parse_lossy(Some("ERROR")), LogLevel::Error);
        assert_eq!(LogLevel::parse_lossy(Some("warning")), LogLevel::Warn);
        assert_eq!(LogLevel::parse_lossy(Some("verbose")), LogLevel::Info);
        assert_eq!(LogLevel::parse_lossy(None), LogLevel::Info);
    }

    #[tokio::test]
    async fn test_local_only_counts_as_delivered() {
        assert!(LogRelay::local_only().send("hello", LogLevel::Debug).await);
    }

    #[tokio::test]
    async fn test_forwards_record_with_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sink-token"))
            .and(body_partial_json(serde_json::json!({
                "message": "Patient chart opened",
                "level": "warn"
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relay = relay_for(mock_server.uri());
        assert!(relay.send("Patient chart opened", LogLevel::Warn).await);
    }

    #[tokio::test]
    async fn test_sink_rejection_is_reported_not_raised() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let relay = relay_for(mock_server.uri());
        assert!(!relay.send("boom", LogLevel::Error).await);
    }

    #[tokio::test]
    async fn test_unreachable_sink_is_reported_not_raised() {
        let relay = relay_for("http://127.0.0.1:9".to_string());
        assert!(!relay.send("nobody listening", LogLevel::Info).await);
    }
}
