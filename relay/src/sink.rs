use async_trait::async_trait;
use reqwest::header;

use crate::api::RelayError;
use crate::event::LogRecord;

#[async_trait]
pub trait LogSink {
    async fn send(&self, record: LogRecord) -> Result<(), RelayError>;
}

/// Sink for local development: logs records instead of delivering them.
pub struct PrintSink {}

#[async_trait]
impl LogSink for PrintSink {
    async fn send(&self, record: LogRecord) -> Result<(), RelayError> {
        tracing::info!("record: {:?}", record);

        Ok(())
    }
}

#[derive(Clone)]
pub struct LogstashSink {
    client: reqwest::Client,
    endpoint: String,
}

impl LogstashSink {
    pub fn new(endpoint: String) -> anyhow::Result<LogstashSink> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent("github-push-relay")
            .build()?;

        Ok(LogstashSink { client, endpoint })
    }
}

#[async_trait]
impl LogSink for LogstashSink {
    async fn send(&self, record: LogRecord) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&record)
            .send()
            .await
            .map_err(|e| RelayError::ForwardError(e.to_string()))?;

        // Logstash answers non-2xx when ingestion fails; treat that the same
        // as a transport failure.
        response
            .error_for_status()
            .map_err(|e| RelayError::ForwardError(e.to_string()))?;

        Ok(())
    }
}
