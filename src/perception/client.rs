//! Vision-language service clients.
//!
//! The engine treats every reply as an untrusted string: transport errors
//! surface as `Err` and are absorbed at the tick boundary, while content
//! problems are the parser's job.

use super::frame::Frame;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Trait abstracting the external path-description service.
#[async_trait]
pub trait VisionQueryClient: Send + Sync {
    /// Describe the walkable path visible in the frame. The reply is
    /// free-form model output; callers must run it through the parser.
    async fn describe_path(&self, frame: &Frame) -> Result<String>;

    /// Human-readable name for logging.
    fn client_name(&self) -> &str;
}

// ============================================================================
// HTTP Bridge Client
// ============================================================================

/// HTTP client for a vision bridge endpoint.
///
/// POSTs the raw frame bytes with the guidance prompt as a query parameter
/// and expects the reply body to be the line protocol understood by
/// [`parser`](super::parser) — either as plain text or wrapped in
/// `{"text": "..."}`.
pub struct HttpVisionClient {
    client: reqwest::Client,
    endpoint: String,
    prompt: String,
}

/// JSON wrapper some bridge deployments put around the model reply.
#[derive(serde::Deserialize)]
struct BridgeReply {
    text: String,
}

impl HttpVisionClient {
    pub fn new(
        endpoint: impl Into<String>,
        prompt: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build vision HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            prompt: prompt.into(),
        })
    }
}

#[async_trait]
impl VisionQueryClient for HttpVisionClient {
    async fn describe_path(&self, frame: &Frame) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("prompt", self.prompt.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(frame.data.clone())
            .send()
            .await
            .context("vision request failed")?
            .error_for_status()
            .context("vision service returned an error status")?;

        let body = response
            .text()
            .await
            .context("vision reply was not readable text")?;

        // Accept both a bare reply and the {"text": ...} wrapper.
        let raw = match serde_json::from_str::<BridgeReply>(&body) {
            Ok(wrapped) => wrapped.text,
            Err(_) => body,
        };
        Ok(raw)
    }

    fn client_name(&self) -> &str {
        "http-bridge"
    }
}

// ============================================================================
// Scripted Client (simulation / replay)
// ============================================================================

/// Replays a fixed script of canned replies, cycling forever.
///
/// Used by `--simulate` so the binary runs end-to-end without a camera or a
/// vision service, and by tests that need deterministic replies.
pub struct ScriptedVisionClient {
    replies: Vec<String>,
    cursor: AtomicUsize,
}

impl ScriptedVisionClient {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies,
            cursor: AtomicUsize::new(0),
        }
    }

    /// A short walk: clear path, a routine obstacle, a critical hazard,
    /// and one garbled reply to exercise the parser's tolerance.
    pub fn demo_script() -> Self {
        Self::new(vec![
            "PATH_STATUS: clear\nOBSTACLES: none\nGUIDANCE: Path is clear, walk on.".to_string(),
            "PATH_STATUS: clear\nOBSTACLES: none\nGUIDANCE: Path is clear, walk on.".to_string(),
            "PATH_STATUS: caution\nOBSTACLES:\n- chair|2.5|left|medium\nGUIDANCE: Keep right."
                .to_string(),
            "PATH_STATUS: caution\nOBSTACLES:\n- chair|2.0|left|medium\n- bench|3.5|right|low\nGUIDANCE: Keep to the middle."
                .to_string(),
            "PATH_STATUS: blocked\nOBSTACLES:\n- table|0.8|center|critical\nGUIDANCE: Stop, go left."
                .to_string(),
            "sorry, I could not make out the scene".to_string(),
        ])
    }
}

#[async_trait]
impl VisionQueryClient for ScriptedVisionClient {
    async fn describe_path(&self, _frame: &Frame) -> Result<String> {
        if self.replies.is_empty() {
            return Ok(String::new());
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        Ok(self.replies[index].clone())
    }

    fn client_name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_client_cycles_through_replies() {
        let client = ScriptedVisionClient::new(vec!["a".to_string(), "b".to_string()]);
        let frame = Frame::new(vec![0u8; 4]);

        assert_eq!(client.describe_path(&frame).await.unwrap(), "a");
        assert_eq!(client.describe_path(&frame).await.unwrap(), "b");
        assert_eq!(client.describe_path(&frame).await.unwrap(), "a");
    }

    #[tokio::test]
    async fn empty_script_yields_empty_reply() {
        let client = ScriptedVisionClient::new(Vec::new());
        let frame = Frame::new(vec![0u8; 4]);
        assert_eq!(client.describe_path(&frame).await.unwrap(), "");
    }
}
