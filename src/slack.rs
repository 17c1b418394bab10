//! Slack `chat.postMessage` client and the trait the dispatcher posts through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://slack.com";

/// Timeout applied to every request so a hung call cannot block the loop forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when posting a message.
#[derive(Debug, Error)]
pub enum PostError {
    /// Transport-level failure (connection, timeout, non-2xx status).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack accepted the request but rejected it (`ok: false`).
    #[error("slack api error: {code}")]
    Api {
        /// Slack's machine-readable error code, e.g. `channel_not_found`.
        code: String,
    },

    /// Slack reported success but the response carried no message timestamp.
    #[error("response missing message timestamp")]
    MissingTimestamp,
}

/// Opaque thread identifier: the `ts` of the parent message.
///
/// Posting a message with a `ThreadTs` attached nests it as a reply under
/// that parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadTs(String);

impl ThreadTs {
    /// Create a ThreadTs from a raw timestamp string.
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    /// Get the underlying string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ThreadTs {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ThreadTs {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ThreadTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A successfully posted message.
#[derive(Debug, Clone)]
pub struct PostedMessage {
    /// The timestamp of the posted message, usable as a thread identifier.
    pub ts: ThreadTs,
}

/// The messaging collaborator the dispatcher posts through.
///
/// Kept minimal so tests can substitute a recording fake; see
/// [`crate::testing::RecordingClient`].
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post one message to a channel, optionally as a reply in a thread.
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread: Option<&ThreadTs>,
    ) -> Result<PostedMessage, PostError>;
}

/// Slack Web API implementation of [`ChatClient`].
pub struct SlackClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

#[derive(Serialize)]
struct PostMessageBody<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    ts: Option<String>,
    error: Option<String>,
}

impl SlackClient {
    /// Create a client for the Slack Web API using a bearer token.
    pub fn new(token: impl Into<String>) -> Result<Self, PostError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (used by contract tests against a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ChatClient for SlackClient {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread: Option<&ThreadTs>,
    ) -> Result<PostedMessage, PostError> {
        let body = PostMessageBody {
            channel,
            text,
            thread_ts: thread.map(ThreadTs::as_str),
        };

        let response: PostMessageResponse = self
            .http
            .post(format!("{}/api/chat.postMessage", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(PostError::Api {
                code: response
                    .error
                    .unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        let ts = response.ts.ok_or(PostError::MissingTimestamp)?;
        Ok(PostedMessage {
            ts: ThreadTs::new(ts),
        })
    }
}
