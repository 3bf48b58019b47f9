use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use folio_base::FolioResult;

use crate::message::{ContactMessage, ContactSubmission};

/// Backend address used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Message reported for failures where no response was received.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

/// The `{ success, message }` reply of the contact route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Reply of `GET /api/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageListing {
    pub success: bool,
    pub count: usize,
    pub messages: Vec<ContactMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct MessageCount {
    count: usize,
}

/// Why an API call did not produce a successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// The backend answered with an error status or an unusable body.
    Server { status: u16, message: Option<String> },
    /// No response was received.
    Network { detail: String },
}

impl ApiFailure {
    /// The message the backend put in its reply, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiFailure::Server { message, .. } => message.as_deref(),
            ApiFailure::Network { .. } => None,
        }
    }

    /// Message suitable for display: the backend's message, or "Network error".
    pub fn message(&self) -> &str {
        match self {
            ApiFailure::Server { message, status } => message
                .as_deref()
                .unwrap_or_else(|| http_reason(*status)),
            ApiFailure::Network { .. } => NETWORK_ERROR_MESSAGE,
        }
    }
}

fn http_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unexpected response")
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::Server { status, .. } => write!(f, "{} (HTTP {})", self.message(), status),
            ApiFailure::Network { detail } => write!(f, "{}: {}", NETWORK_ERROR_MESSAGE, detail),
        }
    }
}

impl std::error::Error for ApiFailure {}

/// Request seam between the contact form and the backend.
pub trait ContactApi: fmt::Debug + Send + Sync {
    /// Post a submission to `/api/contact`.
    fn send_message(&self, submission: &ContactSubmission) -> Result<ApiReply, ApiFailure>;
}

/// Blocking HTTP client for the contact backend.
#[derive(Debug, Clone)]
pub struct HttpContactApi {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpContactApi {
    pub fn new(base_url: impl Into<String>) -> FolioResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| folio_base::err!("Failed to create HTTP client: {}", e))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch all stored messages, newest first.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub fn get_messages(&self) -> Result<MessageListing, ApiFailure> {
        let response = self
            .client
            .get(self.url("/api/messages"))
            .send()
            .map_err(network_failure)?;
        read_reply(response)
    }

    /// Fetch the number of stored messages.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub fn get_message_count(&self) -> Result<usize, ApiFailure> {
        let response = self
            .client
            .get(self.url("/api/messages/count"))
            .send()
            .map_err(network_failure)?;
        read_reply::<MessageCount>(response).map(|reply| reply.count)
    }
}

impl ContactApi for HttpContactApi {
    #[instrument(skip(self, submission), fields(base_url = %self.base_url))]
    fn send_message(&self, submission: &ContactSubmission) -> Result<ApiReply, ApiFailure> {
        let response = self
            .client
            .post(self.url("/api/contact"))
            .json(submission)
            .send()
            .map_err(network_failure)?;
        read_reply(response)
    }
}

fn network_failure(error: reqwest::Error) -> ApiFailure {
    debug!(error = %error, "request failed without a response");
    ApiFailure::Network {
        detail: error.to_string(),
    }
}

/* 📖 # Why read error bodies as ApiReply?

Every failure of the backend carries `{ success: false, message }`. The message is
what the form shows, so it is pulled out of any non-success body. Bodies that are not
JSON (e.g. from a proxy) leave the message empty and the caller falls back to its
default text.
*/
fn read_reply<T: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T, ApiFailure> {
    let status = response.status();
    let body = response.bytes().map_err(network_failure)?;
    if status.is_success() {
        serde_json::from_slice(&body).map_err(|e| {
            debug!(error = %e, "unexpected reply body");
            ApiFailure::Server {
                status: status.as_u16(),
                message: None,
            }
        })
    } else {
        let message = serde_json::from_slice::<ApiReply>(&body)
            .ok()
            .and_then(|reply| reply.message);
        Err(ApiFailure::Server {
            status: status.as_u16(),
            message,
        })
    }
}
