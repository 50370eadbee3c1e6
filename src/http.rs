// Shared plumbing for the blocking JSON clients

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use ureq::Body;
use ureq::http::Response;

const MAX_ERROR_BODY_CHARS: usize = 300;

/// Response status and body text of a completed request
#[derive(Debug)]
pub(crate) struct JsonReply {
    pub status: u16,
    pub body: String,
}

impl JsonReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable error from a failed call, preferring the API's own message
    pub fn error_message(&self) -> String {
        #[derive(Deserialize)]
        struct Nested {
            error: Detail,
        }
        #[derive(Deserialize)]
        struct Detail {
            message: String,
        }

        if let Ok(nested) = serde_json::from_str::<Nested>(&self.body) {
            return nested.error.message;
        }
        if let Ok(flat) = serde_json::from_str::<Detail>(&self.body) {
            return flat.message;
        }
        self.body.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}

/// Agent that hands every status code back to the caller
pub(crate) fn build_agent(timeout: Option<Duration>) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(timeout)
        .build()
        .into()
}

pub(crate) fn read_reply(
    response: Result<Response<Body>, ureq::Error>,
    what: &str,
) -> Result<JsonReply> {
    let mut response = response.with_context(|| format!("Failed to send {}", what))?;
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .with_context(|| format!("Failed to read {} response", what))?;
    Ok(JsonReply { status, body })
}
