use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const RSVP_ROUTE: &str = "/api/rsvp";

pub const RSVP_ACCEPTED_MESSAGE: &str = "RSVP submitted successfully!";
pub const RSVP_FAILED_MESSAGE: &str = "Failed to submit RSVP. Please try again.";

/// Outcome of one submission. A batch either lands in full or not at all,
/// so there is no partial variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RsvpResponseBody", try_from = "RsvpResponseBody")]
pub enum RsvpResponse {
    Success { message: String },
    Failure { error: String },
}

impl RsvpResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Wire shape: `{success:true, message}` or `{success:false, error}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RsvpResponseBody {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("success response without a message")]
    MissingMessage,
    #[error("failure response without an error")]
    MissingError,
}

impl From<RsvpResponse> for RsvpResponseBody {
    fn from(value: RsvpResponse) -> Self {
        match value {
            RsvpResponse::Success { message } => Self {
                success: true,
                message: Some(message),
                error: None,
            },
            RsvpResponse::Failure { error } => Self {
                success: false,
                message: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<RsvpResponseBody> for RsvpResponse {
    type Error = MalformedResponse;

    fn try_from(value: RsvpResponseBody) -> Result<Self, Self::Error> {
        if value.success {
            value
                .message
                .map(|message| RsvpResponse::Success { message })
                .ok_or(MalformedResponse::MissingMessage)
        } else {
            value
                .error
                .map(|error| RsvpResponse::Failure { error })
                .ok_or(MalformedResponse::MissingError)
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
