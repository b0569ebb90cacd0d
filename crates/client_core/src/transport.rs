use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::RsvpSubmission,
    protocol::{RsvpResponse, RSVP_ROUTE},
};

use crate::ClientError;

/// Delivers one submission and returns the server's verdict.
#[async_trait]
pub trait RsvpTransport: Send + Sync {
    async fn send(&self, submission: &RsvpSubmission) -> Result<RsvpResponse, ClientError>;
}

pub struct HttpRsvpTransport {
    http: Client,
    server_url: String,
}

impl HttpRsvpTransport {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        Self {
            http,
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server_url, RSVP_ROUTE)
    }
}

#[async_trait]
impl RsvpTransport for HttpRsvpTransport {
    // Error statuses still carry a `{success: false, error}` body, so the
    // status code is not checked before decoding.
    async fn send(&self, submission: &RsvpSubmission) -> Result<RsvpResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(submission)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|_| ClientError::UnexpectedResponse { status })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
