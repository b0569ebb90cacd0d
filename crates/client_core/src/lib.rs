use shared::{domain::EventTag, protocol::RsvpResponse};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

mod form;
mod transport;

pub use form::{FormError, GuestEntry, GuestUpdate, RsvpForm, SubmitBlocker, SubmitStatus};
pub use transport::{HttpRsvpTransport, RsvpTransport};

pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected server response (status {status})")]
    UnexpectedResponse { status: u16 },
    #[error("{0}")]
    Rejected(String),
}

impl ClientError {
    /// Text shown next to the submit button.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::UnexpectedResponse { status } => {
                format!("Unexpected response from the server (status {status}). Please try again.")
            }
            ClientError::Rejected(error) => error.clone(),
            ClientError::Form(err) => err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Changed(RsvpForm),
    Submitted { message: String },
    SubmitFailed { error: String },
}

/// Owns the form state and drives submissions through a transport.
///
/// Every mutation publishes a [`FormEvent::Changed`] snapshot to subscribers.
pub struct FormController<T: RsvpTransport> {
    transport: T,
    form: Mutex<RsvpForm>,
    events: broadcast::Sender<FormEvent>,
}

impl<T: RsvpTransport> FormController<T> {
    pub fn new(transport: T) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            transport,
            form: Mutex::new(RsvpForm::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> RsvpForm {
        self.form.lock().await.clone()
    }

    pub async fn can_submit(&self) -> bool {
        self.form.lock().await.can_submit()
    }

    pub async fn add_guest(&self) -> usize {
        let mut form = self.form.lock().await;
        let index = form.add_guest();
        self.publish_changed(&form);
        index
    }

    pub async fn remove_guest(&self, index: usize) -> Result<GuestEntry, FormError> {
        let mut form = self.form.lock().await;
        let removed = form.remove_guest(index)?;
        self.publish_changed(&form);
        Ok(removed)
    }

    pub async fn update_guest(&self, index: usize, update: GuestUpdate) -> Result<(), FormError> {
        let mut form = self.form.lock().await;
        form.update_guest(index, update)?;
        self.publish_changed(&form);
        Ok(())
    }

    pub async fn toggle_event(&self, index: usize, tag: EventTag) -> Result<bool, FormError> {
        let mut form = self.form.lock().await;
        let selected = form.toggle_event(index, tag)?;
        self.publish_changed(&form);
        Ok(selected)
    }

    /// Sends the current named guests once. On success the form is reset and
    /// the server's message returned; on failure every entry is kept and the
    /// error's user-facing text is recorded in the status.
    pub async fn submit(&self) -> Result<String, ClientError> {
        let submission = {
            let mut form = self.form.lock().await;
            let submission = form.begin_submit()?;
            self.publish_changed(&form);
            submission
        };
        let guests = submission.guests.len();

        let result = self
            .transport
            .send(&submission)
            .await
            .and_then(|response| match response {
                RsvpResponse::Success { message } => Ok(message),
                RsvpResponse::Failure { error } => Err(ClientError::Rejected(error)),
            });

        let mut form = self.form.lock().await;
        match &result {
            Ok(message) => {
                info!(guests, "rsvp submitted");
                form.finish_success(message.clone());
                self.publish_changed(&form);
                let _ = self.events.send(FormEvent::Submitted {
                    message: message.clone(),
                });
            }
            Err(err) => {
                warn!(guests, error = %err, "rsvp submission failed");
                let error = err.user_message();
                form.finish_failure(error.clone());
                self.publish_changed(&form);
                let _ = self.events.send(FormEvent::SubmitFailed { error });
            }
        }
        result
    }

    fn publish_changed(&self, form: &RsvpForm) {
        let _ = self.events.send(FormEvent::Changed(form.clone()));
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
