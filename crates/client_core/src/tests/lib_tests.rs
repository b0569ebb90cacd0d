use std::{collections::VecDeque, sync::Arc};

use super::*;
use async_trait::async_trait;
use shared::{
    domain::RsvpSubmission,
    protocol::{RSVP_ACCEPTED_MESSAGE, RSVP_FAILED_MESSAGE},
};
use tokio::sync::Notify;

enum Reply {
    Respond(RsvpResponse),
    Unexpected(u16),
}

struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    sent: Mutex<Vec<RsvpSubmission>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    fn gated(replies: Vec<Reply>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }
}

#[async_trait]
impl RsvpTransport for ScriptedTransport {
    async fn send(&self, submission: &RsvpSubmission) -> Result<RsvpResponse, ClientError> {
        self.sent.lock().await.push(submission.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.replies.lock().await.pop_front() {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Unexpected(status)) => Err(ClientError::UnexpectedResponse { status }),
            None => panic!("no scripted reply left"),
        }
    }
}

async fn fill_one_guest<T: RsvpTransport>(controller: &FormController<T>) {
    controller
        .update_guest(0, GuestUpdate::FirstName("Ann".into()))
        .await
        .unwrap();
    controller
        .update_guest(0, GuestUpdate::LastName("Lee".into()))
        .await
        .unwrap();
    controller.toggle_event(0, EventTag::Ceremony).await.unwrap();
}

#[tokio::test]
async fn successful_submit_resets_form_and_reports_message() {
    let controller = FormController::new(ScriptedTransport::new(vec![Reply::Respond(
        RsvpResponse::success(RSVP_ACCEPTED_MESSAGE),
    )]));
    fill_one_guest(&controller).await;
    let mut events = controller.subscribe();

    let message = controller.submit().await.unwrap();

    assert_eq!(message, RSVP_ACCEPTED_MESSAGE);
    let form = controller.snapshot().await;
    assert_eq!(form.guests(), RsvpForm::new().guests());
    assert_eq!(
        form.status(),
        &SubmitStatus::Succeeded(RSVP_ACCEPTED_MESSAGE.into())
    );

    let sent = controller.transport.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].guests[0].first_name, "Ann");

    let mut saw_submitting = false;
    let mut saw_submitted = false;
    while let Ok(event) = events.try_recv() {
        match event {
            FormEvent::Changed(form) if form.status().is_in_flight() => saw_submitting = true,
            FormEvent::Submitted { message } => {
                assert_eq!(message, RSVP_ACCEPTED_MESSAGE);
                saw_submitted = true;
            }
            _ => {}
        }
    }
    assert!(saw_submitting);
    assert!(saw_submitted);
}

#[tokio::test]
async fn server_failure_keeps_entries_and_surfaces_error() {
    let controller = FormController::new(ScriptedTransport::new(vec![
        Reply::Respond(RsvpResponse::failure(RSVP_FAILED_MESSAGE)),
        Reply::Respond(RsvpResponse::success(RSVP_ACCEPTED_MESSAGE)),
    ]));
    fill_one_guest(&controller).await;
    controller.add_guest().await;
    controller
        .update_guest(1, GuestUpdate::Rsvp(false))
        .await
        .unwrap();

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref text) if text == RSVP_FAILED_MESSAGE));
    let form = controller.snapshot().await;
    assert_eq!(form.guests().len(), 2);
    assert_eq!(form.guests()[0].first_name, "Ann");
    assert_eq!(
        form.status(),
        &SubmitStatus::Failed(RSVP_FAILED_MESSAGE.into())
    );
    assert!(controller.can_submit().await);

    // Resubmitting the same entries is allowed after a failure.
    controller.submit().await.unwrap();
    assert_eq!(controller.transport.sent.lock().await.len(), 2);
}

#[tokio::test]
async fn unexpected_response_is_reported_with_status() {
    let controller = FormController::new(ScriptedTransport::new(vec![Reply::Unexpected(502)]));
    fill_one_guest(&controller).await;

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedResponse { status: 502 }));
    match controller.snapshot().await.status() {
        SubmitStatus::Failed(text) => assert!(text.contains("502")),
        other => panic!("unexpected status {other:?}"),
    }
}

#[tokio::test]
async fn submit_refused_without_sending_when_disabled() {
    let controller = FormController::new(ScriptedTransport::new(Vec::new()));

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Form(FormError::SubmitBlocked(SubmitBlocker::NoNamedGuest))
    ));

    controller
        .update_guest(0, GuestUpdate::FirstName("Ann".into()))
        .await
        .unwrap();
    controller
        .update_guest(0, GuestUpdate::LastName("Lee".into()))
        .await
        .unwrap();
    let err = controller.submit().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Form(FormError::SubmitBlocked(SubmitBlocker::MissingEvents(_)))
    ));

    assert!(controller.transport.sent.lock().await.is_empty());
    assert_eq!(controller.snapshot().await.status(), &SubmitStatus::Idle);
}

#[tokio::test]
async fn second_submit_is_refused_while_first_is_in_flight() {
    let gate = Arc::new(Notify::new());
    let controller = Arc::new(FormController::new(ScriptedTransport::gated(
        vec![Reply::Respond(RsvpResponse::success(RSVP_ACCEPTED_MESSAGE))],
        gate.clone(),
    )));
    fill_one_guest(&*controller).await;
    let mut events = controller.subscribe();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    loop {
        if let FormEvent::Changed(form) = events.recv().await.unwrap() {
            if form.status().is_in_flight() {
                break;
            }
        }
    }

    assert!(!controller.can_submit().await);
    let err = controller.submit().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Form(FormError::SubmitBlocked(SubmitBlocker::InFlight))
    ));

    gate.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), RSVP_ACCEPTED_MESSAGE);
    assert_eq!(controller.transport.sent.lock().await.len(), 1);
}

#[tokio::test]
async fn edits_publish_snapshots() {
    let controller = FormController::new(ScriptedTransport::new(Vec::new()));
    let mut events = controller.subscribe();

    let index = controller.add_guest().await;
    controller.remove_guest(index).await.unwrap();
    assert_eq!(
        controller.remove_guest(0).await,
        Err(FormError::LastGuest)
    );

    match events.recv().await.unwrap() {
        FormEvent::Changed(form) => assert_eq!(form.guests().len(), 2),
        other => panic!("unexpected event {other:?}"),
    }
    match events.recv().await.unwrap() {
        FormEvent::Changed(form) => assert_eq!(form.guests().len(), 1),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.try_recv().is_err());
}

#[test]
fn rejection_text_is_shown_verbatim() {
    let err = ClientError::Rejected(
        "Invalid form data: guests[0].firstName must be a non-empty string".into(),
    );
    assert_eq!(
        err.user_message(),
        "Invalid form data: guests[0].firstName must be a non-empty string"
    );
    assert_eq!(
        NETWORK_ERROR_MESSAGE,
        "Network error. Please check your connection and try again."
    );
}
