use std::{collections::BTreeSet, fmt};

use shared::domain::{EventTag, Guest, RsvpSubmission};
use thiserror::Error;

/// One guest card on the form, as the user is filling it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestEntry {
    pub first_name: String,
    pub last_name: String,
    pub rsvp: bool,
    pub events_attending: BTreeSet<EventTag>,
    pub dietary_requirements: String,
}

impl Default for GuestEntry {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            rsvp: true,
            events_attending: BTreeSet::new(),
            dietary_requirements: String::new(),
        }
    }
}

impl GuestEntry {
    pub fn is_blank(&self) -> bool {
        self.first_name.trim().is_empty() && self.last_name.trim().is_empty()
    }

    pub fn is_named(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }

    pub fn needs_event(&self) -> bool {
        self.rsvp && self.events_attending.is_empty()
    }

    fn to_guest(&self) -> Guest {
        let dietary = self.dietary_requirements.trim();
        Guest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            rsvp: self.rsvp,
            events_attending: if self.rsvp {
                self.events_attending.clone()
            } else {
                BTreeSet::new()
            },
            dietary_requirements: (self.rsvp && !dietary.is_empty()).then(|| dietary.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestUpdate {
    FirstName(String),
    LastName(String),
    Rsvp(bool),
    EventsAttending(BTreeSet<EventTag>),
    DietaryRequirements(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded(String),
    Failed(String),
}

impl SubmitStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmitStatus::Submitting)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocker {
    NoNamedGuest,
    MissingEvents(Vec<usize>),
    InFlight,
}

impl fmt::Display for SubmitBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitBlocker::NoNamedGuest => {
                f.write_str("add at least one guest with a first and last name")
            }
            SubmitBlocker::MissingEvents(indices) => {
                let guests: Vec<String> = indices.iter().map(|i| (i + 1).to_string()).collect();
                write!(
                    f,
                    "select at least one event for guest {}",
                    guests.join(", ")
                )
            }
            SubmitBlocker::InFlight => f.write_str("a submission is already in progress"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("no guest at position {index} (form has {len})")]
    GuestOutOfRange { index: usize, len: usize },
    #[error("the form must keep at least one guest")]
    LastGuest,
    #[error("guest {index} has declined; events and dietary requirements cannot be set")]
    NotAttending { index: usize },
    #[error("submit is disabled: {0}")]
    SubmitBlocked(SubmitBlocker),
}

/// Client-side RSVP form state. All mutation goes through the methods below;
/// submit-enablement is recomputed from the current entries on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpForm {
    guests: Vec<GuestEntry>,
    status: SubmitStatus,
}

impl Default for RsvpForm {
    fn default() -> Self {
        Self {
            guests: vec![GuestEntry::default()],
            status: SubmitStatus::Idle,
        }
    }
}

impl RsvpForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guests(&self) -> &[GuestEntry] {
        &self.guests
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    /// Appends a blank guest and returns its index.
    pub fn add_guest(&mut self) -> usize {
        self.guests.push(GuestEntry::default());
        self.guests.len() - 1
    }

    pub fn remove_guest(&mut self, index: usize) -> Result<GuestEntry, FormError> {
        self.check_index(index)?;
        if self.guests.len() == 1 {
            return Err(FormError::LastGuest);
        }
        Ok(self.guests.remove(index))
    }

    pub fn update_guest(&mut self, index: usize, update: GuestUpdate) -> Result<(), FormError> {
        self.check_index(index)?;
        let guest = &mut self.guests[index];
        match update {
            GuestUpdate::FirstName(value) => guest.first_name = value,
            GuestUpdate::LastName(value) => guest.last_name = value,
            GuestUpdate::Rsvp(accepting) => {
                guest.rsvp = accepting;
                if !accepting {
                    guest.events_attending.clear();
                    guest.dietary_requirements.clear();
                }
            }
            GuestUpdate::EventsAttending(events) => {
                if !guest.rsvp && !events.is_empty() {
                    return Err(FormError::NotAttending { index });
                }
                guest.events_attending = events;
            }
            GuestUpdate::DietaryRequirements(value) => {
                if !guest.rsvp && !value.trim().is_empty() {
                    return Err(FormError::NotAttending { index });
                }
                guest.dietary_requirements = value;
            }
        }
        Ok(())
    }

    /// Flips one event for an accepting guest; returns whether it is now selected.
    pub fn toggle_event(&mut self, index: usize, tag: EventTag) -> Result<bool, FormError> {
        self.check_index(index)?;
        let guest = &mut self.guests[index];
        if !guest.rsvp {
            return Err(FormError::NotAttending { index });
        }
        if guest.events_attending.remove(&tag) {
            Ok(false)
        } else {
            guest.events_attending.insert(tag);
            Ok(true)
        }
    }

    /// Indices of accepting guests that have not picked an event yet.
    pub fn guests_missing_events(&self) -> Vec<usize> {
        self.guests
            .iter()
            .enumerate()
            .filter(|(_, guest)| guest.needs_event())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn submit_blocker(&self) -> Option<SubmitBlocker> {
        if self.status.is_in_flight() {
            return Some(SubmitBlocker::InFlight);
        }
        if !self.guests.iter().any(GuestEntry::is_named) {
            return Some(SubmitBlocker::NoNamedGuest);
        }
        let missing = self.guests_missing_events();
        if !missing.is_empty() {
            return Some(SubmitBlocker::MissingEvents(missing));
        }
        None
    }

    pub fn can_submit(&self) -> bool {
        self.submit_blocker().is_none()
    }

    /// Payload that would be sent right now: every entry except fully blank ones.
    pub fn submission(&self) -> RsvpSubmission {
        RsvpSubmission {
            guests: self
                .guests
                .iter()
                .filter(|guest| !guest.is_blank())
                .map(GuestEntry::to_guest)
                .collect(),
        }
    }

    /// Marks the form in flight and hands back the payload to send.
    pub fn begin_submit(&mut self) -> Result<RsvpSubmission, FormError> {
        if let Some(blocker) = self.submit_blocker() {
            return Err(FormError::SubmitBlocked(blocker));
        }
        let submission = self.submission();
        self.status = SubmitStatus::Submitting;
        Ok(submission)
    }

    /// Success resets the form to a single blank guest.
    pub fn finish_success(&mut self, message: impl Into<String>) {
        self.guests = vec![GuestEntry::default()];
        self.status = SubmitStatus::Succeeded(message.into());
    }

    /// Failure keeps every entry so the user can resubmit.
    pub fn finish_failure(&mut self, error: impl Into<String>) {
        self.status = SubmitStatus::Failed(error.into());
    }

    fn check_index(&self, index: usize) -> Result<(), FormError> {
        if index < self.guests.len() {
            Ok(())
        } else {
            Err(FormError::GuestOutOfRange {
                index,
                len: self.guests.len(),
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
