use std::{collections::BTreeSet, str::FromStr};

use client_core::GuestUpdate;
use shared::domain::EventTag;
use thiserror::Error;

/// A guest given on the command line as
/// `First|Last|accept|ceremony+reception|dietary notes`.
///
/// The event list and dietary notes may be omitted; both are ignored for
/// `decline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestSpec {
    pub first_name: String,
    pub last_name: String,
    pub rsvp: bool,
    pub events_attending: BTreeSet<EventTag>,
    pub dietary_requirements: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuestSpecError {
    #[error("expected First|Last|accept|events|dietary, got '{0}'")]
    Shape(String),
    #[error("attendance must be accept or decline, got '{0}'")]
    Attendance(String),
    #[error("unknown event '{0}'")]
    Event(String),
}

impl FromStr for GuestSpec {
    type Err = GuestSpecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
        if !(3..=5).contains(&parts.len()) {
            return Err(GuestSpecError::Shape(raw.to_string()));
        }

        let rsvp = match parts[2].to_ascii_lowercase().as_str() {
            "accept" | "yes" => true,
            "decline" | "no" => false,
            other => return Err(GuestSpecError::Attendance(other.to_string())),
        };

        let mut events_attending = BTreeSet::new();
        if rsvp {
            for tag in parts.get(3).into_iter().flat_map(|list| list.split('+')) {
                let tag = tag.trim();
                if tag.is_empty() {
                    continue;
                }
                let parsed = tag
                    .parse::<EventTag>()
                    .map_err(|_| GuestSpecError::Event(tag.to_string()))?;
                events_attending.insert(parsed);
            }
        }

        Ok(Self {
            first_name: parts[0].to_string(),
            last_name: parts[1].to_string(),
            rsvp,
            events_attending,
            dietary_requirements: if rsvp {
                parts.get(4).copied().unwrap_or_default().to_string()
            } else {
                String::new()
            },
        })
    }
}

impl GuestSpec {
    /// Form edits that fill a blank entry with this guest.
    pub fn updates(&self) -> Vec<GuestUpdate> {
        let mut updates = vec![
            GuestUpdate::FirstName(self.first_name.clone()),
            GuestUpdate::LastName(self.last_name.clone()),
            GuestUpdate::Rsvp(self.rsvp),
        ];
        if self.rsvp {
            updates.push(GuestUpdate::EventsAttending(self.events_attending.clone()));
            updates.push(GuestUpdate::DietaryRequirements(
                self.dietary_requirements.clone(),
            ));
        }
        updates
    }
}

#[cfg(test)]
#[path = "tests/guest_spec_tests.rs"]
mod tests;
