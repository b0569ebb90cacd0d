use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownEventTag;

/// Sub-events a guest can attend. Each one owns a 0/1 column in the guest sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    Ceremony,
    Reception,
}

impl EventTag {
    pub const ALL: [EventTag; 2] = [EventTag::Ceremony, EventTag::Reception];

    pub fn as_str(self) -> &'static str {
        match self {
            EventTag::Ceremony => "ceremony",
            EventTag::Reception => "reception",
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventTag {
    type Err = UnknownEventTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownEventTag(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Accept,
    Decline,
}

impl RsvpStatus {
    pub fn from_flag(accepting: bool) -> Self {
        if accepting {
            RsvpStatus::Accept
        } else {
            RsvpStatus::Decline
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RsvpStatus::Accept => "accept",
            RsvpStatus::Decline => "decline",
        }
    }
}

/// One invitee's answer as it travels between the form and the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub first_name: String,
    pub last_name: String,
    pub rsvp: bool,
    #[serde(default)]
    pub events_attending: BTreeSet<EventTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_requirements: Option<String>,
}

impl Guest {
    /// Both name fields hold something other than whitespace.
    pub fn is_named(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }

    pub fn attends(&self, tag: EventTag) -> bool {
        self.rsvp && self.events_attending.contains(&tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpSubmission {
    pub guests: Vec<Guest>,
}

pub const NO_DIETARY_REQUIREMENTS: &str = "None";
pub const NOT_APPLICABLE: &str = "N/A";

/// Flattened guest record, one per spreadsheet row (columns A..G).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub timestamp: String,
    pub first_name: String,
    pub last_name: String,
    pub rsvp: RsvpStatus,
    pub ceremony: u8,
    pub reception: u8,
    pub dietary_requirements: String,
}

impl SheetRow {
    pub fn from_guest(guest: &Guest, timestamp: &str) -> Self {
        let dietary_requirements = if guest.rsvp {
            guest
                .dietary_requirements
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .unwrap_or(NO_DIETARY_REQUIREMENTS)
                .to_string()
        } else {
            NOT_APPLICABLE.to_string()
        };

        Self {
            timestamp: timestamp.to_string(),
            first_name: guest.first_name.clone(),
            last_name: guest.last_name.clone(),
            rsvp: RsvpStatus::from_flag(guest.rsvp),
            ceremony: u8::from(guest.attends(EventTag::Ceremony)),
            reception: u8::from(guest.attends(EventTag::Reception)),
            dietary_requirements,
        }
    }

    /// Cell values in sheet column order.
    pub fn cells(&self) -> Vec<serde_json::Value> {
        vec![
            self.timestamp.clone().into(),
            self.first_name.clone().into(),
            self.last_name.clone().into(),
            self.rsvp.as_str().into(),
            self.ceremony.into(),
            self.reception.into(),
            self.dietary_requirements.clone().into(),
        ]
    }
}

/// ISO-8601 UTC stamp shared by every row of one submission.
pub fn batch_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
