use std::collections::BTreeSet;

use serde_json::{Map, Value};
use shared::{
    domain::{EventTag, Guest},
    error::{FieldViolation, ValidationErrors},
};

pub const MISSING_EVENT_MESSAGE: &str =
    "must include at least one event when accepting the invitation";

/// Guest as it looked on the wire, after the structural pass only.
#[derive(Debug)]
struct GuestShape {
    first_name: String,
    last_name: String,
    rsvp: bool,
    events_attending: Vec<String>,
    dietary_requirements: Option<String>,
}

/// Checks a decoded request body and returns the accepted guests in order.
///
/// The body is either a bare array of guests or `{"guests": [...]}`. The
/// structural pass collects every type/shape violation; only when it is clean
/// does the business pass run (accepting guests need at least one known
/// event). Declining guests come back with no events and no dietary text.
pub fn validate_submission(body: &Value) -> Result<Vec<Guest>, ValidationErrors> {
    let items = guest_items(body)?;

    let mut violations = Vec::new();
    let shapes: Vec<GuestShape> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| guest_shape(index, item, &mut violations))
        .collect();
    if !violations.is_empty() {
        return Err(ValidationErrors::new(violations));
    }

    let guests: Vec<Guest> = shapes
        .into_iter()
        .enumerate()
        .filter_map(|(index, shape)| apply_attendance_rules(index, shape, &mut violations))
        .collect();
    if !violations.is_empty() {
        return Err(ValidationErrors::new(violations));
    }

    Ok(guests)
}

fn guest_items(body: &Value) -> Result<&Vec<Value>, ValidationErrors> {
    let single = |path: &str, message: &str| {
        ValidationErrors::new(vec![FieldViolation::new(path, message)])
    };
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(map) => match map.get("guests") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(single("guests", "must be an array")),
            None => Err(single("guests", "is required")),
        },
        _ => Err(single(
            "",
            "submission must be an array of guests or an object with a guests array",
        )),
    }
}

fn guest_shape(index: usize, item: &Value, violations: &mut Vec<FieldViolation>) -> Option<GuestShape> {
    let path = format!("guests[{index}]");
    let Some(fields) = item.as_object() else {
        violations.push(FieldViolation::new(path, "must be an object"));
        return None;
    };
    let before = violations.len();

    let first_name = name_field(fields, &path, "firstName", violations);
    let last_name = name_field(fields, &path, "lastName", violations);

    let rsvp = match fields.get("rsvp") {
        Some(Value::Bool(flag)) => *flag,
        _ => {
            violations.push(FieldViolation::new(format!("{path}.rsvp"), "must be a boolean"));
            false
        }
    };

    let events_attending = match fields.get("eventsAttending") {
        Some(Value::Array(events)) => events
            .iter()
            .enumerate()
            .filter_map(|(i, event)| match event {
                Value::String(tag) => Some(tag.clone()),
                _ => {
                    violations.push(FieldViolation::new(
                        format!("{path}.eventsAttending[{i}]"),
                        "must be a string",
                    ));
                    None
                }
            })
            .collect(),
        _ => {
            violations.push(FieldViolation::new(
                format!("{path}.eventsAttending"),
                "must be an array of strings",
            ));
            Vec::new()
        }
    };

    let dietary_requirements = match fields.get("dietaryRequirements") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            violations.push(FieldViolation::new(
                format!("{path}.dietaryRequirements"),
                "must be a string when present",
            ));
            None
        }
    };

    (violations.len() == before).then_some(GuestShape {
        first_name,
        last_name,
        rsvp,
        events_attending,
        dietary_requirements,
    })
}

fn name_field(
    fields: &Map<String, Value>,
    path: &str,
    key: &str,
    violations: &mut Vec<FieldViolation>,
) -> String {
    match fields.get(key) {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        _ => {
            violations.push(FieldViolation::new(
                format!("{path}.{key}"),
                "must be a non-empty string",
            ));
            String::new()
        }
    }
}

fn apply_attendance_rules(
    index: usize,
    shape: GuestShape,
    violations: &mut Vec<FieldViolation>,
) -> Option<Guest> {
    if !shape.rsvp {
        return Some(Guest {
            first_name: shape.first_name,
            last_name: shape.last_name,
            rsvp: false,
            events_attending: BTreeSet::new(),
            dietary_requirements: None,
        });
    }

    let path = format!("guests[{index}].eventsAttending");
    if shape.events_attending.is_empty() {
        violations.push(FieldViolation::new(path, MISSING_EVENT_MESSAGE));
        return None;
    }

    let before = violations.len();
    let mut events_attending = BTreeSet::new();
    for (i, raw) in shape.events_attending.iter().enumerate() {
        match raw.parse::<EventTag>() {
            Ok(tag) => {
                events_attending.insert(tag);
            }
            Err(_) => violations.push(FieldViolation::new(
                format!("{path}[{i}]"),
                format!("must be one of ceremony, reception (got '{raw}')"),
            )),
        }
    }

    (violations.len() == before).then_some(Guest {
        first_name: shape.first_name,
        last_name: shape.last_name,
        rsvp: true,
        events_attending,
        dietary_requirements: shape.dietary_requirements,
    })
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
