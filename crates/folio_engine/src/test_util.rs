use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::message::{ContactMessage, ContactSubmission, MessageId};

/// A message from sender `name`, created `offset_secs` after 2024-01-01T00:00:00Z.
pub fn sample_message(id: &str, name: &str, offset_secs: i64) -> ContactMessage {
    let valid = ContactSubmission::new(name, format!("{}@example.com", name.to_lowercase()), "Hi", "Hello")
        .validate()
        .expect("sample submission is complete");
    ContactMessage::new(MessageId::from_string(id), valid, at(offset_secs))
}

pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::seconds(offset_secs)
}

pub fn ids(messages: &[ContactMessage]) -> Vec<&str> {
    messages.iter().map(|m| m.id().as_str()).collect()
}
