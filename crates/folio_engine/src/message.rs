/* 📖 # Why separate ContactSubmission from ContactMessage?

A submission is whatever the browser posted: any field may be missing. A message is
what the store keeps: all four fields present, plus an id and a creation time that
only the server assigns. validate() is the single place where one becomes the other,
so the store never sees an incomplete record.
*/

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a contact message (`_id` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate a fresh, URL-safe random id.
    pub fn generate() -> Self {
        Self(nanoid::nanoid!())
    }

    /// Wrap an existing id string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted contact form submission.
///
/// Messages are append-only: once stored they are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(rename = "_id")]
    id: MessageId,
    name: String,
    email: String,
    subject: String,
    message: String,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl ContactMessage {
    /// Create a message from a validated submission.
    pub fn new(id: MessageId, submission: ValidSubmission, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: submission.name,
            email: submission.email,
            subject: submission.subject,
            message: submission.message,
            created_at,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The unvalidated body of a contact form POST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContactSubmission {
    /// Create a submission with all four fields set.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            subject: Some(subject.into()),
            message: Some(message.into()),
        }
    }

    /// Check that every field is present and non-empty.
    ///
    /// Only absence and the empty string count as missing; whitespace is accepted.
    ///
    /// ```
    /// use folio_engine::ContactSubmission;
    ///
    /// let missing = ContactSubmission::new("", "a@x.com", "Hi", "Hello").validate().unwrap_err();
    /// assert_eq!(missing.fields(), ["name"]);
    /// ```
    pub fn validate(self) -> Result<ValidSubmission, MissingFields> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        match (
            present(self.name),
            present(self.email),
            present(self.subject),
            present(self.message),
        ) {
            (Some(name), Some(email), Some(subject), Some(message)) => Ok(ValidSubmission {
                name,
                email,
                subject,
                message,
            }),
            (name, email, subject, message) => {
                let fields = [
                    ("name", name.is_none()),
                    ("email", email.is_none()),
                    ("subject", subject.is_none()),
                    ("message", message.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, missing)| missing.then_some(field))
                .collect();
                Err(MissingFields(fields))
            }
        }
    }
}

/// A submission whose four fields are known to be present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl ValidSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Names of the submission fields that were absent or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(Vec<&'static str>);

impl MissingFields {
    pub fn fields(&self) -> &[&'static str] {
        &self.0
    }
}

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required fields: {}", self.0.join(", "))
    }
}

impl std::error::Error for MissingFields {}
