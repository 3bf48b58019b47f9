/* 📖 # Why does submit report storage and email separately?

A submission has two side effects with different stakes: the stored message is the
record of truth, the emails are a courtesy. SubmissionReceipt keeps the stored id
and the NotificationOutcome apart, so callers and logs can tell "saved but email
failed" from "never saved". The HTTP layer still answers both with the same generic
500, which is what browsers of the existing site expect.
*/

use tracing::{info, instrument, warn};

use folio_base::{FolioError, FolioResult, PalHandle};

use crate::mail::{ContactNotifier, NotificationOutcome};
use crate::message::{ContactMessage, ContactSubmission, MessageId, MissingFields};
use crate::store::StoreHandle;

/// Stored message id and what happened to its emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub id: MessageId,
    pub notification: NotificationOutcome,
}

impl SubmissionReceipt {
    /// True unless an email send failed.
    pub fn is_complete(&self) -> bool {
        self.notification != NotificationOutcome::Failed
    }
}

/// Why a submission was not stored.
#[derive(Debug)]
pub enum SubmitError {
    /// Fields absent or empty; storage was not touched.
    Invalid(MissingFields),
    /// The store rejected the message.
    Storage(Box<FolioError>),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Invalid(missing) => write!(f, "{}", missing),
            SubmitError::Storage(error) => write!(f, "Failed to store message: {}", error),
        }
    }
}

/// Human readable state of the backend's collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub database: String,
    pub email: String,
}

/// The contact workflow: validate, persist, notify, list.
#[derive(Debug, Clone)]
pub struct ContactService {
    pal: PalHandle,
    store: StoreHandle,
    notifier: Option<ContactNotifier>,
}

impl ContactService {
    /// Create the service. Without a notifier, submissions are stored without email.
    pub fn new(pal: PalHandle, store: StoreHandle, notifier: Option<ContactNotifier>) -> Self {
        Self {
            pal,
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Validate and store a submission, then send the contact emails if configured.
    #[instrument(skip_all)]
    pub fn submit(&self, submission: ContactSubmission) -> Result<SubmissionReceipt, SubmitError> {
        let valid = submission.validate().map_err(|missing| {
            info!(fields = ?missing.fields(), "rejected incomplete submission");
            SubmitError::Invalid(missing)
        })?;

        let message = ContactMessage::new(MessageId::generate(), valid, self.pal.now());
        let id = self
            .store
            .insert(message.clone())
            .map_err(SubmitError::Storage)?;
        info!(%id, "stored contact message");

        let notification = match &self.notifier {
            None => NotificationOutcome::Skipped,
            Some(notifier) => match notifier.notify(&message) {
                Ok(()) => NotificationOutcome::Sent,
                Err(error) => {
                    warn!(%id, error = ?error, "message stored but contact emails failed");
                    NotificationOutcome::Failed
                }
            },
        };

        Ok(SubmissionReceipt { id, notification })
    }

    /// All stored messages, newest first.
    pub fn list_messages(&self) -> FolioResult<Vec<ContactMessage>> {
        self.store.list_newest_first()
    }

    pub fn message_count(&self) -> FolioResult<usize> {
        self.store.len()
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            database: format!("Store ready: {}", self.store.describe()),
            email: match self.notifier {
                Some(_) => "Email service ready".to_string(),
                None => "Email not configured".to_string(),
            },
        }
    }
}
