/* 📖 # Why model the contact form outside of any UI?

The form is the only interactive part of the site, and its behavior is small but
easy to get subtly wrong: fields cleared only on success, the error text taken from
the backend when there is one, and the success banner hiding itself after a delay.
Keeping it as plain state driven through a ContactApi and an injected clock makes
each of those rules testable without a browser or a network.
*/

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use folio_base::PalHandle;

use crate::message::ContactSubmission;

use super::api::{ApiFailure, ApiReply, ContactApi};

/// Seconds a success banner stays visible.
pub const SUCCESS_DISMISS_AFTER_SECS: i64 = 5;

pub const SUCCESS_MESSAGE: &str =
    "Thank you! Your message has been sent successfully. I'll get back to you soon.";

/// Shown when the backend gives no reason for a failure.
pub const DEFAULT_ERROR_MESSAGE: &str = "Failed to send message. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Subject,
    Message,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Loading,
    Success {
        since: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

/// Local state of the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    name: String,
    email: String,
    subject: String,
    message: String,
    status: FormStatus,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update a field. Ignored while a submission is in flight.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        if self.is_loading() {
            return;
        }
        *self.field_mut(field) = value.into();
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Subject => &self.subject,
            FormField::Message => &self.message,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Subject => &mut self.subject,
            FormField::Message => &mut self.message,
        }
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FormStatus::Loading
    }

    /// Text of the success banner, while it is shown.
    pub fn success_message(&self) -> Option<&'static str> {
        match self.status {
            FormStatus::Success { .. } => Some(SUCCESS_MESSAGE),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            FormStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Enter the loading state and return the fields to send.
    ///
    /// Returns `None` if a submission is already in flight. Fields are sent as typed;
    /// validation is left to the backend.
    pub fn begin_submit(&mut self) -> Option<ContactSubmission> {
        if self.is_loading() {
            return None;
        }
        self.status = FormStatus::Loading;
        Some(ContactSubmission::new(
            self.name.clone(),
            self.email.clone(),
            self.subject.clone(),
            self.message.clone(),
        ))
    }

    /// Apply the backend's answer to a submission started with `begin_submit`.
    pub fn finish_submit(&mut self, result: Result<ApiReply, ApiFailure>, now: DateTime<Utc>) {
        self.status = match result {
            Ok(reply) if reply.success => {
                self.name.clear();
                self.email.clear();
                self.subject.clear();
                self.message.clear();
                FormStatus::Success { since: now }
            }
            Ok(reply) => FormStatus::Error {
                message: reply
                    .message
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
            },
            Err(failure) => {
                debug!(%failure, "contact submission failed");
                FormStatus::Error {
                    message: failure
                        .server_message()
                        .unwrap_or(DEFAULT_ERROR_MESSAGE)
                        .to_string(),
                }
            }
        };
    }

    /// Submit the form through `api`, reading the completion time from the PAL clock.
    pub fn submit(&mut self, api: &dyn ContactApi, pal: &PalHandle) -> &FormStatus {
        if let Some(submission) = self.begin_submit() {
            let result = api.send_message(&submission);
            self.finish_submit(result, pal.now());
        }
        &self.status
    }

    /// Hide the success banner once it has been shown long enough.
    ///
    /// Returns true if the form went back to idle.
    pub fn expire_success(&mut self, now: DateTime<Utc>) -> bool {
        match self.status {
            FormStatus::Success { since }
                if now - since >= TimeDelta::seconds(SUCCESS_DISMISS_AFTER_SECS) =>
            {
                self.status = FormStatus::Idle;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::at;
    use folio_base::MockPal;
    use parking_lot::Mutex;

    /// ContactApi returning a canned result and remembering what it was sent.
    #[derive(Debug)]
    struct StubApi {
        result: Result<ApiReply, ApiFailure>,
        received: Mutex<Vec<ContactSubmission>>,
    }

    impl StubApi {
        fn new(result: Result<ApiReply, ApiFailure>) -> Self {
            Self {
                result,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    impl ContactApi for StubApi {
        fn send_message(&self, submission: &ContactSubmission) -> Result<ApiReply, ApiFailure> {
            self.received.lock().push(submission.clone());
            self.result.clone()
        }
    }

    fn filled_form() -> ContactForm {
        let mut form = ContactForm::new();
        form.set(FormField::Name, "A");
        form.set(FormField::Email, "a@x.com");
        form.set(FormField::Subject, "Hi");
        form.set(FormField::Message, "Hello");
        form
    }

    fn success() -> Result<ApiReply, ApiFailure> {
        Ok(ApiReply {
            success: true,
            message: Some("Message sent successfully!".to_string()),
        })
    }

    #[test]
    fn test_success_clears_fields() {
        let pal = PalHandle::new(MockPal::new());
        let api = StubApi::new(success());
        let mut form = filled_form();

        let status = form.submit(&api, &pal).clone();

        assert_eq!(status, FormStatus::Success { since: at(0) });
        assert_eq!(form.success_message(), Some(SUCCESS_MESSAGE));
        assert_eq!(form.value(FormField::Name), "");
        assert_eq!(form.value(FormField::Message), "");
        assert_eq!(
            api.received.lock().as_slice(),
            [ContactSubmission::new("A", "a@x.com", "Hi", "Hello")]
        );
    }

    #[test]
    fn test_success_banner_dismisses_after_five_seconds() {
        let mut form = filled_form();
        form.begin_submit();
        form.finish_submit(success(), at(100));

        assert!(!form.expire_success(at(104)));
        assert!(form.success_message().is_some());

        assert!(form.expire_success(at(105)));
        assert_eq!(form.status(), &FormStatus::Idle);
        assert!(!form.expire_success(at(200)));
    }

    #[test]
    fn test_server_error_message_is_shown_and_fields_kept() {
        let pal = PalHandle::new(MockPal::new());
        let api = StubApi::new(Err(ApiFailure::Server {
            status: 400,
            message: Some("All fields are required".to_string()),
        }));
        let mut form = filled_form();
        form.set(FormField::Subject, "");

        form.submit(&api, &pal);

        assert_eq!(form.error_message(), Some("All fields are required"));
        assert_eq!(form.value(FormField::Name), "A");
        assert_eq!(
            api.received.lock()[0],
            ContactSubmission::new("A", "a@x.com", "", "Hello")
        );
    }

    #[test]
    fn test_default_error_without_server_message() {
        let pal = PalHandle::new(MockPal::new());
        for failure in [
            ApiFailure::Network {
                detail: "connection refused".to_string(),
            },
            ApiFailure::Server {
                status: 502,
                message: None,
            },
        ] {
            let mut form = filled_form();
            form.submit(&StubApi::new(Err(failure)), &pal);
            assert_eq!(form.error_message(), Some(DEFAULT_ERROR_MESSAGE));
        }
    }

    #[test]
    fn test_loading_blocks_edits_and_resubmission() {
        let mut form = filled_form();

        assert!(form.begin_submit().is_some());
        assert!(form.is_loading());
        assert!(form.begin_submit().is_none());

        form.set(FormField::Name, "B");
        assert_eq!(form.value(FormField::Name), "A");
    }

    #[test]
    fn test_new_submission_clears_previous_error() {
        let mut form = filled_form();
        form.begin_submit();
        form.finish_submit(
            Err(ApiFailure::Network {
                detail: "timeout".to_string(),
            }),
            at(0),
        );
        assert!(form.error_message().is_some());

        form.begin_submit();
        assert_eq!(form.error_message(), None);
        assert_eq!(form.status(), &FormStatus::Loading);
    }
}
