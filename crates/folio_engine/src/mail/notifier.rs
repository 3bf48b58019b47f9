/* 📖 # Why is the notification sent from the owner account?

Relays such as Gmail reject or rewrite mail whose From address is not the
authenticated account. The notification is therefore sent from the owner account to
itself with Reply-To set to the visitor, so replying from the mail client still
reaches the visitor.
*/

use pulldown_cmark_escape::escape_html;
use tracing::{info, instrument};

use folio_base::{FolioError, FolioResult};

use crate::message::ContactMessage;

use super::traits::{MailerHandle, OutgoingMail};

/// Result of the email step of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// No mail account configured; nothing was attempted.
    Skipped,
    /// Owner notification and acknowledgement were both delivered.
    Sent,
    /// A send failed. The message itself is already stored.
    Failed,
}

/// Renders and sends the two emails for an accepted contact message.
#[derive(Debug, Clone)]
pub struct ContactNotifier {
    mailer: MailerHandle,
    owner_address: String,
    owner_name: String,
}

impl ContactNotifier {
    pub fn new(
        mailer: MailerHandle,
        owner_address: impl Into<String>,
        owner_name: impl Into<String>,
    ) -> Self {
        Self {
            mailer,
            owner_address: owner_address.into(),
            owner_name: owner_name.into(),
        }
    }

    pub fn mailer(&self) -> &MailerHandle {
        &self.mailer
    }

    /// Send the owner notification, then the acknowledgement to the visitor.
    ///
    /// Stops at the first failure, so no acknowledgement is sent when the owner
    /// was not notified.
    #[instrument(skip(self, message), fields(id = %message.id()))]
    pub fn notify(&self, message: &ContactMessage) -> FolioResult<()> {
        self.deliver(self.owner_notification(message), "owner notification")?;
        self.deliver(self.acknowledgement(message), "acknowledgement")?;
        info!("contact emails sent");
        Ok(())
    }

    fn deliver(&self, mail: OutgoingMail, kind: &str) -> FolioResult<()> {
        self.mailer.send(&mail).map_err(|cause| {
            Box::new(
                FolioError::message(format!("Failed to send {} to {}", kind, mail.to))
                    .caused_by(cause),
            )
        })
    }

    /// Email to the site owner carrying the submitted fields.
    pub fn owner_notification(&self, message: &ContactMessage) -> OutgoingMail {
        let html_body = format!(
            "<h3>New Contact Form Submission</h3>\n\
             <p><strong>Name:</strong> {name}</p>\n\
             <p><strong>Email:</strong> {email}</p>\n\
             <p><strong>Subject:</strong> {subject}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{body}</p>\n\
             <hr>\n\
             <p>Sent from your portfolio website</p>\n",
            name = escape(message.name()),
            email = escape(message.email()),
            subject = escape(message.subject()),
            body = escape(message.message()),
        );
        OutgoingMail {
            from: self.owner_address.clone(),
            to: self.owner_address.clone(),
            reply_to: Some(message.email().to_string()),
            subject: format!("Portfolio Contact: {}", message.subject()),
            html_body,
        }
    }

    /// Confirmation email to the visitor quoting their message.
    pub fn acknowledgement(&self, message: &ContactMessage) -> OutgoingMail {
        let html_body = format!(
            "<h3>Thank you for your message!</h3>\n\
             <p>Dear {name},</p>\n\
             <p>I have received your message and will get back to you as soon as possible.</p>\n\
             <p><strong>Your message:</strong></p>\n\
             <p>{body}</p>\n\
             <hr>\n\
             <p>Best regards,<br>{owner}</p>\n",
            name = escape(message.name()),
            body = escape(message.message()),
            owner = escape(&self.owner_name),
        );
        OutgoingMail {
            from: self.owner_address.clone(),
            to: message.email().to_string(),
            reply_to: None,
            subject: format!("Thank you for contacting {}", self.owner_name),
            html_body,
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // writing into a String cannot fail
    let _ = escape_html(&mut escaped, text);
    escaped
}
