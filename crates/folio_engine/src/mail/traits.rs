use std::sync::Arc;

use folio_base::FolioResult;

/// A fully rendered email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
}

/// Outbound mail transport.
///
/// Implementations:
/// - `SmtpMailer`: authenticated SMTP relay
/// - `RecordingMailer`: keeps sent mail in memory, for tests and dry runs
pub trait Mailer: std::fmt::Debug + Send + Sync + 'static {
    /// Check that the transport can reach its relay and authenticate.
    fn verify(&self) -> FolioResult<()>;

    /// Deliver one email.
    fn send(&self, mail: &OutgoingMail) -> FolioResult<()>;
}

/// Shared handle to a mailer implementation.
#[derive(Debug, Clone)]
pub struct MailerHandle(Arc<dyn Mailer>);

impl MailerHandle {
    pub fn new(mailer: impl Mailer) -> Self {
        Self(Arc::new(mailer))
    }
}

impl std::ops::Deref for MailerHandle {
    type Target = dyn Mailer;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
