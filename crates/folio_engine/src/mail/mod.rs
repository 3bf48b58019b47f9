/* 📖 # Why a Mailer trait instead of calling lettre directly?

Each accepted submission triggers two emails, but only when an account is configured.
Hiding the transport behind a trait lets the contact flow be tested with a recording
mailer (including transport failures) and lets `folio serve --dry-mail` run without
a relay. Only SmtpMailer knows about lettre.
*/

mod notifier;
mod recording;
mod smtp;
mod traits;

pub use notifier::{ContactNotifier, NotificationOutcome};
pub use recording::RecordingMailer;
pub use smtp::{DEFAULT_SMTP_HOST, SmtpMailer};
pub use traits::{Mailer, MailerHandle, OutgoingMail};
