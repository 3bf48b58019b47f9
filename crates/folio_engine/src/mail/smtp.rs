use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, instrument};

use folio_base::FolioResult;

use super::traits::{Mailer, OutgoingMail};

/// Relay used when `SMTP_HOST` is not set.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Mailer sending through an authenticated SMTP relay over TLS.
pub struct SmtpMailer {
    transport: SmtpTransport,
    host: String,
}

impl SmtpMailer {
    /// Configure a relay. No connection is made until `verify` or `send`.
    pub fn new(host: &str, user: &str, password: &str) -> FolioResult<Self> {
        let transport = SmtpTransport::relay(host)
            .map_err(|e| folio_base::err!("Failed to configure SMTP relay {}: {}", host, e))?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();
        Ok(Self {
            transport,
            host: host.to_string(),
        })
    }

    fn build_message(mail: &OutgoingMail) -> FolioResult<Message> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&mail.from)?)
            .to(parse_mailbox(&mail.to)?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = &mail.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }
        builder
            .body(mail.html_body.clone())
            .map_err(|e| folio_base::err!("Failed to build email: {}", e))
    }
}

fn parse_mailbox(address: &str) -> FolioResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| folio_base::err!("Invalid email address '{}': {}", address, e))
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("host", &self.host).finish()
    }
}

impl Mailer for SmtpMailer {
    #[instrument(skip(self), fields(host = %self.host))]
    fn verify(&self) -> FolioResult<()> {
        match self.transport.test_connection() {
            Ok(true) => Ok(()),
            Ok(false) => folio_base::bail!("SMTP relay {} refused the connection", self.host),
            Err(e) => folio_base::bail!("SMTP relay {} is not reachable: {}", self.host, e),
        }
    }

    #[instrument(skip(self, mail), fields(host = %self.host, to = %mail.to))]
    fn send(&self, mail: &OutgoingMail) -> FolioResult<()> {
        let message = Self::build_message(mail)?;
        let response = self
            .transport
            .send(&message)
            .map_err(|e| folio_base::err!("SMTP relay {} rejected email: {}", self.host, e))?;
        debug!(code = %response.code(), "email accepted by relay");
        Ok(())
    }
}
