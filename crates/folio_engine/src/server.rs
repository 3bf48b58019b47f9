use tracing::{info, warn};

use folio_base::pal::http::{HttpServerConfig, HttpServerHandle};
use folio_base::{FolioResult, PalHandle, ResultExt};

use crate::api::{ALLOW_ORIGIN, ALLOW_ORIGIN_HEADER, ApiService};
use crate::config::Config;
use crate::contact::ContactService;
use crate::mail::{ContactNotifier, MailerHandle, RecordingMailer, SmtpMailer};
use crate::store::open_store;

/// Owner address used by `--dry-mail` when no mail account is configured.
pub const DRY_RUN_OWNER_ADDRESS: &str = "owner@localhost";

/// How outgoing email is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailMode {
    /// SMTP relay, if an account is configured; otherwise no email.
    #[default]
    Smtp,
    /// Record mail in memory and log it instead of delivering.
    DryRun,
}

/// Open the store and set up email as configured.
pub fn build_contact_service(
    pal: &PalHandle,
    config: &Config,
    mail_mode: MailMode,
) -> FolioResult<ContactService> {
    let store = open_store(pal, &config.store_url)
        .with_context(|| format!("Failed to open message store {}", config.store_url))?;

    let (mailer, owner_address) = match (mail_mode, &config.email) {
        (MailMode::DryRun, email) => (
            MailerHandle::new(RecordingMailer::new()),
            email.as_ref().map_or(DRY_RUN_OWNER_ADDRESS, |email| email.user.as_str()),
        ),
        (MailMode::Smtp, Some(email)) => (
            MailerHandle::new(
                SmtpMailer::new(&config.smtp_host, &email.user, &email.password)
                    .context("Failed to set up email")?,
            ),
            email.user.as_str(),
        ),
        (MailMode::Smtp, None) => {
            info!("email not configured, messages are stored without notification");
            return Ok(ContactService::new(pal.clone(), store, None));
        }
    };

    let notifier = ContactNotifier::new(mailer, owner_address, config.owner_name.clone());
    match notifier.mailer().verify() {
        Ok(()) => info!("email server is ready to send messages"),
        Err(e) => warn!(error = ?e, "email configuration error"),
    }
    Ok(ContactService::new(pal.clone(), store, Some(notifier)))
}

/// Start the contact backend on the configured address.
pub fn start_server(
    pal: &PalHandle,
    config: &Config,
    mail_mode: MailMode,
) -> FolioResult<HttpServerHandle> {
    let contact = build_contact_service(pal, config, mail_mode)?;
    let status = contact.status();
    let server_config = HttpServerConfig::new(config.host.clone())
        .with_port(config.port)
        .with_default_header(ALLOW_ORIGIN_HEADER, ALLOW_ORIGIN);
    let handle = pal
        .start_http_server(Box::new(ApiService::new(contact)), server_config)
        .context("Failed to start HTTP server")?;
    info!(
        address = %handle.address(&config.host),
        database = %status.database,
        email = %status.email,
        "server running"
    );
    Ok(handle)
}
