pub mod api;
pub mod client;
pub mod config;
pub mod contact;
pub mod mail;
pub mod message;
pub mod server;
pub mod store;

#[cfg(test)]
mod test_util;

pub use api::ApiService;
pub use config::{Config, EmailCredentials, load_config};
pub use contact::{ContactService, ServiceStatus, SubmissionReceipt, SubmitError};
pub use mail::{ContactNotifier, Mailer, MailerHandle, NotificationOutcome};
pub use message::{ContactMessage, ContactSubmission, MessageId, MissingFields, ValidSubmission};
pub use server::{MailMode, build_contact_service, start_server};
pub use store::{MessageStore, StoreHandle, open_store};
