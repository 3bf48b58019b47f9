use folio_base::{FolioResult, PalHandle};

use crate::mail::DEFAULT_SMTP_HOST;
use crate::store::DEFAULT_STORE_URL;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_OWNER_NAME: &str = "the site owner";

/// Runtime configuration of the contact backend, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Listen address (`HOST`).
    pub host: String,
    /// Listen port (`PORT`).
    pub port: u16,
    /// Document store connection string (`STORE_URL`).
    pub store_url: String,
    /// Mail account; `None` disables outbound email.
    pub email: Option<EmailCredentials>,
    /// SMTP relay (`SMTP_HOST`).
    pub smtp_host: String,
    /// Name used in the acknowledgement email (`OWNER_NAME`).
    pub owner_name: String,
}

/// Account used to send and receive contact emails (`EMAIL_USER` / `EMAIL_PASS`).
#[derive(Clone, PartialEq, Eq)]
pub struct EmailCredentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for EmailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Load configuration through the PAL.
///
/// Unset and empty variables fall back to their defaults. Email is enabled only
/// when both `EMAIL_USER` and `EMAIL_PASS` are non-empty.
pub fn load_config(pal: &PalHandle) -> FolioResult<Config> {
    let var = |key: &str| pal.env_var(key).filter(|value| !value.is_empty());

    let port = match var("PORT") {
        Some(port) => port.trim().parse::<u16>().map_err(|e| {
            folio_base::err!("Invalid PORT '{}': {}", port, e)
        })?,
        None => DEFAULT_PORT,
    };

    let email = match (var("EMAIL_USER"), var("EMAIL_PASS")) {
        (Some(user), Some(password)) => Some(EmailCredentials { user, password }),
        _ => None,
    };

    Ok(Config {
        host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port,
        store_url: var("STORE_URL").unwrap_or_else(|| DEFAULT_STORE_URL.to_string()),
        email,
        smtp_host: var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
        owner_name: var("OWNER_NAME").unwrap_or_else(|| DEFAULT_OWNER_NAME.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use folio_base::MockPal;

    #[test]
    fn test_defaults() {
        let config = load_config(&PalHandle::new(MockPal::new())).unwrap();
        expect![[r#"
            Config {
                host: "0.0.0.0",
                port: 5000,
                store_url: "file://data/messages.jsonl",
                email: None,
                smtp_host: "smtp.gmail.com",
                owner_name: "the site owner",
            }"#]]
        .assert_eq(&format!("{:#?}", config));
    }

    #[test]
    fn test_values_from_environment() {
        let mock = MockPal::new();
        mock.set_env("PORT", "8080");
        mock.set_env("HOST", "127.0.0.1");
        mock.set_env("STORE_URL", "memory://");
        mock.set_env("EMAIL_USER", "owner@example.com");
        mock.set_env("EMAIL_PASS", "app-password");
        mock.set_env("SMTP_HOST", "smtp.example.com");
        mock.set_env("OWNER_NAME", "Jane Doe");

        let config = load_config(&PalHandle::new(mock)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.store_url, "memory://");
        assert_eq!(config.smtp_host, "smtp.example.com");
        assert_eq!(config.owner_name, "Jane Doe");
        assert_eq!(
            format!("{:?}", config.email),
            r#"Some(EmailCredentials { user: "owner@example.com", password: "<redacted>" })"#
        );
    }

    #[test]
    fn test_email_requires_user_and_password() {
        let mock = MockPal::new();
        mock.set_env("EMAIL_USER", "owner@example.com");
        mock.set_env("EMAIL_PASS", "");

        let config = load_config(&PalHandle::new(mock)).unwrap();
        assert_eq!(config.email, None);
    }

    #[test]
    fn test_invalid_port() {
        let mock = MockPal::new();
        mock.set_env("PORT", "http");

        let error = load_config(&PalHandle::new(mock)).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid PORT 'http': invalid digit found in string"
        );
    }
}
