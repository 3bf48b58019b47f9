use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use folio_base::FolioResult;

use super::traits::{Mailer, OutgoingMail};

/// Mailer that keeps every delivered email in memory.
///
/// Clones share state. `fail_with` turns every following `verify` and `send`
/// into an error, which is how transport failures are simulated.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    sent: Vec<OutgoingMail>,
    attempts: usize,
    failure: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following operation fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state.lock().failure = Some(message.into());
    }

    /// Emails delivered so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.state.lock().sent.clone()
    }

    /// Number of `send` calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.state.lock().attempts
    }
}

impl Mailer for RecordingMailer {
    fn verify(&self) -> FolioResult<()> {
        match &self.state.lock().failure {
            Some(failure) => folio_base::bail!("{}", failure),
            None => Ok(()),
        }
    }

    fn send(&self, mail: &OutgoingMail) -> FolioResult<()> {
        let mut state = self.state.lock();
        state.attempts += 1;
        if let Some(failure) = &state.failure {
            folio_base::bail!("{}", failure);
        }
        info!(to = %mail.to, subject = %mail.subject, "recorded outgoing email");
        state.sent.push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            from: "owner@example.com".to_string(),
            to: to.to_string(),
            reply_to: None,
            subject: "Subject".to_string(),
            html_body: "<p>Body</p>".to_string(),
        }
    }

    #[test]
    fn test_records_sent_mail() {
        let mailer = RecordingMailer::new();
        let observer = mailer.clone();

        mailer.verify().unwrap();
        mailer.send(&mail("a@x.com")).unwrap();
        mailer.send(&mail("b@x.com")).unwrap();

        let sent: Vec<String> = observer.sent().into_iter().map(|m| m.to).collect();
        assert_eq!(sent, ["a@x.com", "b@x.com"]);
        assert_eq!(observer.attempts(), 2);
    }

    #[test]
    fn test_failure_counts_attempt_but_records_nothing() {
        let mailer = RecordingMailer::new();
        mailer.fail_with("connection refused");

        assert_eq!(
            mailer.verify().unwrap_err().to_string(),
            "connection refused"
        );
        assert!(mailer.send(&mail("a@x.com")).is_err());
        assert_eq!(mailer.attempts(), 1);
        assert!(mailer.sent().is_empty());
    }
}
