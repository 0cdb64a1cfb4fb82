//! Outbound auth email.

use async_trait::async_trait;

use crate::errors::AppError;

/// A message the auth provider needs delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMail {
    Confirmation { email: String, token: String },
    PasswordRecovery { email: String, token: String },
}

/// Delivery boundary for auth emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: AuthMail) -> Result<(), AppError>;
}

/// Writes the email link to the log instead of delivering it. Stands in for a
/// real email service in development.
pub struct LogMailer {
    public_url: String,
}

impl LogMailer {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
        }
    }

    fn link_for(&self, mail: &AuthMail) -> String {
        match mail {
            AuthMail::Confirmation { token, .. } => {
                format!("{}/confirm#token={}", self.public_url, token)
            }
            AuthMail::PasswordRecovery { token, .. } => {
                format!("{}/update-password#token={}", self.public_url, token)
            }
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: AuthMail) -> Result<(), AppError> {
        let link = self.link_for(&mail);
        match &mail {
            AuthMail::Confirmation { email, .. } => {
                tracing::info!(to = %email, %link, "Confirmation email");
            }
            AuthMail::PasswordRecovery { email, .. } => {
                tracing::info!(to = %email, %link, "Password recovery email");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every message so tests can follow emailed links.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<AuthMail>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<AuthMail> {
            self.sent.lock().unwrap().clone()
        }

        pub fn confirmation_token(&self, email: &str) -> Option<String> {
            self.sent().into_iter().rev().find_map(|mail| match mail {
                AuthMail::Confirmation { email: to, token } if to == email => Some(token),
                _ => None,
            })
        }

        pub fn recovery_token(&self, email: &str) -> Option<String> {
            self.sent().into_iter().rev().find_map(|mail| match mail {
                AuthMail::PasswordRecovery { email: to, token } if to == email => Some(token),
                _ => None,
            })
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: AuthMail) -> Result<(), AppError> {
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_point_at_frontend_routes() {
        let mailer = LogMailer::new("https://bio.example");
        let link = mailer.link_for(&AuthMail::PasswordRecovery {
            email: "a@b.com".to_string(),
            token: "abc".to_string(),
        });
        assert_eq!(link, "https://bio.example/update-password#token=abc");
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer::new("http://localhost");
        let mail = AuthMail::Confirmation {
            email: "a@b.com".to_string(),
            token: "t".to_string(),
        };
        assert!(mailer.send(mail).await.is_ok());
    }
}
