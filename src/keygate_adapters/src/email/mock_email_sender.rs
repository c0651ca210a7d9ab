use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::sync::RwLock;

use keygate_core::{Email, EmailSender, EmailSendError, OneTimeCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentEmailKind {
    Verification,
    PasswordReset,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub code: OneTimeCode,
    pub kind: SentEmailKind,
}

/// Email sender that records instead of delivering.
///
/// Tests read captured codes back out and can force every send to fail with
/// a chosen reason.
#[derive(Clone, Default)]
pub struct MockEmailSender {
    sent: Arc<RwLock<Vec<SentEmail>>>,
    fail_with: Arc<RwLock<Option<fn() -> EmailSendError>>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.read().await.clone()
    }

    pub async fn last_code_for(&self, recipient: &str) -> Option<OneTimeCode> {
        self.sent
            .read()
            .await
            .iter()
            .rev()
            .find(|e| e.recipient == recipient)
            .map(|e| e.code)
    }

    /// Make every subsequent send fail with the error produced by `f`.
    pub async fn fail_with(&self, f: fn() -> EmailSendError) {
        *self.fail_with.write().await = Some(f);
    }

    pub async fn succeed(&self) {
        *self.fail_with.write().await = None;
    }

    async fn record(
        &self,
        recipient: &Email,
        code: OneTimeCode,
        kind: SentEmailKind,
    ) -> Result<(), EmailSendError> {
        if let Some(f) = *self.fail_with.read().await {
            return Err(f());
        }
        self.sent.write().await.push(SentEmail {
            recipient: recipient.as_ref().expose_secret().clone(),
            code,
            kind,
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl EmailSender for MockEmailSender {
    async fn send_verification(
        &self,
        recipient: &Email,
        code: OneTimeCode,
    ) -> Result<(), EmailSendError> {
        self.record(recipient, code, SentEmailKind::Verification).await
    }

    async fn send_password_reset(
        &self,
        recipient: &Email,
        code: OneTimeCode,
    ) -> Result<(), EmailSendError> {
        self.record(recipient, code, SentEmailKind::PasswordReset).await
    }
}
