use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{email::Email, one_time_code::OneTimeCode};

/// Why an email could not be delivered.
///
/// The sub-reason exists for diagnostics; callers show the end user a generic
/// "try again" message regardless of the variant.
#[derive(Debug, Error)]
pub enum EmailSendError {
    #[error("Email provider rejected our credentials")]
    Auth,
    #[error("Could not reach the email provider")]
    Connection,
    #[error("Recipient address was rejected")]
    InvalidRecipient,
    #[error("Email delivery failed: {0}")]
    Other(String),
}

impl PartialEq for EmailSendError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Auth, Self::Auth) => true,
            (Self::Connection, Self::Connection) => true,
            (Self::InvalidRecipient, Self::InvalidRecipient) => true,
            (Self::Other(_), Self::Other(_)) => true,
            _ => false,
        }
    }
}

/// Outbound email collaborator.
///
/// Delivery is a side effect of the account flows, never a precondition for
/// their state transitions, but the flows do report delivery failures to the
/// caller.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_verification(
        &self,
        recipient: &Email,
        code: OneTimeCode,
    ) -> Result<(), EmailSendError>;

    async fn send_password_reset(
        &self,
        recipient: &Email,
        code: OneTimeCode,
    ) -> Result<(), EmailSendError>;
}

/// Source of one-time codes.
///
/// A port so tests can substitute a deterministic sequence for the uniform
/// random draw used in production.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> OneTimeCode;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeSource;

impl RandomCodeSource {
    pub fn new() -> Self {
        Self
    }
}

impl CodeSource for RandomCodeSource {
    fn next_code(&self) -> OneTimeCode {
        OneTimeCode::generate(&mut rand::rng())
    }
}
