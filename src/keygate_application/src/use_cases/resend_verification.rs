use keygate_core::{
    CodeSource, Email, EmailSender, EmailSendError, UserStore, UserStoreError,
};

/// Result of a resend attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendVerificationOutcome {
    /// A fresh code was issued and delivery triggered. Also returned for an
    /// unknown email, so the response does not disclose account existence.
    Sent,
    /// The account is already verified; no code was issued.
    AlreadyVerified,
}

/// Error types for the resend verification use case
#[derive(Debug, thiserror::Error)]
pub enum ResendVerificationError {
    #[error("Verification email could not be delivered: {0}")]
    Delivery(#[from] EmailSendError),
    #[error("User store error: {0}")]
    UserStore(UserStoreError),
}

/// Resend verification use case - re-issues the verification code.
///
/// Issuance overwrites: there is at most one outstanding verification code
/// per account, so the previous code stops working the moment a new one is
/// stored.
pub struct ResendVerificationUseCase<U, C, E>
where
    U: UserStore,
    C: CodeSource,
    E: EmailSender,
{
    user_store: U,
    code_source: C,
    email_sender: E,
}

impl<U, C, E> ResendVerificationUseCase<U, C, E>
where
    U: UserStore,
    C: CodeSource,
    E: EmailSender,
{
    pub fn new(user_store: U, code_source: C, email_sender: E) -> Self {
        Self {
            user_store,
            code_source,
            email_sender,
        }
    }

    /// Execute the resend verification use case
    #[tracing::instrument(name = "ResendVerificationUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        email: Email,
    ) -> Result<ResendVerificationOutcome, ResendVerificationError> {
        let user = match self.user_store.get_user(&email).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => {
                tracing::debug!("verification resend requested for an unknown email");
                return Ok(ResendVerificationOutcome::Sent);
            }
            Err(e) => return Err(ResendVerificationError::UserStore(e)),
        };

        if user.is_verified() {
            return Ok(ResendVerificationOutcome::AlreadyVerified);
        }

        let code = self.code_source.next_code();
        self.user_store
            .set_verification_code(&email, code)
            .await
            .map_err(ResendVerificationError::UserStore)?;

        self.email_sender.send_verification(&email, code).await?;

        Ok(ResendVerificationOutcome::Sent)
    }
}
