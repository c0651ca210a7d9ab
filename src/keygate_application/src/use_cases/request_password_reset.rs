use chrono::Utc;
use keygate_core::{
    CodeSource, Email, EmailSender, EmailSendError, PasswordResetRequest, ResetRequestStore,
    ResetRequestStoreError, UserStore, UserStoreError,
};

/// Error types for the request password reset use case
#[derive(Debug, thiserror::Error)]
pub enum RequestPasswordResetError {
    #[error("Reset email could not be delivered: {0}")]
    Delivery(#[from] EmailSendError),
    #[error("User store error: {0}")]
    UserStore(UserStoreError),
    #[error("Reset request store error: {0}")]
    ResetStore(#[from] ResetRequestStoreError),
}

/// Request password reset use case - step one of the two-step reset protocol.
///
/// Enumeration-resistant: an unknown email returns the same `Ok(())` the
/// found case does, so the response shape never discloses whether an account
/// exists. Outstanding requests from earlier calls are left in place; only a
/// successful reset clears them.
pub struct RequestPasswordResetUseCase<U, R, C, E>
where
    U: UserStore,
    R: ResetRequestStore,
    C: CodeSource,
    E: EmailSender,
{
    user_store: U,
    reset_store: R,
    code_source: C,
    email_sender: E,
}

impl<U, R, C, E> RequestPasswordResetUseCase<U, R, C, E>
where
    U: UserStore,
    R: ResetRequestStore,
    C: CodeSource,
    E: EmailSender,
{
    pub fn new(user_store: U, reset_store: R, code_source: C, email_sender: E) -> Self {
        Self {
            user_store,
            reset_store,
            code_source,
            email_sender,
        }
    }

    /// Execute the request password reset use case
    ///
    /// The reset row is written before delivery is attempted; a delivery
    /// failure still reaches the caller even though the row exists, so the
    /// user is never told "sent" when nothing went out.
    #[tracing::instrument(name = "RequestPasswordResetUseCase::execute", skip(self))]
    pub async fn execute(&self, email: Email) -> Result<(), RequestPasswordResetError> {
        let user = match self.user_store.get_user(&email).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => {
                tracing::debug!("password reset requested for an unknown email");
                return Ok(());
            }
            Err(e) => return Err(RequestPasswordResetError::UserStore(e)),
        };

        let code = self.code_source.next_code();
        let request = PasswordResetRequest::issue(user.id(), code, Utc::now());
        self.reset_store.insert(request).await?;

        self.email_sender.send_password_reset(&email, code).await?;

        Ok(())
    }
}
