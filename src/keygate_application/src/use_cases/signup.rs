use keygate_core::{
    CodeSource, Email, EmailSender, EmailSendError, NewUser, Password, User, UserStore,
    UserStoreError,
};

/// Error types for the signup use case
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("User store error: {0}")]
    UserStore(#[from] UserStoreError),
    #[error("Verification email could not be delivered: {0}")]
    Delivery(#[from] EmailSendError),
}

/// Signup use case - creates an unverified account, issues its verification
/// code, and triggers delivery of that code.
///
/// The account is created before the email is attempted; a delivery failure
/// is reported distinctly so the caller knows the code never went out.
pub struct SignupUseCase<U, C, E>
where
    U: UserStore,
    C: CodeSource,
    E: EmailSender,
{
    user_store: U,
    code_source: C,
    email_sender: E,
}

impl<U, C, E> SignupUseCase<U, C, E>
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

    /// Execute the signup use case
    ///
    /// # Arguments
    /// * `email` - Validated email address
    /// * `password` - Password that passed the account policy
    ///
    /// # Returns
    /// The created user on success; `UserAlreadyExists` inside the store
    /// error for a duplicate email, `Delivery` if the verification email
    /// could not be sent.
    #[tracing::instrument(name = "SignupUseCase::execute", skip(self, password))]
    pub async fn execute(&self, email: Email, password: Password) -> Result<User, SignupError> {
        let code = self.code_source.next_code();
        let user = self
            .user_store
            .add_user(NewUser::new(email.clone(), password, code))
            .await?;

        self.email_sender.send_verification(&email, code).await?;

        Ok(user)
    }
}
