use keygate_core::{Email, Password, User, UserStore, UserStoreError};

/// Error types for the login use case
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Unknown email and wrong password collapse into this one variant so the
    /// response never reveals whether the account exists.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Credentials were correct but the email is still unverified; distinct
    /// so the caller can prompt re-verification.
    #[error("Email address has not been verified")]
    EmailNotVerified,
    #[error("User store error: {0}")]
    UserStore(UserStoreError),
}

/// Login use case - certifies identity and verification status.
///
/// Session issuance is the caller's concern; a successful login only returns
/// the authenticated user.
pub struct LoginUseCase<U>
where
    U: UserStore,
{
    user_store: U,
}

impl<U> LoginUseCase<U>
where
    U: UserStore,
{
    pub fn new(user_store: U) -> Self {
        Self { user_store }
    }

    /// Execute the login use case
    ///
    /// # Arguments
    /// * `email` - User's email address
    /// * `password` - User's password
    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, password))]
    pub async fn execute(&self, email: Email, password: Password) -> Result<User, LoginError> {
        let user = match self.user_store.authenticate(&email, &password).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) | Err(UserStoreError::IncorrectPassword) => {
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => return Err(LoginError::UserStore(e)),
        };

        if !user.is_verified() {
            return Err(LoginError::EmailNotVerified);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use keygate_core::{NewUser, OneTimeCode, VerifiedOutcome};
    use secrecy::{ExposeSecret, Secret};

    #[derive(Clone)]
    struct MockUserStore {
        email: String,
        password: String,
        is_verified: bool,
    }

    #[async_trait::async_trait]
    impl UserStore for MockUserStore {
        async fn add_user(&self, _new_user: NewUser) -> Result<User, UserStoreError> {
            unimplemented!()
        }

        async fn get_user(&self, _email: &Email) -> Result<User, UserStoreError> {
            unimplemented!()
        }

        async fn authenticate(
            &self,
            email: &Email,
            password: &Password,
        ) -> Result<User, UserStoreError> {
            if email.as_ref().expose_secret() != &self.email {
                return Err(UserStoreError::UserNotFound);
            }
            if password.as_ref().expose_secret() != &self.password {
                return Err(UserStoreError::IncorrectPassword);
            }
            let mut user = User::unverified(
                email.clone(),
                Secret::from("fake-hash".to_string()),
                OneTimeCode::try_from(123_456).unwrap(),
            );
            if self.is_verified {
                user.mark_verified(Utc::now());
            }
            Ok(user)
        }

        async fn set_verification_code(
            &self,
            _email: &Email,
            _code: OneTimeCode,
        ) -> Result<(), UserStoreError> {
            unimplemented!()
        }

        async fn mark_verified(
            &self,
            _email: &Email,
            _now: DateTime<Utc>,
        ) -> Result<VerifiedOutcome, UserStoreError> {
            unimplemented!()
        }

        async fn set_new_password(
            &self,
            _email: &Email,
            _new_password: Password,
        ) -> Result<(), UserStoreError> {
            unimplemented!()
        }
    }

    fn store(is_verified: bool) -> MockUserStore {
        MockUserStore {
            email: "test@example.com".to_string(),
            password: "Abcdef1!234X".to_string(),
            is_verified,
        }
    }

    fn email(s: &str) -> Email {
        Email::try_from(Secret::from(s.to_string())).unwrap()
    }

    fn password(s: &str) -> Password {
        Password::try_from(Secret::from(s.to_string())).unwrap()
    }

    #[tokio::test]
    async fn verified_user_with_correct_password_is_granted() {
        let use_case = LoginUseCase::new(store(true));

        let user = use_case
            .execute(email("test@example.com"), password("Abcdef1!234X"))
            .await
            .unwrap();

        assert!(user.is_verified());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let use_case = LoginUseCase::new(store(true));

        let wrong_password = use_case
            .execute(email("test@example.com"), password("Wrong1!wrongX"))
            .await;
        let unknown_email = use_case
            .execute(email("other@example.com"), password("Abcdef1!234X"))
            .await;

        assert!(matches!(wrong_password, Err(LoginError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(LoginError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unverified_user_is_never_granted() {
        let use_case = LoginUseCase::new(store(false));

        let result = use_case
            .execute(email("test@example.com"), password("Abcdef1!234X"))
            .await;

        assert!(matches!(result, Err(LoginError::EmailNotVerified)));
    }
}
