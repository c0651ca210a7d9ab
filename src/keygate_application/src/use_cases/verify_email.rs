use chrono::Utc;
use keygate_core::{Email, OneTimeCode, UserStore, UserStoreError, VerifiedOutcome};

/// Result of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyEmailOutcome {
    /// The account transitioned to verified.
    Verified,
    /// The account was verified before the call; nothing changed.
    AlreadyVerified,
}

/// Error types for the verify email use case
#[derive(Debug, thiserror::Error)]
pub enum VerifyEmailError {
    #[error("Verification code does not match")]
    CodeMismatch,
    #[error("User store error: {0}")]
    UserStore(#[from] UserStoreError),
}

/// Verify email use case - drives the `Unverified -> Verified` transition.
///
/// An already verified account is a benign no-op, never an error, and its
/// `verified_since` stamp is left untouched. There is no reverse transition.
pub struct VerifyEmailUseCase<U>
where
    U: UserStore,
{
    user_store: U,
}

impl<U> VerifyEmailUseCase<U>
where
    U: UserStore,
{
    pub fn new(user_store: U) -> Self {
        Self { user_store }
    }

    /// Execute the verify email use case
    ///
    /// # Arguments
    /// * `email` - The account's email address
    /// * `code` - The submitted 6-digit code (compared numerically)
    #[tracing::instrument(name = "VerifyEmailUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        email: Email,
        code: OneTimeCode,
    ) -> Result<VerifyEmailOutcome, VerifyEmailError> {
        let user = self.user_store.get_user(&email).await?;

        if user.is_verified() {
            return Ok(VerifyEmailOutcome::AlreadyVerified);
        }

        if !user.code_matches(code) {
            return Err(VerifyEmailError::CodeMismatch);
        }

        // The store rechecks the verified flag, so a racing verify collapses
        // into AlreadyVerified here instead of stamping twice.
        match self.user_store.mark_verified(&email, Utc::now()).await? {
            VerifiedOutcome::Verified => Ok(VerifyEmailOutcome::Verified),
            VerifiedOutcome::AlreadyVerified => Ok(VerifyEmailOutcome::AlreadyVerified),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use keygate_core::{NewUser, Password, User};
    use secrecy::Secret;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Clone, Default)]
    struct MockUserStore {
        users: Arc<RwLock<HashMap<Email, User>>>,
    }

    impl MockUserStore {
        async fn with_unverified(email: &Email, code: u32) -> Self {
            let store = Self::default();
            let user = User::unverified(
                email.clone(),
                Secret::from("fake-hash".to_string()),
                OneTimeCode::try_from(code).unwrap(),
            );
            store.users.write().await.insert(email.clone(), user);
            store
        }
    }

    #[async_trait::async_trait]
    impl UserStore for MockUserStore {
        async fn add_user(&self, _new_user: NewUser) -> Result<User, UserStoreError> {
            unimplemented!()
        }

        async fn get_user(&self, email: &Email) -> Result<User, UserStoreError> {
            self.users
                .read()
                .await
                .get(email)
                .cloned()
                .ok_or(UserStoreError::UserNotFound)
        }

        async fn authenticate(
            &self,
            _email: &Email,
            _password: &Password,
        ) -> Result<User, UserStoreError> {
            unimplemented!()
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
            email: &Email,
            now: DateTime<Utc>,
        ) -> Result<VerifiedOutcome, UserStoreError> {
            let mut users = self.users.write().await;
            let user = users.get_mut(email).ok_or(UserStoreError::UserNotFound)?;
            Ok(user.mark_verified(now))
        }

        async fn set_new_password(
            &self,
            _email: &Email,
            _new_password: Password,
        ) -> Result<(), UserStoreError> {
            unimplemented!()
        }
    }

    fn email() -> Email {
        Email::try_from(Secret::from("test@example.com".to_string())).unwrap()
    }

    #[tokio::test]
    async fn correct_code_verifies_the_account() {
        let store = MockUserStore::with_unverified(&email(), 123_456).await;
        let use_case = VerifyEmailUseCase::new(store.clone());

        let outcome = use_case
            .execute(email(), OneTimeCode::try_from(123_456).unwrap())
            .await
            .unwrap();

        assert_eq!(outcome, VerifyEmailOutcome::Verified);
        let user = store.get_user(&email()).await.unwrap();
        assert!(user.is_verified());
        assert_eq!(user.verification_code(), None);
        assert!(user.verified_since().is_some());
    }

    #[tokio::test]
    async fn wrong_code_leaves_state_unchanged() {
        let store = MockUserStore::with_unverified(&email(), 123_456).await;
        let use_case = VerifyEmailUseCase::new(store.clone());

        let result = use_case
            .execute(email(), OneTimeCode::try_from(654_321).unwrap())
            .await;

        assert!(matches!(result, Err(VerifyEmailError::CodeMismatch)));
        let user = store.get_user(&email()).await.unwrap();
        assert!(!user.is_verified());
        assert!(user.verification_code().is_some());
    }

    #[tokio::test]
    async fn verifying_twice_is_a_benign_no_op() {
        let store = MockUserStore::with_unverified(&email(), 123_456).await;
        let use_case = VerifyEmailUseCase::new(store.clone());
        let code = OneTimeCode::try_from(123_456).unwrap();

        use_case.execute(email(), code).await.unwrap();
        let first_stamp = store.get_user(&email()).await.unwrap().verified_since();

        let outcome = use_case.execute(email(), code).await.unwrap();

        assert_eq!(outcome, VerifyEmailOutcome::AlreadyVerified);
        let second_stamp = store.get_user(&email()).await.unwrap().verified_since();
        assert_eq!(first_stamp, second_stamp);
    }

    #[tokio::test]
    async fn unknown_user_is_reported() {
        let use_case = VerifyEmailUseCase::new(MockUserStore::default());

        let result = use_case
            .execute(email(), OneTimeCode::try_from(123_456).unwrap())
            .await;

        assert!(matches!(
            result,
            Err(VerifyEmailError::UserStore(UserStoreError::UserNotFound))
        ));
    }
}
