use chrono::Utc;
use keygate_core::{
    Email, OneTimeCode, Password, ResetRequestStore, ResetRequestStoreError, UserStore,
    UserStoreError,
};

/// Error types for the confirm password reset use case
#[derive(Debug, thiserror::Error)]
pub enum ConfirmPasswordResetError {
    /// No matching, unexpired reset request. Also covers an unknown email.
    #[error("Invalid reset code")]
    NotFound,
    /// The request matched but its usable window has closed; distinct from
    /// `NotFound` so the caller can suggest requesting a new code.
    #[error("Reset code has expired")]
    Expired,
    #[error("User store error: {0}")]
    UserStore(UserStoreError),
    #[error("Reset request store error: {0}")]
    ResetStore(ResetRequestStoreError),
}

/// Confirm password reset use case - step two of the reset protocol.
///
/// Consuming the code, rotating the password, and deleting every remaining
/// reset request for the account. One successful reset invalidates all
/// outstanding codes, not just the consumed one.
pub struct ConfirmPasswordResetUseCase<U, R>
where
    U: UserStore,
    R: ResetRequestStore,
{
    user_store: U,
    reset_store: R,
}

impl<U, R> ConfirmPasswordResetUseCase<U, R>
where
    U: UserStore,
    R: ResetRequestStore,
{
    pub fn new(user_store: U, reset_store: R) -> Self {
        Self {
            user_store,
            reset_store,
        }
    }

    /// Execute the confirm password reset use case
    ///
    /// # Arguments
    /// * `email` - The account's email address
    /// * `code` - The submitted reset code
    /// * `new_password` - Replacement password that passed the policy
    #[tracing::instrument(name = "ConfirmPasswordResetUseCase::execute", skip(self, new_password))]
    pub async fn execute(
        &self,
        email: Email,
        code: OneTimeCode,
        new_password: Password,
    ) -> Result<(), ConfirmPasswordResetError> {
        let user = match self.user_store.get_user(&email).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => return Err(ConfirmPasswordResetError::NotFound),
            Err(e) => return Err(ConfirmPasswordResetError::UserStore(e)),
        };

        let user_id = match self.reset_store.consume(user.id(), code, Utc::now()).await {
            Ok(user_id) => user_id,
            Err(ResetRequestStoreError::NotFound) => return Err(ConfirmPasswordResetError::NotFound),
            Err(ResetRequestStoreError::Expired) => return Err(ConfirmPasswordResetError::Expired),
            Err(e) => return Err(ConfirmPasswordResetError::ResetStore(e)),
        };

        self.user_store
            .set_new_password(&email, new_password)
            .await
            .map_err(ConfirmPasswordResetError::UserStore)?;

        // Full invalidation: earlier unconsumed requests die with this one.
        let removed = self
            .reset_store
            .delete_all_for_user(user_id)
            .await
            .map_err(ConfirmPasswordResetError::ResetStore)?;
        tracing::debug!(removed, "invalidated outstanding reset requests");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use keygate_core::{NewUser, PasswordResetRequest, User, VerifiedOutcome};
    use secrecy::{ExposeSecret, Secret};
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    #[derive(Clone)]
    struct MockUserStore {
        user: Arc<RwLock<User>>,
    }

    #[async_trait::async_trait]
    impl UserStore for MockUserStore {
        async fn add_user(&self, _new_user: NewUser) -> Result<User, UserStoreError> {
            unimplemented!()
        }

        async fn get_user(&self, email: &Email) -> Result<User, UserStoreError> {
            let user = self.user.read().await;
            if user.email() == email {
                Ok(user.clone())
            } else {
                Err(UserStoreError::UserNotFound)
            }
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
            _email: &Email,
            _now: DateTime<Utc>,
        ) -> Result<VerifiedOutcome, UserStoreError> {
            unimplemented!()
        }

        async fn set_new_password(
            &self,
            email: &Email,
            new_password: Password,
        ) -> Result<(), UserStoreError> {
            let mut user = self.user.write().await;
            if user.email() != email {
                return Err(UserStoreError::UserNotFound);
            }
            user.set_password_hash(Secret::from(
                new_password.as_ref().expose_secret().clone(),
            ));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MockResetStore {
        requests: Arc<RwLock<Vec<PasswordResetRequest>>>,
    }

    #[async_trait::async_trait]
    impl ResetRequestStore for MockResetStore {
        async fn insert(
            &self,
            request: PasswordResetRequest,
        ) -> Result<(), ResetRequestStoreError> {
            self.requests.write().await.push(request);
            Ok(())
        }

        async fn consume(
            &self,
            user_id: Uuid,
            code: OneTimeCode,
            now: DateTime<Utc>,
        ) -> Result<Uuid, ResetRequestStoreError> {
            let mut requests = self.requests.write().await;
            let position = requests
                .iter()
                .enumerate()
                .filter(|(_, r)| {
                    r.user_id == user_id && r.code == code && r.within_expiry(now)
                })
                .max_by_key(|(_, r)| r.created_at)
                .map(|(i, _)| i)
                .ok_or(ResetRequestStoreError::NotFound)?;

            let request = requests.remove(position);
            if !request.within_valid_window(now) {
                return Err(ResetRequestStoreError::Expired);
            }
            Ok(request.user_id)
        }

        async fn delete_all_for_user(
            &self,
            user_id: Uuid,
        ) -> Result<u64, ResetRequestStoreError> {
            let mut requests = self.requests.write().await;
            let before = requests.len();
            requests.retain(|r| r.user_id != user_id);
            Ok((before - requests.len()) as u64)
        }
    }

    fn email(s: &str) -> Email {
        Email::try_from(Secret::from(s.to_string())).unwrap()
    }

    fn password(s: &str) -> Password {
        Password::try_from(Secret::from(s.to_string())).unwrap()
    }

    fn code(n: u32) -> OneTimeCode {
        OneTimeCode::try_from(n).unwrap()
    }

    fn verified_user() -> User {
        let mut user = User::unverified(
            email("test@example.com"),
            Secret::from("old-hash".to_string()),
            code(111_111),
        );
        user.mark_verified(Utc::now());
        user
    }

    fn stores_with_request(
        request_code: u32,
    ) -> (MockUserStore, MockResetStore, Uuid) {
        let user = verified_user();
        let user_id = user.id();
        let user_store = MockUserStore {
            user: Arc::new(RwLock::new(user)),
        };
        let reset_store = MockResetStore::default();
        let request = PasswordResetRequest::issue(user_id, code(request_code), Utc::now());
        reset_store
            .requests
            .try_write()
            .unwrap()
            .push(request);
        (user_store, reset_store, user_id)
    }

    #[tokio::test]
    async fn valid_code_rotates_the_password_and_clears_all_requests() {
        let (user_store, reset_store, user_id) = stores_with_request(222_333);
        // A second outstanding request from an earlier call.
        reset_store
            .requests
            .try_write()
            .unwrap()
            .push(PasswordResetRequest::issue(
                user_id,
                code(999_888),
                Utc::now(),
            ));

        let use_case = ConfirmPasswordResetUseCase::new(user_store.clone(), reset_store.clone());

        use_case
            .execute(
                email("test@example.com"),
                code(222_333),
                password("NewPass1!234X"),
            )
            .await
            .unwrap();

        assert_eq!(
            user_store.user.read().await.password_hash().expose_secret(),
            "NewPass1!234X"
        );
        assert!(reset_store.requests.read().await.is_empty());
    }

    #[tokio::test]
    async fn a_code_cannot_be_consumed_twice() {
        let (user_store, reset_store, _) = stores_with_request(222_333);
        let use_case = ConfirmPasswordResetUseCase::new(user_store, reset_store);

        use_case
            .execute(
                email("test@example.com"),
                code(222_333),
                password("NewPass1!234X"),
            )
            .await
            .unwrap();

        let second = use_case
            .execute(
                email("test@example.com"),
                code(222_333),
                password("OtherPass1!2X"),
            )
            .await;

        assert!(matches!(second, Err(ConfirmPasswordResetError::NotFound)));
    }

    #[tokio::test]
    async fn wrong_code_is_not_found() {
        let (user_store, reset_store, _) = stores_with_request(222_333);
        let use_case = ConfirmPasswordResetUseCase::new(user_store, reset_store);

        let result = use_case
            .execute(
                email("test@example.com"),
                code(444_555),
                password("NewPass1!234X"),
            )
            .await;

        assert!(matches!(result, Err(ConfirmPasswordResetError::NotFound)));
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let (user_store, reset_store, _) = stores_with_request(222_333);
        let use_case = ConfirmPasswordResetUseCase::new(user_store, reset_store);

        let result = use_case
            .execute(
                email("nobody@example.com"),
                code(222_333),
                password("NewPass1!234X"),
            )
            .await;

        assert!(matches!(result, Err(ConfirmPasswordResetError::NotFound)));
    }

    #[tokio::test]
    async fn a_request_past_its_valid_window_is_expired() {
        let user = verified_user();
        let user_id = user.id();
        let user_store = MockUserStore {
            user: Arc::new(RwLock::new(user)),
        };
        let reset_store = MockResetStore::default();
        // Issued 30 minutes ago: inside expires_at (1 h), past valid_until (15 min).
        let issued = Utc::now() - chrono::Duration::minutes(30);
        reset_store
            .requests
            .try_write()
            .unwrap()
            .push(PasswordResetRequest::issue(user_id, code(222_333), issued));

        let use_case = ConfirmPasswordResetUseCase::new(user_store, reset_store);

        let result = use_case
            .execute(
                email("test@example.com"),
                code(222_333),
                password("NewPass1!234X"),
            )
            .await;

        assert!(matches!(result, Err(ConfirmPasswordResetError::Expired)));
    }
}
