use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use keygate_core::{
    Email, NewUser, OneTimeCode, Password, User, UserStore, UserStoreError, VerifiedOutcome,
};

use super::password_hash::{
    compute_password_hash, equalize_missing_user_timing, verify_password_hash,
};

/// In-memory user store for tests and local development.
///
/// Hashes with the same Argon2id parameters as the Postgres store so the two
/// are interchangeable behind the port.
#[derive(Default, Clone)]
pub struct HashMapUserStore {
    users: Arc<RwLock<HashMap<Email, User>>>,
}

impl HashMapUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl UserStore for HashMapUserStore {
    async fn add_user(&self, new_user: NewUser) -> Result<User, UserStoreError> {
        let password_hash = compute_password_hash(new_user.password)
            .await
            .map_err(UserStoreError::UnexpectedError)?;

        let mut users = self.users.write().await;
        if users.contains_key(&new_user.email) {
            return Err(UserStoreError::UserAlreadyExists);
        }
        let user = User::unverified(
            new_user.email.clone(),
            password_hash,
            new_user.verification_code,
        );
        users.insert(new_user.email, user.clone());
        Ok(user)
    }

    async fn get_user(&self, email: &Email) -> Result<User, UserStoreError> {
        let users = self.users.read().await;
        users
            .get(email)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn authenticate(
        &self,
        email: &Email,
        password: &Password,
    ) -> Result<User, UserStoreError> {
        let user = {
            let users = self.users.read().await;
            users.get(email).cloned()
        };

        let Some(user) = user else {
            equalize_missing_user_timing(password.clone()).await;
            return Err(UserStoreError::UserNotFound);
        };

        verify_password_hash(user.password_hash().clone(), password.clone())
            .await
            .map_err(|_| UserStoreError::IncorrectPassword)?;

        Ok(user)
    }

    async fn set_verification_code(
        &self,
        email: &Email,
        code: OneTimeCode,
    ) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(email).ok_or(UserStoreError::UserNotFound)?;
        if user.is_verified() {
            // A verified account never carries a code.
            return Err(UserStoreError::UserNotFound);
        }
        user.set_verification_code(code);
        Ok(())
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
        email: &Email,
        new_password: Password,
    ) -> Result<(), UserStoreError> {
        let password_hash = compute_password_hash(new_password)
            .await
            .map_err(UserStoreError::UnexpectedError)?;

        let mut users = self.users.write().await;
        let user = users.get_mut(email).ok_or(UserStoreError::UserNotFound)?;
        user.set_password_hash(password_hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn email(s: &str) -> Email {
        Email::try_from(Secret::from(s.to_string())).unwrap()
    }

    fn password(s: &str) -> Password {
        Password::try_from(Secret::from(s.to_string())).unwrap()
    }

    fn new_user(s: &str) -> NewUser {
        NewUser::new(
            email(s),
            password("Abcdef1!234X"),
            OneTimeCode::try_from(123_456).unwrap(),
        )
    }

    #[tokio::test]
    async fn add_then_authenticate_round_trips() {
        let store = HashMapUserStore::new();
        store.add_user(new_user("test@example.com")).await.unwrap();

        let user = store
            .authenticate(&email("test@example.com"), &password("Abcdef1!234X"))
            .await
            .unwrap();
        assert!(!user.is_verified());
    }

    #[tokio::test]
    async fn duplicate_emails_conflict_case_insensitively() {
        let store = HashMapUserStore::new();
        store.add_user(new_user("test@example.com")).await.unwrap();

        let result = store.add_user(new_user("TEST@Example.Com")).await;
        assert_eq!(result.unwrap_err(), UserStoreError::UserAlreadyExists);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let store = HashMapUserStore::new();
        store.add_user(new_user("test@example.com")).await.unwrap();

        let result = store
            .authenticate(&email("test@example.com"), &password("Wrong1!wrongX"))
            .await;
        assert_eq!(result.unwrap_err(), UserStoreError::IncorrectPassword);
    }

    #[tokio::test]
    async fn mark_verified_transitions_once() {
        let store = HashMapUserStore::new();
        store.add_user(new_user("test@example.com")).await.unwrap();
        let now = Utc::now();

        assert_eq!(
            store.mark_verified(&email("test@example.com"), now).await.unwrap(),
            VerifiedOutcome::Verified
        );
        assert_eq!(
            store
                .mark_verified(&email("test@example.com"), now + chrono::Duration::hours(1))
                .await
                .unwrap(),
            VerifiedOutcome::AlreadyVerified
        );

        let user = store.get_user(&email("test@example.com")).await.unwrap();
        assert_eq!(user.verified_since(), Some(now));
        assert_eq!(user.verification_code(), None);
    }

    #[tokio::test]
    async fn set_new_password_rotates_the_hash() {
        let store = HashMapUserStore::new();
        store.add_user(new_user("test@example.com")).await.unwrap();

        store
            .set_new_password(&email("test@example.com"), password("NewPass1!234X"))
            .await
            .unwrap();

        assert!(store
            .authenticate(&email("test@example.com"), &password("Abcdef1!234X"))
            .await
            .is_err());
        assert!(store
            .authenticate(&email("test@example.com"), &password("NewPass1!234X"))
            .await
            .is_ok());
    }
}
