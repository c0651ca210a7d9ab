use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    email::Email,
    one_time_code::OneTimeCode,
    password::Password,
    reset_request::PasswordResetRequest,
    user::{NewUser, User, VerifiedOutcome},
};

// UserStore port trait and errors
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UserAlreadyExists, Self::UserAlreadyExists) => true,
            (Self::UserNotFound, Self::UserNotFound) => true,
            (Self::IncorrectPassword, Self::IncorrectPassword) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Persistence for account records and their credentials.
///
/// Implementations hash plaintext passwords before storing them and compare
/// candidates against the stored hash in constant time; `IncorrectPassword`
/// and `UserNotFound` must not be observably faster or slower than each other.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an unverified account. Email uniqueness is case-insensitive;
    /// a duplicate yields `UserAlreadyExists`.
    async fn add_user(&self, new_user: NewUser) -> Result<User, UserStoreError>;

    async fn get_user(&self, email: &Email) -> Result<User, UserStoreError>;

    /// Validate credentials against the stored hash.
    async fn authenticate(&self, email: &Email, password: &Password)
        -> Result<User, UserStoreError>;

    /// Overwrite the outstanding verification code for an unverified account.
    async fn set_verification_code(
        &self,
        email: &Email,
        code: OneTimeCode,
    ) -> Result<(), UserStoreError>;

    /// Transition to verified: clear the code, stamp `verified_since`.
    /// Returns `AlreadyVerified` when the account had already transitioned.
    async fn mark_verified(
        &self,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<VerifiedOutcome, UserStoreError>;

    async fn set_new_password(
        &self,
        email: &Email,
        new_password: Password,
    ) -> Result<(), UserStoreError>;
}

// ResetRequestStore port trait and errors
#[derive(Debug, Error)]
pub enum ResetRequestStoreError {
    #[error("No matching reset request")]
    NotFound,
    #[error("Reset request expired")]
    Expired,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for ResetRequestStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound, Self::NotFound) => true,
            (Self::Expired, Self::Expired) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Persistence for outstanding password-reset requests.
#[async_trait]
pub trait ResetRequestStore: Send + Sync {
    /// Append a new request. Prior requests for the same user are untouched.
    async fn insert(&self, request: PasswordResetRequest) -> Result<(), ResetRequestStoreError>;

    /// Atomically find and remove the newest request matching `(user_id,
    /// code)` that is still inside its hard expiry at `now`.
    ///
    /// No such row is `NotFound`. A row that matched but whose `valid_until`
    /// has passed is `Expired` - it is consumed regardless, so a second
    /// attempt with the same code cannot succeed. Two concurrent calls for
    /// the same code must never both return `Ok`.
    async fn consume(
        &self,
        user_id: Uuid,
        code: OneTimeCode,
        now: DateTime<Utc>,
    ) -> Result<Uuid, ResetRequestStoreError>;

    /// Remove every outstanding request for the user, returning the number
    /// of rows deleted. Called after a successful password rotation.
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, ResetRequestStoreError>;
}
