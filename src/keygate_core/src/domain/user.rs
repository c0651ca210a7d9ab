use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

use crate::domain::{email::Email, one_time_code::OneTimeCode, password::Password};

/// Signup data handed to a [`crate::UserStore`] to create an account.
///
/// Carries the plaintext password; the store hashes it before anything is
/// persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password: Password,
    pub verification_code: OneTimeCode,
}

impl NewUser {
    pub fn new(email: Email, password: Password, verification_code: OneTimeCode) -> Self {
        Self {
            email,
            password,
            verification_code,
        }
    }
}

/// Outcome of a verification transition.
///
/// `AlreadyVerified` is a benign signal, not a failure: the account was
/// verified before the call and nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifiedOutcome {
    Verified,
    AlreadyVerified,
}

/// A persisted account record.
///
/// Invariant: `verification_code` is `None` whenever `is_verified` is true,
/// and `verified_since` is stamped exactly once, on the first verification.
/// There is no transition out of the verified state.
#[derive(Debug, Clone)]
pub struct User {
    id: Uuid,
    email: Email,
    password_hash: Secret<String>,
    is_verified: bool,
    verification_code: Option<OneTimeCode>,
    verified_since: Option<DateTime<Utc>>,
}

impl User {
    /// Create a fresh unverified account with an outstanding verification code.
    pub fn unverified(email: Email, password_hash: Secret<String>, code: OneTimeCode) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            is_verified: false,
            verification_code: Some(code),
            verified_since: None,
        }
    }

    /// Rehydrate a record loaded from a store.
    pub fn from_parts(
        id: Uuid,
        email: Email,
        password_hash: Secret<String>,
        is_verified: bool,
        verification_code: Option<OneTimeCode>,
        verified_since: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            // A verified account never carries an outstanding code.
            verification_code: if is_verified { None } else { verification_code },
            is_verified,
            verified_since,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &Secret<String> {
        &self.password_hash
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn verification_code(&self) -> Option<OneTimeCode> {
        self.verification_code
    }

    pub fn verified_since(&self) -> Option<DateTime<Utc>> {
        self.verified_since
    }

    /// Numeric comparison of a submitted code against the outstanding one.
    pub fn code_matches(&self, submitted: OneTimeCode) -> bool {
        self.verification_code == Some(submitted)
    }

    /// Replace the outstanding verification code. Re-issuing overwrites.
    pub fn set_verification_code(&mut self, code: OneTimeCode) {
        self.verification_code = Some(code);
    }

    /// Transition `Unverified -> Verified`, clearing the code and stamping
    /// `verified_since`. Calling on an already verified account is a no-op.
    pub fn mark_verified(&mut self, now: DateTime<Utc>) -> VerifiedOutcome {
        if self.is_verified {
            return VerifiedOutcome::AlreadyVerified;
        }
        self.is_verified = true;
        self.verification_code = None;
        self.verified_since = Some(now);
        VerifiedOutcome::Verified
    }

    pub fn set_password_hash(&mut self, password_hash: Secret<String>) {
        self.password_hash = password_hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let email = Email::try_from(Secret::from("user@example.com".to_string())).unwrap();
        User::unverified(
            email,
            Secret::from("fake-hash".to_string()),
            OneTimeCode::try_from(123_456).unwrap(),
        )
    }

    #[test]
    fn new_accounts_start_unverified_with_a_code() {
        let user = sample_user();
        assert!(!user.is_verified());
        assert!(user.verification_code().is_some());
        assert!(user.verified_since().is_none());
    }

    #[test]
    fn marking_verified_clears_the_code_and_stamps_the_time() {
        let mut user = sample_user();
        let now = Utc::now();

        assert_eq!(user.mark_verified(now), VerifiedOutcome::Verified);
        assert!(user.is_verified());
        assert_eq!(user.verification_code(), None);
        assert_eq!(user.verified_since(), Some(now));
    }

    #[test]
    fn marking_verified_twice_keeps_the_original_timestamp() {
        let mut user = sample_user();
        let first = Utc::now();
        user.mark_verified(first);

        let later = first + chrono::Duration::hours(1);
        assert_eq!(user.mark_verified(later), VerifiedOutcome::AlreadyVerified);
        assert_eq!(user.verified_since(), Some(first));
    }

    #[test]
    fn code_comparison_is_numeric() {
        let user = sample_user();
        assert!(user.code_matches(OneTimeCode::try_from(123_456).unwrap()));
        assert!(!user.code_matches(OneTimeCode::try_from(654_321).unwrap()));
    }

    #[test]
    fn rehydration_drops_a_stale_code_on_verified_accounts() {
        let email = Email::try_from(Secret::from("user@example.com".to_string())).unwrap();
        let user = User::from_parts(
            Uuid::new_v4(),
            email,
            Secret::from("fake-hash".to_string()),
            true,
            Some(OneTimeCode::try_from(123_456).unwrap()),
            Some(Utc::now()),
        );
        assert_eq!(user.verification_code(), None);
    }
}
