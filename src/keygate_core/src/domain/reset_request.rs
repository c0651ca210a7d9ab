use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::one_time_code::OneTimeCode;

/// A single outstanding password-reset authorization.
///
/// Multiple requests may be outstanding for one user at a time; issuing a new
/// one never touches prior rows. A request is usable only while `now` is
/// before BOTH `expires_at` and `valid_until` - `valid_until` is the stricter,
/// authoritative boundary. All rows for a user are deleted once any reset
/// succeeds, and they cascade away with the user.
#[derive(Debug, Clone)]
pub struct PasswordResetRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: OneTimeCode,
    pub expires_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetRequest {
    /// Hard expiry of a reset code, measured from issuance.
    pub const EXPIRY_HOURS: i64 = 1;
    /// The shorter usable window the code must also satisfy.
    pub const VALID_FOR_MINUTES: i64 = 15;

    /// Issue a new request for `user_id` at `now`.
    pub fn issue(user_id: Uuid, code: OneTimeCode, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            code,
            expires_at: now + Duration::hours(Self::EXPIRY_HOURS),
            valid_until: now + Duration::minutes(Self::VALID_FOR_MINUTES),
            created_at: now,
        }
    }

    pub fn within_expiry(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn within_valid_window(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_until
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.within_expiry(now) && self.within_valid_window(now)
    }
}
