pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    email::{Email, EmailParseError},
    one_time_code::{OneTimeCode, OneTimeCodeError},
    password::{Password, PasswordPolicyError},
    reset_request::PasswordResetRequest,
    user::{NewUser, User, VerifiedOutcome},
};

pub use ports::{
    repositories::{ResetRequestStore, ResetRequestStoreError, UserStore, UserStoreError},
    services::{CodeSource, EmailSender, EmailSendError, RandomCodeSource},
};
