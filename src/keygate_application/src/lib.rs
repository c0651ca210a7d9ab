pub mod use_cases;

pub use use_cases::{
    confirm_password_reset::{ConfirmPasswordResetError, ConfirmPasswordResetUseCase},
    login::{LoginError, LoginUseCase},
    request_password_reset::{RequestPasswordResetError, RequestPasswordResetUseCase},
    resend_verification::{
        ResendVerificationError, ResendVerificationOutcome, ResendVerificationUseCase,
    },
    signup::{SignupError, SignupUseCase},
    verify_email::{VerifyEmailError, VerifyEmailOutcome, VerifyEmailUseCase},
};
