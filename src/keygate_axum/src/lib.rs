pub mod routes;

pub use routes::{
    AuthApiError, ErrorResponse, ForgotPasswordRequest, LoginRequest, ResendVerificationRequest,
    ResetPasswordRequest, SignupRequest, VerifyEmailRequest, forgot_password, login,
    resend_verification, reset_password, signup, verify_email,
};
