pub mod error;
pub mod forgot_password;
pub mod login;
pub mod resend_verification;
pub mod reset_password;
pub mod signup;
pub mod verify_email;

pub use error::{AuthApiError, ErrorResponse};
pub use forgot_password::{ForgotPasswordRequest, forgot_password};
pub use login::{LoginRequest, login};
pub use resend_verification::{ResendVerificationRequest, resend_verification};
pub use reset_password::{ResetPasswordRequest, reset_password};
pub use signup::{SignupRequest, signup};
pub use verify_email::{VerifyEmailRequest, verify_email};
