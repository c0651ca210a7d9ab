pub mod confirm_password_reset;
pub mod login;
pub mod request_password_reset;
pub mod resend_verification;
pub mod signup;
pub mod verify_email;
