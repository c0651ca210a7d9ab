use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use keygate_application::{
    ConfirmPasswordResetError, LoginError, RequestPasswordResetError, ResendVerificationError,
    SignupError, VerifyEmailError,
};
use keygate_core::{
    EmailParseError, OneTimeCodeError, PasswordPolicyError, ResetRequestStoreError, UserStoreError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email address has not been verified")]
    EmailNotVerified,

    #[error("Invalid verification code")]
    InvalidVerificationCode,

    #[error("Invalid reset code")]
    InvalidResetCode,

    #[error("Reset code has expired. Please request a new one.")]
    ResetCodeExpired,

    #[error("Email could not be delivered. Please try again later.")]
    DeliveryFailure(String),

    #[error("Unexpected error")]
    UnexpectedError(String),
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AuthApiError::InvalidInput(_)
            | AuthApiError::InvalidResetCode
            | AuthApiError::ResetCodeExpired => (StatusCode::BAD_REQUEST, self.to_string()),

            AuthApiError::UserAlreadyExists => (StatusCode::CONFLICT, self.to_string()),

            AuthApiError::InvalidCredentials | AuthApiError::InvalidVerificationCode => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }

            AuthApiError::EmailNotVerified => (StatusCode::FORBIDDEN, self.to_string()),

            AuthApiError::DeliveryFailure(ref reason) => {
                tracing::error!(%reason, "email delivery failed");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }

            AuthApiError::UnexpectedError(ref reason) => {
                tracing::error!(%reason, "request failed unexpectedly");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status_code, body).into_response()
    }
}

impl From<EmailParseError> for AuthApiError {
    fn from(error: EmailParseError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<PasswordPolicyError> for AuthApiError {
    fn from(error: PasswordPolicyError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<OneTimeCodeError> for AuthApiError {
    fn from(error: OneTimeCodeError) -> Self {
        AuthApiError::InvalidInput(error.to_string())
    }
}

impl From<UserStoreError> for AuthApiError {
    fn from(error: UserStoreError) -> Self {
        match error {
            UserStoreError::UserAlreadyExists => AuthApiError::UserAlreadyExists,
            UserStoreError::UserNotFound | UserStoreError::IncorrectPassword => {
                AuthApiError::InvalidCredentials
            }
            UserStoreError::UnexpectedError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<ResetRequestStoreError> for AuthApiError {
    fn from(error: ResetRequestStoreError) -> Self {
        match error {
            ResetRequestStoreError::NotFound => AuthApiError::InvalidResetCode,
            ResetRequestStoreError::Expired => AuthApiError::ResetCodeExpired,
            ResetRequestStoreError::UnexpectedError(e) => AuthApiError::UnexpectedError(e),
        }
    }
}

impl From<SignupError> for AuthApiError {
    fn from(error: SignupError) -> Self {
        match error {
            SignupError::UserStore(e) => e.into(),
            SignupError::Delivery(e) => AuthApiError::DeliveryFailure(e.to_string()),
        }
    }
}

impl From<VerifyEmailError> for AuthApiError {
    fn from(error: VerifyEmailError) -> Self {
        match error {
            // Unknown email answers exactly like a wrong code.
            VerifyEmailError::CodeMismatch
            | VerifyEmailError::UserStore(UserStoreError::UserNotFound) => {
                AuthApiError::InvalidVerificationCode
            }
            VerifyEmailError::UserStore(e) => e.into(),
        }
    }
}

impl From<ResendVerificationError> for AuthApiError {
    fn from(error: ResendVerificationError) -> Self {
        match error {
            ResendVerificationError::UserStore(e) => e.into(),
            ResendVerificationError::Delivery(e) => AuthApiError::DeliveryFailure(e.to_string()),
        }
    }
}

impl From<LoginError> for AuthApiError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::InvalidCredentials => AuthApiError::InvalidCredentials,
            LoginError::EmailNotVerified => AuthApiError::EmailNotVerified,
            LoginError::UserStore(e) => e.into(),
        }
    }
}

impl From<RequestPasswordResetError> for AuthApiError {
    fn from(error: RequestPasswordResetError) -> Self {
        match error {
            RequestPasswordResetError::Delivery(e) => AuthApiError::DeliveryFailure(e.to_string()),
            RequestPasswordResetError::UserStore(e) => e.into(),
            RequestPasswordResetError::ResetStore(e) => e.into(),
        }
    }
}

impl From<ConfirmPasswordResetError> for AuthApiError {
    fn from(error: ConfirmPasswordResetError) -> Self {
        match error {
            ConfirmPasswordResetError::NotFound => AuthApiError::InvalidResetCode,
            ConfirmPasswordResetError::Expired => AuthApiError::ResetCodeExpired,
            // The gate never admits whether the account exists.
            ConfirmPasswordResetError::UserStore(UserStoreError::UserNotFound) => {
                AuthApiError::InvalidResetCode
            }
            ConfirmPasswordResetError::UserStore(e) => e.into(),
            ConfirmPasswordResetError::ResetStore(e) => e.into(),
        }
    }
}
