use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use keygate_application::{VerifyEmailOutcome, VerifyEmailUseCase};
use keygate_core::{Email, OneTimeCode, UserStore};
use secrecy::Secret;
use serde::Deserialize;

use super::error::AuthApiError;

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: Secret<String>,
    pub code: String,
}

#[tracing::instrument(name = "Verify email", skip_all)]
pub async fn verify_email<U>(
    State(user_store): State<U>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    U: UserStore + Clone + 'static,
{
    let email = Email::try_from(request.email)?;
    let code = request.code.parse::<OneTimeCode>()?;

    let use_case = VerifyEmailUseCase::new(user_store);
    let outcome = use_case.execute(email, code).await?;

    let message = match outcome {
        VerifyEmailOutcome::Verified => "Email verified.",
        VerifyEmailOutcome::AlreadyVerified => "Email is already verified.",
    };

    Ok((StatusCode::OK, String::from(message)))
}
