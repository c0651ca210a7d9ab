use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use keygate_application::{ResendVerificationOutcome, ResendVerificationUseCase};
use keygate_core::{CodeSource, Email, EmailSender, UserStore};
use secrecy::Secret;
use serde::Deserialize;

use super::error::AuthApiError;

#[derive(Deserialize)]
pub struct ResendVerificationRequest {
    pub email: Secret<String>,
}

#[tracing::instrument(name = "Resend verification", skip_all)]
pub async fn resend_verification<U, C, E>(
    State((user_store, code_source, email_sender)): State<(U, C, E)>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    U: UserStore + Clone + 'static,
    C: CodeSource + Clone + 'static,
    E: EmailSender + Clone + 'static,
{
    let email = Email::try_from(request.email)?;

    let use_case = ResendVerificationUseCase::new(user_store, code_source, email_sender);
    let outcome = use_case.execute(email).await?;

    let message = match outcome {
        ResendVerificationOutcome::Sent => {
            "If an account exists for that address, a verification code has been sent."
        }
        ResendVerificationOutcome::AlreadyVerified => "Email is already verified.",
    };

    Ok((StatusCode::OK, String::from(message)))
}
