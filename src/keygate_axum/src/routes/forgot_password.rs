use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use keygate_application::RequestPasswordResetUseCase;
use keygate_core::{CodeSource, Email, EmailSender, ResetRequestStore, UserStore};
use secrecy::Secret;
use serde::Deserialize;

use super::error::AuthApiError;

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Secret<String>,
}

/// The response body is identical whether or not the address has an account.
#[tracing::instrument(name = "Forgot password", skip_all)]
pub async fn forgot_password<U, R, C, E>(
    State((user_store, reset_store, code_source, email_sender)): State<(U, R, C, E)>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    U: UserStore + Clone + 'static,
    R: ResetRequestStore + Clone + 'static,
    C: CodeSource + Clone + 'static,
    E: EmailSender + Clone + 'static,
{
    let email = Email::try_from(request.email)?;

    let use_case =
        RequestPasswordResetUseCase::new(user_store, reset_store, code_source, email_sender);
    use_case.execute(email).await?;

    Ok((
        StatusCode::OK,
        String::from("If an account exists for that address, a reset code has been sent."),
    ))
}
