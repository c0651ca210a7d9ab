use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use keygate_application::SignupUseCase;
use keygate_core::{CodeSource, Email, EmailSender, Password, UserStore};
use secrecy::Secret;
use serde::Deserialize;

use super::error::AuthApiError;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
}

#[tracing::instrument(name = "Signup", skip_all)]
pub async fn signup<U, C, E>(
    State((user_store, code_source, email_sender)): State<(U, C, E)>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    U: UserStore + Clone + 'static,
    C: CodeSource + Clone + 'static,
    E: EmailSender + Clone + 'static,
{
    let email = Email::try_from(request.email)?;
    let password = Password::try_from(request.password)?;

    let use_case = SignupUseCase::new(user_store, code_source, email_sender);
    use_case.execute(email, password).await?;

    Ok((
        StatusCode::CREATED,
        String::from("Account created. Check your email for a verification code."),
    ))
}
