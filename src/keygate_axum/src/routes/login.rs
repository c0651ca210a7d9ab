use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use keygate_application::LoginUseCase;
use keygate_core::{Email, Password, UserStore};
use secrecy::Secret;
use serde::Deserialize;

use super::error::AuthApiError;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
}

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login<U>(
    State(user_store): State<U>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    U: UserStore + Clone + 'static,
{
    let email = Email::try_from(request.email)?;
    // A password that fails the account policy cannot match any stored hash,
    // so it answers as bad credentials rather than as a validation error.
    let password =
        Password::try_from(request.password).map_err(|_| AuthApiError::InvalidCredentials)?;

    let use_case = LoginUseCase::new(user_store);
    use_case.execute(email, password).await?;

    Ok((StatusCode::OK, String::from("Login successful.")))
}
