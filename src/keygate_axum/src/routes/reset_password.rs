use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use keygate_application::ConfirmPasswordResetUseCase;
use keygate_core::{Email, OneTimeCode, Password, ResetRequestStore, UserStore};
use secrecy::Secret;
use serde::Deserialize;

use super::error::AuthApiError;

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Secret<String>,
    pub code: String,
    #[serde(rename = "newPassword")]
    pub new_password: Secret<String>,
}

#[tracing::instrument(name = "Reset password", skip_all)]
pub async fn reset_password<U, R>(
    State((user_store, reset_store)): State<(U, R)>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthApiError>
where
    U: UserStore + Clone + 'static,
    R: ResetRequestStore + Clone + 'static,
{
    let email = Email::try_from(request.email)?;
    let code = request.code.parse::<OneTimeCode>()?;
    let new_password = Password::try_from(request.new_password)?;

    let use_case = ConfirmPasswordResetUseCase::new(user_store, reset_store);
    use_case.execute(email, code, new_password).await?;

    Ok((StatusCode::OK, String::from("Password has been reset.")))
}
