use std::sync::LazyLock;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use keygate_core::Password;
use secrecy::{ExposeSecret, Secret};

fn argon2() -> Result<Argon2<'static>, String> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
    ))
}

#[tracing::instrument(name = "Computing password hash", skip_all)]
pub async fn compute_password_hash(password: Password) -> Result<Secret<String>, String> {
    let current_span: tracing::Span = tracing::Span::current();

    let result = tokio::task::spawn_blocking(move || {
        current_span.in_scope(move || {
            let salt: SaltString = SaltString::generate(rand_core::OsRng);
            argon2()?
                .hash_password(password.as_ref().expose_secret().as_bytes(), &salt)
                .map(|h| Secret::from(h.to_string()))
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?;

    result
}

#[tracing::instrument(name = "Verify password hash", skip_all)]
pub async fn verify_password_hash(
    expected_password_hash: Secret<String>,
    password_candidate: Password,
) -> Result<(), String> {
    let current_span: tracing::Span = tracing::Span::current();
    let result = tokio::task::spawn_blocking(move || {
        current_span.in_scope(|| {
            let expected_password_hash: PasswordHash<'_> =
                PasswordHash::new(expected_password_hash.expose_secret())
                    .map_err(|e| e.to_string())?;

            argon2()?
                .verify_password(
                    password_candidate.as_ref().expose_secret().as_bytes(),
                    &expected_password_hash,
                )
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?;

    result
}

static DUMMY_PASSWORD_HASH: LazyLock<Secret<String>> = LazyLock::new(|| {
    let salt = SaltString::generate(rand_core::OsRng);
    let hash = argon2()
        .and_then(|hasher| {
            hasher
                .hash_password(b"keygate-dummy-password", &salt)
                .map_err(|e| e.to_string())
        })
        .expect("hashing a fixed password must succeed");
    Secret::from(hash.to_string())
});

/// Burn a verification against a throwaway hash.
///
/// Run on the user-not-found path so a lookup miss costs the same as a wrong
/// password and response timing does not reveal whether the account exists.
pub async fn equalize_missing_user_timing(password_candidate: Password) {
    let _ = verify_password_hash(DUMMY_PASSWORD_HASH.clone(), password_candidate).await;
}
