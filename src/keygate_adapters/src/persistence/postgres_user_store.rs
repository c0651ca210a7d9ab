use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, Pool, Postgres, Row};
use uuid::Uuid;

use keygate_core::{
    Email, NewUser, OneTimeCode, Password, User, UserStore, UserStoreError, VerifiedOutcome,
};

use super::password_hash::{
    compute_password_hash, equalize_missing_user_timing, verify_password_hash,
};

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresUserStore { pool }
    }

    async fn fetch_user(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, email, password_hash, is_verified, verification_code, verified_since
                FROM users
                WHERE email = $1
            "#,
        )
        .bind(email.as_ref().expose_secret())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: Uuid = row
            .try_get("id")
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
        let email_raw: String = row
            .try_get("email")
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
        let is_verified: bool = row
            .try_get("is_verified")
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
        let verification_code: Option<i32> = row
            .try_get("verification_code")
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
        let verified_since: Option<DateTime<Utc>> = row
            .try_get("verified_since")
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        let email = Email::try_from(Secret::from(email_raw))
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;
        let verification_code = verification_code
            .map(|c| OneTimeCode::try_from(c as u32))
            .transpose()
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        Ok(Some(User::from_parts(
            id,
            email,
            Secret::from(password_hash),
            is_verified,
            verification_code,
            verified_since,
        )))
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn add_user(&self, new_user: NewUser) -> Result<User, UserStoreError> {
        let password_hash = compute_password_hash(new_user.password.clone())
            .await
            .map_err(UserStoreError::UnexpectedError)?;

        let user = User::unverified(
            new_user.email,
            password_hash,
            new_user.verification_code,
        );

        let query = sqlx::query(
            r#"
                INSERT INTO users (id, email, password_hash, is_verified, verification_code)
                VALUES ($1, $2, $3, FALSE, $4)
            "#,
        )
        .bind(user.id())
        .bind(user.email().as_ref().expose_secret())
        .bind(user.password_hash().expose_secret())
        .bind(user.verification_code().map(|c| c.as_u32() as i32));

        query.execute(&self.pool).await.map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint().is_some() {
                    return UserStoreError::UserAlreadyExists;
                }
            }
            UserStoreError::UnexpectedError(e.to_string())
        })?;

        Ok(user)
    }

    #[tracing::instrument(name = "Retrieving user from PostgreSQL", skip_all)]
    async fn get_user(&self, email: &Email) -> Result<User, UserStoreError> {
        self.fetch_user(email)
            .await?
            .ok_or(UserStoreError::UserNotFound)
    }

    #[tracing::instrument(name = "Validating user credentials in PostgreSQL", skip_all)]
    async fn authenticate(
        &self,
        email: &Email,
        password: &Password,
    ) -> Result<User, UserStoreError> {
        let Some(user) = self.fetch_user(email).await? else {
            equalize_missing_user_timing(password.clone()).await;
            return Err(UserStoreError::UserNotFound);
        };

        verify_password_hash(user.password_hash().clone(), password.clone())
            .await
            .map_err(|_| UserStoreError::IncorrectPassword)?;

        Ok(user)
    }

    #[tracing::instrument(name = "Replacing verification code in PostgreSQL", skip_all)]
    async fn set_verification_code(
        &self,
        email: &Email,
        code: OneTimeCode,
    ) -> Result<(), UserStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE users
                SET verification_code = $1
                WHERE email = $2 AND is_verified = FALSE
            "#,
        )
        .bind(code.as_u32() as i32)
        .bind(email.as_ref().expose_secret())
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }

        Ok(())
    }

    #[tracing::instrument(name = "Marking user verified in PostgreSQL", skip_all)]
    async fn mark_verified(
        &self,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<VerifiedOutcome, UserStoreError> {
        // Single conditional update: a racing call finds zero rows and falls
        // through to the already-verified check.
        let result = sqlx::query(
            r#"
                UPDATE users
                SET is_verified = TRUE, verification_code = NULL, verified_since = $1
                WHERE email = $2 AND is_verified = FALSE
            "#,
        )
        .bind(now)
        .bind(email.as_ref().expose_secret())
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(VerifiedOutcome::Verified);
        }

        match self.fetch_user(email).await? {
            Some(user) if user.is_verified() => Ok(VerifiedOutcome::AlreadyVerified),
            Some(_) => Err(UserStoreError::UnexpectedError(
                "conditional verify matched no rows for an unverified user".to_string(),
            )),
            None => Err(UserStoreError::UserNotFound),
        }
    }

    #[tracing::instrument(name = "Set new password", skip_all)]
    async fn set_new_password(
        &self,
        email: &Email,
        new_password: Password,
    ) -> Result<(), UserStoreError> {
        let password_hash = compute_password_hash(new_password)
            .await
            .map_err(UserStoreError::UnexpectedError)?;

        let result = sqlx::query(
            r#"
                UPDATE users
                SET password_hash = $1
                WHERE email = $2
            "#,
        )
        .bind(password_hash.expose_secret())
        .bind(email.as_ref().expose_secret())
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }

        Ok(())
    }
}
