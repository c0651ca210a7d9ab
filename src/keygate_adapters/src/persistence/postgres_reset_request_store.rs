use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, Row};
use uuid::Uuid;

use keygate_core::{
    OneTimeCode, PasswordResetRequest, ResetRequestStore, ResetRequestStoreError,
};

#[derive(Clone)]
pub struct PostgresResetRequestStore {
    pool: PgPool,
}

impl PostgresResetRequestStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresResetRequestStore { pool }
    }
}

#[async_trait::async_trait]
impl ResetRequestStore for PostgresResetRequestStore {
    #[tracing::instrument(name = "Inserting reset request into PostgreSQL", skip_all)]
    async fn insert(&self, request: PasswordResetRequest) -> Result<(), ResetRequestStoreError> {
        sqlx::query(
            r#"
                INSERT INTO password_reset_requests
                    (id, user_id, code, expires_at, valid_until, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.code.as_u32() as i32)
        .bind(request.expires_at)
        .bind(request.valid_until)
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ResetRequestStoreError::UnexpectedError(e.to_string()))?;

        Ok(())
    }

    #[tracing::instrument(name = "Consuming reset request in PostgreSQL", skip_all)]
    async fn consume(
        &self,
        user_id: Uuid,
        code: OneTimeCode,
        now: DateTime<Utc>,
    ) -> Result<Uuid, ResetRequestStoreError> {
        // One conditional delete: lookup and invalidation are a single
        // statement, so two racing consumes cannot both take the row.
        let row = sqlx::query(
            r#"
                DELETE FROM password_reset_requests
                WHERE id = (
                    SELECT id FROM password_reset_requests
                    WHERE user_id = $1 AND code = $2 AND expires_at > $3
                    ORDER BY created_at DESC
                    LIMIT 1
                    FOR UPDATE SKIP LOCKED
                )
                RETURNING user_id, valid_until
            "#,
        )
        .bind(user_id)
        .bind(code.as_u32() as i32)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ResetRequestStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(ResetRequestStoreError::NotFound);
        };

        let valid_until: DateTime<Utc> = row
            .try_get("valid_until")
            .map_err(|e| ResetRequestStoreError::UnexpectedError(e.to_string()))?;
        if now >= valid_until {
            return Err(ResetRequestStoreError::Expired);
        }

        row.try_get("user_id")
            .map_err(|e| ResetRequestStoreError::UnexpectedError(e.to_string()))
    }

    #[tracing::instrument(name = "Deleting reset requests for user in PostgreSQL", skip_all)]
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, ResetRequestStoreError> {
        let result = sqlx::query(
            r#"
                DELETE FROM password_reset_requests
                WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ResetRequestStoreError::UnexpectedError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
