use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use keygate_core::{
    OneTimeCode, PasswordResetRequest, ResetRequestStore, ResetRequestStoreError,
};

/// In-memory reset-request store.
///
/// `consume` holds the write lock across lookup and removal, which gives the
/// same at-most-once guarantee the Postgres store gets from its conditional
/// delete.
#[derive(Default, Clone)]
pub struct HashMapResetRequestStore {
    requests: Arc<RwLock<Vec<PasswordResetRequest>>>,
}

impl HashMapResetRequestStore {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn count_for_user(&self, user_id: Uuid) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .count()
    }
}

#[async_trait::async_trait]
impl ResetRequestStore for HashMapResetRequestStore {
    async fn insert(&self, request: PasswordResetRequest) -> Result<(), ResetRequestStoreError> {
        self.requests.write().await.push(request);
        Ok(())
    }

    async fn consume(
        &self,
        user_id: Uuid,
        code: OneTimeCode,
        now: DateTime<Utc>,
    ) -> Result<Uuid, ResetRequestStoreError> {
        let mut requests = self.requests.write().await;

        let position = requests
            .iter()
            .enumerate()
            .filter(|(_, r)| r.user_id == user_id && r.code == code && r.within_expiry(now))
            .max_by_key(|(_, r)| r.created_at)
            .map(|(i, _)| i)
            .ok_or(ResetRequestStoreError::NotFound)?;

        // Removed even when stale, so the code cannot be retried.
        let request = requests.remove(position);
        if !request.within_valid_window(now) {
            return Err(ResetRequestStoreError::Expired);
        }
        Ok(request.user_id)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, ResetRequestStoreError> {
        let mut requests = self.requests.write().await;
        let before = requests.len();
        requests.retain(|r| r.user_id != user_id);
        Ok((before - requests.len()) as u64)
    }
}
