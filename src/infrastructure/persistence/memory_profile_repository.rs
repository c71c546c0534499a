//! In-memory profile repository for development and testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{NewProfile, ProfileRecord, UserId};
use crate::domain::repositories::{ProfileRepository, RepositoryError};

/// A profile store that keeps documents in process memory.
///
/// Used when no database is configured and by HTTP tests. Documents are
/// lost on restart.
///
/// # Use Cases
///
/// - Development environments without PostgreSQL
/// - Handler tests that should not depend on a database
#[derive(Default)]
pub struct InMemoryProfileRepository {
    documents: RwLock<HashMap<UserId, ProfileRecord>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        debug!("Using in-memory profile store");
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn overwrite(
        &self,
        uid: &UserId,
        profile: &NewProfile,
    ) -> Result<ProfileRecord, RepositoryError> {
        let record = ProfileRecord {
            uid: uid.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            login_at: Utc::now(),
        };

        self.documents
            .write()
            .await
            .insert(uid.clone(), record.clone());

        Ok(record)
    }

    async fn find(&self, uid: &UserId) -> Result<Option<ProfileRecord>, RepositoryError> {
        Ok(self.documents.read().await.get(uid).cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<ProfileRecord>, RepositoryError> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        let mut records: Vec<ProfileRecord> =
            self.documents.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.login_at.cmp(&a.login_at));
        records.truncate(limit);

        Ok(records)
    }

    async fn delete(&self, uid: &UserId) -> Result<bool, RepositoryError> {
        Ok(self.documents.write().await.remove(uid).is_some())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
