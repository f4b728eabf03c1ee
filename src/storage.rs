use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::User;

/// Fixed namespace the authentication snapshot is stored under, matching
/// the key the web client uses for its persisted auth state.
pub const AUTH_NAMESPACE: &str = "auth-storage";

/// The persisted slice of authentication state. Only the user record and
/// the flag are stored; there is no schema versioning or migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn put(&self, key: &str, data: &[u8]) -> std::io::Result<()>;
    async fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>>;
    async fn delete(&self, key: &str) -> std::io::Result<()>;
}

/// File-backed snapshot store: one JSON file per namespace key.
#[derive(Clone)]
pub struct LocalSnapshotStore {
    root_dir: PathBuf,
}

impl LocalSnapshotStore {
    pub fn new(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root_dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl SnapshotStore for LocalSnapshotStore {
    async fn put(&self, key: &str, data: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(self.path_for(key), data).await
    }

    async fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn delete(&self, key: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// Persists the `{user, is_authenticated}` snapshot on login, signup and
/// logout, and restores it at startup.
#[derive(Clone)]
pub struct SessionService {
    provider: Arc<dyn SnapshotStore>,
}

impl SessionService {
    pub fn new(provider: Arc<dyn SnapshotStore>) -> Self {
        Self { provider }
    }

    pub async fn save(&self, user: &User) -> Result<(), SnapshotError> {
        let snapshot = SessionSnapshot {
            user: Some(user.clone()),
            is_authenticated: true,
        };
        let data = serde_json::to_vec(&snapshot)?;
        self.provider.put(AUTH_NAMESPACE, &data).await?;
        Ok(())
    }

    pub async fn load(&self) -> Result<Option<SessionSnapshot>, SnapshotError> {
        match self.provider.get(AUTH_NAMESPACE).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    pub async fn clear(&self) -> Result<(), SnapshotError> {
        self.provider.delete(AUTH_NAMESPACE).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Role, User};
    use chrono::Utc;

    fn service(dir: &std::path::Path) -> SessionService {
        SessionService::new(Arc::new(LocalSnapshotStore::new(dir.to_path_buf())))
    }

    fn user() -> User {
        User {
            id: "student1".to_string(),
            email: "student@example.com".to_string(),
            username: "Alex Johnson".to_string(),
            role: Role::Student,
            profile_picture: None,
            created_at: Utc::now(),
            student: None,
            teacher: None,
        }
    }

    #[actix_web::test]
    async fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = service(dir.path());

        sessions.save(&user()).await.unwrap();
        let snapshot = sessions.load().await.unwrap().unwrap();

        assert!(snapshot.is_authenticated);
        assert_eq!(snapshot.user.unwrap().id, "student1");
    }

    #[actix_web::test]
    async fn clear_removes_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = service(dir.path());

        sessions.save(&user()).await.unwrap();
        sessions.clear().await.unwrap();
        assert!(sessions.load().await.unwrap().is_none());

        // Clearing an absent snapshot is not an error.
        sessions.clear().await.unwrap();
    }

    #[actix_web::test]
    async fn missing_snapshot_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(service(dir.path()).load().await.unwrap().is_none());
    }
}
