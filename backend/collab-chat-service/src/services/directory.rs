//! User directory lookups
//!
//! The `users` table belongs to the identity side of the platform. This service only
//! reads `{id, display_name, role}` from it to validate pairings and to snapshot
//! participant details.

use crate::error::AppError;
use crate::models::UserRole;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub id: Uuid,
    pub display_name: String,
    pub role: UserRole,
}

/// Resolves user ids. `Ok(None)` means the user does not exist; `Err` is a
/// lookup failure and must not be reported as "not found".
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<DirectoryUser>, AppError>;
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<DirectoryUser>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, Option<String>, Option<String>, String)>(
            r#"
            SELECT id, display_name, username, role
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "directory lookup failed");
            AppError::Directory(e.to_string())
        })?;

        let Some((id, display_name, username, role)) = row else {
            return Ok(None);
        };

        // Bad data in the users table; retrying will not help
        let role = UserRole::from_db(&role).ok_or_else(|| {
            tracing::error!(user_id = %id, role = %role, "directory row has unknown role");
            AppError::Internal(format!("user {id} has unknown role {role:?}"))
        })?;

        Ok(Some(DirectoryUser {
            id,
            display_name: display_name.or(username).unwrap_or_default(),
            role,
        }))
    }
}

/// Directory backed by a map. Used with the in-memory store for local runs and tests.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, DirectoryUser>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: DirectoryUser) {
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.id, user);
    }

    /// Convenience for seeding: registers a user and returns its id
    pub fn add(&self, display_name: &str, role: UserRole) -> Uuid {
        let id = Uuid::new_v4();
        self.insert(DirectoryUser {
            id,
            display_name: display_name.to_string(),
            role,
        });
        id
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<DirectoryUser>, AppError> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_directory_lookup() {
        let directory = InMemoryUserDirectory::new();
        let id = directory.add("Acme", UserRole::Brand);

        let user = directory.find_user(id).await.unwrap().unwrap();
        assert_eq!(user.display_name, "Acme");
        assert_eq!(user.role, UserRole::Brand);

        assert!(directory.find_user(Uuid::new_v4()).await.unwrap().is_none());
    }
}
