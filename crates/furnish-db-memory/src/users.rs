//! In-memory `UserRepository` backend.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use furnish_core::{NewUser, User, UserId};
use furnish_storage::{StorageError, UserRepository};

/// Map-backed user repository with a uniqueness check on email.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    rows: DashMap<UserId, User>,
    next_id: AtomicI64,
}

impl MemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, StorageError> {
        if self.rows.iter().any(|e| e.value().email == user.email) {
            return Err(StorageError::already_exists("user", user.email.clone()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = OffsetDateTime::now_utc();
        let row = User {
            id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .rows
            .iter()
            .find(|e| e.value().email == email)
            .map(|e| e.value().clone()))
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.rows.get(&id).map(|e| e.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use furnish_core::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            name: "Test".into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let repo = MemoryUserRepository::new();
        repo.create(&new_user("a@b.c")).await.unwrap();
        let err = repo.create(&new_user("a@b.c")).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn lookup_by_email_and_id() {
        let repo = MemoryUserRepository::new();
        let created = repo.create(&new_user("a@b.c")).await.unwrap();
        assert_eq!(
            repo.get_by_email("a@b.c").await.unwrap().unwrap().id,
            created.id
        );
        assert!(repo.get_by_id(created.id).await.unwrap().is_some());
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }
}
