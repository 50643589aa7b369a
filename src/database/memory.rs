use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserStatus};
use crate::database::repository::UserStore;

/// In-process user store used by tests and local runs without Postgres
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update<F>(&self, id: Uuid, updated_by: Option<Uuid>, apply: F) -> Result<User, DatabaseError>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("User `{}` not found", id)))?;
        apply(user);
        user.updated_at = Some(Utc::now());
        user.updated_by = updated_by;
        Ok(user.clone())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.values().find(|u| u.phone == phone).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.phone == user.phone) {
            return Err(DatabaseError::Conflict(format!(
                "User with phone `{}` already exists",
                user.phone
            )));
        }
        let record = user.into_user(Uuid::new_v4(), Utc::now());
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_by: Option<Uuid>,
    ) -> Result<User, DatabaseError> {
        self.update(id, updated_by, |u| u.password = password_hash.to_string()).await
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: UserStatus,
        updated_by: Option<Uuid>,
    ) -> Result<User, DatabaseError> {
        self.update(id, updated_by, |u| u.status = status).await
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }
}
