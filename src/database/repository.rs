use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserStatus};

/// Persistence seam for user records.
///
/// Reads happen once per request during identity resolution; writes only on
/// the administrative and login-upgrade paths. Every write is a single atomic
/// statement and concurrent writers resolve last-write-wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// Look up by normalized phone (`2547XXXXXXXX`)
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with `Conflict` when the phone is already registered
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;

    /// Replace the stored password hash
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_by: Option<Uuid>,
    ) -> Result<User, DatabaseError>;

    async fn set_status(
        &self,
        id: Uuid,
        status: UserStatus,
        updated_by: Option<Uuid>,
    ) -> Result<User, DatabaseError>;

    /// All users ordered by name
    async fn list(&self) -> Result<Vec<User>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
