use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewUser, User, UserStatus};
use crate::database::repository::UserStore;

const USER_COLUMNS: &str = r#"
    id, name, phone, password, status,
    user_level_id, landlord_id, apartment_id,
    created_at, created_by, updated_at, updated_by
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    phone: String,
    password: String,
    status: String,
    user_level_id: Option<Uuid>,
    landlord_id: Option<Uuid>,
    apartment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: Option<DateTime<Utc>>,
    updated_by: Option<Uuid>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<UserStatus>().map_err(DatabaseError::QueryError)?;
        Ok(User {
            id: row.id,
            name: row.name,
            phone: row.phone,
            password: row.password,
            status,
            user_level_id: row.user_level_id,
            landlord_id: row.landlord_id,
            apartment_id: row.apartment_id,
            created_at: row.created_at,
            created_by: row.created_by,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        })
    }
}

/// Postgres-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE phone = $1", USER_COLUMNS))
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let phone = user.phone.clone();
        let record = user.into_user(Uuid::new_v4(), Utc::now());

        let query = format!(
            r#"
            INSERT INTO users (
                id, name, phone, password, status,
                user_level_id, landlord_id, apartment_id,
                created_at, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.phone)
            .bind(&record.password)
            .bind(record.status.as_str())
            .bind(record.user_level_id)
            .bind(record.landlord_id)
            .bind(record.apartment_id)
            .bind(record.created_at)
            .bind(record.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DatabaseError::Conflict(format!("User with phone `{}` already exists", phone))
                } else {
                    DatabaseError::Sqlx(e)
                }
            })?;

        User::try_from(row)
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_by: Option<Uuid>,
    ) -> Result<User, DatabaseError> {
        let query = format!(
            "UPDATE users SET password = $2, updated_at = NOW(), updated_by = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(password_hash)
            .bind(updated_by)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User `{}` not found", id)))?;
        User::try_from(row)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: UserStatus,
        updated_by: Option<Uuid>,
    ) -> Result<User, DatabaseError> {
        let query = format!(
            "UPDATE users SET status = $2, updated_at = NOW(), updated_by = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(updated_by)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User `{}` not found", id)))?;
        User::try_from(row)
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users ORDER BY name", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
