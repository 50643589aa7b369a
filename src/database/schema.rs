use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        phone TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        user_level_id UUID,
        landlord_id UUID,
        apartment_id UUID,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        created_by UUID,
        updated_at TIMESTAMPTZ,
        updated_by UUID
    )
"#;

/// Create the users table when starting against an empty database
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    info!("Database schema ready");
    Ok(())
}
