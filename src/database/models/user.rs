use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account state. Users are never removed, only deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            other => Err(format!("unknown user status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub status: UserStatus,
    pub user_level_id: Option<Uuid>,
    pub landlord_id: Option<Uuid>,
    pub apartment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Input for the administrative create flow. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub password: String,
    pub user_level_id: Option<Uuid>,
    pub landlord_id: Option<Uuid>,
    pub apartment_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

impl NewUser {
    pub fn into_user(self, id: Uuid, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            phone: self.phone,
            password: self.password,
            status: UserStatus::Active,
            user_level_id: self.user_level_id,
            landlord_id: self.landlord_id,
            apartment_id: self.apartment_id,
            created_at: now,
            created_by: self.created_by,
            updated_at: None,
            updated_by: None,
        }
    }
}
