use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Staff account roles, ordered by privilege. `super_admin` may manage
/// `admin` accounts; `admin` is restricted to `staff` accounts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

impl UserRole {
    fn rank(self) -> u8 {
        match self {
            UserRole::Staff => 0,
            UserRole::Admin => 1,
            UserRole::SuperAdmin => 2,
        }
    }

    pub fn at_least(self, required: UserRole) -> bool {
        self.rank() >= required.rank()
    }

    /// Whether an account of this role may create/modify/disable an
    /// account of role `other`.
    pub fn can_manage(self, other: UserRole) -> bool {
        match self {
            UserRole::SuperAdmin => other != UserRole::SuperAdmin,
            UserRole::Admin => other == UserRole::Staff,
            UserRole::Staff => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Staff => "staff",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(UserRole::Staff),
            "admin" => Ok(UserRole::Admin),
            "super_admin" => Ok(UserRole::SuperAdmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_hierarchy() {
        assert!(UserRole::SuperAdmin.at_least(UserRole::Admin));
        assert!(UserRole::Admin.at_least(UserRole::Staff));
        assert!(!UserRole::Staff.at_least(UserRole::Admin));
    }

    #[test]
    fn account_management_rules() {
        assert!(UserRole::SuperAdmin.can_manage(UserRole::Admin));
        assert!(UserRole::SuperAdmin.can_manage(UserRole::Staff));
        assert!(!UserRole::SuperAdmin.can_manage(UserRole::SuperAdmin));
        assert!(UserRole::Admin.can_manage(UserRole::Staff));
        assert!(!UserRole::Admin.can_manage(UserRole::Admin));
        assert!(!UserRole::Staff.can_manage(UserRole::Staff));
    }
}
