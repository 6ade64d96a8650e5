use std::str::FromStr;

use chrono::{DateTime, Utc};
use kernel::model::{id::UserId, role::Role, user::User};
use shared::error::AppError;

// role はテキストカラムで保持し、変換時に検証する
#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        let UserRow {
            user_id,
            user_name,
            email,
            role_name,
            created_at,
        } = value;
        let role = Role::from_str(&role_name)
            .map_err(|e| AppError::ConversionEntityError(e.to_string()))?;
        Ok(User {
            user_id,
            user_name,
            email,
            role,
            created_at,
        })
    }
}

// 認証時にのみ使う行。password_hash はこの型の外には出さない
#[derive(sqlx::FromRow)]
pub struct UserCredentialRow {
    pub user_id: UserId,
    pub password_hash: String,
}
