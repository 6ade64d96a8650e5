use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::UserId,
    role::Role,
    user::{
        event::{UpdateUserPassword, UpdateUserRole},
        User,
    },
};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

#[derive(Debug, Serialize, Deserialize, VariantNames)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RoleName {
    User,
    Vendor,
    Admin,
}

impl From<Role> for RoleName {
    fn from(value: Role) -> Self {
        match value {
            Role::User => Self::User,
            Role::Vendor => Self::Vendor,
            Role::Admin => Self::Admin,
        }
    }
}

impl From<RoleName> for Role {
    fn from(value: RoleName) -> Self {
        match value {
            RoleName::User => Self::User,
            RoleName::Vendor => Self::Vendor,
            RoleName::Admin => Self::Admin,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub items: Vec<UserResponse>,
}

impl From<Vec<User>> for UsersResponse {
    fn from(value: Vec<User>) -> Self {
        Self {
            items: value.into_iter().map(UserResponse::from).collect(),
        }
    }
}

// パスワードハッシュは User 自体が持たないため、
// レスポンスに漏れる経路はここには存在しない
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: RoleName,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            user_name,
            email,
            role,
            created_at,
        } = value;
        Self {
            user_id,
            user_name,
            email,
            role: RoleName::from(role),
            created_at,
        }
    }
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPasswordRequest {
    #[garde(length(min = 1))]
    current_password: String,
    #[garde(length(min = 8))]
    new_password: String,
}

#[derive(new)]
pub struct UpdateUserPasswordRequestWithUserId(UserId, UpdateUserPasswordRequest);

impl From<UpdateUserPasswordRequestWithUserId> for UpdateUserPassword {
    fn from(value: UpdateUserPasswordRequestWithUserId) -> Self {
        let UpdateUserPasswordRequestWithUserId(
            user_id,
            UpdateUserPasswordRequest {
                current_password,
                new_password,
            },
        ) = value;
        UpdateUserPassword {
            user_id,
            current_password,
            new_password,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleRequest {
    role: RoleName,
}

#[derive(new)]
pub struct UpdateUserRoleRequestWithUserId(UserId, UpdateUserRoleRequest);

impl From<UpdateUserRoleRequestWithUserId> for UpdateUserRole {
    fn from(value: UpdateUserRoleRequestWithUserId) -> Self {
        let UpdateUserRoleRequestWithUserId(user_id, UpdateUserRoleRequest { role }) = value;
        Self {
            user_id,
            role: Role::from(role),
        }
    }
}
