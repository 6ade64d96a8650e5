use garde::Validate;
use kernel::model::{id::UserId, user::event::CreateUser};
use serde::{Deserialize, Serialize};

use crate::model::user::UserResponse;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[garde(length(min = 1))]
    user_name: String,
    #[garde(email)]
    email: String,
    #[garde(length(min = 8))]
    password: String,
}

impl From<RegisterRequest> for CreateUser {
    fn from(value: RegisterRequest) -> Self {
        let RegisterRequest {
            user_name,
            email,
            password,
        } = value;
        Self {
            user_name,
            email,
            password,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub access_token: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub user_id: UserId,
    pub access_token: String,
}
