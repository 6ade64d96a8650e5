use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;
use kernel::model::auth::event::CreateToken;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::{
        auth::{AccessTokenResponse, LoginRequest, RegisterRequest, RegisterResponse},
        user::UserResponse,
    },
};

pub async fn register(
    State(registry): State<AppRegistry>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    req.validate(&())?;

    let user = registry.user_repository().create(req.into()).await?;
    // 登録直後からログイン済みとして扱えるようにトークンも返す
    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(user.user_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.into(),
            access_token: access_token.0,
        }),
    ))
}

pub async fn login(
    State(registry): State<AppRegistry>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AccessTokenResponse>> {
    req.validate(&())?;

    let user_id = registry
        .auth_repository()
        .verify_user(&req.email, &req.password)
        .await?;
    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(user_id))
        .await?;

    Ok(Json(AccessTokenResponse {
        user_id,
        access_token: access_token.0,
    }))
}

pub async fn show_current_user(user: AuthorizedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.user))
}
