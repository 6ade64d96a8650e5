use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::UserId;
use kernel::permission::action;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::{
        game::GamesResponse,
        user::{
            UpdateUserPasswordRequest, UpdateUserPasswordRequestWithUserId, UpdateUserRoleRequest,
            UpdateUserRoleRequestWithUserId, UsersResponse,
        },
    },
};

// ユーザー一覧は vendor と admin が等しく閲覧できる
pub async fn show_user_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UsersResponse>> {
    if !registry
        .authorization_policy()
        .can_perform(&user, action::USER_LIST)
    {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .user_repository()
        .find_all()
        .await
        .map(UsersResponse::from)
        .map(Json)
}

pub async fn update_user_role(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> AppResult<StatusCode> {
    if !registry
        .authorization_policy()
        .can_perform(&user, action::USER_ROLE_UPDATE)
    {
        return Err(AppError::ForbiddenOperation);
    }

    registry
        .user_repository()
        .update_role(UpdateUserRoleRequestWithUserId::new(user_id, req).into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn update_user_password(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserPasswordRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    registry
        .user_repository()
        .update_password(UpdateUserPasswordRequestWithUserId::new(user.id(), req).into())
        .await
        .map(|_| StatusCode::OK)
}

// 指定ユーザーが現在借りているゲームの一覧（公開）
pub async fn show_borrowed_list(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<GamesResponse>> {
    registry
        .game_repository()
        .find_borrowed_by_user_id(user_id)
        .await
        .map(GamesResponse::from)
        .map(Json)
}
