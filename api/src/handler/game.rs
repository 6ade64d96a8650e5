use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::game::event::{BorrowGame, DeleteGame, ReturnGame};
use kernel::model::id::GameId;
use kernel::permission::action;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::{AuthorizedUser, OptionalAuthorizedUser},
    model::game::{
        CreateGameRequest, GameListQuery, GameResponse, GamesResponse, UpdateGameRequest,
        UpdateGameRequestWithIds,
    },
};

pub async fn register_game(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    req.validate(&())?;

    registry
        .game_repository()
        .create(req.into(), user.id())
        .await
        .map(|game| (StatusCode::CREATED, Json(game.into())))
}

// 一覧は未認証でも閲覧できる。mine=true は認証済みの場合のみ効く
pub async fn show_game_list(
    user: OptionalAuthorizedUser,
    Query(query): Query<GameListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<GamesResponse>> {
    let options = query.into_options(user.0.map(|u| u.user_id));
    registry
        .game_repository()
        .find_all(options)
        .await
        .map(GamesResponse::from)
        .map(Json)
}

pub async fn show_game(
    Path(game_id): Path<GameId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<GameResponse>> {
    registry
        .game_repository()
        .find_by_id(game_id)
        .await
        .and_then(|game| match game {
            Some(g) => Ok(Json(g.into())),
            None => Err(AppError::EntityNotFound(
                "指定されたゲームが見つかりませんでした".into(),
            )),
        })
}

pub async fn update_game(
    user: AuthorizedUser,
    Path(game_id): Path<GameId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateGameRequest>,
) -> AppResult<Json<GameResponse>> {
    req.validate(&())?;

    registry
        .game_repository()
        .update(UpdateGameRequestWithIds::new(game_id, user.id(), req).into())
        .await
        .map(|game| Json(game.into()))
}

pub async fn delete_game(
    user: AuthorizedUser,
    Path(game_id): Path<GameId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    // 所有者でなくても game.delete.any を持つロールなら削除できる
    let allow_non_owner = registry
        .authorization_policy()
        .can_perform(&user, action::GAME_DELETE_ANY);

    registry
        .game_repository()
        .delete(DeleteGame {
            game_id,
            requested_user: user.id(),
            allow_non_owner,
        })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn borrow_game(
    user: AuthorizedUser,
    Path(game_id): Path<GameId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<GameResponse>> {
    registry
        .game_repository()
        .borrow(BorrowGame::new(game_id, user.id(), Utc::now()))
        .await
        .map(|game| Json(game.into()))
}

pub async fn return_game(
    user: AuthorizedUser,
    Path(game_id): Path<GameId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<GameResponse>> {
    registry
        .game_repository()
        .return_game(ReturnGame::new(game_id, user.id()))
        .await
        .map(|game| Json(game.into()))
}
