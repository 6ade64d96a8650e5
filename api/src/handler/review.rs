use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::{GameId, ReviewId};
use kernel::model::review::event::{CreateReview, DeleteReview};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::review::{
        CreateReviewRequest, ReviewResponse, ReviewsResponse, UpdateReviewRequest,
        UpdateReviewRequestWithIds,
    },
};

pub async fn register_review(
    user: AuthorizedUser,
    Path(game_id): Path<GameId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    req.validate(&())?;

    registry
        .review_repository()
        .create(CreateReview::new(game_id, user.id(), req.rating, req.comment))
        .await
        .map(|review| (StatusCode::CREATED, Json(review.into())))
}

// レビュー一覧は未認証でも閲覧できる
pub async fn show_review_list(
    Path(game_id): Path<GameId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReviewsResponse>> {
    registry
        .review_repository()
        .find_by_game_id(game_id)
        .await
        .map(ReviewsResponse::from)
        .map(Json)
}

pub async fn update_review(
    user: AuthorizedUser,
    Path(review_id): Path<ReviewId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    req.validate(&())?;

    registry
        .review_repository()
        .update(UpdateReviewRequestWithIds::new(review_id, user.id(), req).into())
        .await
        .map(|review| Json(review.into()))
}

pub async fn delete_review(
    user: AuthorizedUser,
    Path(review_id): Path<ReviewId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .review_repository()
        .delete(DeleteReview {
            review_id,
            requested_user: user.id(),
        })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
