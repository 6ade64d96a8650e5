use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::{GameId, ReviewId},
    review::{
        event::{CreateReview, DeleteReview, UpdateReview},
        Review,
    },
};

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    // 同じ (game, user) の組に対するレビューは 1 件まで
    async fn create(&self, event: CreateReview) -> AppResult<Review>;
    async fn find_by_id(&self, review_id: ReviewId) -> AppResult<Option<Review>>;
    // 対象ゲームのレビュー一覧。ゲームが存在しなければ EntityNotFound
    async fn find_by_game_id(&self, game_id: GameId) -> AppResult<Vec<Review>>;
    // 投稿者のみ
    async fn update(&self, event: UpdateReview) -> AppResult<Review>;
    // 投稿者のみ
    async fn delete(&self, event: DeleteReview) -> AppResult<()>;
}
