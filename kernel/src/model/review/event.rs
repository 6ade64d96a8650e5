use derive_new::new;

use crate::model::id::{GameId, ReviewId, UserId};

#[derive(new)]
pub struct CreateReview {
    pub game_id: GameId,
    pub reviewed_by: UserId,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug)]
pub struct UpdateReview {
    pub review_id: ReviewId,
    pub requested_user: UserId,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug)]
pub struct DeleteReview {
    pub review_id: ReviewId,
    pub requested_user: UserId,
}
