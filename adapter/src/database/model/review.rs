use chrono::{DateTime, Utc};
use kernel::model::{
    id::{GameId, ReviewId, UserId},
    review::Review,
    user::Reviewer,
};

#[derive(sqlx::FromRow)]
pub struct ReviewRow {
    pub review_id: ReviewId,
    pub game_id: GameId,
    pub user_id: UserId,
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(value: ReviewRow) -> Self {
        let ReviewRow {
            review_id,
            game_id,
            user_id,
            user_name,
            rating,
            comment,
            created_at,
        } = value;
        Review {
            review_id,
            game_id,
            reviewer: Reviewer { user_id, user_name },
            rating,
            comment,
            created_at,
        }
    }
}
