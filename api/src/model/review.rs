use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{GameId, ReviewId, UserId},
    review::{average_rating, event::UpdateReview, Review},
    user::Reviewer,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[garde(range(min = 1, max = 5))]
    pub rating: i32,
    #[garde(length(min = 1, max = 1000))]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[garde(inner(range(min = 1, max = 5)))]
    pub rating: Option<i32>,
    #[garde(inner(length(min = 1, max = 1000)))]
    pub comment: Option<String>,
}

#[derive(new)]
pub struct UpdateReviewRequestWithIds(ReviewId, UserId, UpdateReviewRequest);

impl From<UpdateReviewRequestWithIds> for UpdateReview {
    fn from(value: UpdateReviewRequestWithIds) -> Self {
        let UpdateReviewRequestWithIds(
            review_id,
            requested_user,
            UpdateReviewRequest { rating, comment },
        ) = value;
        UpdateReview {
            review_id,
            requested_user,
            rating,
            comment,
        }
    }
}

// レビュー一覧は平均評価と件数を添えて返す
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsResponse {
    pub count: usize,
    pub average_rating: f64,
    pub items: Vec<ReviewResponse>,
}

impl From<Vec<Review>> for ReviewsResponse {
    fn from(value: Vec<Review>) -> Self {
        let ratings: Vec<i32> = value.iter().map(|r| r.rating).collect();
        Self {
            count: value.len(),
            average_rating: average_rating(&ratings),
            items: value.into_iter().map(ReviewResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub review_id: ReviewId,
    pub game_id: GameId,
    pub reviewer: ReviewerResponse,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(value: Review) -> Self {
        let Review {
            review_id,
            game_id,
            reviewer,
            rating,
            comment,
            created_at,
        } = value;
        Self {
            review_id,
            game_id,
            reviewer: reviewer.into(),
            rating,
            comment,
            created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerResponse {
    pub user_id: UserId,
    pub user_name: String,
}

impl From<Reviewer> for ReviewerResponse {
    fn from(value: Reviewer) -> Self {
        let Reviewer { user_id, user_name } = value;
        Self { user_id, user_name }
    }
}
