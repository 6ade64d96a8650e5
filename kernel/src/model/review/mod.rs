// kernel/src/model/review/mod.rs
use chrono::{DateTime, Utc};

use crate::model::{
    id::{GameId, ReviewId},
    user::Reviewer,
};

pub mod event;

pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;
pub const COMMENT_MAX_LENGTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub review_id: ReviewId,
    pub game_id: GameId,
    pub reviewer: Reviewer,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

// 平均評価は算術平均を小数第 2 位に丸めて返す。
// レビューが 1 件もない場合は NaN ではなく 0 とする。
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i32 = ratings.iter().sum();
    let mean = f64::from(sum) / ratings.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_no_ratings_is_exactly_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn average_is_arithmetic_mean_rounded_to_two_decimals() {
        assert_eq!(average_rating(&[5, 4]), 4.5);
        assert_eq!(average_rating(&[5, 4, 4]), 4.33);
        assert_eq!(average_rating(&[1, 2]), 1.5);
        assert_eq!(average_rating(&[3]), 3.0);
    }
}
