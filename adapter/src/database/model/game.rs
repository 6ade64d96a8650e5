use std::str::FromStr;

use chrono::{DateTime, Utc};
use kernel::model::{
    game::{Game, GameStatus},
    id::{GameId, UserId},
    user::{Borrower, GameOwner},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct GameRow {
    pub game_id: GameId,
    pub title: String,
    pub platform: String,
    pub genre: String,
    pub release_year: i32,
    pub status: String,
    pub owned_by: UserId,
    pub owner_name: String,
    pub borrowed_by: Option<UserId>,
    pub borrower_name: Option<String>,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<GameRow> for Game {
    type Error = AppError;

    fn try_from(value: GameRow) -> Result<Self, Self::Error> {
        let GameRow {
            game_id,
            title,
            platform,
            genre,
            release_year,
            status,
            owned_by,
            owner_name,
            borrowed_by,
            borrower_name,
            borrowed_at,
            created_at,
        } = value;
        let status = GameStatus::from_str(&status)
            .map_err(|e| AppError::ConversionEntityError(e.to_string()))?;
        // borrowed_by と borrower_name は LEFT JOIN 由来なので必ず対で揃う
        let borrowed_by = match (borrowed_by, borrower_name) {
            (Some(user_id), Some(user_name)) => Some(Borrower { user_id, user_name }),
            _ => None,
        };
        Ok(Game {
            game_id,
            title,
            platform,
            genre,
            release_year,
            status,
            owner: GameOwner {
                owner_id: owned_by,
                owner_name,
            },
            borrowed_by,
            borrowed_at,
            created_at,
        })
    }
}
