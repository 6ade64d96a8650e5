use chrono::{DateTime, Utc};
use derive_new::new;

use crate::model::{
    game::GameStatus,
    id::{GameId, UserId},
};

pub struct CreateGame {
    pub title: String,
    pub platform: String,
    pub genre: String,
    pub release_year: i32,
    // 省略時は available で登録する
    pub status: Option<GameStatus>,
}

#[derive(Debug)]
pub struct UpdateGame {
    pub game_id: GameId,
    pub requested_user: UserId,
    pub title: Option<String>,
    pub platform: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub status: Option<GameStatus>,
}

#[derive(Debug)]
pub struct DeleteGame {
    pub game_id: GameId,
    pub requested_user: UserId,
    // 権限マトリクスで game.delete.any を許可されたユーザーのみ true
    pub allow_non_owner: bool,
}

#[derive(new)]
pub struct BorrowGame {
    pub game_id: GameId,
    pub requested_user: UserId,
    pub borrowed_at: DateTime<Utc>,
}

#[derive(new)]
pub struct ReturnGame {
    pub game_id: GameId,
    pub requested_user: UserId,
}

#[derive(Debug, Default)]
pub struct GameListOptions {
    pub platform: Option<String>,
    pub genre: Option<String>,
    pub status: Option<GameStatus>,
    // 認証済みの呼び出し元が自分の所有分に絞り込む場合のみ Some
    pub owned_by: Option<UserId>,
}
