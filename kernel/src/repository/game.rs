use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    game::{
        event::{BorrowGame, CreateGame, DeleteGame, GameListOptions, ReturnGame, UpdateGame},
        Game,
    },
    id::{GameId, UserId},
};

#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn create(&self, event: CreateGame, owner_id: UserId) -> AppResult<Game>;
    async fn find_all(&self, options: GameListOptions) -> AppResult<Vec<Game>>;
    async fn find_by_id(&self, game_id: GameId) -> AppResult<Option<Game>>;
    // 所有者のみ。部分更新で、status の直接変更は整合性ルールを通す
    async fn update(&self, event: UpdateGame) -> AppResult<Game>;
    // 所有者のみ（権限マトリクスによる管理者の例外あり）
    async fn delete(&self, event: DeleteGame) -> AppResult<()>;
    // 貸出操作を行う。available からのみ遷移できる
    async fn borrow(&self, event: BorrowGame) -> AppResult<Game>;
    // 返却操作を行う。borrowed からのみ遷移できる
    async fn return_game(&self, event: ReturnGame) -> AppResult<Game>;
    // ユーザーが現在借りているゲームの一覧（履歴ではなく現在の状態のみ）
    async fn find_borrowed_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Game>>;
}
