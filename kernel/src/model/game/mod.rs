// kernel/src/model/game/mod.rs
use chrono::{DateTime, Utc};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::model::{
    id::{GameId, UserId},
    user::{Borrower, GameOwner},
};

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    Available,
    Borrowed,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub game_id: GameId,
    pub title: String,
    pub platform: String,
    pub genre: String,
    pub release_year: i32,
    pub status: GameStatus,
    pub owner: GameOwner,
    pub borrowed_by: Option<Borrower>,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner.owner_id == user_id
    }

    pub fn is_borrowed_by(&self, user_id: UserId) -> bool {
        self.borrowed_by
            .as_ref()
            .map(|b| b.user_id == user_id)
            .unwrap_or(false)
    }

    // status = available ⇔ borrowed_by = None ⇔ borrowed_at = None
    pub fn is_consistent(&self) -> bool {
        match self.status {
            GameStatus::Available => self.borrowed_by.is_none() && self.borrowed_at.is_none(),
            GameStatus::Borrowed => self.borrowed_by.is_some() && self.borrowed_at.is_some(),
            // playing は所有者が手元で使用中の状態なので貸出情報を持たない
            GameStatus::Playing => self.borrowed_by.is_none() && self.borrowed_at.is_none(),
        }
    }

    // 貸出遷移の事前条件。書き込み時点の最新状態に対して必ず再検証する
    pub fn check_borrowable_by(&self, requester: UserId) -> AppResult<()> {
        if self.status != GameStatus::Available {
            return Err(AppError::UnprocessableEntity(format!(
                "ゲーム（{}）は現在貸出できる状態ではありません。",
                self.game_id
            )));
        }
        if self.is_owned_by(requester) {
            return Err(AppError::SelfBorrowDenied);
        }
        Ok(())
    }

    // 返却遷移の事前条件。所有者か現在の借り手のみ返却できる
    pub fn check_returnable_by(&self, requester: UserId) -> AppResult<()> {
        if self.status != GameStatus::Borrowed {
            return Err(AppError::UnprocessableEntity(format!(
                "ゲーム（{}）は貸出中ではありません。",
                self.game_id
            )));
        }
        if !self.is_owned_by(requester) && !self.is_borrowed_by(requester) {
            return Err(AppError::ForbiddenOperation);
        }
        Ok(())
    }
}

// 所有者がステータスを直接編集した場合の整合性ルール。
// available を指定したら貸出情報を必ずクリアし、
// 借り手がいないのに borrowed を指定する編集は拒否する。
// 戻り値は貸出情報（borrowed_by / borrowed_at）をクリアするかどうか。
pub fn validate_status_edit(new_status: GameStatus, has_borrower: bool) -> AppResult<bool> {
    match new_status {
        GameStatus::Available => Ok(true),
        GameStatus::Borrowed if !has_borrower => Err(AppError::UnprocessableEntity(
            "借り手がいない状態で borrowed には変更できません。".into(),
        )),
        GameStatus::Borrowed => Ok(false),
        GameStatus::Playing if has_borrower => Err(AppError::UnprocessableEntity(
            "貸出中のゲームを playing には変更できません。".into(),
        )),
        GameStatus::Playing => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn game(status: GameStatus, owner: UserId, borrower: Option<UserId>) -> Game {
        Game {
            game_id: GameId::new(),
            title: "Outer Wilds".into(),
            platform: "Switch".into(),
            genre: "Adventure".into(),
            release_year: 2019,
            status,
            owner: GameOwner {
                owner_id: owner,
                owner_name: "owner".into(),
            },
            borrowed_by: borrower.map(|user_id| Borrower {
                user_id,
                user_name: "borrower".into(),
            }),
            borrowed_at: borrower.map(|_| Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn available_game_can_be_borrowed_by_non_owner() {
        let owner = UserId::new();
        let g = game(GameStatus::Available, owner, None);
        assert!(g.check_borrowable_by(UserId::new()).is_ok());
    }

    #[test]
    fn owner_cannot_borrow_own_game() {
        let owner = UserId::new();
        let g = game(GameStatus::Available, owner, None);
        assert!(matches!(
            g.check_borrowable_by(owner),
            Err(AppError::SelfBorrowDenied)
        ));
    }

    #[test]
    fn borrowed_game_cannot_be_borrowed_again() {
        let g = game(GameStatus::Borrowed, UserId::new(), Some(UserId::new()));
        assert!(matches!(
            g.check_borrowable_by(UserId::new()),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn return_allowed_for_owner_and_borrower_only() {
        let owner = UserId::new();
        let borrower = UserId::new();
        let g = game(GameStatus::Borrowed, owner, Some(borrower));

        assert!(g.check_returnable_by(owner).is_ok());
        assert!(g.check_returnable_by(borrower).is_ok());
        assert!(matches!(
            g.check_returnable_by(UserId::new()),
            Err(AppError::ForbiddenOperation)
        ));
    }

    #[test]
    fn return_requires_borrowed_status() {
        let owner = UserId::new();
        let g = game(GameStatus::Available, owner, None);
        assert!(matches!(
            g.check_returnable_by(owner),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn status_edit_to_available_clears_borrow_fields() -> anyhow::Result<()> {
        assert!(validate_status_edit(GameStatus::Available, true)?);
        assert!(validate_status_edit(GameStatus::Available, false)?);
        Ok(())
    }

    #[test]
    fn status_edit_to_borrowed_requires_borrower() {
        assert!(matches!(
            validate_status_edit(GameStatus::Borrowed, false),
            Err(AppError::UnprocessableEntity(_))
        ));
        assert!(matches!(validate_status_edit(GameStatus::Borrowed, true), Ok(false)));
    }

    #[test]
    fn consistency_invariant_holds_per_status() {
        let owner = UserId::new();
        assert!(game(GameStatus::Available, owner, None).is_consistent());
        assert!(game(GameStatus::Borrowed, owner, Some(UserId::new())).is_consistent());
        assert!(!game(GameStatus::Borrowed, owner, None).is_consistent());
    }
}
