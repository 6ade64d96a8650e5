// kernel/src/model/user/mod.rs
use chrono::{DateTime, Utc};

use crate::model::{id::UserId, role::Role};
use crate::permission::RoleBearer;

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl RoleBearer for User {
    fn role(&self) -> Role {
        self.role
    }
}

// ゲーム所有者への参照（所有権は持たない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOwner {
    pub owner_id: UserId,
    pub owner_name: String,
}

// 現在の借り手への参照（所有権は持たない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Borrower {
    pub user_id: UserId,
    pub user_name: String,
}

// レビュー投稿者への参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reviewer {
    pub user_id: UserId,
    pub user_name: String,
}
