use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};

#[async_trait]
pub trait AuthRepository: Send + Sync {
    // メールアドレスとパスワードからユーザーを検証する
    async fn verify_user(&self, email: &str, password: &str) -> AppResult<UserId>;
    // 署名付きトークンを発行する。サーバー側には何も保存しない
    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken>;
    // トークンの署名と有効期限を検証してユーザー ID を取り出す。
    // ストレージには一切アクセスしない
    async fn fetch_user_id_from_token(&self, access_token: &AccessToken) -> AppResult<UserId>;
}
