use async_trait::async_trait;
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};
use kernel::repository::auth::AuthRepository;
use shared::error::{AppError, AppResult};

use crate::{database::model::user::UserCredentialRow, database::ConnectionPool, jwt::TokenCodec};

pub struct AuthRepositoryImpl {
    db: ConnectionPool,
    codec: TokenCodec,
}

impl AuthRepositoryImpl {
    pub fn new(db: ConnectionPool, codec: TokenCodec) -> Self {
        Self { db, codec }
    }
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn verify_user(&self, email: &str, password: &str) -> AppResult<UserId> {
        let row: Option<UserCredentialRow> = sqlx::query_as(
            r#"
                SELECT user_id, password_hash FROM users
                WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        // メールアドレス誤りとパスワード誤りは区別せず同じエラーにする
        let row = row.ok_or(AppError::UnauthenticatedError)?;
        let valid = bcrypt::verify(password, &row.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        Ok(row.user_id)
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        self.codec.issue(event.user_id)
    }

    async fn fetch_user_id_from_token(&self, access_token: &AccessToken) -> AppResult<UserId> {
        self.codec.verify(access_token)
    }
}
