use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UserId,
    user::{
        event::{CreateUser, UpdateUserPassword, UpdateUserRole},
        User,
    },
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::user::{UserCredentialRow, UserRow},
    ConnectionPool,
};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let user_id = UserId::new();
        let hashed = bcrypt::hash(&event.password, bcrypt::DEFAULT_COST)?;

        let res = sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role_name)
                VALUES ($1, $2, $3, $4, 'user')
            "#,
        )
        .bind(user_id)
        .bind(&event.user_name)
        .bind(&event.email)
        .bind(&hashed)
        .execute(self.db.inner_ref())
        .await
        .map_err(to_duplicate_user_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No user record has been created".into(),
            ));
        }

        self.find_current_user(user_id).await?.ok_or_else(|| {
            AppError::ConversionEntityError("created user record was not found".into())
        })
    }

    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
                SELECT user_id, user_name, email, role_name, created_at
                FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(current_user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(User::try_from).transpose()
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
                SELECT user_id, user_name, email, role_name, created_at
                FROM users
                ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_password(&self, event: UpdateUserPassword) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let original: UserCredentialRow = sqlx::query_as(
            r#"
                SELECT user_id, password_hash FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        // 現在のパスワードが一致しない場合は認証エラー
        let valid = bcrypt::verify(&event.current_password, &original.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        let new_hash = bcrypt::hash(&event.new_password, bcrypt::DEFAULT_COST)?;
        sqlx::query(
            r#"
                UPDATE users SET password_hash = $2
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .bind(&new_hash)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE users SET role_name = $2
                WHERE user_id = $1
            "#,
        )
        .bind(event.user_id)
        .bind(event.role.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(
                "指定されたユーザーが見つかりませんでした。".into(),
            ));
        }

        Ok(())
    }
}

// user_name / email のユニーク制約違反は 409 にマップする
fn to_duplicate_user_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateUser
        }
        e => AppError::SpecificOperationError(e),
    }
}
