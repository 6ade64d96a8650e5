use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{GameId, ReviewId},
    review::{
        event::{CreateReview, DeleteReview, UpdateReview},
        Review, COMMENT_MAX_LENGTH, RATING_MAX, RATING_MIN,
    },
};
use kernel::repository::review::ReviewRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::review::ReviewRow, ConnectionPool};

const SELECT_REVIEW: &str = r#"
    SELECT
        r.review_id,
        r.game_id,
        r.user_id,
        u.user_name,
        r.rating,
        r.comment,
        r.created_at
    FROM reviews AS r
    INNER JOIN users AS u ON r.user_id = u.user_id
"#;

#[derive(new)]
pub struct ReviewRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ReviewRepository for ReviewRepositoryImpl {
    async fn create(&self, event: CreateReview) -> AppResult<Review> {
        validate_review_fields(Some(event.rating), Some(&event.comment))?;

        let mut tx = self.db.begin().await?;

        // 対象ゲームの存在チェック
        let game = sqlx::query("SELECT game_id FROM games WHERE game_id = $1")
            .bind(event.game_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if game.is_none() {
            return Err(AppError::EntityNotFound(format!(
                "ゲーム（{}）が見つかりませんでした。",
                event.game_id
            )));
        }

        // 同一ユーザーによる二重投稿の事前チェック。
        // 競合時はこのチェックをすり抜けるため、最終的には
        // (game_id, user_id) のユニーク制約で防ぐ
        let existing = sqlx::query(
            r#"
                SELECT review_id FROM reviews
                WHERE game_id = $1 AND user_id = $2
            "#,
        )
        .bind(event.game_id)
        .bind(event.reviewed_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if existing.is_some() {
            return Err(AppError::DuplicateReview);
        }

        let review_id = ReviewId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO reviews (review_id, game_id, user_id, rating, comment)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(review_id)
        .bind(event.game_id)
        .bind(event.reviewed_by)
        .bind(event.rating)
        .bind(&event.comment)
        .execute(&mut *tx)
        .await
        .map_err(to_duplicate_review_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No review record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(review_id).await?.ok_or_else(|| {
            AppError::ConversionEntityError("created review record was not found".into())
        })
    }

    async fn find_by_id(&self, review_id: ReviewId) -> AppResult<Option<Review>> {
        let sql = format!("{SELECT_REVIEW} WHERE r.review_id = $1");
        let row: Option<ReviewRow> = sqlx::query_as(&sql)
            .bind(review_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Review::from))
    }

    async fn find_by_game_id(&self, game_id: GameId) -> AppResult<Vec<Review>> {
        let game = sqlx::query("SELECT game_id FROM games WHERE game_id = $1")
            .bind(game_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        if game.is_none() {
            return Err(AppError::EntityNotFound(format!(
                "ゲーム（{}）が見つかりませんでした。",
                game_id
            )));
        }

        let sql = format!(
            r#"
                {SELECT_REVIEW}
                WHERE r.game_id = $1
                ORDER BY r.created_at DESC
            "#
        );
        let rows: Vec<ReviewRow> = sqlx::query_as(&sql)
            .bind(game_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn update(&self, event: UpdateReview) -> AppResult<Review> {
        validate_review_fields(event.rating, event.comment.as_deref())?;

        let mut tx = self.db.begin().await?;

        let current = self.fetch_for_update(&mut tx, event.review_id).await?;
        // レビューを変更できるのは投稿者のみ
        if current.reviewer.user_id != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        let rating = event.rating.unwrap_or(current.rating);
        let comment = event.comment.unwrap_or(current.comment);

        let res = sqlx::query(
            r#"
                UPDATE reviews SET rating = $2, comment = $3
                WHERE review_id = $1
            "#,
        )
        .bind(event.review_id)
        .bind(rating)
        .bind(&comment)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No review record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.review_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "レビュー（{}）が見つかりませんでした。",
                event.review_id
            ))
        })
    }

    async fn delete(&self, event: DeleteReview) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let current = self.fetch_for_update(&mut tx, event.review_id).await?;
        if current.reviewer.user_id != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        let res = sqlx::query("DELETE FROM reviews WHERE review_id = $1")
            .bind(event.review_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No review record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

impl ReviewRepositoryImpl {
    async fn fetch_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        review_id: ReviewId,
    ) -> AppResult<Review> {
        let sql = format!("{SELECT_REVIEW} WHERE r.review_id = $1");
        let row: Option<ReviewRow> = sqlx::query_as(&sql)
            .bind(review_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        row.map(Review::from).ok_or_else(|| {
            AppError::EntityNotFound(format!("レビュー（{}）が見つかりませんでした。", review_id))
        })
    }
}

// API 層の garde による検証とは別に、書き込み直前にも範囲を確かめる
fn validate_review_fields(rating: Option<i32>, comment: Option<&str>) -> AppResult<()> {
    if let Some(rating) = rating {
        if !(RATING_MIN..=RATING_MAX).contains(&rating) {
            return Err(AppError::UnprocessableEntity(format!(
                "評価は {RATING_MIN} から {RATING_MAX} の整数で指定してください。"
            )));
        }
    }
    if let Some(comment) = comment {
        if comment.is_empty() || comment.chars().count() > COMMENT_MAX_LENGTH {
            return Err(AppError::UnprocessableEntity(
                "コメントは 1 文字以上 1000 文字以内で入力してください。".into(),
            ));
        }
    }
    Ok(())
}

fn to_duplicate_review_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateReview
        }
        e => AppError::SpecificOperationError(e),
    }
}
