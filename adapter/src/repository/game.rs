use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    game::{
        event::{BorrowGame, CreateGame, DeleteGame, GameListOptions, ReturnGame, UpdateGame},
        validate_status_edit, Game, GameStatus,
    },
    id::{GameId, UserId},
};
use kernel::repository::game::GameRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::game::GameRow, ConnectionPool};

// 一覧・詳細で共通に使う SELECT 句。
// 所有者は必ず存在するので INNER JOIN、借り手は LEFT JOIN
const SELECT_GAME: &str = r#"
    SELECT
        g.game_id,
        g.title,
        g.platform,
        g.genre,
        g.release_year,
        g.status,
        g.owned_by,
        o.user_name AS owner_name,
        g.borrowed_by,
        b.user_name AS borrower_name,
        g.borrowed_at,
        g.created_at
    FROM games AS g
    INNER JOIN users AS o ON g.owned_by = o.user_id
    LEFT OUTER JOIN users AS b ON g.borrowed_by = b.user_id
"#;

#[derive(new)]
pub struct GameRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl GameRepository for GameRepositoryImpl {
    async fn create(&self, event: CreateGame, owner_id: UserId) -> AppResult<Game> {
        let game_id = GameId::new();
        let status = event.status.unwrap_or(GameStatus::Available);

        let res = sqlx::query(
            r#"
                INSERT INTO games (game_id, title, platform, genre, release_year, status, owned_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(game_id)
        .bind(&event.title)
        .bind(&event.platform)
        .bind(&event.genre)
        .bind(event.release_year)
        .bind(status.as_ref())
        .bind(owner_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No game record has been created".into(),
            ));
        }

        self.find_by_id(game_id).await?.ok_or_else(|| {
            AppError::ConversionEntityError("created game record was not found".into())
        })
    }

    async fn find_all(&self, options: GameListOptions) -> AppResult<Vec<Game>> {
        let sql = format!(
            r#"
                {SELECT_GAME}
                WHERE ($1::text IS NULL OR g.platform = $1)
                  AND ($2::text IS NULL OR g.genre = $2)
                  AND ($3::text IS NULL OR g.status = $3)
                  AND ($4::uuid IS NULL OR g.owned_by = $4)
                ORDER BY g.created_at DESC
            "#
        );
        let rows: Vec<GameRow> = sqlx::query_as(&sql)
            .bind(options.platform)
            .bind(options.genre)
            .bind(options.status.map(|s| s.as_ref().to_string()))
            .bind(options.owned_by)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Game::try_from).collect()
    }

    async fn find_by_id(&self, game_id: GameId) -> AppResult<Option<Game>> {
        let sql = format!("{SELECT_GAME} WHERE g.game_id = $1");
        let row: Option<GameRow> = sqlx::query_as(&sql)
            .bind(game_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        row.map(Game::try_from).transpose()
    }

    async fn update(&self, event: UpdateGame) -> AppResult<Game> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        // 書き込み時点の状態を読み直して所有者を再検証する
        let current = self.fetch_for_update(&mut tx, event.game_id).await?;
        if current.owner.owner_id != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        let title = event.title.unwrap_or(current.title);
        let platform = event.platform.unwrap_or(current.platform);
        let genre = event.genre.unwrap_or(current.genre);
        let release_year = event.release_year.unwrap_or(current.release_year);

        // status の直接編集は borrow/return を経由しないため、
        // 貸出情報との整合性ルールを通してから反映する
        let (status, clear_borrow_fields) = match event.status {
            Some(new_status) => {
                let clear = validate_status_edit(new_status, current.borrowed_by.is_some())?;
                (new_status, clear)
            }
            None => (current.status, false),
        };

        let res = if clear_borrow_fields {
            sqlx::query(
                r#"
                    UPDATE games
                    SET title = $2, platform = $3, genre = $4, release_year = $5,
                        status = $6, borrowed_by = NULL, borrowed_at = NULL
                    WHERE game_id = $1
                "#,
            )
        } else {
            sqlx::query(
                r#"
                    UPDATE games
                    SET title = $2, platform = $3, genre = $4, release_year = $5,
                        status = $6
                    WHERE game_id = $1
                "#,
            )
        }
        .bind(event.game_id)
        .bind(&title)
        .bind(&platform)
        .bind(&genre)
        .bind(release_year)
        .bind(status.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No game record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.game_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!("ゲーム（{}）が見つかりませんでした。", event.game_id))
        })
    }

    async fn delete(&self, event: DeleteGame) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let current = self.fetch_for_update(&mut tx, event.game_id).await?;
        if !event.allow_non_owner && current.owner.owner_id != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        // 関連レビューは削除しない（孤児レビューは一覧経路で 404 になる）
        let res = sqlx::query("DELETE FROM games WHERE game_id = $1")
            .bind(event.game_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No game record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn borrow(&self, event: BorrowGame) -> AppResult<Game> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let current = self.fetch_for_update(&mut tx, event.game_id).await?;
        current.check_borrowable_by(event.requested_user)?;

        // 事前条件チェックと書き込みの間に他の操作が割り込んでも、
        // status を条件にした楽観的な条件付き更新で検出できる
        let res = sqlx::query(
            r#"
                UPDATE games
                SET status = 'borrowed', borrowed_by = $2, borrowed_at = $3
                WHERE game_id = $1 AND status = 'available'
            "#,
        )
        .bind(event.game_id)
        .bind(event.requested_user)
        .bind(event.borrowed_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        check_transition_applied(res.rows_affected())?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.game_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!("ゲーム（{}）が見つかりませんでした。", event.game_id))
        })
    }

    async fn return_game(&self, event: ReturnGame) -> AppResult<Game> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let current = self.fetch_for_update(&mut tx, event.game_id).await?;
        current.check_returnable_by(event.requested_user)?;

        let res = sqlx::query(
            r#"
                UPDATE games
                SET status = 'available', borrowed_by = NULL, borrowed_at = NULL
                WHERE game_id = $1 AND status = 'borrowed'
            "#,
        )
        .bind(event.game_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        check_transition_applied(res.rows_affected())?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.game_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!("ゲーム（{}）が見つかりませんでした。", event.game_id))
        })
    }

    async fn find_borrowed_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Game>> {
        let sql = format!(
            r#"
                {SELECT_GAME}
                WHERE g.borrowed_by = $1 AND g.status = 'borrowed'
                ORDER BY g.borrowed_at DESC
            "#
        );
        let rows: Vec<GameRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Game::try_from).collect()
    }
}

// 状態を条件にした UPDATE が 1 行も書けなかった場合、
// 事前条件の読み出しと書き込みの間に他の操作が状態を変えている
fn check_transition_applied(rows_affected: u64) -> AppResult<()> {
    if rows_affected < 1 {
        return Err(AppError::ConflictError);
    }
    Ok(())
}

impl GameRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    async fn fetch_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        game_id: GameId,
    ) -> AppResult<Game> {
        let sql = format!("{SELECT_GAME} WHERE g.game_id = $1");
        let row: Option<GameRow> = sqlx::query_as(&sql)
            .bind(game_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        row.map(Game::try_from).transpose()?.ok_or_else(|| {
            AppError::EntityNotFound(format!("ゲーム（{}）が見つかりませんでした。", game_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 事前条件を読んだ後に他の操作が割り込むと、
    // 条件付き UPDATE は 0 行で返る。これを競合として報告する
    #[test]
    fn lost_conditional_update_is_a_conflict() {
        assert!(matches!(
            check_transition_applied(0),
            Err(AppError::ConflictError)
        ));
        assert!(check_transition_applied(1).is_ok());
    }
}
