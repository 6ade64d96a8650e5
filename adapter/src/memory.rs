// adapter/src/memory.rs
//
// インメモリのストレージバックエンド。テストで使用する。
// 状態遷移は 1 つの書き込みロックの中で
// 「読み出し → 事前条件の検証 → 書き込み」を行うため、
// Postgres 実装の条件付き UPDATE と同じ原子性になる。
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    game::{
        event::{BorrowGame, CreateGame, DeleteGame, GameListOptions, ReturnGame, UpdateGame},
        validate_status_edit, Game, GameStatus,
    },
    id::{GameId, ReviewId, UserId},
    review::{
        event::{CreateReview, DeleteReview, UpdateReview},
        Review,
    },
    role::Role,
    user::{
        event::{CreateUser, UpdateUserPassword, UpdateUserRole},
        Borrower, GameOwner, Reviewer, User,
    },
};
use kernel::repository::{
    auth::AuthRepository, game::GameRepository, review::ReviewRepository, user::UserRepository,
};
use shared::error::{AppError, AppResult};

use crate::jwt::TokenCodec;

struct UserRecord {
    user_id: UserId,
    user_name: String,
    email: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
}

struct GameRecord {
    game_id: GameId,
    title: String,
    platform: String,
    genre: String,
    release_year: i32,
    status: GameStatus,
    owned_by: UserId,
    borrowed_by: Option<UserId>,
    borrowed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

struct ReviewRecord {
    review_id: ReviewId,
    game_id: GameId,
    user_id: UserId,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct StoreInner {
    users: HashMap<UserId, UserRecord>,
    games: HashMap<GameId, GameRecord>,
    reviews: HashMap<ReviewId, ReviewRecord>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore(Arc<RwLock<StoreInner>>);

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, StoreInner>> {
        self.0
            .read()
            .map_err(|_| AppError::ConversionEntityError("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, StoreInner>> {
        self.0
            .write()
            .map_err(|_| AppError::ConversionEntityError("in-memory store lock poisoned".into()))
    }
}

fn user_from(record: &UserRecord) -> User {
    User {
        user_id: record.user_id,
        user_name: record.user_name.clone(),
        email: record.email.clone(),
        role: record.role,
        created_at: record.created_at,
    }
}

fn game_from(inner: &StoreInner, record: &GameRecord) -> AppResult<Game> {
    let owner = inner.users.get(&record.owned_by).ok_or_else(|| {
        AppError::ConversionEntityError("game owner record was not found".into())
    })?;
    let borrowed_by = match record.borrowed_by {
        Some(user_id) => {
            let borrower = inner.users.get(&user_id).ok_or_else(|| {
                AppError::ConversionEntityError("borrower record was not found".into())
            })?;
            Some(Borrower {
                user_id,
                user_name: borrower.user_name.clone(),
            })
        }
        None => None,
    };
    Ok(Game {
        game_id: record.game_id,
        title: record.title.clone(),
        platform: record.platform.clone(),
        genre: record.genre.clone(),
        release_year: record.release_year,
        status: record.status,
        owner: GameOwner {
            owner_id: record.owned_by,
            owner_name: owner.user_name.clone(),
        },
        borrowed_by,
        borrowed_at: record.borrowed_at,
        created_at: record.created_at,
    })
}

fn review_from(inner: &StoreInner, record: &ReviewRecord) -> AppResult<Review> {
    let reviewer = inner.users.get(&record.user_id).ok_or_else(|| {
        AppError::ConversionEntityError("reviewer record was not found".into())
    })?;
    Ok(Review {
        review_id: record.review_id,
        game_id: record.game_id,
        reviewer: Reviewer {
            user_id: record.user_id,
            user_name: reviewer.user_name.clone(),
        },
        rating: record.rating,
        comment: record.comment.clone(),
        created_at: record.created_at,
    })
}

#[derive(Clone)]
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

impl InMemoryUserRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let mut inner = self.store.write()?;

        // user_name / email のユニーク制約
        let duplicated = inner
            .users
            .values()
            .any(|u| u.user_name == event.user_name || u.email == event.email);
        if duplicated {
            return Err(AppError::DuplicateUser);
        }

        let record = UserRecord {
            user_id: UserId::new(),
            user_name: event.user_name,
            email: event.email,
            password_hash: bcrypt::hash(&event.password, bcrypt::DEFAULT_COST)?,
            role: Role::default(),
            created_at: Utc::now(),
        };
        let user = user_from(&record);
        inner.users.insert(record.user_id, record);

        Ok(user)
    }

    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>> {
        let inner = self.store.read()?;
        Ok(inner.users.get(&current_user_id).map(user_from))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let inner = self.store.read()?;
        let mut users: Vec<User> = inner.users.values().map(user_from).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_password(&self, event: UpdateUserPassword) -> AppResult<()> {
        let mut inner = self.store.write()?;
        let record = inner.users.get_mut(&event.user_id).ok_or_else(|| {
            AppError::EntityNotFound("指定されたユーザーが見つかりませんでした。".into())
        })?;

        let valid = bcrypt::verify(&event.current_password, &record.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        record.password_hash = bcrypt::hash(&event.new_password, bcrypt::DEFAULT_COST)?;
        Ok(())
    }

    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()> {
        let mut inner = self.store.write()?;
        let record = inner.users.get_mut(&event.user_id).ok_or_else(|| {
            AppError::EntityNotFound("指定されたユーザーが見つかりませんでした。".into())
        })?;
        record.role = event.role;
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryGameRepository {
    store: InMemoryStore,
}

impl InMemoryGameRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn create(&self, event: CreateGame, owner_id: UserId) -> AppResult<Game> {
        let mut inner = self.store.write()?;
        if !inner.users.contains_key(&owner_id) {
            return Err(AppError::EntityNotFound(
                "指定されたユーザーが見つかりませんでした。".into(),
            ));
        }

        let record = GameRecord {
            game_id: GameId::new(),
            title: event.title,
            platform: event.platform,
            genre: event.genre,
            release_year: event.release_year,
            status: event.status.unwrap_or(GameStatus::Available),
            owned_by: owner_id,
            borrowed_by: None,
            borrowed_at: None,
            created_at: Utc::now(),
        };
        let game = game_from(&inner, &record)?;
        inner.games.insert(record.game_id, record);

        Ok(game)
    }

    async fn find_all(&self, options: GameListOptions) -> AppResult<Vec<Game>> {
        let inner = self.store.read()?;
        let mut games = inner
            .games
            .values()
            .filter(|g| {
                options.platform.as_deref().map_or(true, |p| g.platform == p)
                    && options.genre.as_deref().map_or(true, |x| g.genre == x)
                    && options.status.map_or(true, |s| g.status == s)
                    && options.owned_by.map_or(true, |o| g.owned_by == o)
            })
            .map(|record| game_from(&inner, record))
            .collect::<AppResult<Vec<Game>>>()?;
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(games)
    }

    async fn find_by_id(&self, game_id: GameId) -> AppResult<Option<Game>> {
        let inner = self.store.read()?;
        inner
            .games
            .get(&game_id)
            .map(|record| game_from(&inner, record))
            .transpose()
    }

    async fn update(&self, event: UpdateGame) -> AppResult<Game> {
        let mut inner = self.store.write()?;
        let record = inner.games.get(&event.game_id).ok_or_else(|| {
            AppError::EntityNotFound(format!("ゲーム（{}）が見つかりませんでした。", event.game_id))
        })?;
        if record.owned_by != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        let clear_borrow_fields = match event.status {
            Some(new_status) => validate_status_edit(new_status, record.borrowed_by.is_some())?,
            None => false,
        };

        let record = inner
            .games
            .get_mut(&event.game_id)
            .ok_or_else(|| {
                AppError::ConversionEntityError("game record vanished while lock held".into())
            })?;
        if let Some(title) = event.title {
            record.title = title;
        }
        if let Some(platform) = event.platform {
            record.platform = platform;
        }
        if let Some(genre) = event.genre {
            record.genre = genre;
        }
        if let Some(release_year) = event.release_year {
            record.release_year = release_year;
        }
        if let Some(status) = event.status {
            record.status = status;
        }
        if clear_borrow_fields {
            record.borrowed_by = None;
            record.borrowed_at = None;
        }

        let record = inner.games.get(&event.game_id).ok_or_else(|| {
            AppError::ConversionEntityError("game record vanished while lock held".into())
        })?;
        game_from(&inner, record)
    }

    async fn delete(&self, event: DeleteGame) -> AppResult<()> {
        let mut inner = self.store.write()?;
        let record = inner.games.get(&event.game_id).ok_or_else(|| {
            AppError::EntityNotFound(format!("ゲーム（{}）が見つかりませんでした。", event.game_id))
        })?;
        if !event.allow_non_owner && record.owned_by != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        // 関連レビューは削除しない（孤児レビューは一覧経路で 404 になる）
        inner.games.remove(&event.game_id);
        Ok(())
    }

    async fn borrow(&self, event: BorrowGame) -> AppResult<Game> {
        let mut inner = self.store.write()?;
        let record = inner.games.get(&event.game_id).ok_or_else(|| {
            AppError::EntityNotFound(format!("ゲーム（{}）が見つかりませんでした。", event.game_id))
        })?;

        // 書き込みロック内で最新状態に対して事前条件を再検証する
        game_from(&inner, record)?.check_borrowable_by(event.requested_user)?;

        let record = inner
            .games
            .get_mut(&event.game_id)
            .ok_or_else(|| {
                AppError::ConversionEntityError("game record vanished while lock held".into())
            })?;
        record.status = GameStatus::Borrowed;
        record.borrowed_by = Some(event.requested_user);
        record.borrowed_at = Some(event.borrowed_at);

        let record = inner.games.get(&event.game_id).ok_or_else(|| {
            AppError::ConversionEntityError("game record vanished while lock held".into())
        })?;
        game_from(&inner, record)
    }

    async fn return_game(&self, event: ReturnGame) -> AppResult<Game> {
        let mut inner = self.store.write()?;
        let record = inner.games.get(&event.game_id).ok_or_else(|| {
            AppError::EntityNotFound(format!("ゲーム（{}）が見つかりませんでした。", event.game_id))
        })?;

        game_from(&inner, record)?.check_returnable_by(event.requested_user)?;

        let record = inner
            .games
            .get_mut(&event.game_id)
            .ok_or_else(|| {
                AppError::ConversionEntityError("game record vanished while lock held".into())
            })?;
        record.status = GameStatus::Available;
        record.borrowed_by = None;
        record.borrowed_at = None;

        let record = inner.games.get(&event.game_id).ok_or_else(|| {
            AppError::ConversionEntityError("game record vanished while lock held".into())
        })?;
        game_from(&inner, record)
    }

    async fn find_borrowed_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Game>> {
        let inner = self.store.read()?;
        let mut games = inner
            .games
            .values()
            .filter(|g| g.borrowed_by == Some(user_id) && g.status == GameStatus::Borrowed)
            .map(|record| game_from(&inner, record))
            .collect::<AppResult<Vec<Game>>>()?;
        games.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));
        Ok(games)
    }
}

#[derive(Clone)]
pub struct InMemoryReviewRepository {
    store: InMemoryStore,
}

impl InMemoryReviewRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn create(&self, event: CreateReview) -> AppResult<Review> {
        let mut inner = self.store.write()?;
        if !inner.games.contains_key(&event.game_id) {
            return Err(AppError::EntityNotFound(format!(
                "ゲーム（{}）が見つかりませんでした。",
                event.game_id
            )));
        }

        // (game_id, user_id) のユニーク制約。
        // 書き込みロック内のチェックなので競合してもすり抜けない
        let duplicated = inner
            .reviews
            .values()
            .any(|r| r.game_id == event.game_id && r.user_id == event.reviewed_by);
        if duplicated {
            return Err(AppError::DuplicateReview);
        }

        let record = ReviewRecord {
            review_id: ReviewId::new(),
            game_id: event.game_id,
            user_id: event.reviewed_by,
            rating: event.rating,
            comment: event.comment,
            created_at: Utc::now(),
        };
        let review = review_from(&inner, &record)?;
        inner.reviews.insert(record.review_id, record);

        Ok(review)
    }

    async fn find_by_id(&self, review_id: ReviewId) -> AppResult<Option<Review>> {
        let inner = self.store.read()?;
        inner
            .reviews
            .get(&review_id)
            .map(|record| review_from(&inner, record))
            .transpose()
    }

    async fn find_by_game_id(&self, game_id: GameId) -> AppResult<Vec<Review>> {
        let inner = self.store.read()?;
        if !inner.games.contains_key(&game_id) {
            return Err(AppError::EntityNotFound(format!(
                "ゲーム（{}）が見つかりませんでした。",
                game_id
            )));
        }

        let mut reviews = inner
            .reviews
            .values()
            .filter(|r| r.game_id == game_id)
            .map(|record| review_from(&inner, record))
            .collect::<AppResult<Vec<Review>>>()?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn update(&self, event: UpdateReview) -> AppResult<Review> {
        let mut inner = self.store.write()?;
        let record = inner.reviews.get(&event.review_id).ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "レビュー（{}）が見つかりませんでした。",
                event.review_id
            ))
        })?;
        if record.user_id != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        let record = inner
            .reviews
            .get_mut(&event.review_id)
            .ok_or_else(|| {
                AppError::ConversionEntityError("review record vanished while lock held".into())
            })?;
        if let Some(rating) = event.rating {
            record.rating = rating;
        }
        if let Some(comment) = event.comment {
            record.comment = comment;
        }

        let record = inner.reviews.get(&event.review_id).ok_or_else(|| {
            AppError::ConversionEntityError("review record vanished while lock held".into())
        })?;
        review_from(&inner, record)
    }

    async fn delete(&self, event: DeleteReview) -> AppResult<()> {
        let mut inner = self.store.write()?;
        let record = inner.reviews.get(&event.review_id).ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "レビュー（{}）が見つかりませんでした。",
                event.review_id
            ))
        })?;
        if record.user_id != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        inner.reviews.remove(&event.review_id);
        Ok(())
    }
}

pub struct InMemoryAuthRepository {
    store: InMemoryStore,
    codec: TokenCodec,
}

impl InMemoryAuthRepository {
    pub fn new(store: InMemoryStore, codec: TokenCodec) -> Self {
        Self { store, codec }
    }
}

#[async_trait]
impl AuthRepository for InMemoryAuthRepository {
    async fn verify_user(&self, email: &str, password: &str) -> AppResult<UserId> {
        let inner = self.store.read()?;
        let record = inner
            .users
            .values()
            .find(|u| u.email == email)
            .ok_or(AppError::UnauthenticatedError)?;

        let valid = bcrypt::verify(password, &record.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        Ok(record.user_id)
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        self.codec.issue(event.user_id)
    }

    async fn fetch_user_id_from_token(&self, access_token: &AccessToken) -> AppResult<UserId> {
        self.codec.verify(access_token)
    }
}
