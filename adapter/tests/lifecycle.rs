// 貸出・返却・レビューの一連の流れをインメモリ実装で検証する。
// 状態遷移と認可のルールは Postgres 実装と同じ kernel のロジックを通る。
use adapter::jwt::TokenCodec;
use adapter::memory::{
    InMemoryAuthRepository, InMemoryGameRepository, InMemoryReviewRepository, InMemoryStore,
    InMemoryUserRepository,
};
use anyhow::Result;
use chrono::Utc;
use kernel::model::{
    auth::event::CreateToken,
    game::{
        event::{BorrowGame, CreateGame, DeleteGame, GameListOptions, ReturnGame, UpdateGame},
        GameStatus,
    },
    review::event::{CreateReview, DeleteReview, UpdateReview},
    user::{event::CreateUser, User},
};
use kernel::repository::{
    auth::AuthRepository, game::GameRepository, review::ReviewRepository, user::UserRepository,
};
use shared::error::AppError;

struct Fixture {
    store: InMemoryStore,
    users: InMemoryUserRepository,
    games: InMemoryGameRepository,
    reviews: InMemoryReviewRepository,
}

impl Fixture {
    fn new() -> Self {
        let store = InMemoryStore::new();
        Self {
            users: InMemoryUserRepository::new(store.clone()),
            games: InMemoryGameRepository::new(store.clone()),
            reviews: InMemoryReviewRepository::new(store.clone()),
            store,
        }
    }

    async fn register_user(&self, name: &str) -> Result<User> {
        let user = self
            .users
            .create(CreateUser {
                user_name: name.into(),
                email: format!("{name}@example.com"),
                password: "passw0rd".into(),
            })
            .await?;
        Ok(user)
    }
}

fn sample_game(title: &str) -> CreateGame {
    CreateGame {
        title: title.into(),
        platform: "Switch".into(),
        genre: "RPG".into(),
        release_year: 2023,
        status: None,
    }
}

#[tokio::test]
async fn game_lifecycle_from_register_to_delete() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;

    // alice がゲームを登録。省略時は available
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;
    assert_eq!(game.status, GameStatus::Available);
    assert!(game.borrowed_by.is_none());

    // bob が借りる
    let borrowed = fx
        .games
        .borrow(BorrowGame::new(game.game_id, bob.user_id, Utc::now()))
        .await?;
    assert_eq!(borrowed.status, GameStatus::Borrowed);
    assert_eq!(
        borrowed.borrowed_by.as_ref().map(|b| b.user_id),
        Some(bob.user_id)
    );
    assert!(borrowed.borrowed_at.is_some());

    // 貸出中のゲームは alice も借りられない
    let err = fx
        .games
        .borrow(BorrowGame::new(game.game_id, alice.user_id, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnprocessableEntity(_)));

    // bob が返す
    let returned = fx
        .games
        .return_game(ReturnGame::new(game.game_id, bob.user_id))
        .await?;
    assert_eq!(returned.status, GameStatus::Available);
    assert!(returned.borrowed_by.is_none());
    assert!(returned.borrowed_at.is_none());

    // alice が削除すると取得できなくなる
    fx.games
        .delete(DeleteGame {
            game_id: game.game_id,
            requested_user: alice.user_id,
            allow_non_owner: false,
        })
        .await?;
    assert!(fx.games.find_by_id(game.game_id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn owner_cannot_borrow_own_game() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;

    let err = fx
        .games
        .borrow(BorrowGame::new(game.game_id, alice.user_id, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SelfBorrowDenied));

    Ok(())
}

#[tokio::test]
async fn third_party_cannot_return_borrowed_game() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;
    let carol = fx.register_user("carol").await?;

    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;
    fx.games
        .borrow(BorrowGame::new(game.game_id, bob.user_id, Utc::now()))
        .await?;

    // 借り手でも所有者でもない carol は返却できない
    let err = fx
        .games
        .return_game(ReturnGame::new(game.game_id, carol.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ForbiddenOperation));

    // 所有者 alice は強制返却できる
    let returned = fx
        .games
        .return_game(ReturnGame::new(game.game_id, alice.user_id))
        .await?;
    assert_eq!(returned.status, GameStatus::Available);

    Ok(())
}

#[tokio::test]
async fn returning_available_game_fails() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;

    let err = fx
        .games
        .return_game(ReturnGame::new(game.game_id, bob.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnprocessableEntity(_)));

    Ok(())
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;

    let err = fx
        .games
        .update(UpdateGame {
            game_id: game.game_id,
            requested_user: bob.user_id,
            title: Some("Hijacked".into()),
            platform: None,
            genre: None,
            release_year: None,
            status: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ForbiddenOperation));

    let err = fx
        .games
        .delete(DeleteGame {
            game_id: game.game_id,
            requested_user: bob.user_id,
            allow_non_owner: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ForbiddenOperation));

    // 権限マトリクスで許可された場合は非所有者でも削除できる
    fx.games
        .delete(DeleteGame {
            game_id: game.game_id,
            requested_user: bob.user_id,
            allow_non_owner: true,
        })
        .await?;

    Ok(())
}

#[tokio::test]
async fn status_edit_to_available_clears_borrow_fields() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;
    fx.games
        .borrow(BorrowGame::new(game.game_id, bob.user_id, Utc::now()))
        .await?;

    let updated = fx
        .games
        .update(UpdateGame {
            game_id: game.game_id,
            requested_user: alice.user_id,
            title: None,
            platform: None,
            genre: None,
            release_year: None,
            status: Some(GameStatus::Available),
        })
        .await?;
    assert_eq!(updated.status, GameStatus::Available);
    assert!(updated.borrowed_by.is_none());
    assert!(updated.borrowed_at.is_none());

    Ok(())
}

#[tokio::test]
async fn status_edit_to_borrowed_without_borrower_is_rejected() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;

    let err = fx
        .games
        .update(UpdateGame {
            game_id: game.game_id,
            requested_user: alice.user_id,
            title: None,
            platform: None,
            genre: None,
            release_year: None,
            status: Some(GameStatus::Borrowed),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnprocessableEntity(_)));

    Ok(())
}

#[tokio::test]
async fn borrowed_list_tracks_current_state_only() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;

    let zelda = fx.games.create(sample_game("Zelda"), alice.user_id).await?;
    let mario = fx.games.create(sample_game("Mario"), alice.user_id).await?;

    fx.games
        .borrow(BorrowGame::new(zelda.game_id, bob.user_id, Utc::now()))
        .await?;
    fx.games
        .borrow(BorrowGame::new(mario.game_id, bob.user_id, Utc::now()))
        .await?;

    let borrowed = fx.games.find_borrowed_by_user_id(bob.user_id).await?;
    assert_eq!(borrowed.len(), 2);

    // 返却すると一覧から消える（履歴ではない）
    fx.games
        .return_game(ReturnGame::new(zelda.game_id, bob.user_id))
        .await?;
    let borrowed = fx.games.find_borrowed_by_user_id(bob.user_id).await?;
    assert_eq!(borrowed.len(), 1);
    assert_eq!(borrowed[0].game_id, mario.game_id);

    Ok(())
}

#[tokio::test]
async fn game_list_filters_by_platform_and_owner() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;

    fx.games.create(sample_game("Zelda"), alice.user_id).await?;
    let mut ps5 = sample_game("Bloodborne");
    ps5.platform = "PS5".into();
    fx.games.create(ps5, bob.user_id).await?;

    let all = fx.games.find_all(GameListOptions::default()).await?;
    assert_eq!(all.len(), 2);

    let switch_only = fx
        .games
        .find_all(GameListOptions {
            platform: Some("Switch".into()),
            ..Default::default()
        })
        .await?;
    assert_eq!(switch_only.len(), 1);
    assert_eq!(switch_only[0].title, "Zelda");

    let mine = fx
        .games
        .find_all(GameListOptions {
            owned_by: Some(bob.user_id),
            ..Default::default()
        })
        .await?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "Bloodborne");

    Ok(())
}

#[tokio::test]
async fn one_review_per_game_and_user() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;

    fx.reviews
        .create(CreateReview::new(
            game.game_id,
            bob.user_id,
            5,
            "最高".into(),
        ))
        .await?;

    // 同じ (game, user) の組は 2 件目を拒否する
    let err = fx
        .reviews
        .create(CreateReview::new(
            game.game_id,
            bob.user_id,
            4,
            "やっぱり 4".into(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateReview));

    // 別のユーザーなら投稿できる
    fx.reviews
        .create(CreateReview::new(
            game.game_id,
            alice.user_id,
            4,
            "自作自演".into(),
        ))
        .await?;

    let reviews = fx.reviews.find_by_game_id(game.game_id).await?;
    assert_eq!(reviews.len(), 2);

    Ok(())
}

#[tokio::test]
async fn review_author_only_can_update_and_delete() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let bob = fx.register_user("bob").await?;
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;

    let review = fx
        .reviews
        .create(CreateReview::new(game.game_id, bob.user_id, 3, "普通".into()))
        .await?;

    let err = fx
        .reviews
        .update(UpdateReview {
            review_id: review.review_id,
            requested_user: alice.user_id,
            rating: Some(1),
            comment: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ForbiddenOperation));

    let updated = fx
        .reviews
        .update(UpdateReview {
            review_id: review.review_id,
            requested_user: bob.user_id,
            rating: Some(5),
            comment: Some("やり込んだら化けた".into()),
        })
        .await?;
    assert_eq!(updated.rating, 5);

    let err = fx
        .reviews
        .delete(DeleteReview {
            review_id: review.review_id,
            requested_user: alice.user_id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ForbiddenOperation));

    fx.reviews
        .delete(DeleteReview {
            review_id: review.review_id,
            requested_user: bob.user_id,
        })
        .await?;
    assert!(fx.reviews.find_by_id(review.review_id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn review_for_missing_game_is_not_found() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;
    let game = fx.games.create(sample_game("Zelda"), alice.user_id).await?;

    fx.games
        .delete(DeleteGame {
            game_id: game.game_id,
            requested_user: alice.user_id,
            allow_non_owner: false,
        })
        .await?;

    let err = fx
        .reviews
        .create(CreateReview::new(game.game_id, alice.user_id, 5, "幻".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EntityNotFound(_)));

    let err = fx.reviews.find_by_game_id(game.game_id).await.unwrap_err();
    assert!(matches!(err, AppError::EntityNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn duplicate_user_name_or_email_is_rejected() -> Result<()> {
    let fx = Fixture::new();
    fx.register_user("alice").await?;

    let err = fx.register_user("alice").await.unwrap_err();
    let err = err.downcast::<AppError>()?;
    assert!(matches!(err, AppError::DuplicateUser));

    Ok(())
}

#[tokio::test]
async fn login_and_token_round_trip() -> Result<()> {
    let fx = Fixture::new();
    let alice = fx.register_user("alice").await?;

    let codec = TokenCodec::new("test-secret", 3600);
    let auth = InMemoryAuthRepository::new(fx.store.clone(), codec);

    // 正しい資格情報ならトークンが発行され、ユーザー ID に戻せる
    let user_id = auth.verify_user("alice@example.com", "passw0rd").await?;
    assert_eq!(user_id, alice.user_id);

    let token = auth.create_token(CreateToken::new(user_id)).await?;
    let resolved = auth.fetch_user_id_from_token(&token).await?;
    assert_eq!(resolved, alice.user_id);

    // パスワード誤りと未知のメールは同じ認証エラーになる
    let err = auth
        .verify_user("alice@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnauthenticatedError));
    let err = auth
        .verify_user("nobody@example.com", "passw0rd")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnauthenticatedError));

    Ok(())
}
