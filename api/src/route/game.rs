use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::game::{
    borrow_game, delete_game, register_game, return_game, show_game, show_game_list, update_game,
};
use crate::handler::review::{register_review, show_review_list};

pub fn build_game_routers() -> Router<AppRegistry> {
    let games_routers = Router::new()
        .route("/", post(register_game))
        .route("/", get(show_game_list))
        .route("/:game_id", get(show_game))
        .route("/:game_id", put(update_game))
        .route("/:game_id", delete(delete_game))
        .route("/:game_id/borrow", post(borrow_game))
        .route("/:game_id/return", post(return_game))
        // レビューの作成と一覧はゲーム配下のパスに置く
        .route("/:game_id/reviews", post(register_review))
        .route("/:game_id/reviews", get(show_review_list));

    Router::new().nest("/games", games_routers)
}
