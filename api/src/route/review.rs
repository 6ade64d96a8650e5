use axum::{
    routing::{delete, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::review::{delete_review, update_review};

// 個別レビューの変更と削除はレビュー ID 直指定のパスで行う
pub fn build_review_routers() -> Router<AppRegistry> {
    let review_routers = Router::new()
        .route("/:review_id", put(update_review))
        .route("/:review_id", delete(delete_review));

    Router::new().nest("/reviews", review_routers)
}
