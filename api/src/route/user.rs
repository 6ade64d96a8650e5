use axum::{
    routing::{get, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::user::{
    show_borrowed_list, show_user_list, update_user_password, update_user_role,
};

pub fn build_user_routers() -> Router<AppRegistry> {
    let user_routers = Router::new()
        .route("/", get(show_user_list))
        .route("/me/password", put(update_user_password))
        .route("/:user_id/role", put(update_user_role))
        .route("/:user_id/borrowed", get(show_borrowed_list));

    Router::new().nest("/users", user_routers)
}
