use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::auth::{login, register, show_current_user};

pub fn build_auth_routers() -> Router<AppRegistry> {
    let auth_routers = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(show_current_user));

    Router::new().nest("/auth", auth_routers)
}
