pub mod auth;
pub mod game;
pub mod id;
pub mod review;
pub mod role;
pub mod user;
