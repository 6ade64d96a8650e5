pub mod auth;
pub mod game;
pub mod health;
pub mod review;
pub mod user;
pub mod v1;
