pub mod model;
pub mod permission;
pub mod repository;
