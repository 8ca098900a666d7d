pub mod auth;
pub mod event;
pub mod profile;
pub mod user;
