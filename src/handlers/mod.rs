pub mod auth;
pub mod current_user;
pub mod event_create;
pub mod event_delete;
pub mod fallback;
pub mod health;
