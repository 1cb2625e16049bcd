pub mod core;
pub mod models;
pub mod stores;
pub mod i18n;
pub mod render;
pub mod validation;
pub mod utils;
pub mod handlers;
