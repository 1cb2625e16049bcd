pub mod event;
pub mod group;
pub mod permission;
pub mod responses;
pub mod user;
