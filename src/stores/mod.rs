// Storage seams used by the handlers and the user entity

pub mod database;
pub mod session_store;

use crate::core::error::StoreError;
use crate::models::event::NewEvent;
use crate::models::group::Group;
use crate::models::user::{NewUser, UserRecord};

pub trait EventStore: Send + Sync {
    /// Delete one event, returning the number of rows removed
    fn delete_event(&self, id: i64) -> Result<usize, StoreError>;

    /// Persist a new event, returning its id
    fn insert_event(&self, event: &NewEvent) -> Result<i64, StoreError>;
}

pub trait UserStore: Send + Sync {
    fn find_user(&self, uid: i64) -> Result<Option<UserRecord>, StoreError>;

    fn find_user_by_name(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    fn insert_user(&self, user: &NewUser) -> Result<i64, StoreError>;

    fn count_users(&self) -> Result<i64, StoreError>;
}

pub trait GroupStore: Send + Sync {
    fn groups_for_user(&self, uid: i64) -> Result<Vec<Group>, StoreError>;
}
