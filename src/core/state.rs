// Application state (AppState)

use crate::core::config::Config;
use crate::stores::database::Database;
use crate::stores::session_store::SessionStore;
use std::sync::Arc;

/// Shared application state
///
/// Everything a request handler needs is reached through here; nothing is
/// global.
#[derive(Clone)]
pub struct AppState {
    /// Events, users and groups
    pub db: Arc<Database>,

    /// Browser sessions
    pub sessions: Arc<SessionStore>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        Self {
            db: Arc::new(db),
            sessions: Arc::new(SessionStore::new()),
            config: Arc::new(config),
        }
    }
}
