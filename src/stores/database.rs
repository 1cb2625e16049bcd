//! SQLite-backed calendar storage

use crate::core::error::StoreError;
use crate::models::event::NewEvent;
use crate::models::group::Group;
use crate::models::user::{NewUser, UserRecord};
use crate::stores::{EventStore, GroupStore, UserStore};
use crate::utils::time::current_timestamp;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const USER_COLUMNS: &str = "uid, username, password, admin, password_editable, default_cid, timezone, language, disabled";

/// SQLite connection shared by all requests
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_tables()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_tables()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_tables(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cid INTEGER NOT NULL,
                owner_uid INTEGER NOT NULL,
                subject TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_cid ON events(cid);

            CREATE TABLE IF NOT EXISTS users (
                uid INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                admin INTEGER NOT NULL DEFAULT 0,
                password_editable INTEGER NOT NULL DEFAULT 1,
                default_cid INTEGER NOT NULL DEFAULT 1,
                timezone TEXT,
                language TEXT,
                disabled INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS calendar_groups (
                gid INTEGER PRIMARY KEY AUTOINCREMENT,
                cid INTEGER NOT NULL,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_groups (
                uid INTEGER NOT NULL,
                gid INTEGER NOT NULL,
                PRIMARY KEY (uid, gid)
            );",
        )?;
        Ok(())
    }

    /// `column` is always one of our own column names, never request input
    fn find_user_where<P: ToSql>(&self, column: &str, value: P) -> Result<Option<UserRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column))?;
        let record = stmt.query_row(params![value], user_record_from_row).optional()?;
        Ok(record)
    }
}

/// Fixture helpers for tests
#[cfg(test)]
impl Database {
    pub fn insert_group(&self, cid: i64, name: &str) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO calendar_groups (cid, name) VALUES (?1, ?2)",
            params![cid, name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_user_to_group(&self, uid: i64, gid: i64) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT OR IGNORE INTO user_groups (uid, gid) VALUES (?1, ?2)",
            params![uid, gid],
        )?;
        Ok(())
    }

    pub fn set_user_disabled(&self, uid: i64, disabled: bool) -> Result<usize, StoreError> {
        let affected = self.conn()?.execute(
            "UPDATE users SET disabled = ?1 WHERE uid = ?2",
            params![disabled, uid],
        )?;
        Ok(affected)
    }

    pub fn event_exists(&self, id: i64) -> Result<bool, StoreError> {
        let found = self
            .conn()?
            .query_row("SELECT 1 FROM events WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

fn user_record_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        uid: row.get("uid")?,
        username: row.get("username")?,
        password: row.get("password")?,
        admin: row.get("admin")?,
        password_editable: row.get("password_editable")?,
        default_cid: row.get("default_cid")?,
        timezone: row.get("timezone")?,
        language: row.get("language")?,
        disabled: row.get("disabled")?,
    })
}

impl EventStore for Database {
    fn delete_event(&self, id: i64) -> Result<usize, StoreError> {
        let affected = self
            .conn()?
            .execute("DELETE FROM events WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    fn insert_event(&self, event: &NewEvent) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO events (cid, owner_uid, subject, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.cid,
                event.owner_uid,
                event.subject,
                event.description,
                current_timestamp(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl UserStore for Database {
    fn find_user(&self, uid: i64) -> Result<Option<UserRecord>, StoreError> {
        self.find_user_where("uid", uid)
    }

    fn find_user_by_name(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_user_where("username", username)
    }

    fn insert_user(&self, user: &NewUser) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, password, admin, password_editable, default_cid, timezone, language)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.username,
                user.password_hash,
                user.admin,
                user.password_editable,
                user.default_cid,
                user.timezone,
                user.language,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn count_users(&self) -> Result<i64, StoreError> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl GroupStore for Database {
    fn groups_for_user(&self, uid: i64) -> Result<Vec<Group>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT g.gid, g.cid, g.name FROM calendar_groups g
             INNER JOIN user_groups ug ON ug.gid = g.gid
             WHERE ug.uid = ?1
             ORDER BY g.gid",
        )?;

        let groups = stmt.query_map(params![uid], |row| {
            Ok(Group {
                gid: row.get(0)?,
                cid: row.get(1)?,
                name: row.get(2)?,
            })
        })?;

        let mut result = Vec::new();
        for group in groups {
            result.push(group?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event(subject: &str) -> NewEvent {
        NewEvent {
            cid: 1,
            owner_uid: 1,
            subject: subject.to_string(),
            description: String::new(),
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            admin: false,
            password_editable: true,
            default_cid: 1,
            timezone: None,
            language: Some("en".to_string()),
        }
    }

    #[test]
    fn test_delete_existing_event() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_event(&new_event("standup")).unwrap();

        assert!(db.event_exists(id).unwrap());
        assert_eq!(db.delete_event(id).unwrap(), 1);
        assert!(!db.event_exists(id).unwrap());
    }

    #[test]
    fn test_delete_missing_event_affects_nothing() {
        let db = Database::in_memory().unwrap();

        assert_eq!(db.delete_event(999).unwrap(), 0);
    }

    #[test]
    fn test_delete_twice() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_event(&new_event("retro")).unwrap();

        assert_eq!(db.delete_event(id).unwrap(), 1);
        assert_eq!(db.delete_event(id).unwrap(), 0);
    }

    #[test]
    fn test_insert_and_find_user() {
        let db = Database::in_memory().unwrap();
        let uid = db.insert_user(&new_user("alice")).unwrap();

        assert!(uid > 0);
        let record = db.find_user(uid).unwrap().unwrap();
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.admin, Some(false));
        assert_eq!(record.disabled, Some(false));
        assert_eq!(record.timezone, None);
        assert_eq!(record.language.as_deref(), Some("en"));

        let by_name = db.find_user_by_name("alice").unwrap().unwrap();
        assert_eq!(by_name.uid, Some(uid));
    }

    #[test]
    fn test_find_missing_user() {
        let db = Database::in_memory().unwrap();

        assert!(db.find_user(12).unwrap().is_none());
        assert!(db.find_user_by_name("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let db = Database::in_memory().unwrap();
        db.insert_user(&new_user("bob")).unwrap();

        assert!(matches!(
            db.insert_user(&new_user("bob")),
            Err(StoreError::Database(_))
        ));
        assert_eq!(db.count_users().unwrap(), 1);
    }

    #[test]
    fn test_groups_for_user() {
        let db = Database::in_memory().unwrap();
        let uid = db.insert_user(&new_user("carol")).unwrap();
        let editors = db.insert_group(1, "editors").unwrap();
        let viewers = db.insert_group(2, "viewers").unwrap();
        db.insert_group(1, "unrelated").unwrap();

        db.add_user_to_group(uid, editors).unwrap();
        db.add_user_to_group(uid, viewers).unwrap();
        db.add_user_to_group(uid, viewers).unwrap();

        let groups = db.groups_for_user(uid).unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["editors", "viewers"]);
        assert_eq!(groups[1].cid, 2);
        assert!(db.groups_for_user(0).unwrap().is_empty());
    }

    #[test]
    fn test_open_file_database() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("calendar.db");

        let id = {
            let db = Database::open(&path).unwrap();
            db.insert_event(&new_event("persisted")).unwrap()
        };

        let db = Database::open(&path).unwrap();
        assert!(db.event_exists(id).unwrap());
    }
}
