use crate::core::error::StoreError;
use crate::models::group::Group;
use crate::stores::session_store::Session;
use crate::stores::GroupStore;
use chrono_tz::TZ_VARIANTS;
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// uid of the anonymous principal
pub const ANONYMOUS_UID: i64 = 0;

/// Session key holding the locale chosen by an anonymous visitor
pub const SESSION_LOCALE_KEY: &str = "_locale";

/// Raw `users` row. Every column is nullable here so that a malformed row is
/// reported by [`User::from_record`] instead of panicking in the row mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub uid: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub admin: Option<bool>,
    pub password_editable: Option<bool>,
    pub default_cid: Option<i64>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub disabled: Option<bool>,
}

/// Values needed to persist a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub admin: bool,
    pub password_editable: bool,
    pub default_cid: i64,
    pub timezone: Option<String>,
    pub language: Option<String>,
}

/// Request parameters an anonymous visitor may use to pick a timezone and language
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnonymousParams {
    pub tz: Option<String>,
    pub lang: Option<String>,
}

impl AnonymousParams {
    /// Pull `tz` and `lang` out of a raw query string.
    ///
    /// The last occurrence of each wins, and an empty last value counts as
    /// absent. Other keys and undecodable query strings are ignored.
    pub fn from_query(raw_query: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = raw_query
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();

        let mut params = Self::default();
        for (key, value) in pairs {
            let value = (!value.is_empty()).then_some(value);
            match key.as_str() {
                "tz" => params.tz = value,
                "lang" => params.lang = value,
                _ => {}
            }
        }
        params
    }
}

/// The principal making a request, authenticated or anonymous.
///
/// Built once per request and dropped with it. Group memberships are loaded on
/// the first call to [`User::groups`] and kept for the rest of the request.
pub struct User {
    uid: i64,
    username: String,
    password_hash: Option<String>,
    password_editable: bool,
    default_cid: i64,
    timezone: Option<String>,
    locale: Option<String>,
    admin: bool,
    disabled: bool,
    groups: OnceLock<Vec<Group>>,
    group_store: Arc<dyn GroupStore>,
}

impl User {
    /// Build a user from a persisted row.
    ///
    /// Stored users always have a positive uid; 0 is reserved for the
    /// anonymous principal.
    pub fn from_record(record: UserRecord, group_store: Arc<dyn GroupStore>) -> Result<Self, StoreError> {
        fn required<T>(value: Option<T>, field: &'static str) -> Result<T, StoreError> {
            value.ok_or(StoreError::MalformedRecord { field })
        }

        let uid = required(record.uid, "uid")?;
        if uid <= ANONYMOUS_UID {
            return Err(StoreError::InvalidUid { uid });
        }

        Ok(Self {
            uid,
            username: required(record.username, "username")?,
            password_hash: Some(required(record.password, "password")?),
            admin: required(record.admin, "admin")?,
            password_editable: required(record.password_editable, "password_editable")?,
            default_cid: required(record.default_cid, "default_cid")?,
            timezone: record.timezone,
            locale: record.language,
            disabled: required(record.disabled, "disabled")?,
            groups: OnceLock::new(),
            group_store,
        })
    }

    /// Build the anonymous principal for this request.
    ///
    /// An explicit `lang` is remembered in the session so later requests keep it.
    pub fn anonymous(params: &AnonymousParams, session: &Session, group_store: Arc<dyn GroupStore>) -> Self {
        Self {
            uid: ANONYMOUS_UID,
            username: "anonymous".to_string(),
            password_hash: None,
            password_editable: false,
            default_cid: 0,
            timezone: anonymous_timezone(params),
            locale: anonymous_locale(params, session),
            admin: false,
            disabled: false,
            groups: OnceLock::new(),
            group_store,
        }
    }

    pub fn uid(&self) -> i64 {
        self.uid
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn has_editable_password(&self) -> bool {
        self.password_editable
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn default_cid(&self) -> i64 {
        self.default_cid
    }

    /// True for every authenticated principal
    pub fn is_user(&self) -> bool {
        self.uid > ANONYMOUS_UID
    }

    /// Group memberships, fetched from storage on first use
    pub fn groups(&self) -> Result<&[Group], StoreError> {
        if let Some(groups) = self.groups.get() {
            return Ok(groups);
        }

        let loaded = self.group_store.groups_for_user(self.uid)?;
        Ok(self.groups.get_or_init(|| loaded))
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("uid", &self.uid)
            .field("username", &self.username)
            .field("admin", &self.admin)
            .field("disabled", &self.disabled)
            .field("default_cid", &self.default_cid)
            .field("timezone", &self.timezone)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

fn anonymous_timezone(params: &AnonymousParams) -> Option<String> {
    let tz = params.tz.as_deref()?;
    TZ_VARIANTS
        .iter()
        .any(|known| known.name() == tz)
        .then(|| tz.to_string())
}

fn anonymous_locale(params: &AnonymousParams, session: &Session) -> Option<String> {
    if let Some(lang) = &params.lang {
        session.set(SESSION_LOCALE_KEY, lang);
        return Some(lang.clone());
    }

    session.get(SESSION_LOCALE_KEY)
}
