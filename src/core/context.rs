// Per-request principal, session and translator

use crate::core::error::{CalendarError, StoreError};
use crate::core::state::AppState;
use crate::i18n::Translator;
use crate::models::user::{AnonymousParams, User};
use crate::stores::session_store::Session;
use crate::stores::{GroupStore, UserStore};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use std::sync::Arc;
use tracing::{debug, warn};

/// Session key holding the authenticated uid
pub const SESSION_UID_KEY: &str = "uid";

/// Who is asking, in which session, and in which language to answer
pub struct RequestContext {
    pub user: User,
    pub session: Session,
    pub translator: Translator,
    cookie_name: String,
}

impl RequestContext {
    /// Resolve the principal for a request.
    ///
    /// A session carrying the uid of an existing, enabled user yields that user.
    /// Anything else yields the anonymous principal.
    pub fn resolve(
        state: &AppState,
        headers: &HeaderMap,
        raw_query: Option<&str>,
    ) -> Result<Self, StoreError> {
        let cookie_name = state.config.session.cookie_name.clone();
        let session = state
            .sessions
            .open(session_cookie(headers, &cookie_name).as_deref());

        let group_store: Arc<dyn GroupStore> = state.db.clone();
        let user = match authenticated_user(state, &session, group_store.clone())? {
            Some(user) => user,
            None => User::anonymous(&AnonymousParams::from_query(raw_query), &session, group_store),
        };

        let translator = Translator::new(user.locale().unwrap_or(state.config.locale.default.as_str()));

        debug!(
            uid = user.uid(),
            session_new = session.is_new(),
            locale = translator.locale(),
            "Request context resolved"
        );

        Ok(Self {
            user,
            session,
            translator,
            cookie_name,
        })
    }

    /// Replace the session with a fresh one, dropping the old session's data
    pub fn rotate_session(&mut self, state: &AppState) {
        state.sessions.destroy(self.session.id());
        self.session = state.sessions.open(None);
    }

    /// Turn a handler outcome into the response, errors included, so the
    /// session cookie reaches the client either way
    pub fn respond(&self, result: Result<Response, CalendarError>) -> Response {
        let response = match result {
            Ok(response) => response,
            Err(e) => e.into_localized_response(&self.translator),
        };
        self.finish(response)
    }

    /// Attach the session cookie when this request started a session and wrote to it
    pub fn finish(&self, mut response: Response) -> Response {
        if self.session.is_new() && self.session.is_stored() {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                self.cookie_name,
                self.session.id()
            );
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => warn!(error = %e, "Failed to build session cookie"),
            }
        }
        response
    }
}

fn authenticated_user(
    state: &AppState,
    session: &Session,
    group_store: Arc<dyn GroupStore>,
) -> Result<Option<User>, StoreError> {
    let Some(uid) = session
        .get(SESSION_UID_KEY)
        .and_then(|v| v.parse::<i64>().ok())
    else {
        return Ok(None);
    };

    let Some(record) = state.db.find_user(uid)? else {
        warn!(uid = uid, "Session refers to a missing user");
        session.remove(SESSION_UID_KEY);
        return Ok(None);
    };

    let user = User::from_record(record, group_store)?;
    if user.is_disabled() {
        warn!(uid = uid, "Session belongs to a disabled user");
        session.remove(SESSION_UID_KEY);
        return Ok(None);
    }

    Ok(Some(user))
}

/// Value of the named cookie, if the request carries it
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
