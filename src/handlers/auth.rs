use crate::core::context::{RequestContext, SESSION_UID_KEY};
use crate::core::error::CalendarError;
use crate::core::state::AppState;
use crate::models::responses::LoginForm;
use crate::models::user::User;
use crate::render::html;
use crate::stores::{GroupStore, UserStore};
use crate::utils::auth::verify_password;
use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Log a user in
///
/// POST /login (form: username, password)
#[instrument(skip(state, headers, form))]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, CalendarError> {
    let mut ctx = RequestContext::resolve(&state, &headers, None)?;
    let result = log_in(&state, &mut ctx, &form);
    Ok(ctx.respond(result))
}

fn log_in(
    state: &AppState,
    ctx: &mut RequestContext,
    form: &LoginForm,
) -> Result<Response, CalendarError> {
    let Some(record) = state.db.find_user_by_name(&form.username)? else {
        warn!(username = %form.username, "Login for unknown user");
        return Err(CalendarError::InvalidCredentials(
            ctx.translator.get("login-failed").to_string(),
        ));
    };

    let group_store: Arc<dyn GroupStore> = state.db.clone();
    let user = User::from_record(record, group_store)?;

    let password_ok = user
        .password_hash()
        .is_some_and(|hash| verify_password(&form.password, hash));

    if !password_ok || user.is_disabled() {
        warn!(
            uid = user.uid(),
            disabled = user.is_disabled(),
            "Login refused"
        );
        return Err(CalendarError::InvalidCredentials(
            ctx.translator.get("login-failed").to_string(),
        ));
    }

    ctx.rotate_session(state);
    ctx.session.set(SESSION_UID_KEY, &user.uid().to_string());

    info!(uid = user.uid(), username = %user.username(), "User logged in");

    let body = html::message_box(ctx.translator.get("logged-in"));
    Ok((StatusCode::OK, Html(body)).into_response())
}

/// Log the current user out. The rest of the session (language) is kept.
///
/// POST /logout
#[instrument(skip(state, headers))]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, CalendarError> {
    let ctx = RequestContext::resolve(&state, &headers, None)?;

    if ctx.session.remove(SESSION_UID_KEY).is_some() {
        info!(uid = ctx.user.uid(), "User logged out");
    }

    let body = html::message_box(ctx.translator.get("logged-out"));
    Ok(ctx.finish((StatusCode::OK, Html(body)).into_response()))
}
