use crate::core::context::RequestContext;
use crate::core::error::CalendarError;
use crate::core::state::AppState;
use crate::models::responses::{CurrentUserResponse, GroupResponse};
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Describe the principal behind this request
///
/// GET /user[?tz=<zone>&lang=<locale>]
#[instrument(skip(state, headers, raw_query))]
pub async fn current_user_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, CalendarError> {
    let ctx = RequestContext::resolve(&state, &headers, raw_query.as_deref())?;
    let result = describe(&ctx);
    Ok(ctx.respond(result))
}

fn describe(ctx: &RequestContext) -> Result<Response, CalendarError> {
    let user = &ctx.user;

    let groups = user.groups()?.iter().map(GroupResponse::from).collect();

    debug!(uid = user.uid(), "Describing current user");

    let body = CurrentUserResponse {
        uid: user.uid(),
        username: user.username().to_string(),
        authenticated: user.is_user(),
        admin: user.is_admin(),
        password_editable: user.has_editable_password(),
        default_cid: user.default_cid(),
        timezone: user.timezone().map(str::to_string),
        locale: ctx.translator.locale().to_string(),
        groups,
    };

    Ok((StatusCode::OK, Json(body)).into_response())
}
