use crate::core::context::RequestContext;
use crate::core::error::{CalendarError, PermissionError};
use crate::core::state::AppState;
use crate::models::event::{EventCreateForm, NewEvent};
use crate::models::permission::PermissionLevel;
use crate::render::html;
use crate::stores::EventStore;
use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const MAX_SUBJECT_LEN: usize = 255;

/// Add an event to a calendar
///
/// POST /events (form: cid, subject, description)
#[instrument(skip(state, headers, form))]
pub async fn event_create_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<EventCreateForm>,
) -> Result<Response, CalendarError> {
    let ctx = RequestContext::resolve(&state, &headers, None)?;
    let result = create_event(&state, &ctx, form);
    Ok(ctx.respond(result))
}

fn create_event(
    state: &AppState,
    ctx: &RequestContext,
    form: EventCreateForm,
) -> Result<Response, CalendarError> {
    let tr = &ctx.translator;

    if !ctx.user.is_user()
        && !state
            .config
            .permissions
            .anon_permission
            .allows(PermissionLevel::CREATE)
    {
        warn!("Anonymous create attempt refused");
        return Err(PermissionError::new(Some(tr.get("create-permission-denied").to_string()), tr).into());
    }

    let subject = form.subject.trim();
    if subject.is_empty() {
        return Err(CalendarError::InvalidParameter("subject must not be empty".to_string()));
    }
    if subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(CalendarError::InvalidParameter(format!(
            "subject must be at most {} characters",
            MAX_SUBJECT_LEN
        )));
    }
    if form.cid <= 0 {
        return Err(CalendarError::InvalidParameter("cid must be a positive integer".to_string()));
    }

    let event = NewEvent {
        cid: form.cid,
        owner_uid: ctx.user.uid(),
        subject: subject.to_string(),
        description: form.description.unwrap_or_default(),
    };

    let id = state.db.insert_event(&event)?;

    info!(event_id = id, uid = ctx.user.uid(), cid = event.cid, "Event created");

    let body = html::message_box(&format!("{}: {}", tr.get("created-item"), id));
    Ok((StatusCode::CREATED, Html(body)).into_response())
}
