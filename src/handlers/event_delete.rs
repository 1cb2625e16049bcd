use crate::core::context::RequestContext;
use crate::core::error::{CalendarError, PermissionError};
use crate::core::state::AppState;
use crate::i18n::Translator;
use crate::models::event::{DeleteOutcome, DeleteReport};
use crate::models::permission::PermissionLevel;
use crate::models::user::User;
use crate::render::html;
use crate::stores::EventStore;
use crate::validation::query::parse_delete_targets;
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Bulk event deletion
///
/// GET /events/delete?id=<id>&id=<id>...
///
/// # Flow
/// 1. Resolve the principal from the session
/// 2. Refuse anonymous callers unless anonymous users may modify events
/// 3. Delete every `id` from the query string, in order
/// 4. Render one line per requested id
#[instrument(skip(state, headers, raw_query))]
pub async fn event_delete_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, CalendarError> {
    let ctx = RequestContext::resolve(&state, &headers, raw_query.as_deref())?;

    let result = delete_events(
        &*state.db,
        &ctx.user,
        state.config.permissions.anon_permission,
        raw_query.as_deref(),
        &ctx.translator,
    )
    .map(|report| {
        let body = html::boxed(report_lines(&report, &ctx.translator));
        (StatusCode::OK, Html(body)).into_response()
    });

    Ok(ctx.respond(result))
}

/// Check permission, then delete each requested event.
///
/// A storage error stops the batch; events already deleted stay deleted.
pub fn delete_events(
    store: &dyn EventStore,
    user: &User,
    anon_permission: PermissionLevel,
    raw_query: Option<&str>,
    tr: &Translator,
) -> Result<DeleteReport, CalendarError> {
    if !user.is_user() && !anon_permission.allows(PermissionLevel::DELETE) {
        warn!(
            anon_permission = %anon_permission,
            "Anonymous delete attempt refused"
        );
        return Err(PermissionError::new(
            Some(tr.get("delete-permission-denied").to_string()),
            tr,
        )
        .into());
    }

    let targets = parse_delete_targets(raw_query);
    let mut report = DeleteReport::default();

    for target in targets {
        let removed = match target.id {
            Some(id) => store.delete_event(id)? > 0,
            None => {
                debug!(value = %target.raw, "Delete target is not an event id");
                false
            }
        };

        if removed {
            info!(uid = user.uid(), event_id = %target.raw, "Event removed");
            report.outcomes.push(DeleteOutcome::Removed(target.raw));
        } else {
            debug!(uid = user.uid(), event_id = %target.raw, "Event not removed");
            report.outcomes.push(DeleteOutcome::NotRemoved(target.raw));
        }
    }

    info!(
        uid = user.uid(),
        requested = report.outcomes.len(),
        removed = report.removed(),
        "Delete request processed"
    );

    Ok(report)
}

/// Human-readable lines for a report, or the "nothing selected" notice
pub fn report_lines(report: &DeleteReport, tr: &Translator) -> Vec<String> {
    if report.is_empty() {
        return vec![tr.get("no-items-selected").to_string()];
    }

    report
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            DeleteOutcome::Removed(id) => format!("{}: {}", tr.get("removed-item"), id),
            DeleteOutcome::NotRemoved(id) => {
                format!("{}: {}", tr.get("could-not-remove-item"), id)
            }
        })
        .collect()
}
