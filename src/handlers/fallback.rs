use crate::core::context::RequestContext;
use crate::core::state::AppState;
use crate::i18n::Translator;
use crate::render::html;
use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

pub async fn fallback_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    debug!(path = %uri.path(), "No route matched");

    match RequestContext::resolve(&state, &headers, raw_query.as_deref()) {
        Ok(ctx) => {
            let body = html::message_box(ctx.translator.get("not-found"));
            ctx.finish((StatusCode::NOT_FOUND, Html(body)).into_response())
        }
        Err(e) => {
            warn!(error = %e, "Could not resolve session for unmatched route");
            let tr = Translator::new(&state.config.locale.default);
            (StatusCode::NOT_FOUND, Html(html::message_box(tr.get("not-found")))).into_response()
        }
    }
}
