use crate::models::event::DeleteTarget;
use crate::utils::url::url_decode;
use tracing::debug;

/// Collect every `id=<value>` pair from a raw query string, in order.
///
/// Pairs without `=` and keys other than exactly `id` are skipped. Values that
/// do not decode or are not integers are kept, with `id: None`, so they still
/// show up in the report.
pub fn parse_delete_targets(raw_query: Option<&str>) -> Vec<DeleteTarget> {
    let Some(query) = raw_query else {
        return Vec::new();
    };

    let mut targets = Vec::new();

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            if !pair.is_empty() {
                debug!(pair = %pair, "Skipping query pair without '='");
            }
            continue;
        };

        if key != "id" {
            continue;
        }

        let raw = url_decode(value).unwrap_or_else(|_| value.to_string());
        let id = raw.trim().parse::<i64>().ok();

        targets.push(DeleteTarget { raw, id });
    }

    targets
}
