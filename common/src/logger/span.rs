use tracing::{Span, field};

use super::TraceId;

/// Create a root span for a tick / request.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id,
        asset = field::Empty
    )
}

/// Create a child span (inherits trace_id from the enclosing root).
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name, asset = field::Empty)
}

/// Records the asset being processed on the current span.
pub fn annotate_asset(asset: &str) {
    Span::current().record("asset", field::display(asset));
}
