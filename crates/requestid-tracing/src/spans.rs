//! Span builder helpers for request instrumentation.

/// Create a tracing span for one inbound request.
///
/// Usage: `let span = request_span!(request_id, method, path);`
///
/// Fields recorded later by the caller:
/// - `status`: response status code
/// - `latency_ms`: milliseconds spent in the inner handler
#[macro_export]
macro_rules! request_span {
    ($request_id:expr, $method:expr, $path:expr) => {
        tracing::info_span!(
            "request",
            request_id = %$request_id,
            method = %$method,
            path = %$path,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}
