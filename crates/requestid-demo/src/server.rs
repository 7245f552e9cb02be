//! Axum HTTP server: router, listener, graceful shutdown.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use requestid::{Handler, Key, RequestContext, Tracer};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::DemoConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: DemoConfig,
    pub tracer: Tracer,
}

#[derive(Debug, Serialize)]
struct RequestIdBody {
    key: String,
    request_id: String,
}

/// Build the application router.
///
/// `/v1/request-id` is a traced [`Handler`] mounted directly;
/// `/v1/context` is a plain axum handler behind the tracer's layer.
pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);
    let key = state.tracer.key().clone();

    let echo_key = key.clone();
    let request_id = state.tracer.trace(instrument(
        key,
        Handler::from_fn(move |request| handle_request_id(echo_key.clone(), request)),
    ));

    let layered = Router::new()
        .route("/v1/context", get(handle_context))
        .layer(state.tracer.layer());

    Router::new()
        .route_service("/v1/request-id", request_id)
        .merge(layered)
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build and run the HTTP server.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let listen_addr = state.config.server.listen_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "requestid demo listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("requestid demo shut down gracefully");
    Ok(())
}

/// Opens a request span carrying the injected id around `next`.
///
/// Must sit inside the tracer so the id is already in the context.
fn instrument(key: Key, next: Handler) -> Handler {
    Handler::new(move |request: Request| {
        let ctx = RequestContext::from_request(&request);
        let span = requestid_tracing::request_span!(
            ctx.request_id(&key).unwrap_or("-"),
            request.method(),
            request.uri().path()
        );

        let response = next.handle(request);
        Box::pin(
            async move {
                let started = Instant::now();
                let response = response.await;

                let span = tracing::Span::current();
                span.record("status", response.status().as_u16());
                span.record(
                    "latency_ms",
                    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                );
                tracing::info!("request completed");

                response
            }
            .instrument(span),
        )
    })
}

/// Handler for GET /v1/request-id.
async fn handle_request_id(key: Key, request: Request) -> Response {
    request_id_response(&key, &RequestContext::from_request(&request))
}

/// Handler for GET /v1/context.
async fn handle_context(State(state): State<Arc<AppState>>, ctx: RequestContext) -> Response {
    request_id_response(state.tracer.key(), &ctx)
}

fn request_id_response(key: &Key, ctx: &RequestContext) -> Response {
    match ctx.request_id(key) {
        Some(id) => Json(RequestIdBody {
            key: key.to_string(),
            request_id: id.to_string(),
        })
        .into_response(),
        None => {
            tracing::error!(key = %key, "no request id in context");
            (StatusCode::INTERNAL_SERVER_ERROR, "request id missing").into_response()
        }
    }
}

/// Health check endpoint.
async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use requestid::{with_id_generator, TracerConfig};
    use std::fmt;
    use std::sync::Mutex;
    use tower::ServiceExt;
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    type Fields = Arc<Mutex<Vec<(String, String)>>>;

    /// Collects the fields of `request` spans.
    struct RequestSpanFields(Fields);

    struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

    impl Visit for FieldVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
    }

    impl<S: Subscriber> Layer<S> for RequestSpanFields {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            if attrs.metadata().name() == "request" {
                attrs.record(&mut FieldVisitor(&mut self.0.lock().unwrap()));
            }
        }

        fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
            values.record(&mut FieldVisitor(&mut self.0.lock().unwrap()));
        }
    }

    fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    fn app(tracer: Tracer) -> Router {
        router(AppState {
            config: DemoConfig::default(),
            tracer,
        })
    }

    fn get_request(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_routes_return_generated_id() {
        for path in ["/v1/request-id", "/v1/context"] {
            let response = app(Tracer::default())
                .oneshot(get_request(path))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = json_body(response).await;
            assert_eq!(body["key"], "request-id");
            assert_eq!(body["request_id"].as_str().unwrap().len(), 36);
        }
    }

    #[tokio::test]
    async fn test_configured_key_and_format() {
        let config: TracerConfig =
            serde_json::from_str(r#"{"key": "testKey", "id_format": "simple"}"#).unwrap();
        let tracer = config.build().unwrap();

        let response = app(tracer)
            .oneshot(get_request("/v1/request-id"))
            .await
            .unwrap();
        let body = json_body(response).await;

        assert_eq!(body["key"], "testKey");
        assert_eq!(body["request_id"].as_str().unwrap().len(), 32);
    }

    #[tokio::test]
    async fn test_upstream_id_is_kept() {
        let tracer = Tracer::new([with_id_generator(|| "static-key".to_string())]);

        let mut request = get_request("/v1/context");
        RequestContext::new()
            .with_value(tracer.key().clone(), "upstream-id".to_string())
            .attach(&mut request);

        let response = app(tracer).oneshot(request).await.unwrap();
        let body = json_body(response).await;

        assert_eq!(body["request_id"], "upstream-id");
    }

    #[tokio::test]
    async fn test_request_span_records_injected_id() {
        let fields: Fields = Arc::default();
        let subscriber = tracing_subscriber::registry().with(RequestSpanFields(Arc::clone(&fields)));
        let _default = tracing::subscriber::set_default(subscriber);

        let tracer = Tracer::default();
        let key = tracer.key().clone();
        let echo_key = key.clone();
        let handler = tracer.trace(instrument(
            key,
            Handler::from_fn(move |request| handle_request_id(echo_key.clone(), request)),
        ));

        let response = handler.handle(get_request("/v1/request-id")).await;
        let body = json_body(response).await;

        let fields = fields.lock().unwrap();
        assert_eq!(field(&fields, "request_id"), body["request_id"].as_str());
        assert_ne!(field(&fields, "request_id"), Some("-"));
        assert_eq!(field(&fields, "method"), Some("GET"));
        assert_eq!(field(&fields, "status"), Some("200"));
        assert!(field(&fields, "latency_ms").is_some());
    }

    #[tokio::test]
    async fn test_health_is_not_traced() {
        let response = app(Tracer::default())
            .oneshot(get_request("/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
