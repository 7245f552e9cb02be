//! Tower layer for installing a [`Tracer`] router-wide.

use std::convert::Infallible;

use axum::extract::Request;
use axum::response::IntoResponse;
use tower::{Layer, Service};

use crate::handler::Handler;
use crate::tracer::Tracer;

/// Wraps every service it is applied to with [`Tracer::trace`].
///
/// ```ignore
/// let app = Router::new()
///     .route("/v1/get", get(handler))
///     .layer(tracer.layer());
/// ```
#[derive(Debug, Clone)]
pub struct RequestIdLayer {
    tracer: Tracer,
}

impl RequestIdLayer {
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }
}

impl<S> Layer<S> for RequestIdLayer
where
    S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Response: IntoResponse + 'static,
    S::Future: Send + 'static,
{
    type Service = Handler;

    fn layer(&self, inner: S) -> Self::Service {
        self.tracer.trace(Handler::from_service(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::key::{Key, DEFAULT_TRACING_KEY};
    use crate::options::with_tracer_key;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    async fn read_id(ctx: RequestContext) -> Result<String, StatusCode> {
        ctx.request_id(&DEFAULT_TRACING_KEY)
            .map(str::to_string)
            .ok_or(StatusCode::BAD_REQUEST)
    }

    #[tokio::test]
    async fn test_layer_injects_for_every_route() {
        let app = Router::new()
            .route("/a", get(read_id))
            .route("/b", get(read_id))
            .layer(Tracer::default().layer());

        for path in ["/a", "/b"] {
            let request = Request::builder().uri(path).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_layer_uses_tracer_key() {
        let app = Router::new()
            .route("/a", get(read_id))
            .layer(Tracer::new([with_tracer_key(Key::from_static("testKey"))]).layer());

        let request = Request::builder().uri("/a").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unmatched_path_still_reaches_fallback() {
        let app = Router::new()
            .route("/a", get(read_id))
            .layer(Tracer::default().layer());

        let request = Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
