//! Type-erased request handlers.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures_core::future::BoxFuture;
use tower::{Service, ServiceExt};

type HandlerFn = dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync;

/// A clonable async function from request to response.
///
/// This is the unit a [`Tracer`](crate::Tracer) wraps. It implements
/// [`tower::Service`], so a traced handler can be mounted directly with
/// `Router::route_service`.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    /// Builds a handler from a function that already returns a boxed future.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Request) -> BoxFuture<'static, Response> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Builds a handler from an async function returning anything that
    /// converts into a response.
    pub fn from_fn<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        Self::new(move |request| {
            let fut = f(request);
            Box::pin(async move { fut.await.into_response() })
        })
    }

    /// Adapts an infallible tower service, such as an axum `Route`.
    pub fn from_service<S>(service: S) -> Self
    where
        S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Response: IntoResponse + 'static,
        S::Future: Send + 'static,
    {
        Self::new(move |request| {
            let service = service.clone();
            Box::pin(async move {
                match service.oneshot(request).await {
                    Ok(response) => response.into_response(),
                    Err(never) => match never {},
                }
            })
        })
    }

    /// Invokes the handler.
    pub fn handle(&self, request: Request) -> BoxFuture<'static, Response> {
        (self.0)(request)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

impl Service<Request> for Handler {
    type Response = Response;
    type Error = Infallible;
    type Future = ResponseFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        ResponseFuture(self.handle(request))
    }
}

/// Response future for [`Handler`].
pub struct ResponseFuture(BoxFuture<'static, Response>);

impl Future for ResponseFuture {
    type Output = Result<Response, Infallible>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx).map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    #[tokio::test]
    async fn test_from_fn_converts_output_into_response() {
        let handler = Handler::from_fn(|_request: Request| async { StatusCode::ACCEPTED });

        let response = handler.oneshot(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_from_service_forwards_to_router() {
        let router = Router::new().route("/v1/get", get(|| async { "ok" }));
        let handler = Handler::from_service(router);

        let request = Request::builder()
            .uri("/v1/get")
            .body(Body::empty())
            .unwrap();
        let response = handler.handle(request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mounts_with_route_service() {
        let handler = Handler::from_fn(|_request: Request| async { StatusCode::NO_CONTENT });
        let router = Router::new().route_service("/v1/get", handler);

        let request = Request::builder()
            .uri("/v1/get")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
