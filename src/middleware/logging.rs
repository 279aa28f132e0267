use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Method, Request, Response, StatusCode},
};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::request_id::RequestId;

/// Route label for requests that reached the 404 fallback
const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Access log: one event per completed request, labelled with the matched
/// route template (`/api/places/:pid`) as well as the concrete path.
#[derive(Clone)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingService { inner }
    }
}

#[derive(Clone)]
pub struct LoggingService<S> {
    inner: S,
}

struct AccessRecord {
    request_id: String,
    method: Method,
    route: String,
    path: String,
    started: Instant,
}

impl AccessRecord {
    fn new(req: &Request<Body>) -> Self {
        let extensions = req.extensions();
        Self {
            request_id: extensions
                .get::<RequestId>()
                .map(ToString::to_string)
                .unwrap_or_default(),
            method: req.method().clone(),
            route: extensions
                .get::<MatchedPath>()
                .map(|path| path.as_str().to_string())
                .unwrap_or_else(|| UNMATCHED_ROUTE.to_string()),
            path: req.uri().path().to_string(),
            started: Instant::now(),
        }
    }

    fn finish(self, status: StatusCode) {
        let elapsed_ms = millis(self.started.elapsed());
        let status = status.as_u16();

        match status {
            500..=599 => tracing::error!(
                request_id = %self.request_id,
                method = %self.method,
                route = %self.route,
                path = %self.path,
                status,
                elapsed_ms,
                "Request failed"
            ),
            400..=499 => tracing::warn!(
                request_id = %self.request_id,
                method = %self.method,
                route = %self.route,
                path = %self.path,
                status,
                elapsed_ms,
                "Request rejected"
            ),
            _ => tracing::info!(
                request_id = %self.request_id,
                method = %self.method,
                route = %self.route,
                status,
                elapsed_ms,
                "Request served"
            ),
        }
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

impl<S> Service<Request<Body>> for LoggingService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let record = AccessRecord::new(&req);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;
            record.finish(response.status());
            Ok(response)
        })
    }
}
