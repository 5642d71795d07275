//! Admin endpoints: health and metrics

use crate::metrics::MetricsCollector;
use http_body_util::Full;
use hyper::header::CONTENT_TYPE;
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use tracing::warn;

/// Serves `/healthz` and `/metrics` on the admin listener
#[derive(Clone)]
pub struct AdminService {
    metrics: MetricsCollector,
}

impl AdminService {
    pub fn new(metrics: MetricsCollector) -> Self {
        Self { metrics }
    }

    pub async fn serve<B>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        if req.method() != Method::GET {
            return text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed\n");
        }

        match req.uri().path() {
            "/healthz" => text_response(StatusCode::OK, "OK\n"),
            "/metrics" => match self.metrics.gather() {
                Ok(text) => {
                    let mut response = text_response(StatusCode::OK, text);
                    response.headers_mut().insert(
                        CONTENT_TYPE,
                        hyper::header::HeaderValue::from_static("text/plain; version=0.0.4"),
                    );
                    response
                }
                Err(e) => {
                    warn!("Failed to gather metrics: {}", e);
                    text_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to gather metrics\n")
                }
            },
            _ => text_response(StatusCode::NOT_FOUND, "Not Found\n"),
        }
    }
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
}
