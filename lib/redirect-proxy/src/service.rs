//! Redirect service: hyper request in, redirect or error response out

use crate::http::{into_response, request_descriptor};
use crate::middleware::{MiddlewareChain, MiddlewareContext};
use http_body_util::Full;
use hyper::{body::Bytes, Request, Response};
use redirect_core::RedirectHandler;
use std::sync::Arc;
use tracing::debug;

/// RedirectService answers every request on the main listener
///
/// Path, query and method are ignored; only the host matters.
#[derive(Clone)]
pub struct RedirectService {
    handler: RedirectHandler,
    middleware: Arc<MiddlewareChain>,
}

impl RedirectService {
    pub fn new(handler: RedirectHandler, middleware: MiddlewareChain) -> Self {
        Self {
            handler,
            middleware: Arc::new(middleware),
        }
    }

    pub async fn serve<B>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        let context = MiddlewareContext::from_request(&req);

        if let Err(e) = self.middleware.on_request(&context).await {
            debug!("Middleware on_request error: {}", e);
        }

        let descriptor = match request_descriptor(&req) {
            Ok(request) => self.handler.handle(&request).await,
            Err(e) => {
                debug!(request_id = %context.request_id, "Rejecting request: {}", e);
                e.into_response()
            }
        };

        let response = into_response(descriptor);

        if let Err(e) = self
            .middleware
            .on_response(&context, response.status().as_u16())
            .await
        {
            debug!("Middleware on_response error: {}", e);
        }

        response
    }
}
