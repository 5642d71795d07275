//! Redirect handler: one host in, one response out

use crate::{
    LookupOutcome, ProxyEvent, RedirectConfig, RedirectError, RedirectStore, RequestDescriptor,
    ResponseDescriptor, StoreError,
};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, Level};

/// RedirectHandler maps a request descriptor to a redirect or error response
///
/// Each call performs exactly one store lookup, bounded by the configured
/// lookup timeout. Nothing is cached or retried.
#[derive(Clone)]
pub struct RedirectHandler {
    store: Arc<dyn RedirectStore>,
    config: Arc<RedirectConfig>,
}

impl RedirectHandler {
    pub fn new(store: Arc<dyn RedirectStore>, config: RedirectConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Answer a proxy-integration event
    ///
    /// An event without a usable `Host` header is a 400 and never reaches the
    /// store.
    pub async fn handle_event(&self, event: &ProxyEvent) -> ResponseDescriptor {
        match event.descriptor() {
            Ok(request) => self.handle(&request).await,
            Err(e) => {
                debug!("Rejecting event: {}", e);
                e.into_response()
            }
        }
    }

    pub async fn handle(&self, request: &RequestDescriptor) -> ResponseDescriptor {
        let host = request.host();
        let table = self.config.table_name.as_str();
        debug!(host, table, store = self.store.name(), "Looking up redirect");

        let lookup = self.store.lookup(table, host);
        let outcome = match timeout(self.config.lookup_timeout, lookup).await {
            Ok(outcome) => outcome,
            Err(_) => LookupOutcome::Failed(StoreError::Timeout(self.config.lookup_timeout)),
        };

        let response = match outcome {
            LookupOutcome::Found(mapping) => match mapping.usable_location() {
                Some(location) => {
                    debug!(host, location, "Redirecting");
                    ResponseDescriptor::redirect(location)
                }
                None => {
                    debug!(host, "Record has no usable location");
                    RedirectError::NotFound(host.to_string()).into_response()
                }
            },
            LookupOutcome::Missing => {
                debug!(host, "No record for host");
                RedirectError::NotFound(host.to_string()).into_response()
            }
            LookupOutcome::Failed(e) => {
                error!(host, table, "Unable to query for redirect: {}", e);
                RedirectError::UpstreamUnavailable.into_response()
            }
        };

        if tracing::enabled!(Level::DEBUG) {
            if let Ok(envelope) = response.to_envelope() {
                debug!("Response: {}", envelope);
            }
        }
        response
    }
}
