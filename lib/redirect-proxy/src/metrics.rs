//! Prometheus metrics for redirect traffic

use crate::middleware::{Middleware, MiddlewareContext};
use anyhow::Result;
use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics collector for redirect requests
#[derive(Clone)]
pub struct MetricsCollector {
    /// Total requests received
    pub requests_total: Counter,
    /// Responses by status code
    pub responses_total: CounterVec,
    /// Request latency by status code
    pub request_duration_seconds: HistogramVec,
    pub registry: Arc<Registry>,
}

impl MetricsCollector {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let requests_total = Counter::new(
            "redirect_requests_total",
            "Total redirect requests received",
        )?;

        let responses_total = CounterVec::new(
            Opts::new("redirect_responses_total", "Redirect responses by status"),
            &["status"],
        )?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "redirect_request_duration_seconds",
                "Redirect request latency in seconds",
            ),
            &["status"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(responses_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        Ok(Self {
            requests_total,
            responses_total,
            request_duration_seconds,
            registry,
        })
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Records request counts, status codes and latency
pub struct MetricsMiddleware {
    pub collector: MetricsCollector,
}

impl MetricsMiddleware {
    pub fn new(collector: MetricsCollector) -> Self {
        Self { collector }
    }
}

#[async_trait::async_trait]
impl Middleware for MetricsMiddleware {
    fn name(&self) -> &'static str {
        "MetricsMiddleware"
    }

    async fn on_request(&self, _context: &MiddlewareContext) -> Result<()> {
        self.collector.requests_total.inc();
        Ok(())
    }

    async fn on_response(&self, context: &MiddlewareContext, status: u16) -> Result<()> {
        let status = status.to_string();
        self.collector
            .responses_total
            .with_label_values(&[&status])
            .inc();
        self.collector
            .request_duration_seconds
            .with_label_values(&[&status])
            .observe(context.elapsed().as_secs_f64());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Request;

    fn context() -> MiddlewareContext {
        let req = Request::builder()
            .uri("/")
            .header("host", "a.example.com")
            .body(())
            .unwrap();
        MiddlewareContext::from_request(&req)
    }

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create collector");
        let metrics = collector.gather().expect("Failed to gather metrics");
        assert!(metrics.contains("# HELP redirect_requests_total"));
    }

    #[test]
    fn test_metrics_collector_clone_shares_registry() {
        let collector = MetricsCollector::new().expect("Failed to create collector");
        let clone = collector.clone();
        clone.requests_total.inc();
        assert_eq!(collector.requests_total.get(), 1.0);
    }

    #[tokio::test]
    async fn test_metrics_middleware_records_responses() {
        let collector = MetricsCollector::new().expect("Failed to create collector");
        let middleware = MetricsMiddleware::new(collector.clone());
        let context = context();

        middleware.on_request(&context).await.unwrap();
        middleware.on_response(&context, 301).await.unwrap();
        middleware.on_request(&context).await.unwrap();
        middleware.on_response(&context, 404).await.unwrap();

        assert_eq!(collector.requests_total.get(), 2.0);
        assert_eq!(collector.responses_total.with_label_values(&["301"]).get(), 1.0);
        assert_eq!(collector.responses_total.with_label_values(&["404"]).get(), 1.0);
        assert_eq!(
            collector
                .request_duration_seconds
                .with_label_values(&["301"])
                .get_sample_count(),
            1
        );

        let metrics = collector.gather().expect("Failed to gather metrics");
        assert!(metrics.contains("redirect_responses_total{status=\"404\"} 1"));
    }
}
