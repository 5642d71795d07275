use anyhow::{Context, Result};
use http_body_util::Full;
use hyper::{
    body::{Bytes, Incoming},
    server::conn::http1,
    service::service_fn,
    Request, Response,
};
use hyper_util::rt::TokioIo;
use redirect_core::{
    LogFormat, MemoryStore, RedirectConfig, RedirectHandler, RedirectStore, StoreBackend,
};
use redirect_kube::ConfigMapStore;
use redirect_proxy::{
    AdminService, LoggingMiddleware, MetricsCollector, MetricsMiddleware, MiddlewareChain,
    RedirectService,
};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RedirectConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting redirect-gateway...");
    info!("  - Table: {}", config.table_name);
    info!("  - Lookup timeout: {:?}", config.lookup_timeout);

    let store = build_store(&config).await?;

    let metrics = MetricsCollector::new()?;
    info!("Metrics collector initialized");

    let middleware = MiddlewareChain::new()
        .add(LoggingMiddleware)
        .add(MetricsMiddleware::new(metrics.clone()));

    let handler = RedirectHandler::new(store, config.clone());
    let service = RedirectService::new(handler, middleware);
    let admin = AdminService::new(metrics);

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    info!("Redirect listener on {}", config.bind_address);

    let admin_listener = TcpListener::bind(config.admin_address)
        .await
        .with_context(|| format!("binding {}", config.admin_address))?;
    info!("Admin listener on {} (/healthz, /metrics)", config.admin_address);

    tokio::spawn(accept_connections(admin_listener, "admin", move |req| {
        let admin = admin.clone();
        async move { admin.serve(req).await }
    }));

    tokio::select! {
        _ = accept_connections(listener, "redirect", move |req| {
            let service = service.clone();
            async move { service.serve(req).await }
        }) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received, exiting...");
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn build_store(config: &RedirectConfig) -> Result<Arc<dyn RedirectStore>> {
    match config.store {
        StoreBackend::Memory => {
            let store = match &config.mappings_file {
                Some(path) => MemoryStore::from_file(path)
                    .await
                    .with_context(|| format!("loading mappings from {}", path.display()))?,
                None => {
                    warn!("REDIRECT_MAPPINGS_FILE not set - memory store starts empty");
                    MemoryStore::new()
                }
            };
            info!(
                "Memory store initialized with {} mappings in table {}",
                store.len(&config.table_name).await,
                config.table_name
            );
            Ok(Arc::new(store))
        }
        StoreBackend::ConfigMap => {
            let store = ConfigMapStore::connect(&config.namespace).await?;
            info!("ConfigMap store initialized in namespace {}", store.namespace());
            Ok(Arc::new(store))
        }
    }
}

/// Accept HTTP/1 connections and answer each request with `serve`
async fn accept_connections<F, Fut>(listener: TcpListener, name: &'static str, serve: F)
where
    F: Fn(Request<Incoming>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Response<Full<Bytes>>> + Send + 'static,
{
    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Error accepting {} connection: {}", name, e);
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let serve = serve.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let response = serve(req);
                async move { Ok::<_, Infallible>(response.await) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Error serving {} connection from {}: {}", name, peer_addr, e);
            }
        });
    }
}
