//! Core redirect lookup functionality
//!
//! This library provides:
//! - Request and response descriptors for host-based redirects
//! - The store abstraction and an in-memory store
//! - The redirect handler mapping a host to a redirect or an error response

pub mod config;
pub mod error;
pub mod handler;
pub mod mapping;
pub mod request;
pub mod response;
pub mod store;

pub use config::{LogFormat, RedirectConfig, StoreBackend};
pub use error::{ConfigError, RedirectError, Result, StoreError};
pub use handler::RedirectHandler;
pub use mapping::{is_usable, LookupOutcome, RedirectMapping};
pub use request::{normalize_host, ProxyEvent, RequestDescriptor};
pub use response::ResponseDescriptor;
pub use store::{MemoryStore, RedirectStore};
