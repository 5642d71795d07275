use crate::ResponseDescriptor;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced to clients as JSON error responses.
///
/// The `Display` string of each variant is the `errorMessage` sent back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedirectError {
    #[error("Missing Host header")]
    MissingHost,

    #[error("No destination for {0}")]
    NotFound(String),

    #[error("Unable to query for redirect")]
    UpstreamUnavailable,
}

impl RedirectError {
    pub fn status(&self) -> u16 {
        match self {
            RedirectError::MissingHost => 400,
            RedirectError::NotFound(_) => 404,
            RedirectError::UpstreamUnavailable => 500,
        }
    }

    pub fn into_response(self) -> ResponseDescriptor {
        ResponseDescriptor::error(self.status(), &self.to_string())
    }
}

/// Failures of a store lookup or of loading store content.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Duplicate host {host} in table {table}")]
    DuplicateHost { table: String, host: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mapping file error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
