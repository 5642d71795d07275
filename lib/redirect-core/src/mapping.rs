//! Redirect records and lookup outcomes

use crate::StoreError;
use serde::{Deserialize, Serialize};

/// A single host -> location record as held by a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectMapping {
    pub host: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl RedirectMapping {
    pub fn new(host: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            location: Some(location.into()),
        }
    }

    /// The location, if it can be redirected to.
    pub fn usable_location(&self) -> Option<&str> {
        let location = self.location.as_deref();
        if is_usable(location) {
            location
        } else {
            None
        }
    }
}

/// A location is usable when it is present and non-empty.
pub fn is_usable(location: Option<&str>) -> bool {
    matches!(location, Some(l) if !l.is_empty())
}

/// Result of a single point lookup against a store.
#[derive(Debug)]
pub enum LookupOutcome {
    /// The store returned a record for the host
    Found(RedirectMapping),
    /// The store answered but holds no record for the host
    Missing,
    /// The store could not be queried
    Failed(StoreError),
}
