//! Redirect stores: the lookup abstraction and an in-memory implementation

use crate::{normalize_host, LookupOutcome, RedirectMapping, Result, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A key-value store answering point lookups by host
#[async_trait]
pub trait RedirectStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str {
        "UnnamedStore"
    }

    /// Read the mapping for `host` from `table`
    async fn lookup(&self, table: &str, host: &str) -> LookupOutcome;
}

type Table = HashMap<String, RedirectMapping>;

/// MemoryStore keeps redirect tables in process
#[derive(Clone, Default)]
pub struct MemoryStore {
    // Map of table name to host-keyed records
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a YAML document of the form
    ///
    /// ```yaml
    /// redirection:
    ///   - host: redirect.example.com
    ///     location: https://example.com/
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<RedirectMapping>> = serde_yaml::from_str(yaml)?;

        let mut tables = HashMap::with_capacity(raw.len());
        for (table_name, records) in raw {
            let mut table = Table::with_capacity(records.len());
            for mut record in records {
                record.host = normalize_host(&record.host);
                if table.contains_key(&record.host) {
                    return Err(StoreError::DuplicateHost {
                        table: table_name,
                        host: record.host,
                    });
                }
                table.insert(record.host.clone(), record);
            }
            debug!("Loaded {} mappings into table {}", table.len(), table_name);
            tables.insert(table_name, table);
        }

        Ok(Self {
            tables: Arc::new(RwLock::new(tables)),
        })
    }

    /// Build a store from a YAML mappings file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_yaml_str(&contents)
    }

    /// Insert or replace the mapping for a host
    pub async fn put(&self, table: &str, mapping: RedirectMapping) {
        let host = normalize_host(&mapping.host);
        let mapping = RedirectMapping { host: host.clone(), ..mapping };

        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(host.clone(), mapping);

        debug!("Stored mapping for {} in table {}", host, table);
    }

    /// Remove the mapping for a host, returning it if present
    pub async fn remove(&self, table: &str, host: &str) -> Option<RedirectMapping> {
        let mut tables = self.tables.write().await;
        let removed = tables.get_mut(table)?.remove(&normalize_host(host));
        if removed.is_some() {
            debug!("Removed mapping for {} from table {}", host, table);
        }
        removed
    }

    /// Number of mappings held in a table
    pub async fn len(&self, table: &str) -> usize {
        let tables = self.tables.read().await;
        tables.get(table).map_or(0, HashMap::len)
    }

    pub async fn is_empty(&self, table: &str) -> bool {
        self.len(table).await == 0
    }
}

#[async_trait]
impl RedirectStore for MemoryStore {
    fn name(&self) -> &'static str {
        "MemoryStore"
    }

    async fn lookup(&self, table: &str, host: &str) -> LookupOutcome {
        let tables = self.tables.read().await;
        match tables.get(table).and_then(|t| t.get(host)) {
            Some(mapping) => LookupOutcome::Found(mapping.clone()),
            None => LookupOutcome::Missing,
        }
    }
}
