//! # Table Registry
//!
//! Maps table IDs to their row sources. Built once at startup from the
//! configured tables and owned by the application state; it is never
//! mutated afterwards, so lookups need no locking.

use crate::sources::{LeadSource, SourceConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Table served by `/api/leads`.
pub const DEFAULT_TABLE: &str = "leads";

/// One `[[tables]]` entry of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub id: String,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub id: String,
    pub source: &'static str,
}

#[derive(Default)]
pub struct TableRegistry {
    tables: HashMap<String, Arc<dyn LeadSource>>,
    /// Registration order, for listings.
    order: Vec<String>,
}

impl TableRegistry {
    /// Build from config. Without any configured table a mock `leads` table
    /// is registered; a repeated ID keeps its first definition.
    pub fn from_config(tables: &[TableConfig]) -> Self {
        let mut registry = Self::default();
        if tables.is_empty() {
            registry.insert(DEFAULT_TABLE, SourceConfig::default().build());
            return registry;
        }
        for table in tables {
            if registry.tables.contains_key(&table.id) {
                tracing::warn!("Table {:?} is configured twice; keeping the first", table.id);
                continue;
            }
            registry.insert(&table.id, table.source.build());
        }
        registry
    }

    pub fn insert(&mut self, id: &str, source: Arc<dyn LeadSource>) {
        if self.tables.insert(id.to_string(), source).is_none() {
            self.order.push(id.to_string());
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn LeadSource>> {
        self.tables.get(id).cloned()
    }

    pub fn list(&self) -> Vec<TableInfo> {
        self.order
            .iter()
            .filter_map(|id| {
                self.tables.get(id).map(|source| TableInfo {
                    id: id.clone(),
                    source: source.kind(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_when_unconfigured() {
        let registry = TableRegistry::from_config(&[]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(DEFAULT_TABLE).map(|s| s.kind()), Some("mock"));
    }

    #[test]
    fn test_configured_tables_in_order() {
        let tables = vec![
            TableConfig {
                id: "archive".into(),
                source: SourceConfig::File { path: "archive.json".into() },
            },
            TableConfig {
                id: "leads".into(),
                source: SourceConfig::default(),
            },
            TableConfig {
                id: "archive".into(),
                source: SourceConfig::default(),
            },
        ];
        let registry = TableRegistry::from_config(&tables);
        let listed: Vec<(String, &str)> = registry.list().into_iter().map(|t| (t.id, t.source)).collect();
        assert_eq!(listed, vec![("archive".to_string(), "file"), ("leads".to_string(), "mock")]);
        assert!(registry.get("missing").is_none());
    }
}
