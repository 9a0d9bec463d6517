//! # Row Sources
//!
//! Where a table's rows come from. Each registered table owns one
//! [`LeadSource`]; the pipeline in `lg-core` only ever sees the rows it
//! returns, newest first.

pub mod file;
pub mod mock;

use lg_core::Lead;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rows in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// A read-only supplier of rows for one table.
#[async_trait::async_trait]
pub trait LeadSource: Send + Sync {
    /// Short label for logs and `/api/tables`.
    fn kind(&self) -> &'static str;

    /// All rows of the table, sorted by descending `lastActivity`.
    async fn fetch(&self) -> Result<Vec<Lead>, SourceError>;
}

fn default_mock_rows() -> usize {
    100
}

/// `source = { kind = "mock", rows = 100 }` or `source = { kind = "file", path = "leads.json" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Mock {
        #[serde(default = "default_mock_rows")]
        rows: usize,
        /// Fixed seed for reproducible fixtures; fresh rows on every fetch otherwise.
        #[serde(default)]
        seed: Option<u64>,
    },
    File {
        path: PathBuf,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Mock {
            rows: default_mock_rows(),
            seed: None,
        }
    }
}

impl SourceConfig {
    pub fn build(&self) -> Arc<dyn LeadSource> {
        match self {
            SourceConfig::Mock { rows, seed } => Arc::new(mock::MockSource::new(*rows, *seed)),
            SourceConfig::File { path } => Arc::new(file::FileSource::new(path.clone())),
        }
    }
}
