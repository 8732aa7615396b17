// portside-core/src/infrastructure/sink.rs

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::PortsideError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::sink::{TableEnvelope, TableSink, WriteResult};

/// Persists each table as one pretty-printed JSON document under the tables
/// directory. Writes go through a temp-file + rename so a crash never leaves
/// a half-written table behind.
pub struct JsonFileSink {
    tables_dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(tables_dir: impl Into<PathBuf>) -> Self {
        Self {
            tables_dir: tables_dir.into(),
        }
    }

    fn table_path(&self, table_name: &str) -> PathBuf {
        self.tables_dir.join(format!("{table_name}.json"))
    }
}

#[async_trait]
impl TableSink for JsonFileSink {
    async fn write_table(&self, envelope: &TableEnvelope) -> Result<WriteResult, PortsideError> {
        if !self.tables_dir.exists() {
            fs::create_dir_all(&self.tables_dir).map_err(PortsideError::from)?;
        }
        let content = serde_json::to_string_pretty(envelope)
            .map_err(|e| PortsideError::InternalError(format!("Serialization: {e}")))?;
        let path = self.table_path(&envelope.metadata.table_name);
        atomic_write(&path, content)?;
        debug!(table = %envelope.metadata.table_name, path = ?path, "Table written");
        Ok(WriteResult {
            table: envelope.metadata.table_name.clone(),
            records: envelope.metadata.record_count,
        })
    }

    async fn remove_table(&self, table_name: &str) -> Result<(), PortsideError> {
        let path = self.table_path(table_name);
        if path.exists() {
            fs::remove_file(&path).map_err(PortsideError::from)?;
        }
        Ok(())
    }
}

/// Helper shared by the run/failure reports: they live next to the tables
/// directory and are deliberately NOT part of the rollback set.
pub fn report_path(output_dir: &Path) -> PathBuf {
    output_dir.join("run_report.json")
}
