// portside-core/src/ports/sink.rs

// This file defines what the application needs from table persistence,
// without knowing how it is done. The pipeline talks to this trait only;
// the JSON-file adapter (and the test mocks) plug into it.

use crate::domain::constraints::FleetConstraints;
use crate::error::PortsideError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Envelope metadata written alongside every table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub table_name: String,
    pub loaded_at: String,
    pub record_count: usize,
    pub schema_version: String,
    pub constraints_snapshot: FleetConstraints,
}

/// A table ready to persist: metadata plus the record array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableEnvelope {
    pub metadata: TableMetadata,
    pub data: serde_json::Value,
}

impl TableEnvelope {
    pub fn new<T: Serialize>(
        table_name: &str,
        records: &[T],
        schema_version: &str,
        constraints: &FleetConstraints,
    ) -> Result<Self, PortsideError> {
        let data = serde_json::to_value(records)
            .map_err(|e| PortsideError::InternalError(format!("Serialization: {e}")))?;
        Ok(Self {
            metadata: TableMetadata {
                table_name: table_name.to_string(),
                loaded_at: chrono::Utc::now().to_rfc3339(),
                record_count: records.len(),
                schema_version: schema_version.to_string(),
                constraints_snapshot: constraints.clone(),
            },
            data,
        })
    }

    /// Variant for single-document tables (KPI summaries).
    pub fn single<T: Serialize>(
        table_name: &str,
        record: &T,
        schema_version: &str,
        constraints: &FleetConstraints,
    ) -> Result<Self, PortsideError> {
        let data = serde_json::to_value(record)
            .map_err(|e| PortsideError::InternalError(format!("Serialization: {e}")))?;
        Ok(Self {
            metadata: TableMetadata {
                table_name: table_name.to_string(),
                loaded_at: chrono::Utc::now().to_rfc3339(),
                record_count: 1,
                schema_version: schema_version.to_string(),
                constraints_snapshot: constraints.clone(),
            },
            data,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WriteResult {
    pub table: String,
    pub records: usize,
}

#[async_trait]
pub trait TableSink: Send + Sync {
    /// Persist one table, all-or-nothing (no partial write may remain).
    async fn write_table(&self, envelope: &TableEnvelope) -> Result<WriteResult, PortsideError>;

    /// Remove a previously written table (rollback path).
    async fn remove_table(&self, table_name: &str) -> Result<(), PortsideError>;
}
