// portside-core/src/ports/mod.rs

pub mod sink;

pub use sink::{TableEnvelope, TableMetadata, TableSink, WriteResult};
