// portside-core/src/application/mod.rs

pub mod aggregate;
pub mod clean;
pub mod extract;
pub mod pipeline;
pub mod transform;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI do:
// `use portside_core::application::{run_pipeline, validate_project, clean_output};`
// without knowing the internal file layout.

pub use aggregate::{KpiBundle, aggregate};
pub use clean::clean_output;
pub use pipeline::{AbortFlag, CheckOutcome, RunReport, run_pipeline, validate_project};
pub use transform::{transform_inspections, transform_vessels};
