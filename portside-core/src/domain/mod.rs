// portside-core/src/domain/mod.rs

pub mod calendar;
pub mod constraints;
pub mod error;
pub mod model;
pub mod risk;
pub mod rules;
pub mod stats;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use constraints::FleetConstraints;
pub use error::DomainError;
pub use rules::{ValidationReport, Violation};
