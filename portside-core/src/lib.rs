// portside-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)] // Doc coverage is still being filled in

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Contract of the table persistence boundary (TableSink).
pub mod ports;

// 2. Domain (Cœur du métier)
// Entities, business-rule validator, calendar, risk model.
// Depends on nothing else (no infra, no app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Technical implementation (JSON files, config loading, reference tables)
// Depends on Domain and Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration (Pipeline, Extract, Transform, Aggregate, Clean)
// Depends on Domain, Infra and Ports.
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// Lets consumers import the top error easily: use portside_core::PortsideError;
pub use error::PortsideError;
