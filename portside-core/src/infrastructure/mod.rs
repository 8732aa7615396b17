// portside-core/src/infrastructure/mod.rs

pub mod config;
pub mod error;
pub mod fs;
pub mod reference;
pub mod sink;

pub use config::{InputPaths, ProjectConfig, RetryConfig, load_project_config};
pub use reference::load_reference_tables;
pub use sink::JsonFileSink;
