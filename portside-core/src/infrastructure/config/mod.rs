// portside-core/src/infrastructure/config/mod.rs

pub mod project;

pub use project::{InputPaths, ProjectConfig, RetryConfig, load_project_config};
