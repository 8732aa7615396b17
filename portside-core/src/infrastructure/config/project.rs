// portside-core/src/infrastructure/config/project.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::constraints::FleetConstraints;
use crate::domain::risk::RiskConfig;
use crate::infrastructure::error::InfrastructureError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub inputs: InputPaths,

    #[serde(default = "default_output_path")]
    pub output_path: String,

    #[serde(default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    /// Stamped into every table envelope.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub retry: RetryConfig,

    pub constraints: FleetConstraints,

    #[serde(default)]
    pub risk: RiskConfig,

    /// Reference date for vessel age; defaults to the run date when absent.
    /// Fixtures pin it so risk output stays deterministic under test.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InputPaths {
    #[serde(default = "default_fleet_roster")]
    pub fleet_roster: String,
    #[serde(default = "default_inspection_log")]
    pub inspection_log: String,
    #[serde(default = "default_mou_registry")]
    pub mou_registry: String,
    #[serde(default = "default_action_codes")]
    pub action_codes: String,
    #[serde(default = "default_deficiency_codes")]
    pub deficiency_codes: String,
    #[serde(default = "default_ports")]
    pub ports: String,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            fleet_roster: default_fleet_roster(),
            inspection_log: default_inspection_log(),
            mou_registry: default_mou_registry(),
            action_codes: default_action_codes(),
            deficiency_codes: default_deficiency_codes(),
            ports: default_ports(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

// --- LOADER ---

#[instrument(skip(project_dir))] // Log automatique de l'entrée/sortie de la fonction
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Découverte du fichier principal
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Chargement YAML
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Override via Variables d'Environnement (Pattern 'Layering')
    // Permet de faire: PORTSIDE_OUTPUT_PATH=/tmp/out portside run
    apply_env_overrides(&mut config);

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["portside.yaml", "portside_project.yaml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

fn apply_env_overrides(config: &mut ProjectConfig) {
    if let Ok(val) = std::env::var("PORTSIDE_OUTPUT_PATH") {
        info!(old = ?config.output_path, new = ?val, "Overriding output path via ENV");
        config.output_path = val;
    }
}

fn default_output_path() -> String {
    "output".to_string()
}
fn default_clean_targets() -> Vec<String> {
    vec!["output".to_string()]
}
fn default_schema_version() -> String {
    "1.0".to_string()
}
fn default_fleet_roster() -> String {
    "data/fleet_roster.json".to_string()
}
fn default_inspection_log() -> String {
    "data/inspection_log.json".to_string()
}
fn default_mou_registry() -> String {
    "reference/mou_registry.json".to_string()
}
fn default_action_codes() -> String {
    "reference/action_codes.json".to_string()
}
fn default_deficiency_codes() -> String {
    "reference/deficiency_codes.json".to_string()
}
fn default_ports() -> String {
    "reference/ports.json".to_string()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_delay_ms() -> u64 {
    200
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
name: fleet_demo
version: "1.0"
constraints:
  total-vessels: 3
  total-inspections: 5
  total-detentions: 1
  total-clean-inspections: 2
  total-deficiencies: 12
  vessels-by-owner:
    Aurora Shipping: 2
    Baltica Marine: 1
"#;

    #[test]
    fn test_load_minimal_config_with_defaults() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("portside.yaml"), MINIMAL)?;

        let config = load_project_config(dir.path())?;
        assert_eq!(config.name, "fleet_demo");
        assert_eq!(config.output_path, "output");
        assert_eq!(config.inputs.fleet_roster, "data/fleet_roster.json");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.constraints.total_vessels, 3);
        assert_eq!(
            config.constraints.vessels_by_owner.get("Aurora Shipping"),
            Some(&2)
        );
        assert_eq!(config.risk.weights.age, 0.4);
        assert!(config.as_of.is_none());
        Ok(())
    }

    #[test]
    fn test_missing_config_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let err = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
        Ok(())
    }
}
