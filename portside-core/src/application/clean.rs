// portside-core/src/application/clean.rs

use crate::error::PortsideError;
use crate::infrastructure::config::ProjectConfig;
use std::fs;
use std::path::Path;

pub fn clean_output(project_dir: &Path, config: &ProjectConfig) -> Result<(), PortsideError> {
    tracing::info!("🧹 Removing generated output artifacts...");

    let targets = if config.clean_targets.is_empty() {
        vec![config.output_path.clone()]
    } else {
        config.clean_targets.clone()
    };

    for target_rel_path in targets {
        let target = Path::new(&target_rel_path);

        // Zero-Trust Path Traversal Guard: `starts_with` alone would wave
        // `..` components through because joined paths are not normalized.
        let escapes = target.is_absolute()
            || target
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes {
            return Err(PortsideError::UnsafePath(target_rel_path));
        }

        let full_path = project_dir.join(target);

        if full_path.exists() {
            if full_path.is_dir() {
                fs::remove_dir_all(&full_path)?;
            } else {
                fs::remove_file(&full_path)?;
            }
            println!("   🗑️  Artifact removed: {}", target_rel_path);
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::constraints::FleetConstraints;
    use anyhow::Result;
    use tempfile::tempdir;

    fn config_with_targets(targets: Vec<String>) -> ProjectConfig {
        ProjectConfig {
            name: "test".into(),
            version: "1.0".into(),
            inputs: Default::default(),
            output_path: "output".into(),
            clean_targets: targets,
            schema_version: "1.0".into(),
            retry: Default::default(),
            constraints: FleetConstraints::default(),
            risk: Default::default(),
            as_of: None,
        }
    }

    #[test]
    fn test_clean_removes_output_dir() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("output");
        fs::create_dir_all(out.join("tables"))?;
        fs::write(out.join("tables/vessel_master.json"), "{}")?;

        clean_output(dir.path(), &config_with_targets(vec!["output".into()]))?;
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn test_clean_rejects_path_traversal() -> Result<()> {
        let dir = tempdir()?;
        let config = config_with_targets(vec!["../elsewhere".into()]);
        let err = clean_output(dir.path(), &config).unwrap_err();
        assert!(matches!(err, PortsideError::UnsafePath(_)));
        Ok(())
    }
}
