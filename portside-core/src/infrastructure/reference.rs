// portside-core/src/infrastructure/reference.rs
//
// Reference Loader: static lookup tables (MOU registry, action codes,
// deficiency codes, port/LOCODE registry) indexed by their natural code.
// A missing file never fails the load — the table is substituted empty and
// a warning is logged. Corrupt files DO fail: silence there would turn
// every downstream lookup into a bogus miss.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::model::{ActionCode, DeficiencyCode, MouRegion, PortEntry, ReferenceSet};
use crate::error::PortsideError;
use crate::infrastructure::config::InputPaths;
use crate::infrastructure::fs::read_json_file;

#[derive(Debug, Deserialize)]
struct MouRegistryDocument {
    #[allow(dead_code)]
    schema_version: String,
    total_regions: usize,
    regions: Vec<MouRegion>,
}

#[derive(Debug, Deserialize)]
struct ActionCodeDocument {
    #[allow(dead_code)]
    schema_version: String,
    total_codes: usize,
    action_codes: Vec<ActionCode>,
}

#[derive(Debug, Deserialize)]
struct DeficiencyCodeDocument {
    #[allow(dead_code)]
    schema_version: String,
    total_codes: usize,
    deficiency_codes: Vec<DeficiencyCode>,
}

#[derive(Debug, Deserialize)]
struct PortRegistryDocument {
    #[allow(dead_code)]
    schema_version: String,
    total_ports: usize,
    ports: Vec<PortEntry>,
}

pub async fn load_reference_tables(
    project_dir: &Path,
    inputs: &InputPaths,
) -> Result<ReferenceSet, PortsideError> {
    let mut refs = ReferenceSet::default();

    if let Some(doc) =
        load_optional::<MouRegistryDocument>(project_dir, &inputs.mou_registry, "MOU registry")
            .await?
    {
        check_declared("MOU registry", doc.total_regions, doc.regions.len());
        refs.mou_regions = index_by(doc.regions, |r| r.name.clone());
    }

    if let Some(doc) =
        load_optional::<ActionCodeDocument>(project_dir, &inputs.action_codes, "action codes")
            .await?
    {
        check_declared("action codes", doc.total_codes, doc.action_codes.len());
        refs.action_codes = index_by(doc.action_codes, |a| a.code.clone());
    }

    if let Some(doc) = load_optional::<DeficiencyCodeDocument>(
        project_dir,
        &inputs.deficiency_codes,
        "deficiency codes",
    )
    .await?
    {
        check_declared("deficiency codes", doc.total_codes, doc.deficiency_codes.len());
        refs.deficiency_codes = index_by(doc.deficiency_codes, |d| d.code.clone());
    }

    if let Some(doc) =
        load_optional::<PortRegistryDocument>(project_dir, &inputs.ports, "port registry").await?
    {
        check_declared("port registry", doc.total_ports, doc.ports.len());
        refs.ports = index_by(doc.ports, |p| p.locode.clone());
    }

    Ok(refs)
}

async fn load_optional<T: DeserializeOwned>(
    project_dir: &Path,
    relative: &str,
    label: &str,
) -> Result<Option<T>, PortsideError> {
    let path = project_dir.join(relative);
    if !path.exists() {
        warn!(table = label, path = ?path, "Reference file not found, substituting empty table");
        return Ok(None);
    }
    Ok(Some(read_json_file::<T>(&path).await?))
}

fn check_declared(label: &str, declared: usize, actual: usize) {
    if declared != actual {
        warn!(
            table = label,
            declared, actual, "Reference table declared count disagrees with payload"
        );
    }
}

fn index_by<T>(items: Vec<T>, key: impl Fn(&T) -> String) -> HashMap<String, T> {
    items.into_iter().map(|item| (key(&item), item)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_all_files_missing_yields_empty_tables() -> Result<()> {
        let dir = tempdir()?;
        let refs = load_reference_tables(dir.path(), &InputPaths::default()).await?;
        assert!(refs.mou_regions.is_empty());
        assert!(refs.action_codes.is_empty());
        assert!(refs.deficiency_codes.is_empty());
        assert!(refs.ports.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_action_codes_indexed_by_code() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("reference"))?;
        fs::write(
            dir.path().join("reference/action_codes.json"),
            r#"{
                "schema_version": "1.0",
                "total_codes": 2,
                "action_codes": [
                    {"code": "30", "description": "Grounds for detention", "priority": "High",
                     "urgency_level": "Immediate", "timeframe_hours": 0, "detention_related": true},
                    {"code": "17", "description": "Rectify before departure", "priority": "Medium",
                     "urgency_level": "Before departure", "timeframe_hours": 24, "detention_related": false}
                ]
            }"#,
        )?;

        let refs = load_reference_tables(dir.path(), &InputPaths::default()).await?;
        assert_eq!(refs.action_codes.len(), 2);
        assert!(refs.action_codes.get("30").unwrap().detention_related);
        assert!(!refs.action_codes.get("17").unwrap().detention_related);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_reference_file_fails_loudly() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("reference"))?;
        fs::write(dir.path().join("reference/ports.json"), "{ not json")?;

        let result = load_reference_tables(dir.path(), &InputPaths::default()).await;
        assert!(result.is_err());
        Ok(())
    }
}
