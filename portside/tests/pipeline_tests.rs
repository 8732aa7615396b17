use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Abstraction for managing the Portside test environment.
struct PipelineTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl PipelineTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fleet_demo");

        let dest = tmp.path().join("fleet_demo");
        Self::copy_dir(&fixture, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &PathBuf, dst: &PathBuf) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn portside(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("portside"));
        cmd.current_dir(&self.root);
        cmd
    }

    fn read_table(&self, name: &str) -> Result<serde_json::Value> {
        let path = self.root.join(format!("output/tables/{name}.json"));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("table {name} not found at {path:?}"))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn read_run_report(&self) -> Result<serde_json::Value> {
        let content = std::fs::read_to_string(self.root.join("output/run_report.json"))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn edit_json(&self, rel: &str, edit: impl FnOnce(&mut serde_json::Value)) -> Result<()> {
        let path = self.root.join(rel);
        let mut doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        edit(&mut doc);
        std::fs::write(&path, serde_json::to_string_pretty(&doc)?)?;
        Ok(())
    }

    fn table_files(&self) -> Vec<String> {
        let tables_dir = self.root.join("output/tables");
        if !tables_dir.exists() {
            return vec![];
        }
        walkdir::WalkDir::new(&tables_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }
}

#[test]
fn test_pipeline_end_to_end_kpis() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    env.portside().arg("run").assert().success();

    let overview = env.read_table("kpi_fleet_overview")?;
    assert_eq!(overview["data"]["totalVessels"], 3);
    assert_eq!(overview["data"]["byOwner"]["Aurora Shipping"], 2);
    assert_eq!(overview["data"]["byType"]["Bulk"], 1);

    let psc = env.read_table("kpi_psc_performance")?;
    assert_eq!(psc["data"]["totalInspections"], 5);
    assert_eq!(psc["data"]["totalDeficiencies"], 12);
    assert_eq!(psc["data"]["detentionRate"], 20.0);
    assert_eq!(psc["data"]["cleanRate"], 40.0);
    assert_eq!(psc["data"]["avgDeficienciesPerInspection"], 2.4);

    // Envelope metadata carries the constraints snapshot
    assert_eq!(psc["metadata"]["schemaVersion"], "1.0");
    assert_eq!(psc["metadata"]["constraintsSnapshot"]["total-vessels"], 3);

    // Sum of per-inspection counts equals the deficiency table length
    let facts = env.read_table("inspection_fact")?;
    let sum: u64 = facts["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["deficiencyCount"].as_u64().unwrap())
        .sum();
    let deficiencies = env.read_table("deficiency_fact")?;
    assert_eq!(sum as usize, deficiencies["data"].as_array().unwrap().len());

    // The detained vessel tops the risk ranking
    let risks = env.read_table("kpi_risk_indicators")?;
    assert_eq!(risks["data"][0]["vesselId"], "V-003");

    // All 13 tables plus the run report
    assert_eq!(env.table_files().len(), 13);
    let report = env.read_run_report()?;
    assert_eq!(report["success"], true);
    assert_eq!(report["stage"], "complete");
    assert!(report["referenceMisses"].as_array().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_outputs_idempotent_except_timestamps() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    env.portside().arg("run").assert().success();
    let mut first = std::collections::BTreeMap::new();
    for name in env.table_files() {
        let table = name.trim_end_matches(".json").to_string();
        first.insert(table.clone(), env.read_table(&table)?);
    }

    env.portside().arg("run").assert().success();
    for (table, before) in &first {
        let after = env.read_table(table)?;
        assert_eq!(
            before["data"], after["data"],
            "table {table} data drifted between identical runs"
        );
        assert_eq!(
            before["metadata"]["recordCount"],
            after["metadata"]["recordCount"]
        );
    }
    Ok(())
}

#[test]
fn test_mutated_doc_company_fails_with_exact_discrepancies() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    env.edit_json("data/fleet_roster.json", |doc| {
        doc["vessels"][2]["doc_company"] = "Meridian Ship Management".into();
    })?;

    env.portside()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicates::str::contains("vessel.byDocCompany"));

    // Nothing committed, but the failure report is always written.
    assert!(env.table_files().is_empty());
    let report = env.read_run_report()?;
    assert_eq!(report["success"], false);
    assert_eq!(report["stage"], "validate");
    let violations = report["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 2);
    assert!(
        violations
            .iter()
            .all(|v| v["rule"] == "vessel.byDocCompany")
    );
    Ok(())
}

#[test]
fn test_detention_without_detention_action_code_is_rejected() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    // Strip the detention-related action codes off the detained inspection.
    env.edit_json("data/inspection_log.json", |doc| {
        for def in doc["inspections"][3]["deficiencies"]
            .as_array_mut()
            .unwrap()
        {
            if def["action_code"] == "30" {
                def["action_code"] = "17".into();
            }
        }
    })?;

    env.portside()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicates::str::contains("inspection.detentionAction"));

    assert!(env.table_files().is_empty());
    Ok(())
}

#[test]
fn test_unknown_deficiency_code_is_tolerated() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    env.edit_json("data/inspection_log.json", |doc| {
        doc["inspections"][0]["deficiencies"][0]["code"] = "9999".into();
    })?;

    env.portside().arg("run").assert().success();

    let deficiencies = env.read_table("deficiency_fact")?;
    let row = deficiencies["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["code"] == "9999")
        .context("expected the unknown-code row in the fact table")?;
    assert_eq!(row["priority"], "Unknown");

    let report = env.read_run_report()?;
    let misses = report["referenceMisses"].as_array().unwrap();
    assert_eq!(misses.len(), 1);
    assert_eq!(misses[0]["table"], "deficiency_codes");
    assert_eq!(misses[0]["key"], "9999");
    Ok(())
}

#[test]
fn test_missing_reference_file_substitutes_empty_table() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    std::fs::remove_file(env.root.join("reference/ports.json"))?;
    env.portside().arg("run").assert().success();

    // With no port registry the locode passes through unvalidated.
    let facts = env.read_table("inspection_fact")?;
    assert_eq!(facts["data"][0]["portLocode"], "KRPUS");
    Ok(())
}

#[test]
fn test_extraction_constraint_mismatch_is_fatal() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    let config_path = env.root.join("portside.yaml");
    let content = std::fs::read_to_string(&config_path)?;
    std::fs::write(
        &config_path,
        content.replace("total-vessels: 3", "total-vessels: 14"),
    )?;

    env.portside()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Extraction constraint failed"));

    assert!(env.table_files().is_empty());
    let report = env.read_run_report()?;
    assert_eq!(report["stage"], "extract");
    Ok(())
}

#[test]
fn test_validate_command_reports_without_writing() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    env.portside()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicates::str::contains("All business rules hold"));

    assert!(!env.root.join("output").exists());
    Ok(())
}

#[test]
fn test_clean_removes_generated_output() -> Result<()> {
    let env = PipelineTestEnv::new()?;

    env.portside().arg("run").assert().success();
    assert!(env.root.join("output").exists());

    env.portside().arg("clean").assert().success();
    assert!(!env.root.join("output").exists());
    Ok(())
}
