// portside-core/src/application/pipeline.rs
//
// Pipeline Orchestrator: extract -> transform -> validate -> load -> aggregate,
// one sequential pass over an explicit run trace (no shared mutable instance
// state). Each stage runs under retry-with-fixed-delay, honored only for
// retryable I/O failures. Any fatal error rolls back every table written in
// this run; a structured report is written regardless of outcome.

use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::aggregate::{KpiBundle, aggregate};
use crate::application::extract::{extract_fleet, extract_inspections};
use crate::application::transform::{
    TransformedInspections, doc_company_masters, owner_masters, transform_inspections,
    transform_vessels,
};
use crate::domain::error::DomainError;
use crate::domain::model::{ReferenceMiss, Vessel};
use crate::domain::rules::{self, ValidationReport, Violation};
use crate::error::PortsideError;
use crate::infrastructure::config::{ProjectConfig, RetryConfig};
use crate::infrastructure::fs::write_json_pretty;
use crate::infrastructure::reference::load_reference_tables;
use crate::infrastructure::sink::report_path;
use crate::ports::sink::{TableEnvelope, TableSink};

/// External cancellation signal, checked between stages (never mid-stage).
pub type AbortFlag = Arc<AtomicBool>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub success: bool,
    /// Last stage entered: "complete" on success, the failing stage otherwise.
    pub stage: String,
    pub tables_written: Vec<String>,
    pub violations: Vec<Violation>,
    pub reference_misses: Vec<ReferenceMiss>,
    pub error: Option<String>,
    pub finished_at: String,
}

#[derive(Default)]
struct RunTrace {
    stage: String,
    written: Vec<String>,
    misses: Vec<ReferenceMiss>,
    violations: Vec<Violation>,
}

impl RunTrace {
    fn enter(&mut self, stage: &str, abort: &AbortFlag) -> Result<(), PortsideError> {
        if abort.load(Ordering::Relaxed) {
            return Err(PortsideError::Aborted(stage.to_string()));
        }
        stage.clone_into(&mut self.stage);
        Ok(())
    }
}

pub async fn run_pipeline(
    project_dir: &Path,
    config: &ProjectConfig,
    sink: &dyn TableSink,
    abort: &AbortFlag,
) -> Result<RunReport, PortsideError> {
    println!("🚢 Starting PSC ETL pipeline for '{}'...", config.name);
    let start_time = std::time::Instant::now();

    let output_dir = project_dir.join(&config.output_path);
    if !output_dir.exists() {
        fs::create_dir_all(&output_dir)?;
    }

    let mut trace = RunTrace::default();
    let result = execute(project_dir, config, sink, abort, &mut trace).await;

    let report = match &result {
        Ok(()) => {
            println!(
                "✨ Done in {:.2}s. {} tables written.",
                start_time.elapsed().as_secs_f64(),
                trace.written.len()
            );
            RunReport {
                success: true,
                stage: "complete".into(),
                tables_written: trace.written.clone(),
                violations: vec![],
                reference_misses: trace.misses.clone(),
                error: None,
                finished_at: chrono::Utc::now().to_rfc3339(),
            }
        }
        Err(e) => {
            eprintln!("❌ Pipeline failed at stage '{}': {}", trace.stage, e);
            // All-or-nothing commit: anything already written this run goes.
            rollback(sink, &trace.written).await;
            RunReport {
                success: false,
                stage: trace.stage.clone(),
                tables_written: vec![],
                violations: trace.violations.clone(),
                reference_misses: trace.misses.clone(),
                error: Some(e.to_string()),
                finished_at: chrono::Utc::now().to_rfc3339(),
            }
        }
    };

    // The report survives rollback on purpose: it is the failure record.
    if let Err(e) = write_json_pretty(&report_path(&output_dir), &report) {
        warn!(error = %e, "Could not persist run report");
    }

    result.map(|()| report)
}

async fn execute(
    project_dir: &Path,
    config: &ProjectConfig,
    sink: &dyn TableSink,
    abort: &AbortFlag,
    trace: &mut RunTrace,
) -> Result<(), PortsideError> {
    let retry = &config.retry;

    // 1. REFERENCE TABLES
    trace.enter("reference", abort)?;
    let refs =
        with_retry("reference", retry, || load_reference_tables(project_dir, &config.inputs))
            .await?;

    // 2. EXTRACT (the two raw reads are independent, issue them concurrently)
    trace.enter("extract", abort)?;
    let fleet_path = project_dir.join(&config.inputs.fleet_roster);
    let log_path = project_dir.join(&config.inputs.inspection_log);
    let (fleet, log) = with_retry("extract", retry, || async {
        futures::try_join!(
            extract_fleet(&fleet_path, config.constraints.total_vessels),
            extract_inspections(&log_path, config.constraints.total_inspections),
        )
    })
    .await?;
    println!(
        "📥 Extracted {} vessels, {} inspections",
        fleet.vessels.len(),
        log.inspections.len()
    );

    // 3. TRANSFORM
    trace.enter("transform", abort)?;
    let vessels = transform_vessels(&fleet)?;
    let TransformedInspections {
        inspections,
        deficiencies,
        misses,
    } = transform_inspections(&log, &refs)?;
    trace.misses = misses;
    println!(
        "🔧 Transformed {} deficiency rows ({} reference misses)",
        deficiencies.len(),
        trace.misses.len()
    );

    // 4. VALIDATE (exhaustive, fatal on any violation)
    trace.enter("validate", abort)?;
    let report = rules::validate(&vessels, &inspections, &deficiencies, &config.constraints);
    println!(
        "🧪 Business rules: {} checks run, {} violation(s)",
        report.checks_run,
        report.violations.len()
    );
    if !report.is_clean() {
        trace.violations = report.violations.clone();
        return Err(DomainError::RuleViolations { report }.into());
    }

    // 5. LOAD (masters + facts, one logical transaction with the KPIs below)
    trace.enter("load", abort)?;
    let owners = owner_masters(&vessels);
    let doc_companies = doc_company_masters(&vessels);
    write_table(sink, retry, trace, table(config, "vessel_master", &vessels)?).await?;
    write_table(sink, retry, trace, table(config, "owner_master", &owners)?).await?;
    write_table(sink, retry, trace, table(config, "doc_company_master", &doc_companies)?)
        .await?;
    write_table(sink, retry, trace, table(config, "inspection_fact", &inspections)?)
        .await?;
    write_table(sink, retry, trace, table(config, "deficiency_fact", &deficiencies)?)
        .await?;

    // 6. AGGREGATE (KPIs derive from the loaded masters + facts)
    trace.enter("aggregate", abort)?;
    let as_of = config.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let kpi = aggregate(&vessels, &inspections, &config.risk, as_of);
    write_kpis(sink, config, retry, trace, &kpi).await?;

    Ok(())
}

fn table<T: Serialize>(
    config: &ProjectConfig,
    name: &str,
    records: &[T],
) -> Result<TableEnvelope, PortsideError> {
    TableEnvelope::new(name, records, &config.schema_version, &config.constraints)
}

async fn write_kpis(
    sink: &dyn TableSink,
    config: &ProjectConfig,
    retry: &RetryConfig,
    trace: &mut RunTrace,
    kpi: &KpiBundle,
) -> Result<(), PortsideError> {
    let fleet = TableEnvelope::single(
        "kpi_fleet_overview",
        &kpi.fleet_overview,
        &config.schema_version,
        &config.constraints,
    )?;
    write_table(sink, retry, trace, fleet).await?;
    let psc = TableEnvelope::single(
        "kpi_psc_performance",
        &kpi.psc_performance,
        &config.schema_version,
        &config.constraints,
    )?;
    write_table(sink, retry, trace, psc).await?;

    write_table(sink, retry, trace, table(config, "kpi_vessel_performance", &kpi.vessel_performance)?).await?;
    write_table(sink, retry, trace, table(config, "kpi_owner_performance", &kpi.owner_performance)?).await?;
    write_table(sink, retry, trace, table(config, "kpi_doc_company_performance", &kpi.doc_company_performance)?).await?;
    write_table(sink, retry, trace, table(config, "kpi_mou_performance", &kpi.mou_performance)?).await?;
    write_table(sink, retry, trace, table(config, "kpi_monthly_trends", &kpi.monthly_trends)?).await?;
    write_table(sink, retry, trace, table(config, "kpi_risk_indicators", &kpi.risk_indicators)?).await?;
    Ok(())
}

async fn write_table(
    sink: &dyn TableSink,
    retry: &RetryConfig,
    trace: &mut RunTrace,
    envelope: TableEnvelope,
) -> Result<(), PortsideError> {
    let result = with_retry("load", retry, || sink.write_table(&envelope)).await?;
    println!("   📦 {} ({} records)", result.table, result.records);
    trace.written.push(result.table);
    Ok(())
}

async fn with_retry<T, F, Fut>(
    stage: &str,
    retry: &RetryConfig,
    op: F,
) -> Result<T, PortsideError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, PortsideError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < retry.max_attempts => {
                warn!(stage, attempt, error = %e, "Retryable failure, backing off");
                tokio::time::sleep(Duration::from_millis(retry.delay_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn rollback(sink: &dyn TableSink, written: &[String]) {
    if written.is_empty() {
        return;
    }
    eprintln!("↩️  Rolling back {} written table(s)...", written.len());
    for table in written.iter().rev() {
        if let Err(e) = sink.remove_table(table).await {
            warn!(table, error = %e, "Rollback could not remove table");
        }
    }
}

// --- VALIDATE-ONLY USE CASE ---

pub struct CheckOutcome {
    pub report: ValidationReport,
    pub reference_misses: Vec<ReferenceMiss>,
    pub vessels: Vec<Vessel>,
}

/// Extract, transform and validate without writing any table. Used by the
/// CLI `validate` command.
pub async fn validate_project(
    project_dir: &Path,
    config: &ProjectConfig,
) -> Result<CheckOutcome, PortsideError> {
    let refs = load_reference_tables(project_dir, &config.inputs).await?;
    let fleet_roster_path = project_dir.join(&config.inputs.fleet_roster);
    let inspection_log_path = project_dir.join(&config.inputs.inspection_log);
    let (fleet, log) = futures::try_join!(
        extract_fleet(
            &fleet_roster_path,
            config.constraints.total_vessels
        ),
        extract_inspections(
            &inspection_log_path,
            config.constraints.total_inspections
        ),
    )?;

    let vessels = transform_vessels(&fleet)?;
    let transformed = transform_inspections(&log, &refs)?;
    let report = rules::validate(
        &vessels,
        &transformed.inspections,
        &transformed.deficiencies,
        &config.constraints,
    );
    Ok(CheckOutcome {
        report,
        reference_misses: transformed.misses,
        vessels,
    })
}
