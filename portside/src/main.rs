// portside/src/main.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use comfy_table::{Table, presets::UTF8_FULL};

// Infrastructure (Config & Adapters)
use portside_core::PortsideError;
use portside_core::application::{AbortFlag, clean_output, run_pipeline, validate_project};
use portside_core::domain::DomainError;
use portside_core::domain::rules::ValidationReport;
use portside_core::infrastructure::{JsonFileSink, load_project_config};

#[derive(Parser)]
#[command(name = "portside")]
#[command(about = "The PSC Inspection ETL & Fleet KPI Pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 🚢 Runs the ETL pipeline (Extract -> Transform -> Validate -> Load -> KPIs)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🧪 Checks the raw data against the configured business rules (no writes)
    Validate {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🧹 Cleans generated output tables
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug portside run ... for the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        // --- USE CASE: RUN PIPELINE ---
        Commands::Run { project_dir } => {
            let start = std::time::Instant::now();

            println!("⚙️  Loading configuration...");
            let config = load_project_config(&project_dir)?;
            println!("   Project: {} (v{})", config.name, config.version);

            let sink = JsonFileSink::new(
                project_dir.join(&config.output_path).join("tables"),
            );
            let abort: AbortFlag = Arc::new(AtomicBool::new(false));

            match run_pipeline(&project_dir, &config, &sink, &abort).await {
                Ok(report) => {
                    if !report.reference_misses.is_empty() {
                        println!(
                            "   ⚠️  {} reference lookup miss(es), see run_report.json",
                            report.reference_misses.len()
                        );
                    }
                    println!("\n✨ SUCCESS! Pipeline finished in {:.2?}", start.elapsed());
                }
                Err(PortsideError::Domain(DomainError::RuleViolations { report })) => {
                    eprintln!("\n{}", render_violations(&report));
                    eprintln!("❌ FAILURE. {} business rule violation(s).", report.violations.len());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("\n💥 CRITICAL PIPELINE ERROR: {}", e);
                    std::process::exit(1);
                }
            }
        }

        // --- USE CASE: VALIDATE ONLY ---
        Commands::Validate { project_dir } => {
            let config = load_project_config(&project_dir)?;

            match validate_project(&project_dir, &config).await {
                Ok(outcome) => {
                    println!(
                        "🧪 {} checks run over {} vessels.",
                        outcome.report.checks_run,
                        outcome.vessels.len()
                    );
                    if outcome.report.is_clean() {
                        println!("✅ All business rules hold.");
                    } else {
                        eprintln!("{}", render_violations(&outcome.report));
                        eprintln!(
                            "❌ {} violation(s) found.",
                            outcome.report.violations.len()
                        );
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("💥 Validation could not complete: {}", e);
                    std::process::exit(1);
                }
            }
        }

        // --- USE CASE: CLEAN ---
        Commands::Clean { project_dir } => {
            let config = load_project_config(&project_dir)?;
            if let Err(e) = clean_output(&project_dir, &config) {
                eprintln!("❌ Clean failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn render_violations(report: &ValidationReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Rule", "Subject", "Expected", "Actual"]);
    for v in &report.violations {
        table.add_row(vec![&v.rule, &v.subject, &v.expected, &v.actual]);
    }
    table
}
