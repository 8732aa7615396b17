// portside-core/src/domain/error.rs

use crate::domain::rules::ValidationReport;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error(
        "Extraction constraint failed for '{table}': document declares {declared} records, configuration expects {expected}"
    )]
    #[diagnostic(
        code(portside::domain::extraction),
        help("The raw document disagrees with the configured fleet constraints. Refresh the constraints or investigate the upstream export.")
    )]
    ExtractionConstraint {
        table: String,
        declared: usize,
        expected: usize,
    },

    #[error("Transform failed for record '{record}': {reason}")]
    #[diagnostic(code(portside::domain::transform))]
    Transform { record: String, reason: String },

    #[error(
        "Business rule validation failed with {} violation(s)",
        .report.violations.len()
    )]
    #[diagnostic(
        code(portside::domain::rules),
        help("Every discrepancy is listed in the attached report, expected vs actual.")
    )]
    RuleViolations { report: ValidationReport },
}
