//! Classify command - error types and categories of failed builds

use crate::classify::report::{self, ClassifyReport};
use crate::classify::{breakdown, classify_failures, error_counts, CategoryTable};
use crate::cli::args::{ClassifyArgs, OutputFormat};
use crate::config::Config;
use crate::error::{MatrixError, MatrixResult};
use crate::ledger::{CsvLedger, LEDGER_FILE};
use crate::ui::{self, UiContext};

/// Category table looked up in the results directory
pub const DEFAULT_CATEGORIES_FILE: &str = "categories.csv";

/// Execute the classify command
pub async fn execute(args: ClassifyArgs, config: &Config) -> MatrixResult<()> {
    if !args.results_dir.is_dir() {
        return Err(MatrixError::ResultsNotFound(args.results_dir));
    }

    let log_dir = args.logs.unwrap_or_else(|| args.results_dir.clone());
    let output_dir = args.output.unwrap_or_else(|| args.results_dir.clone());
    let table = match args.categories {
        Some(path) => CategoryTable::load(&path).await?,
        None => CategoryTable::load_or_builtin(&args.results_dir.join(DEFAULT_CATEGORIES_FILE)).await?,
    };

    let rows = CsvLedger::read_rows(&args.results_dir.join(LEDGER_FILE)).await?;
    let records = classify_failures(&rows, &log_dir, &table, &config.classify).await?;
    let breakdown = breakdown(&records);
    let written = report::write_reports(&output_dir, &records, &breakdown).await?;

    let report = ClassifyReport {
        failures: records.len(),
        breakdown,
        error_counts: error_counts(&records),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::section(&ctx, &format!("Failure categories ({} failed builds)", report.failures));
            print!("{}", report::render_breakdown(&report.breakdown));
            ui::section(&ctx, "Error types");
            print!("{}", report::render_error_counts(&report.error_counts));
            println!();
            for path in &written {
                ui::step_ok(&ctx, &format!("Wrote {}", path.display()));
            }
        }
    }

    Ok(())
}
