use std::io::{self, BufRead, Write};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetload_core::config::CoreConfig;
use sheetload_core::fetch::HttpFetcher;
use sheetload_core::{Decision, LoadPolicy, ReportService, RunOutcome, Settings};
use sheetload_store::WorkbookFile;

/// Main entry point for a SheetLoad run
///
/// Reads run settings from the workbook's settings table, fetches the report, and loads it into
/// every target table. Confirmation prompts from the server are answered on stdin.
///
/// # Environment Variables
/// - `SHEETLOAD_WORKBOOK`: workbook file (default: "workbook.json")
/// - `SHEETLOAD_SETTINGS_TABLE`: settings table name (default: "Developer Settings")
/// - `SHEETLOAD_USER_EMAIL`: identity sent with the request and recorded in history
/// - `SHEETLOAD_HTTP_TIMEOUT_SECS`: request timeout in seconds (default: 120)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sheetload=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = CoreConfig::from_env_values(
        std::env::var("SHEETLOAD_WORKBOOK").ok(),
        std::env::var("SHEETLOAD_SETTINGS_TABLE").ok(),
        std::env::var("SHEETLOAD_USER_EMAIL").ok(),
        std::env::var("SHEETLOAD_HTTP_TIMEOUT_SECS").ok(),
    )?;

    let mut book = WorkbookFile::open(config.workbook_path())?;
    tracing::info!(path = %book.path().display(), "workbook opened");

    let settings = Settings::from_store(
        &book,
        config.settings_table(),
        config.user_email(),
        |param, table| {
            ask_yes_no(&format!(
                "Param '{param}' matches tab '{table}'.\nUse its sheet data as param?"
            ))
        },
    )?;
    settings.validate()?;

    let service = ReportService::new(HttpFetcher::new(config.http_timeout())?);
    let outcome = service.run(&mut book, &settings, new_run_id, |message| {
        if ask_yes_no(message) {
            Decision::Proceed
        } else {
            Decision::Cancel
        }
    });

    // History rows may have been written even when the run stops early.
    book.save()?;

    match outcome? {
        RunOutcome::Cancelled { message } => {
            tracing::warn!(%message, "run cancelled at confirmation");
            println!("Cancelled.");
        }
        RunOutcome::Loaded(report) => {
            tracing::info!(
                run_id = %report.run_id,
                tables = report.loads.len(),
                "report loaded"
            );
            let action = match report.policy {
                LoadPolicy::Append => "appended to",
                LoadPolicy::Overwrite => "overwritten in",
            };
            for load in &report.loads {
                println!(
                    "Data fetched and {} {} tab ({} row(s)).",
                    action, load.table, load.rows_written
                );
            }
            if report.note_attached {
                println!("Refer the Note of cell A1 for execution summary.");
            }
        }
    }

    Ok(())
}

/// Eight lowercase alphanumeric characters identifying one fetch attempt.
fn new_run_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_owned()
}

fn ask_yes_no(prompt: &str) -> bool {
    print!("{prompt}\n[y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "ok")
}
