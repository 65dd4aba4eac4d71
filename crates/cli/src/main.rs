use clap::{Parser, Subcommand};
use sheetload_core::constants::DEFAULT_WORKBOOK_PATH;
use sheetload_core::csv::parse_csv;
use sheetload_core::loader::populate_table;
use sheetload_core::settings::parse_target_tables;
use sheetload_core::{decode_sections, LoadPolicy, Table, TableName, TableStore};
use sheetload_store::WorkbookFile;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetload")]
#[command(about = "Inspect report payloads and workbook tables")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sections of a saved report payload
    Decode {
        /// Payload file as returned by the report server
        payload: PathBuf,
    },
    /// Load a saved report payload into workbook tables
    Load {
        /// Payload file as returned by the report server
        payload: PathBuf,
        /// Target tables (comma-separated)
        #[arg(long)]
        tables: String,
        /// Data load mode: append or overwrite
        #[arg(long, default_value = "overwrite")]
        mode: String,
        /// Workbook file
        #[arg(long, default_value = DEFAULT_WORKBOOK_PATH)]
        workbook: PathBuf,
    },
    /// List workbook tables
    Tables {
        /// Workbook file
        #[arg(long, default_value = DEFAULT_WORKBOOK_PATH)]
        workbook: PathBuf,
    },
    /// Print a table and its anchor note
    Show {
        /// Table name
        table: String,
        /// Workbook file
        #[arg(long, default_value = DEFAULT_WORKBOOK_PATH)]
        workbook: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Decode { payload }) => {
            let raw = std::fs::read_to_string(&payload)?;
            let sections = decode_sections(&raw);

            if let Some(message) = &sections.confirmation_message {
                println!("Confirmation: {}", message);
            }
            if let Some(block) = &sections.history_block {
                println!("History: {}", block);
            }
            if let Some(note) = &sections.note {
                println!("Note: {}", note);
            }

            let rows = parse_csv(&sections.report_body);
            println!("Report: {} row(s)", rows.len());
            for row in rows {
                println!("  {:?}", row);
            }
        }
        Some(Commands::Load {
            payload,
            tables,
            mode,
            workbook,
        }) => {
            let policy: LoadPolicy = mode.parse()?;
            let targets = parse_target_tables(&tables);
            if targets.is_empty() {
                eprintln!("Error: no target tables given");
                return Ok(());
            }

            let raw = std::fs::read_to_string(&payload)?;
            let sections = decode_sections(&raw);
            if sections.confirmation_message.is_some() {
                eprintln!("Payload asks for confirmation; it carries no report to load.");
                return Ok(());
            }

            let rows = parse_csv(&sections.report_body);
            let mut book = WorkbookFile::open(&workbook)?;
            for name in &targets {
                let table = book.table_or_create(name)?;
                match populate_table(table, rows.clone(), policy, sections.note.as_deref()) {
                    Ok(written) => println!("Wrote {} row(s) to {} ({})", written, name, policy),
                    Err(e) => eprintln!("Error loading {}: {}", name, e),
                }
            }
            book.save()?;
        }
        Some(Commands::Tables { workbook }) => {
            let book = WorkbookFile::open(&workbook)?;
            let names = book.table_names();
            if names.is_empty() {
                println!("No tables found.");
            } else {
                for name in names {
                    let rows = book.table(&name).map_or(0, |t| t.last_row());
                    println!("{} ({} row(s))", name, rows);
                }
            }
        }
        Some(Commands::Show { table, workbook }) => {
            let book = WorkbookFile::open(&workbook)?;
            let name = TableName::new(&table)?;
            match book.table(&name) {
                Some(sheet) => {
                    for row in sheet.values()? {
                        println!("{}", row.join(" | "));
                    }
                    if let Some(note) = sheet.anchor_note()? {
                        println!("\nA1 note:\n{}", note);
                    }
                }
                None => eprintln!("Error: table not found: {}", name),
            }
        }
        None => {
            println!("Use 'sheetload --help' for commands");
        }
    }

    Ok(())
}
