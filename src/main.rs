//! Daybook main entry point

use clap::{Parser, Subcommand};
use daybook_config::{Config, ConfigError};
use daybook_core::{
    CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, InsertMode, Ledger, LedgerStore,
    SqliteStore, StatementResponse,
};
use daybook_parser::{CsvOptions, CsvRecordSource, RawRecord, RecordSource};
use daybook_utils::format_amount;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "daybook")]
#[command(author = "Daybook Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Deduplicating transaction ingest and daily budget statements", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delete the database and recreate an empty schema
    Init,
    /// Import a CSV file of date,description,debit,credit rows
    Import {
        file: PathBuf,
        /// Store new rows and skip already stored ones instead of rejecting the file
        #[arg(long)]
        skip_duplicates: bool,
    },
    /// Show the rows of a CSV file without storing them
    Preview { file: PathBuf },
    /// Print the daily statement
    Statement {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one stored transaction
    Show { id: String },
    /// List imported files
    History,
    /// Print the default configuration file
    DefaultConfig,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Import { .. } => "import",
            Command::Preview { .. } => "preview",
            Command::Statement { .. } => "statement",
            Command::Show { .. } => "show",
            Command::History => "history",
            Command::DefaultConfig => "default-config",
        }
    }
}

/// Read a file's rows with the configured CSV options, without a store
async fn preview_records(config: &Config, path: &std::path::Path) -> CoreResult<Vec<RawRecord>> {
    let source = CsvRecordSource::new(CsvOptions {
        delimiter: config.ingest.delimiter_byte(),
        has_headers: config.ingest.has_headers,
    });
    Ok(source.read_records(path).await?)
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => {
            init_logging(&config.logging.level);
            log::debug!("Config loaded from {}", args.config.display());
            config
        }
        Err(ConfigError::FileNotFound { path }) => {
            let config = Config::default();
            init_logging(&config.logging.level);
            log::warn!("Config file {} not found, using defaults", path);
            config
        }
        Err(e) => {
            init_logging("info");
            for suggestion in e.suggestions() {
                log::error!("{}", suggestion);
            }
            return Err(e.into());
        }
    };

    let rt = Runtime::new()?;
    let operation = args.command.name();
    if let Err(error) = rt.block_on(run(args.command, config)) {
        let context = ErrorContext::new(operation)
            .with_data("config", serde_json::json!(args.config.to_string_lossy()));
        DefaultErrorLogger.log_error(&error, &context);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command, config: Config) -> CoreResult<()> {
    let db_path = config.database_path();

    match command {
        Command::Init => {
            SqliteStore::rebuild(&db_path)?.close()?;
            println!("Rebuilt empty database at {}", db_path.display());
        }
        Command::DefaultConfig => {
            print!("{}", Config::generate_default());
        }
        Command::Import { file, skip_duplicates } => {
            let ledger = Ledger::from_config(config, SqliteStore::open(&db_path)?);
            let mode = if skip_duplicates {
                InsertMode::SkipDuplicates
            } else {
                ledger.default_insert_mode()
            };
            let report = ledger.import_file(&file, mode).await?;
            println!(
                "{}: {} rows read, {} inserted, {} skipped",
                report.filename, report.rows, report.inserted, report.skipped
            );
            ledger.close()?;
        }
        Command::Preview { file } => {
            let rows = preview_records(&config, &file).await?;
            println!("{:<6} {:<12} {:<32} {:>12} {:>12}", "ROW", "DATE", "DESCRIPTION", "DEBIT", "CREDIT");
            for row in &rows {
                println!(
                    "{:<6} {:<12} {:<32} {:>12} {:>12}",
                    row.row, row.date, row.description, row.debit, row.credit
                );
            }
            println!("{} rows in {}", rows.len(), file.display());
        }
        Command::Statement { json } => {
            let ledger = Ledger::from_config(config, SqliteStore::open(&db_path)?);
            let statement = ledger.statement()?;

            if json {
                let response = StatementResponse::from(&statement);
                let body = serde_json::to_string_pretty(&response).map_err(|e| {
                    daybook_core::CoreError::InvalidFormat { message: e.to_string() }
                })?;
                println!("{}", body);
            } else if statement.is_empty() {
                println!("No transactions stored.");
            } else {
                let display = &ledger.config().display;
                let fmt = |v: f64| format_amount(v, display.decimal_places, &display.thousands_separator);

                println!("{:<12} {:>14} {:>14} {:>14}", "DATE", "INCOME", "EXPENSE", "BALANCE");
                for bucket in &statement.buckets {
                    println!(
                        "{:<12} {:>14} {:>14} {:>14}",
                        bucket.date.to_string(),
                        fmt(bucket.income),
                        fmt(bucket.expense),
                        fmt(bucket.balance)
                    );
                }
                println!();
                println!("Total income:   {}", fmt(statement.total_income()));
                println!("Total expenses: {}", fmt(statement.total_expense()));
                println!("Net income:     {}", fmt(statement.net()));
            }
            ledger.close()?;
        }
        Command::Show { id } => {
            let ledger = Ledger::from_config(config, SqliteStore::open(&db_path)?);
            let tx = ledger.transaction(&id)?;
            let display = &ledger.config().display;
            let fmt = |v: f64| format_amount(v, display.decimal_places, &display.thousands_separator);

            println!("ID:          {}", tx.id);
            println!("Date:        {}", tx.date);
            println!("Description: {}", tx.description);
            println!("Debit:       {}", fmt(tx.debit));
            println!("Credit:      {}", fmt(tx.credit));
            ledger.close()?;
        }
        Command::History => {
            let store = SqliteStore::open(&db_path)?;
            let history = store.upload_history()?;
            if history.is_empty() {
                println!("No files imported.");
            }
            for upload in &history {
                println!(
                    "{}  {:<32} {:>6} rows {:>10} bytes",
                    upload.uploaded_at, upload.filename, upload.num_rows, upload.file_size
                );
            }
            store.close()?;
        }
    }

    Ok(())
}
