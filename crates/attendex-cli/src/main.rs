use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use attendex_core::DocumentStore;
use attendex_core::config_file::{self, ConfigFile};
use attendex_parsing::{AttendanceExtractor, ParsingConfigBuilder};
use attendex_pdf_mupdf::MupdfBackend;
use attendex_reporting::ExportFormat;
use attendex_store::SqliteStore;

mod output;

use output::ColorMode;

/// Attendance report extractor - turn per-student attendance PDFs into tables
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the attendance table from a report and sync it to the store
    Extract {
        /// Path to the attendance report PDF
        file_path: PathBuf,

        /// Where to write the table (default: <pdf name>.<format> in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv or json
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Path to the SQLite attendance store (overrides ATTENDEX_STORE_PATH and config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Write the table only; do not touch the store
        #[arg(long)]
        no_sync: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the students and subjects found in a report without writing anything
    DryRun {
        /// Path to the attendance report PDF
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the stored attendance document for a registration id
    Show {
        /// Registration id, e.g. RA2111003010001
        registration_id: String,

        /// Path to the SQLite attendance store
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config_file::load_config();

    match cli.command {
        Command::Extract {
            file_path,
            output,
            format,
            store,
            no_sync,
            no_color,
        } => {
            let store = if no_sync {
                None
            } else {
                resolve_store_path(store, &config)
            };
            extract(&config, &file_path, output, format, store, no_color)
        }
        Command::DryRun {
            file_path,
            no_color,
        } => dry_run(&config, &file_path, no_color),
        Command::Show {
            registration_id,
            store,
        } => {
            let path = resolve_store_path(store, &config).ok_or_else(|| {
                anyhow::anyhow!("No store configured. Pass --store or set ATTENDEX_STORE_PATH")
            })?;
            show(&path, &registration_id)
        }
    }
}

/// Resolve the store path: CLI flag > env var > config file.
fn resolve_store_path(flag: Option<PathBuf>, config: &ConfigFile) -> Option<PathBuf> {
    flag.or_else(|| std::env::var("ATTENDEX_STORE_PATH").ok().map(PathBuf::from))
        .or_else(|| config.store_path())
}

fn build_extractor(config: &ConfigFile) -> anyhow::Result<AttendanceExtractor> {
    let builder = match &config.parsing {
        Some(section) => ParsingConfigBuilder::from_config_file(section),
        None => ParsingConfigBuilder::new(),
    };
    let parsing = builder
        .build()
        .context("Invalid [parsing] section in configuration")?;
    Ok(AttendanceExtractor::with_config(parsing))
}

fn display_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string())
}

fn extract(
    config: &ConfigFile,
    file_path: &Path,
    output: Option<PathBuf>,
    format: ExportFormat,
    store_path: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let color = ColorMode(!no_color);
    let mut writer = std::io::stdout();

    // Open the store before doing any work so a bad path fails fast.
    let store = store_path
        .as_deref()
        .map(SqliteStore::open)
        .transpose()
        .context("Failed to open attendance store")?;

    let extractor = build_extractor(config)?;
    let backend = MupdfBackend::new().skip_blank_pages(true);
    let table = extractor
        .extract_via_backend(file_path, &backend)
        .with_context(|| format!("Failed to extract attendance from {}", file_path.display()))?;

    output::print_extraction_summary(&mut writer, &display_name(file_path), &table, color)?;

    let output_path = output.unwrap_or_else(|| {
        let stem = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "attendance".to_string());
        PathBuf::from(format!("{}.{}", stem, format.extension()))
    });
    attendex_reporting::write_table(&table, format, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    writeln!(writer, "Wrote {}", output_path.display())?;

    if let Some(store) = store {
        let report = attendex_store::sync_table(&store, &table);
        output::print_sync_summary(&mut writer, &report, color)?;
    }

    Ok(())
}

fn dry_run(config: &ConfigFile, file_path: &Path, no_color: bool) -> anyhow::Result<()> {
    use attendex_core::PdfBackend;
    use owo_colors::OwoColorize;

    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let color = ColorMode(!no_color);
    let mut writer = std::io::stdout();

    let text = MupdfBackend::new().extract_text(file_path)?;
    let records = build_extractor(config)?.extract_records(&text)?;

    let name = display_name(file_path);
    if color.enabled() {
        writeln!(
            writer,
            "{} {} ({} students segmented)\n",
            "DRY RUN:".bold().cyan(),
            name.bold(),
            records.len()
        )?;
    } else {
        writeln!(
            writer,
            "DRY RUN: {} ({} students segmented)\n",
            name,
            records.len()
        )?;
    }

    for record in &records {
        output::print_student(&mut writer, record, color)?;
        writeln!(writer)?;
    }

    writeln!(writer, "Total: {} students", records.len())?;
    Ok(())
}

fn show(store_path: &Path, registration_id: &str) -> anyhow::Result<()> {
    let store = SqliteStore::open(store_path)?;
    let doc = store
        .get(registration_id)?
        .ok_or_else(|| anyhow::anyhow!("No document stored for {}", registration_id))?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
