mod candidates;
mod config;
mod document;
mod export;
mod matcher;
mod normalize;
mod recognize;
mod scanner;
mod search;
mod snippet;
mod table;
mod target;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use config::Settings;
use document::WordDocument;
use export::ExportFormat;
use recognize::{Calendar, recognize_dates};
use search::{ColumnChoice, SearchRequest};
use table::HeaderRow;

#[derive(Parser)]
#[command(
    name = "docdate_extract",
    about = "Pull the rows and passages that mention a date out of Word documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a document (or a directory of them) and export the hits
    Extract(ExtractArgs),
    /// List the table columns detected in a document
    Columns {
        /// A .docx file or a directory of them
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = HeaderRow::First)]
        header: HeaderRow,
    },
    /// Print the dates recognized in some text
    Dates {
        /// Text to scan, e.g. "交期 114/10/23"
        #[arg(required = true)]
        text: Vec<String>,
        /// Take 2–3 digit years literally instead of as ROC years
        #[arg(long)]
        no_roc: bool,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// A .docx file or a directory of them
    path: PathBuf,
    /// Target date, e.g. 2025-10-23, 2025/10/23, 114/10/23, 2025年10月23日.
    /// Defaults to the previous business day.
    #[arg(long)]
    date: Option<String>,
    /// Characters kept after the date (1–1000)
    #[arg(long = "chars")]
    num_chars: Option<usize>,
    /// Table column to search; repeatable
    #[arg(long = "column")]
    columns: Vec<String>,
    /// Search every table column
    #[arg(long, conflicts_with = "columns")]
    all_columns: bool,
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,
    /// Output file, or output directory when PATH is a directory
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_enum)]
    header: Option<HeaderRow>,
    /// Skip tables and search body paragraphs only
    #[arg(long)]
    paragraphs_only: bool,
    /// Take 2–3 digit years literally instead of as ROC years
    #[arg(long)]
    no_roc: bool,
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docdate_extract=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract(args) => run_extract(&args),
        Command::Columns { path, header } => run_columns(&path, header),
        Command::Dates { text, no_roc } => {
            run_dates(&text, !no_roc);
            Ok(())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  EXTRACT MODE: search documents and write one summary per document
// ═══════════════════════════════════════════════════════════════════════

/// Settings file first, then command-line flags on top.
fn resolve_settings(args: &ExtractArgs) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(n) = args.num_chars {
        settings.num_chars = n;
    }
    if !args.columns.is_empty() {
        settings.columns = args.columns.clone();
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
    if let Some(header) = args.header {
        settings.header_row = header;
    }
    if args.paragraphs_only {
        settings.prefer_tables = false;
    }
    if args.no_roc {
        settings.roc_years = false;
    }
    settings.validate()?;
    Ok(settings)
}

fn build_request(args: &ExtractArgs, settings: &Settings) -> Result<SearchRequest> {
    let target = match &args.date {
        Some(input) => target::parse_target_date(input, settings.roc_years)
            .with_context(|| format!("cannot use `{input}` as the target date"))?,
        None => {
            let day = target::previous_business_day(Local::now().date_naive());
            info!(date = %day, "no date given, using the previous business day");
            day
        }
    };

    let columns = if args.all_columns {
        ColumnChoice::All
    } else if settings.columns.is_empty() {
        ColumnChoice::Default
    } else {
        ColumnChoice::Named(settings.columns.clone())
    };

    Ok(SearchRequest {
        target,
        needle: args.date.clone(),
        num_chars: settings.num_chars,
        columns,
        prefer_tables: settings.prefer_tables,
        header_row: settings.header_row,
        roc_years: settings.roc_years,
    })
}

/// Where the summary of `doc` goes.
fn output_path(
    args: &ExtractArgs,
    doc: &Path,
    batch: bool,
    target: &str,
    format: ExportFormat,
) -> PathBuf {
    if !batch {
        return args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(export::default_file_name(target, None, format)));
    }
    let stem = doc.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
    let dir = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    dir.join(export::default_file_name(target, Some(stem), format))
}

/// Search one document; `Ok(false)` when it has no hits and nothing was written.
fn extract_one(
    args: &ExtractArgs,
    doc: &Path,
    batch: bool,
    request: &SearchRequest,
    format: ExportFormat,
) -> Result<bool> {
    let document =
        WordDocument::open(doc).with_context(|| format!("cannot open {}", doc.display()))?;
    info!(
        path = %doc.display(),
        tables = document.tables.len(),
        paragraphs = document.paragraphs.len(),
        "document loaded"
    );

    let summary = search::run_search(&document, request);
    if summary.is_empty() {
        warn!(
            path = %doc.display(),
            date = %summary.target,
            "no matching rows or paragraphs; check that the document has tables or \
             paragraphs containing the date, or pass the exact date text with --date"
        );
        return Ok(false);
    }

    let out = output_path(args, doc, batch, &summary.target, format);
    export::write_summary(&out, &summary, format)
        .with_context(|| format!("cannot write {}", out.display()))?;
    info!(path = %out.display(), hits = summary.hits.len(), ?format, "summary written");
    Ok(true)
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let settings = resolve_settings(args)?;
    let request = build_request(args, &settings)?;

    let docs = scanner::discover_documents(&args.path);
    if docs.is_empty() {
        bail!("no .docx files found under {}", args.path.display());
    }
    let batch = args.path.is_dir();
    if !batch {
        return extract_one(args, &docs[0], false, &request, settings.format).map(|_| ());
    }

    info!(documents = docs.len(), "processing directory");
    let mut failed = 0usize;
    for doc in &docs {
        if let Err(e) = extract_one(args, doc, true, &request, settings.format) {
            error!(path = %doc.display(), "{e:#}");
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} documents could not be processed", docs.len());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  COLUMNS MODE: print detected column names per table
// ═══════════════════════════════════════════════════════════════════════

fn run_columns(path: &Path, header: HeaderRow) -> Result<()> {
    let docs = scanner::discover_documents(path);
    let batch = path.is_dir();
    for doc in &docs {
        let document =
            WordDocument::open(doc).with_context(|| format!("cannot open {}", doc.display()))?;
        if batch {
            println!("{}", doc.display());
        }
        let frames = table::frames(&document, header);
        if frames.is_empty() {
            println!("  (no tables)");
            continue;
        }
        for frame in &frames {
            let names: Vec<&str> = frame
                .columns
                .iter()
                .map(String::as_str)
                .filter(|c| !c.trim().is_empty())
                .collect();
            println!(
                "  table_{} ({} rows): {}",
                frame.table_index + 1,
                frame.rows.len(),
                names.join(", ")
            );
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  DATES MODE: show what the recognizer sees
// ═══════════════════════════════════════════════════════════════════════

fn run_dates(texts: &[String], roc_years: bool) {
    let calendar = Calendar::current(roc_years);
    for text in texts {
        let mentions = recognize_dates(text, calendar);
        if mentions.is_empty() {
            println!("{text}: (no dates)");
            continue;
        }
        for m in &mentions {
            let note = if m.year_omitted { " (year omitted)" } else { "" };
            println!("{}\t{}\t@{}{note}", m.date, m.raw, m.char_start);
        }
    }
}
