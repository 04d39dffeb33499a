mod chat;
mod consolidate;
mod error;
mod noise;
mod ocr;
mod report;
mod sanitize;
mod table;
mod valuation;

use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use loot_types::{ExtractedItem, HuntEntry, LogEntry, Notice, PriceCatalogEntry};

use error::{Error, Result};
use ocr::{OcrEngine, OcrError, SidecarText};
use valuation::{PriceCatalog, PriceLookup};

#[derive(Parser)]
#[command(
    name = "loot_extract",
    about = "Loot extraction from game chat and hunt screenshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract loot and the defeated opponent from a chat paste
    Chat {
        /// Chat text file, or "-" for stdin
        #[arg(default_value = "-")]
        file: PathBuf,
        /// Character the loot belongs to
        #[arg(long, default_value = "")]
        player: String,
        /// Log timestamp, "dd/mm/yyyy HH:MM:SS" (defaults to now)
        #[arg(long)]
        datetime: Option<String>,
        /// Opponent to use when the paste names none
        #[arg(long)]
        defeated: Option<String>,
        /// Only list loot tokens, without building a log record
        #[arg(long)]
        loot_only: bool,
    },
    /// Read hunt summary tables from OCR text files or screenshot folders
    Hunt {
        /// .txt files with OCR output, images with a .txt sidecar, or folders of images
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, default_value = "")]
        player: String,
        /// Hunt date, "dd/mm/yyyy" (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// JSON list of items already read; new images are merged into it
        #[arg(long)]
        append: Option<PathBuf>,
    },
    /// Value one loot token against a price catalog
    Value {
        catalog: PathBuf,
        defeated: String,
        /// "<qty> <item>", e.g. "3 Potions"
        #[arg(required = true)]
        token: Vec<String>,
    },
    /// Per-day and per-opponent loot values for stored logs
    Report {
        catalog: PathBuf,
        logs: PathBuf,
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },
    /// List the opponents known to a price catalog
    Defeated { catalog: PathBuf },
    /// Clean an item name the way hunt table rows are cleaned
    Sanitize {
        #[arg(required = true)]
        phrase: Vec<String>,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat {
            file,
            player,
            datetime,
            defeated,
            loot_only,
        } => run_chat(&file, &player, datetime, defeated.as_deref(), loot_only),
        Command::Hunt {
            paths,
            player,
            date,
            append,
        } => run_hunt(&paths, player, date, append.as_deref()),
        Command::Value {
            catalog,
            defeated,
            token,
        } => run_value(&catalog, &defeated, &token.join(" ")),
        Command::Report {
            catalog,
            logs,
            from,
            to,
        } => run_report(&catalog, &logs, report::DateRange { from, to }),
        Command::Defeated { catalog } => run_defeated(&catalog),
        Command::Sanitize { phrase } => run_sanitize(&phrase.join(" ")),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════
//  INPUT / OUTPUT HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn read_text(path: &Path) -> Result<String> {
    let read = if path.as_os_str() == "-" {
        io::read_to_string(io::stdin())
    } else {
        std::fs::read_to_string(path)
    };
    read.map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn load_catalog(path: &Path) -> Result<PriceCatalog> {
    let entries: Vec<PriceCatalogEntry> = read_json(path)?;
    let catalog = PriceCatalog::from_entries(entries);
    if catalog.is_empty() {
        warn!("price catalog {} is empty; every item values 0", path.display());
    }
    info!("loaded {} catalog entries from {}", catalog.len(), path.display());
    Ok(catalog)
}

fn print_json<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    ["%d/%m/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| Error::InvalidDate(raw.to_string()))
}

fn report_notice(notice: Notice) {
    match notice {
        Notice::EmptyResult => warn!("nothing found in the input"),
        Notice::DuplicatesFolded(n) => info!("{n} duplicate item row(s) consolidated"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  CHAT MODE
// ═══════════════════════════════════════════════════════════════════════

fn run_chat(
    file: &Path,
    player: &str,
    datetime: Option<String>,
    fallback_defeated: Option<&str>,
    loot_only: bool,
) -> Result<()> {
    let text = read_text(file)?;

    if loot_only {
        let loot = chat::extract_loot(&text);
        if loot.is_empty() {
            report_notice(Notice::EmptyResult);
        }
        return print_json(&loot);
    }

    let extraction = chat::extract_defeated_and_loot(&text);
    if extraction.is_empty() {
        debug!("no loot or combat line in the paste");
    }
    info!(
        tokens = extraction.loot.len(),
        defeated = extraction.defeated.as_deref().unwrap_or("-"),
        "chat extracted"
    );
    let datetime =
        datetime.unwrap_or_else(|| Local::now().format("%d/%m/%Y %H:%M:%S").to_string());

    match extraction.into_log_entry(player, &datetime, fallback_defeated) {
        Ok(entry) => {
            if entry.defeated.is_none() {
                warn!("no defeated opponent found; pass --defeated to value this loot");
            }
            print_json(&entry)
        }
        Err(notice) => {
            report_notice(notice);
            print_json(&Option::<LogEntry>::None)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  HUNT MODE
// ═══════════════════════════════════════════════════════════════════════

/// Plain .txt inputs are already OCR output; anything else is an image
/// whose text sits in a sidecar file.
struct CliEngine;

impl OcrEngine for CliEngine {
    fn recognize(&self, image: &Path) -> std::result::Result<String, OcrError> {
        let is_text = image
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if image.is_dir() {
            return Err(OcrError::Engine {
                path: image.to_path_buf(),
                message: "is a directory".to_string(),
            });
        }
        if !is_text {
            return SidecarText.recognize(image);
        }
        std::fs::read_to_string(image).map_err(|source| OcrError::MissingText {
            path: image.to_path_buf(),
            source,
        })
    }
}

fn run_hunt(
    paths: &[PathBuf],
    player: String,
    date: Option<String>,
    append: Option<&Path>,
) -> Result<()> {
    let pages: Vec<PathBuf> = paths
        .iter()
        .flat_map(|p| {
            if p.is_dir() {
                ocr::find_images(p)
            } else {
                vec![p.clone()]
            }
        })
        .collect();

    let scan = match append {
        Some(existing_path) => {
            let existing: Vec<ExtractedItem> = read_json(existing_path)?;
            ocr::append_images(&CliEngine, &pages, existing)
        }
        None => ocr::scan_images(&CliEngine, &pages, |i, n| {
            info!("reading image {i}/{n}");
        }),
    };

    if let Some(notice) = scan.notice() {
        report_notice(notice);
    }
    if scan.failed > 0 {
        warn!("{} of {} image(s) could not be read", scan.failed, pages.len());
    }

    let hunt = HuntEntry {
        id: None,
        player,
        date: date.unwrap_or_else(|| Local::now().format("%d/%m/%Y").to_string()),
        items: scan.items,
    };
    info!(total_value = hunt.total_value(), "hunt ready");
    print_json(&hunt)
}

// ═══════════════════════════════════════════════════════════════════════
//  CATALOG / REPORT MODES
// ═══════════════════════════════════════════════════════════════════════

fn run_value(catalog_path: &Path, defeated: &str, token: &str) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let (quantity, item) = valuation::split_quantity(token);
    let unit_value = catalog.unit_value(defeated, item);
    if !catalog.contains(defeated, item) {
        match catalog.lookup(defeated, item) {
            PriceLookup::Singular(v) => {
                debug!("no exact entry for {defeated:?} / {item:?}, value {v} via plural fallback");
            }
            _ => debug!("no catalog entry for {defeated:?} / {item:?}, valued at 0"),
        }
    }

    #[derive(Serialize)]
    struct Valued<'a> {
        defeated: &'a str,
        item: &'a str,
        quantity: u64,
        unit_value: f64,
        total: f64,
    }

    print_json(&Valued {
        defeated,
        item,
        quantity,
        unit_value,
        total: catalog.token_value(defeated, token),
    })
}

fn run_report(catalog_path: &Path, logs_path: &Path, range: report::DateRange) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let logs: Vec<LogEntry> = read_json(logs_path)?;
    info!("loaded {} logs from {}", logs.len(), logs_path.display());

    #[derive(Serialize)]
    struct Report {
        days: Vec<report::DayNode>,
        dashboard: report::Dashboard,
    }

    print_json(&Report {
        days: report::log_tree(&logs, &catalog),
        dashboard: report::dashboard(&logs, &catalog, range),
    })
}

fn run_defeated(catalog_path: &Path) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    print_json(&catalog.defeated_names())
}

fn run_sanitize(phrase: &str) -> Result<()> {
    let cleaned = sanitize::sanitize_item_name(phrase);
    if cleaned.is_empty() {
        report_notice(Notice::EmptyResult);
    }
    print_json(&cleaned)
}
