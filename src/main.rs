//! Media Catalog CLI
//!
//! Builds a catalog for one category over the flash, card and host roots.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use media_catalog::config::CatalogConfigBuilder;
use media_catalog::classifier::path_extension;
use media_catalog::{Catalog, CatalogConfig, Category, ScanOutcome, StorageClass};

const ABOUT: &str = r#"
Media Catalog - bounded media catalog builder

Examples:
  media_catalog scan -c audio                                   use roots from the environment
  media_catalog scan -c image --flash /flash --card /card --host /usb
  media_catalog scan -c video --cap 100 --json                  JSON output
  media_catalog scan -c audio --detach host                     drop the host volume afterwards
  media_catalog classify song.MP3 cover.jpg                     show the category of each file
"#;

/// Bounded media catalog builder
#[derive(Parser)]
#[command(name = "media_catalog")]
#[command(author, version, about = ABOUT, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the catalog for one category
    Scan {
        /// Category to collect (audio, video, ebook, image, package)
        #[arg(short = 'c', long)]
        category: Category,

        /// JSON config file; command-line flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Internal flash root
        #[arg(long)]
        flash: Option<PathBuf>,

        /// Removable card root
        #[arg(long)]
        card: Option<PathBuf>,

        /// Host-attached volume root
        #[arg(long)]
        host: Option<PathBuf>,

        /// Maximum number of entries
        #[arg(long)]
        cap: Option<usize>,

        /// Maximum recursion depth below each root
        #[arg(long)]
        max_depth: Option<usize>,

        /// Storage class to detach after the build (flash, card, host)
        #[arg(long)]
        detach: Option<StorageClass>,

        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,

        /// Emit JSON progress lines on stderr
        #[arg(long)]
        progress: bool,
    },

    /// Show the category each file name would be filed under
    Classify {
        /// File names or paths
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
struct CatalogOutput {
    category: Category,
    generated_at: DateTime<Utc>,
    truncated: bool,
    outcome: ScanOutcome,
    errors: usize,
    entries: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Scan {
            category,
            config,
            flash,
            card,
            host,
            cap,
            max_depth,
            detach,
            json,
            progress,
        }) => {
            let base = match config {
                Some(path) => match CatalogConfig::from_json_file(&path) {
                    Ok(config) => config,
                    Err(e) => {
                        error!("{}", e);
                        return ExitCode::FAILURE;
                    }
                },
                None => CatalogConfig::default(),
            };

            let mut builder = CatalogConfigBuilder::from_config(base);
            if let Some(path) = flash {
                builder = builder.flash_root(path);
            }
            if let Some(path) = card {
                builder = builder.card_root(path);
            }
            if let Some(path) = host {
                builder = builder.host_root(path);
            }
            if let Some(cap) = cap {
                builder = builder.cap(cap);
            }
            if max_depth.is_some() {
                builder = builder.max_depth(max_depth);
            }
            if progress {
                builder = builder.show_progress(true);
            }
            let config = builder.build();

            let mut catalog = Catalog::from_config(config);
            info!("Roots: {:?}", catalog.roots());

            if catalog.select_category(category).is_none() {
                error!("Category {} cannot be scanned", category);
                return ExitCode::FAILURE;
            }

            if let Some(class) = detach {
                if let Err(e) = catalog.detach_root(class) {
                    error!("{}", e);
                    return ExitCode::FAILURE;
                }
            }

            let report = catalog.last_report();
            if json {
                let output = CatalogOutput {
                    category,
                    generated_at: Utc::now(),
                    truncated: catalog.is_truncated(),
                    outcome: report.outcome,
                    errors: report.error_count(),
                    entries: catalog.to_strings(),
                };
                match serde_json::to_string_pretty(&output) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        error!("Cannot serialize catalog: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                for entry in catalog.to_strings() {
                    println!("{}", entry);
                }
                println!();
                println!("Catalog completed:");
                println!("  Category: {}", category);
                println!("  Entries: {}", catalog.len());
                println!("  Truncated: {}", catalog.is_truncated());
                println!("  Files examined: {}", report.total_files);
                println!("  Dirs: {}", report.total_dirs);
                println!("  Errors: {}", report.error_count());
                println!("  Duration: {}ms", report.duration_ms);
            }
            ExitCode::SUCCESS
        }
        Some(Commands::Classify { files }) => {
            for file in files {
                let category = Category::from_extension(&path_extension(&file));
                println!("{}\t{}", category, file.display());
            }
            ExitCode::SUCCESS
        }
        None => {
            println!("{}", ABOUT);
            println!("Run 'media_catalog scan --help' for the scan options");
            ExitCode::SUCCESS
        }
    }
}
