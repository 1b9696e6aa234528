use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oxidize_dvi::fonts::{FontPool, MetafontMode};
use oxidize_dvi::parser::{DviDocument, ParseOptions, Postamble};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "oxidizedvi",
    about = "A native Rust DVI inspection tool",
    version,
    author
)]
struct Cli {
    /// Log every parsing pass
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get information about a DVI file
    Info {
        /// Input DVI file
        input: PathBuf,

        /// Metafont mode used for font sizes (cx, ljfour, lexmarks)
        #[arg(short, long, default_value = "ljfour")]
        mode: MetafontMode,

        /// Render resolution in dpi (defaults to the mode's resolution)
        #[arg(short, long)]
        resolution: Option<f64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Reject inconsistent page links instead of repairing them
        #[arg(long)]
        strict: bool,
    },

    /// List the byte range of every page
    Pages {
        /// Input DVI file
        input: PathBuf,

        /// Reject inconsistent page links instead of repairing them
        #[arg(long)]
        strict: bool,
    },

    /// List the fonts defined in a DVI file
    Fonts {
        /// Input DVI file
        input: PathBuf,

        /// Metafont mode used for font sizes (cx, ljfour, lexmarks)
        #[arg(short, long, default_value = "ljfour")]
        mode: MetafontMode,
    },
}

#[derive(Serialize)]
struct FontReport<'a> {
    number: u32,
    name: &'a str,
    checksum: u32,
    scale: u32,
    design_size: u32,
    effective_size: f64,
}

#[derive(Serialize)]
struct InfoReport<'a> {
    file: String,
    size: usize,
    generator: &'a str,
    numerator: u32,
    denominator: u32,
    magnification: u32,
    mode: MetafontMode,
    conversion_factor: f64,
    pages: usize,
    postamble: Option<&'a Postamble>,
    fonts: Vec<FontReport<'a>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info {
            input,
            mode,
            resolution,
            json,
            strict,
        } => {
            let mut pool = FontPool::new().with_mode(mode);
            if let Some(dpi) = resolution {
                pool = pool.with_render_resolution(dpi);
            }
            let doc = open_or_exit(&input, &pool, strict);

            let report = InfoReport {
                file: input.display().to_string(),
                size: doc.len(),
                generator: doc.generator(),
                numerator: doc.numerator(),
                denominator: doc.denominator(),
                magnification: doc.magnification(),
                mode,
                conversion_factor: doc.dimension_conversion_factor(),
                pages: doc.page_count(),
                postamble: doc.postamble(),
                fonts: font_reports(&doc),
            };

            if json {
                let text = serde_json::to_string_pretty(&report)
                    .context("could not encode the report as JSON")?;
                println!("{text}");
            } else {
                print_info(&report);
            }
        }

        Commands::Pages { input, strict } => {
            let doc = open_or_exit(&input, &FontPool::new(), strict);

            println!("{} page(s) in {}", doc.page_count(), input.display());
            for page in 0..doc.page_count() {
                if let Some(range) = doc.page_range(page) {
                    println!(
                        "Page {}: bytes {}..{} ({} bytes)",
                        page + 1,
                        range.start,
                        range.end,
                        range.len()
                    );
                }
            }
        }

        Commands::Fonts { input, mode } => {
            let pool = FontPool::new().with_mode(mode);
            let doc = open_or_exit(&input, &pool, false);

            if doc.fonts().is_empty() {
                println!("No fonts defined");
            }
            for font in font_reports(&doc) {
                println!(
                    "{:>6}  {:<20} {:>8.2} dots  checksum {:08X}",
                    font.number, font.name, font.effective_size, font.checksum
                );
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "oxidize_dvi=debug"
    } else {
        "oxidize_dvi=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_or_exit(input: &Path, pool: &FontPool, strict: bool) -> DviDocument {
    let options = if strict {
        ParseOptions::strict()
    } else {
        ParseOptions::lenient()
    };
    let doc = DviDocument::open(input, Arc::new(pool.clone()), options);
    if let Some(message) = doc.error_message() {
        eprintln!("Error: Failed to load DVI file {}: {}", input.display(), message);
        std::process::exit(1);
    }
    doc
}

fn font_reports(doc: &DviDocument) -> Vec<FontReport<'_>> {
    doc.fonts()
        .into_iter()
        .map(|(number, font)| FontReport {
            number,
            name: &font.name,
            checksum: font.checksum,
            scale: font.scale,
            design_size: font.design_size,
            effective_size: font.effective_size,
        })
        .collect()
}

fn print_info(report: &InfoReport<'_>) {
    println!("DVI Information for: {}", report.file);
    println!("==========================================");
    println!("File size: {} bytes", report.size);
    println!("Generator: {}", report.generator.trim());
    println!(
        "Units: num={} den={} mag={}",
        report.numerator, report.denominator, report.magnification
    );
    println!("Metafont mode: {}", report.mode);
    println!("Conversion factor: {:.6}", report.conversion_factor);
    println!("Pages: {}", report.pages);

    if let Some(post) = report.postamble {
        println!(
            "Largest page: {} x {} DVI units, stack depth {}",
            post.max_width, post.max_height, post.max_stack_depth
        );
    }

    println!("Fonts: {}", report.fonts.len());
    for font in &report.fonts {
        println!(
            "  {:>6}: {} at {:.2} dots",
            font.number, font.name, font.effective_size
        );
    }
}
