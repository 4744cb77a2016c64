use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use artparse_core::{PageSource, PageSourceError, TextFilePageSource, ocr_sibling_path};
use artparse_parsing::{
    ExtractionResult, MarginTolerance, PageParity, ParsingConfigBuilder, ParsingError,
    ReferenceExtractor,
};
use artparse_pdf_mupdf::MupdfPageSource;

mod output;

use output::ColorMode;

/// Article reference parser - Recover bibliographic references from article PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the bibliography of a PDF or a form-feed separated text file
    Extract {
        /// Path to the PDF (or .txt rendering) to parse
        file_path: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read an explicit config file instead of the default cascade
        #[arg(long)]
        config: Option<PathBuf>,

        /// How much text a margin column may hold: strict, numbers or text
        #[arg(long)]
        margin_tolerance: Option<MarginTolerance>,

        /// Which pages to sample for running headers: even or odd
        #[arg(long)]
        page_parity: Option<PageParity>,

        /// Keep line-break hyphens as printed
        #[arg(long)]
        no_hyphenation_repair: bool,

        /// Show the raw reference text under each entry
        #[arg(long)]
        raw: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Extract {
            file_path,
            json,
            no_color,
            output,
            config,
            margin_tolerance,
            page_parity,
            no_hyphenation_repair,
            raw,
        } => {
            // Resolve configuration: CLI flags > config file > defaults
            let file = match config {
                Some(path) => artparse_core::config_file::load_from_path(&path).ok_or_else(
                    || anyhow::anyhow!("Could not read config file {}", path.display()),
                )?,
                None => artparse_core::config_file::load_config(),
            };
            let mut builder = ParsingConfigBuilder::new().apply_file(&file)?;
            if let Some(tolerance) = margin_tolerance {
                builder = builder.margin_tolerance(tolerance);
            }
            if let Some(parity) = page_parity {
                builder = builder.page_parity(parity);
            }
            if no_hyphenation_repair {
                builder = builder.repair_hyphenation(false);
            }
            let extractor = ReferenceExtractor::with_config(builder.build()?);

            let use_color = !no_color && !json && output.is_none();
            let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
                Box::new(std::fs::File::create(output_path)?)
            } else {
                Box::new(std::io::stdout())
            };

            let result = extract(&extractor, &file_path)?;

            if json {
                serde_json::to_writer_pretty(&mut writer, &result)?;
                writeln!(writer)?;
                return Ok(());
            }

            let file_name = file_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file_path.display().to_string());
            output::print_result(&mut writer, &file_name, &result, raw, ColorMode(use_color))?;
            Ok(())
        }
    }
}

fn page_source_for(path: &Path) -> Box<dyn PageSource> {
    let is_text = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if is_text {
        Box::new(TextFilePageSource::new())
    } else {
        Box::new(MupdfPageSource::new())
    }
}

/// Run the pipeline, falling back to an OCR'd sibling (`paper-ocr.pdf`)
/// when the document has no text layer.
fn extract(extractor: &ReferenceExtractor, path: &Path) -> anyhow::Result<ExtractionResult> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    match extractor.extract_references(path, page_source_for(path).as_ref()) {
        Ok(result) => Ok(result),
        Err(ParsingError::PageSource(PageSourceError::NoText)) => {
            let ocr_path = ocr_sibling_path(path);
            if !ocr_path.exists() {
                anyhow::bail!(
                    "{} has no extractable text. Run OCR and save the result as {}",
                    path.display(),
                    ocr_path.display()
                );
            }
            tracing::info!(path = %ocr_path.display(), "no text layer, using OCR'd copy");
            Ok(extractor.extract_references(&ocr_path, page_source_for(&ocr_path).as_ref())?)
        }
        Err(e) => Err(e.into()),
    }
}
