//! pngstrip - Report and remove metadata chunks from PNG files
//!
//! This tool walks PNG files, prints the text, timestamp, physical size,
//! ICC profile and Exif metadata they carry, and writes a copy with those
//! chunks removed next to the original (`photo.png` -> `photo_checked.png`).

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use pngstrip_core::{ChunkType, DecodedReport, Error, StripSet, Stripper, StripperConfig};
use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Suffix inserted before the extension of cleaned files
const CHECKED_SUFFIX: &str = "_checked";

/// Report and remove metadata chunks from PNG files
#[derive(Parser, Debug)]
#[command(name = "pngstrip")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Output directory for cleaned files (default: next to each input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Keep chunks of this type instead of stripping them (repeatable)
    #[arg(long, value_name = "TYPE", value_parser = parse_chunk_type)]
    keep: Vec<ChunkType>,

    /// Maximum inflated size of a single compressed text chunk, in bytes
    #[arg(long, default_value_t = pngstrip_core::inflate::DEFAULT_INFLATE_LIMIT)]
    max_inflated_size: usize,

    /// Dry run - report metadata without writing cleaned files
    #[arg(long)]
    dry_run: bool,

    /// Overwrite existing output files
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Path to a single PNG file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of PNG files to process recursively
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full decoded reports
    Text,
    /// Just the removed chunk types (for scripting)
    Types,
}

fn parse_chunk_type(s: &str) -> std::result::Result<ChunkType, String> {
    ChunkType::try_from(s)
}

#[derive(Debug, Default)]
struct RunStats {
    files_processed: usize,
    files_clean: usize,
    chunks_removed: usize,
    bytes_saved: usize,
    written: usize,
}

impl RunStats {
    fn print_summary(&self) {
        info!(
            "Summary: {} files processed, {} already clean, {} chunks removed, {} bytes saved, {} written",
            self.files_processed,
            self.files_clean,
            self.chunks_removed,
            self.bytes_saved,
            self.written
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch based on input mode
    if let Some(ref file) = cli.input.file {
        process_single_file(&cli, file)
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(&cli, directory)
    } else {
        bail!("Either --file or --directory must be specified")
    }
}

impl Cli {
    fn stripper(&self) -> Stripper {
        let strip_set = self
            .keep
            .iter()
            .fold(StripSet::default(), |set, &chunk_type| set.keep(chunk_type));
        Stripper::with_config(
            StripperConfig::new()
                .strip_set(strip_set)
                .max_inflated_size(self.max_inflated_size),
        )
    }
}

/// Process a single PNG file
fn process_single_file(cli: &Cli, file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    let mut stats = RunStats::default();
    process_png(cli, &cli.stripper(), file, &mut stats)?;
    stats.print_summary();
    Ok(())
}

/// Process a directory of PNG files recursively
fn process_directory(cli: &Cli, directory: &Path) -> Result<()> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let stripper = cli.stripper();
    let mut stats = RunStats::default();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || !is_png_path(path) {
            trace!("Skipping: {}", path.display());
            continue;
        }

        // Skip our own output from an earlier run
        if path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.ends_with(CHECKED_SUFFIX))
            .unwrap_or(false)
        {
            trace!("Skipping cleaned file: {}", path.display());
            continue;
        }

        debug!("Processing: {}", path.display());
        if let Err(e) = process_png(cli, &stripper, path, &mut stats) {
            // Log error but continue with other files
            warn!("Error processing {}: {:#}", path.display(), e);
        }
    }

    stats.print_summary();
    Ok(())
}

/// Returns true for visible files with a `.png` extension (any case)
fn is_png_path(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false);
    let png = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    png && !hidden
}

/// Strip one PNG, print its reports and write the cleaned copy
fn process_png(cli: &Cli, stripper: &Stripper, path: &Path, stats: &mut RunStats) -> Result<()> {
    trace!("Reading {}", path.display());
    let data =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let output = stripper
        .strip(&data)
        .with_context(|| format!("Failed to parse PNG: {}", path.display()))?;

    stats.files_processed += 1;
    stats.chunks_removed += output.reports.len();
    stats.bytes_saved += data.len() - output.kept.len();

    match cli.format {
        OutputFormat::Text => {
            println!("{}", path.display());
            if output.is_clean() {
                println!("  no removable metadata found");
            }
            for (chunk_type, report) in &output.reports {
                print!("{}", render_report(*chunk_type, report));
            }
        }
        OutputFormat::Types => {
            for (chunk_type, _) in &output.reports {
                println!("{}", chunk_type);
            }
        }
    }

    if output.is_clean() {
        stats.files_clean += 1;
    }

    let target = output_path(cli.output.as_deref(), path)?;
    if cli.dry_run {
        if cli.format == OutputFormat::Text {
            println!("Would write: {}", target.display());
        }
        return Ok(());
    }

    match write_output(&target, output.as_bytes(), cli.force) {
        Ok(()) => {
            if cli.format == OutputFormat::Text {
                println!("Wrote {}", target.display());
            }
            stats.written += 1;
        }
        Err(e) => {
            error!("Failed to write {}: {:#}", target.display(), e);
        }
    }

    Ok(())
}

/// Render one report as indented text under a `[type]` heading
fn render_report(chunk_type: ChunkType, report: &DecodedReport) -> String {
    let mut out = format!("  [{}]\n", chunk_type);

    if let Some(rows) = report.as_rows() {
        let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
        for (key, value) in rows {
            let _ = writeln!(out, "    {:<width$}  {}", key, value, width = width);
        }
        return out;
    }

    match report {
        DecodedReport::PlainText(text) => {
            let _ = writeln!(out, "    {}", text);
        }
        DecodedReport::List(items) => {
            for item in items {
                let _ = writeln!(out, "    - {}", item);
            }
        }
        DecodedReport::KeyValueTable(_) => {}
    }
    out
}

/// Insert `_checked` before the extension: `photo.png` -> `photo_checked.png`
fn checked_file_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            format!("{}{}.{}", stem, CHECKED_SUFFIX, ext)
        }
        _ => format!("{}{}", file_name, CHECKED_SUFFIX),
    }
}

/// Where the cleaned copy of `input` goes
fn output_path(output_dir: Option<&Path>, input: &Path) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Input has no usable file name: {}", input.display()))?;
    let dir = match output_dir {
        Some(dir) => dir,
        None => input.parent().unwrap_or_else(|| Path::new(".")),
    };
    Ok(dir.join(checked_file_name(file_name)))
}

/// Write the cleaned PNG to disk
fn write_output(output_path: &Path, content: &[u8], force: bool) -> Result<()> {
    // Create parent directories
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Check if file exists
    if output_path.exists() && !force {
        bail!(
            "File already exists: {} (use --force to overwrite)",
            output_path.display()
        );
    }

    let mut file =
        fs::File::create(output_path).map_err(|e| Error::file_write(output_path, e))?;
    file.write_all(content)
        .map_err(|e| Error::file_write(output_path, e))?;

    Ok(())
}
