//! hdrbin - Extract byte-array initializers from C headers into binary files
//!
//! This tool scans headers for `static const uint8_t name[N] = { ... };`
//! declarations and writes each array, zero-filled to its declared size, to
//! `<name>.bin` in the output directory together with a provenance manifest.

mod manifest;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use hdrbin_core::emit::DEFAULT_EXTENSION;
use hdrbin_core::{
    ArtifactStatus, CollisionPolicy, Emitter, Error, ExtractionResult, Extractor, ExtractorConfig,
    ScannerConfig, SourceText,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// File extensions treated as headers in directory mode
const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "inc"];

/// Extract byte-array initializers from C headers into binary files
#[derive(Parser, Debug)]
#[command(name = "hdrbin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Output directory for extracted binaries
    #[arg(short, long, env = "HDRBIN_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Extension of the written binaries
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Keyword sequence that introduces an array declaration
    #[arg(long, default_value = "static const uint8_t")]
    keywords: String,

    /// Only extract arrays whose name starts with this prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Resolution for same-name arrays with different contents
    #[arg(long, value_enum, default_value = "reject")]
    on_collision: CollisionStrategy,

    /// File name of the provenance manifest
    #[arg(long, default_value = manifest::DEFAULT_MANIFEST_NAME)]
    manifest_name: String,

    /// Text file used as the manifest preamble instead of the built-in one
    #[arg(long)]
    manifest_preamble: Option<PathBuf>,

    /// Don't write a manifest
    #[arg(long, conflicts_with = "manifest_preamble")]
    no_manifest: bool,

    /// Dry run - don't write files, just show what would be written
    #[arg(long)]
    dry_run: bool,

    /// Only list found arrays without writing anything
    #[arg(long, conflicts_with = "dry_run")]
    list_only: bool,

    /// Compare against existing binaries and fail if any is missing or differs
    #[arg(long, conflicts_with_all = ["dry_run", "list_only"])]
    check: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Header file to extract arrays from (repeatable, processed in order)
    #[arg(short, long)]
    file: Vec<PathBuf>,

    /// Directory searched recursively for headers
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Strategy for resolving naming conflicts
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CollisionStrategy {
    /// Abort the run
    Reject,
    /// Keep the array from the header processed first
    FirstWins,
    /// Keep the array from the header processed last
    LastWins,
}

impl From<CollisionStrategy> for CollisionPolicy {
    fn from(strategy: CollisionStrategy) -> Self {
        match strategy {
            CollisionStrategy::Reject => CollisionPolicy::Reject,
            CollisionStrategy::FirstWins => CollisionPolicy::FirstWins,
            CollisionStrategy::LastWins => CollisionPolicy::LastWins,
        }
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
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let extractor = Extractor::with_config(extractor_config(cli)?);

    // Dispatch based on input mode
    let result = if !cli.input.file.is_empty() {
        extract_files(&extractor, &cli.input.file)?
    } else if let Some(ref directory) = cli.input.directory {
        extract_directory(&extractor, directory)?
    } else {
        bail!("Either --file or --directory must be specified")
    };

    let emitter = Emitter::new(&cli.output).extension(cli.extension.as_str());

    if cli.list_only {
        for entry in result.iter() {
            println!(
                "{} {} {} {}",
                entry.array.name(),
                entry.array.capacity(),
                entry.array.literal_count(),
                entry.origin
            );
        }
        return Ok(());
    }

    if cli.check {
        return check_artifacts(&emitter, &result);
    }

    if cli.dry_run {
        for path in emitter.plan(&result)? {
            println!("Would write: {}", path.display());
        }
        return Ok(());
    }

    // Resolve the manifest before the first write
    let manifest = if cli.no_manifest {
        None
    } else {
        let path = manifest_path(cli, &emitter, &result)?;
        let preamble = match cli.manifest_preamble {
            Some(ref file) => Some(fs::read_to_string(file).with_context(|| {
                format!("Failed to read manifest preamble: {}", file.display())
            })?),
            None => None,
        };
        Some((path, manifest::render(preamble.as_deref(), &result, &emitter)?))
    };

    let report = emitter
        .emit(&result)
        .with_context(|| format!("Failed to write binaries to {}", cli.output.display()))?;

    if let Some((path, contents)) = manifest {
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
        debug!("Wrote manifest {}", path.display());
    }

    print_summary(&result, report.count());
    println!(
        "Wrote {} artifacts to {}",
        report.count(),
        cli.output.display()
    );

    Ok(())
}

fn extractor_config(cli: &Cli) -> Result<ExtractorConfig> {
    let keywords: Vec<&str> = cli.keywords.split_whitespace().collect();
    if keywords.is_empty() {
        bail!("--keywords must contain at least one keyword");
    }

    let mut scanner = ScannerConfig::new().keywords(keywords);
    if let Some(ref prefix) = cli.prefix {
        scanner = scanner.name_prefix(prefix.as_str());
    }

    Ok(ExtractorConfig::new()
        .scanner(scanner)
        .collision_policy(cli.on_collision.into()))
}

/// Resolve the manifest path, refusing names that would clobber an artifact
fn manifest_path(cli: &Cli, emitter: &Emitter, result: &ExtractionResult) -> Result<PathBuf> {
    let name = Path::new(&cli.manifest_name);
    if name.file_name() != Some(name.as_os_str()) {
        bail!(
            "Manifest name must be a plain file name: {}",
            cli.manifest_name
        );
    }

    let path = cli.output.join(name);
    if emitter.plan(result)?.contains(&path) {
        bail!(
            "Manifest name {} collides with an extracted binary",
            cli.manifest_name
        );
    }
    Ok(path)
}

/// Extract from explicitly named headers; every one must contain an array
fn extract_files(extractor: &Extractor, files: &[PathBuf]) -> Result<ExtractionResult> {
    let mut result = ExtractionResult::new();

    for file in files {
        if !file.exists() {
            bail!("Input file does not exist: {}", file.display());
        }
        if !file.is_file() {
            bail!("Input path is not a file: {}", file.display());
        }

        trace!("Reading {}", file.display());
        let source = SourceText::read(file)
            .with_context(|| format!("Failed to read header: {}", file.display()))?;
        let count = extractor
            .add_source(&mut result, &source)
            .with_context(|| format!("Failed to extract arrays from {}", file.display()))?;
        debug!("Found {} array(s) in {}", count, file.display());
    }

    Ok(result)
}

/// Extract from every header below a directory, in sorted order
fn extract_directory(extractor: &Extractor, directory: &Path) -> Result<ExtractionResult> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let mut result = ExtractionResult::new();
    let mut headers_processed = 0;

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry
            .with_context(|| format!("Failed to walk directory: {}", directory.display()))?;
        let path = entry.path();

        // Skip directories
        if !entry.file_type().is_file() {
            continue;
        }

        // Skip hidden files
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
        {
            continue;
        }

        if !is_header(path) {
            trace!("Skipping non-header: {}", path.display());
            continue;
        }

        debug!("Processing header: {}", path.display());
        let source = SourceText::read(path)
            .with_context(|| format!("Failed to read header: {}", path.display()))?;
        match extractor.add_source(&mut result, &source) {
            Ok(count) => debug!("Found {} array(s) in {}", count, path.display()),
            // Headers without arrays are expected in a directory walk
            Err(e) if e.is_skippable() => warn!("Skipping {}: {}", path.display(), e),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to extract arrays from {}", path.display())))
            }
        }
        headers_processed += 1;
    }

    info!("Processed {} headers", headers_processed);

    if result.is_empty() {
        return Err(Error::scan_empty(directory.display().to_string()).into());
    }

    Ok(result)
}

/// Heuristic to determine if a file is a C/C++ header
fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| HEADER_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Compare freshly extracted arrays against the binaries on disk
fn check_artifacts(emitter: &Emitter, result: &ExtractionResult) -> Result<()> {
    let checks = emitter.check(result)?;
    let mut stale = 0;

    for check in &checks {
        match check.status {
            ArtifactStatus::Match => debug!("Up to date: {}", check.path.display()),
            ArtifactStatus::Differs => {
                println!("Differs: {}", check.path.display());
                stale += 1;
            }
            ArtifactStatus::Missing => {
                println!("Missing: {}", check.path.display());
                stale += 1;
            }
        }
    }

    if stale > 0 {
        bail!(
            "{} of {} binaries in {} are missing or out of date",
            stale,
            checks.len(),
            emitter.output_dir().display()
        );
    }

    println!(
        "All {} binaries in {} are up to date",
        checks.len(),
        emitter.output_dir().display()
    );
    Ok(())
}

fn print_summary(result: &ExtractionResult, written: usize) {
    let stats = result.stats();
    info!(
        "Summary: {} declarations, {} duplicates skipped, {} collisions overridden, {} collisions ignored, {} written",
        stats.declarations,
        stats.duplicates_skipped,
        stats.collisions_overridden,
        stats.collisions_ignored,
        written
    );
}
