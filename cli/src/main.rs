use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use swagger_refs_core::{resolve_document, Document, FsFetcher, ResolveOptions};
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "swagger-refs")]
#[command(about = "Resolve every $ref of a Swagger/OpenAPI document into one self-contained file")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge all external definitions into the document's registry
    Resolve {
        /// Input specification (YAML or JSON)
        input: PathBuf,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the resolution report (merged definitions, warnings) to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Base URI of the input (defaults to the input file's location)
        #[arg(long)]
        base_uri: Option<String>,

        /// Max nesting depth of the traversal
        #[arg(long, default_value_t = 64)]
        max_depth: usize,

        /// Copy identical external definitions under suffixed names instead of reusing them
        #[arg(long)]
        no_reuse_identical: bool,

        /// Exit with an error if any reference is left unresolved
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve {
            input,
            output,
            report: report_path,
            base_uri,
            max_depth,
            no_reuse_identical,
            strict,
            format,
        } => {
            let bytes = fs::read(&input)
                .with_context(|| format!("Failed to read input file: {}", input.display()))?;
            let mut document = Document::from_slice(&bytes)
                .with_context(|| format!("Failed to parse document from: {}", input.display()))?;

            let base_uri = match base_uri {
                Some(uri) => uri,
                None => file_uri(&input)?,
            };
            let options = ResolveOptions {
                base_uri: Some(base_uri),
                max_depth,
                reuse_identical: !no_reuse_identical,
            };

            let report = resolve_document(&mut document, &FsFetcher, &options)
                .map_err(|e| anyhow::Error::from(e).context("Resolution failed"))?;

            for warning in &report.warnings {
                eprintln!("Warning: {}", warning.message);
            }

            write_json(&document.to_value(), output.as_ref(), format)?;

            if let Some(path) = report_path {
                write_json(&report, Some(&path), format)?;
            }

            if strict && !report.warnings.is_empty() {
                bail!(
                    "{} reference(s) left unresolved",
                    report.warnings.len()
                );
            }
        }
    }

    Ok(())
}

fn file_uri(path: &Path) -> Result<String> {
    let absolute = fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|()| anyhow!("Cannot express {} as a file URL", absolute.display()))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
