//! # Clipper CLI
//!
//! Command-line front end for the extraction pipeline.
//!
//! ## Commands
//!
//! - `extract`: extract one URL, optionally with metadata
//! - `route`: show which strategy a URL would use, without fetching it
//! - `batch`: extract a file of URLs with bounded concurrency
//!
//! Logging goes to stderr (`RUST_LOG` filters it), optionally mirrored to
//! `clipper.log` under `--log-dir`. OTLP export is enabled by setting
//! `OTEL_EXPORTER_OTLP_ENDPOINT`.

mod telemetry;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use clipper::batch::{extract_many, outcomes_json, read_url_list, save_outcomes};
use clipper::extract::{ContentExtractor, ExtractorConfig, classify};
use indicatif::{ProgressBar, ProgressStyle};
use telemetry::OtelGuard;
use tracing::instrument;
use url::Url;

#[derive(Parser)]
#[command(author, version, about = "Turn URLs into LLM-ready text and metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Also write logs to clipper.log in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Overall deadline per URL in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum characters of extracted content
    #[arg(long, global = true)]
    max_chars: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract readable content from a URL
    Extract(ExtractArgs),

    /// Show the extraction strategy chosen for a URL
    Route(RouteArgs),

    /// Extract every URL listed in a file
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// URL to extract
    #[arg(required = true)]
    url: String,

    /// Include page metadata
    #[arg(short, long)]
    metadata: bool,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Print the metadata header and content as one context block
    #[arg(short, long)]
    context: bool,
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// URL to classify
    #[arg(required = true)]
    url: String,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// File with one URL per line
    #[arg(required = true)]
    file: PathBuf,

    /// Number of URLs extracted at once
    #[arg(short, long, default_value = "4")]
    concurrency: usize,

    /// Write JSON results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _otel: OtelGuard = telemetry::init_tracing_subscriber(cli.log_dir.as_deref())?;
    let config = build_config(&cli)?;

    match cli.command {
        Commands::Extract(args) => extract_command(config, args).await?,
        Commands::Route(args) => route_command(args)?,
        Commands::Batch(args) => batch_command(config, args).await?,
    }

    Ok(())
}

/// Environment configuration with command-line overrides applied
fn build_config(cli: &Cli) -> anyhow::Result<ExtractorConfig> {
    let mut config = ExtractorConfig::from_env();
    if let Some(secs) = cli.timeout {
        config.overall_timeout_secs = secs;
        config.request_timeout_secs = config.request_timeout_secs.min(secs);
    }
    if let Some(max_chars) = cli.max_chars {
        config.max_content_chars = max_chars;
    }
    config.validate()?;
    Ok(config)
}

#[instrument(skip(config))]
async fn extract_command(config: ExtractorConfig, args: ExtractArgs) -> anyhow::Result<()> {
    let extractor = ContentExtractor::new(config)?;

    if !args.metadata && !args.context {
        let content = extractor.extract_content(&args.url).await?;
        if args.format == "json" {
            let json = serde_json::json!({ "url": args.url, "content": content });
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!("{content}");
        }
        return Ok(());
    }

    let result = extractor.extract_content_with_metadata(&args.url).await?;
    match (args.format.as_str(), args.context) {
        ("json", true) => {
            let json = serde_json::json!({ "url": args.url, "context": result.context_string() });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        ("json", false) => println!("{}", serde_json::to_string_pretty(&result)?),
        (_, true) => println!("{}", result.context_string()),
        (_, false) => {
            let meta = &result.metadata;
            println!("URL: {}", meta.url);
            if let Some(title) = &meta.title {
                println!("Title: {title}");
            }
            if let Some(author) = &meta.author {
                println!("Author: {author}");
            }
            if let Some(date) = &meta.published_date {
                println!("Published: {date}");
            }
            if !meta.keywords.is_empty() {
                println!("Keywords: {}", meta.keywords.join(", "));
            }
            println!("\n{}", result.content);
        }
    }

    Ok(())
}

fn route_command(args: RouteArgs) -> anyhow::Result<()> {
    let url = Url::parse(&args.url).with_context(|| format!("invalid URL: {}", args.url))?;
    let route = classify(&url);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&route)?);
    } else {
        println!("Strategy: {}", route.strategy);
        println!("PDF first: {}", route.pdf_first);
    }
    Ok(())
}

#[instrument(skip(config))]
async fn batch_command(config: ExtractorConfig, args: BatchArgs) -> anyhow::Result<()> {
    let urls = read_url_list(&args.file).await?;
    let extractor = ContentExtractor::new(config)?;

    let progress_bar = ProgressBar::new(urls.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message("Extracting...");

    let start_time = std::time::Instant::now();
    let outcomes = extract_many(&extractor, urls, args.concurrency, |outcome| {
        progress_bar.inc(1);
        progress_bar.set_message(outcome.url.clone());
    })
    .await;
    progress_bar.finish_with_message("Extraction completed");

    let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
    match args.output {
        Some(path) => {
            save_outcomes(&path, &outcomes).await?;
            println!("Saved results to {}", path.display());
        }
        None => println!("{}", outcomes_json(&outcomes)?),
    }

    eprintln!(
        "Extracted {}/{} URLs in {:.2?}",
        succeeded,
        outcomes.len(),
        start_time.elapsed()
    );
    Ok(())
}
