use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use wikiplain::{dump, split_wiki_text_by_sections, DumpTarget, Pipeline, Settings, SingleArticle, Stage, StageMetric};

#[derive(Parser)]
#[command(name = "wikiplain", about = "MediaWiki dump to plain-text articles")]
struct Cli {
    /// Settings file (default: ./wikiplain.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract articles from a MediaWiki XML export
    Extract {
        input: PathBuf,
        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Snapshot every pipeline stage under this directory
        #[arg(long)]
        dump_dir: Option<PathBuf>,
        /// Emit one row per section instead of nested articles
        #[arg(long)]
        rows: bool,
    },
    /// Strip markup from a raw wikitext file
    Clean { input: PathBuf },
    /// Split plain text into sections
    Split { input: PathBuf },
    /// Per-stage counts for a MediaWiki XML export
    Stats { input: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    info!(?settings, "settings loaded");
    let pipeline = Pipeline::new(&settings)?;

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            dump_dir,
            rows,
        } => {
            let pipeline = match dump_dir.or(settings.dump_dir) {
                Some(dir) => pipeline.with_dump(DumpTarget::new(dir, file_stem(&input))),
                None => pipeline,
            };
            let run = run_pipeline(&pipeline, &input)?;
            if rows {
                let rows: Vec<_> = run.articles.iter().flat_map(SingleArticle::rows).collect();
                write_json(output.as_deref(), &rows)?;
            } else {
                write_json(output.as_deref(), &run.articles)?;
            }
            eprintln!(
                "Extracted {} articles from {} pages.",
                run.articles.len(),
                run.pages
            );
            Ok(())
        }
        Commands::Clean { input } => {
            let text = read_input(&input)?;
            println!("{}", pipeline.convert(&text)?);
            Ok(())
        }
        Commands::Split { input } => {
            let text = read_input(&input)?;
            write_json(None, &split_wiki_text_by_sections(&text))
        }
        Commands::Stats { input } => {
            let run = run_pipeline(&pipeline, &input)?;
            println!("Pages: {}", run.pages);
            println!(
                "{:<10} | {:>8} | {:>8} | {:>12} | {:>12}",
                "Stage", "Articles", "Sections", "Chars", "Removed"
            );
            println!("{}", "-".repeat(62));
            for m in &run.metrics {
                println!(
                    "{:<10} | {:>8} | {:>8} | {:>12} | {:>12}",
                    m.stage.name(),
                    m.articles,
                    m.sections,
                    m.after,
                    m.before.saturating_sub(m.after)
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

struct PipelineRun {
    pages: usize,
    articles: Vec<SingleArticle>,
    metrics: Vec<StageMetric>,
}

fn run_pipeline(pipeline: &Pipeline, input: &Path) -> Result<PipelineRun> {
    let pages = dump::read_pages_from_file(input)
        .with_context(|| format!("Failed to read pages from {}", input.display()))?;
    let page_count = pages.len();

    let pb = ProgressBar::new(Stage::ALL.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:20.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut metrics = Vec::new();
    let articles = pipeline.run_observed(pages, |m| {
        pb.set_message(format!("{} ({} articles)", m.stage.name(), m.articles));
        pb.inc(1);
        metrics.push(m.clone());
    })?;
    pb.finish_and_clear();

    Ok(PipelineRun {
        pages: page_count,
        articles,
        metrics,
    })
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(output: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dump".to_string())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
