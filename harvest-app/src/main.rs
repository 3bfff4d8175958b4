use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use harvest_common::observability::{LogConfig, init_logging};
use harvest_common::{Category, HarvestError};
use harvest_config::{HarvestConfig, HarvestConfigLoader};
use harvest_pipeline::{Pipeline, classify};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Crawl a URL into clean plain text")]
#[command(version)]
struct Cli {
    /// YAML configuration file; ignored when missing
    #[arg(short, long, default_value = "harvest.yaml", env = "HARVEST_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl one or more URLs
    Crawl {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Force a category (SOCIAL, DOCUMENT, GENERIC_WEB) instead of classifying
        #[arg(short = 'k', long)]
        category: Option<String>,

        /// Maximum crawls in flight
        #[arg(short = 'j', long, default_value_t = 2)]
        concurrency: usize,

        /// Print extracted text without normalization
        #[arg(long)]
        raw: bool,
    },

    /// Print the category each URL would be crawled with
    Classify {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let cfg: HarvestConfig = HarvestConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    init_logging(LogConfig {
        app_name: cfg.logging.app_name.clone(),
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;

    match cli.command {
        Commands::Classify { urls } => {
            for url in urls {
                println!("{}\t{url}", classify(&url));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Crawl {
            urls,
            category,
            concurrency,
            raw,
        } => {
            let hint = match category.as_deref().map(str::parse::<Category>).transpose() {
                Ok(hint) => hint,
                Err(e) => {
                    eprintln!("[{}] {e}", category.as_deref().unwrap_or_default().trim());
                    return Ok(ExitCode::FAILURE);
                }
            };
            crawl(&cfg, urls, hint, concurrency, raw).await
        }
    }
}

async fn crawl(
    cfg: &HarvestConfig,
    urls: Vec<String>,
    hint: Option<Category>,
    concurrency: usize,
    raw: bool,
) -> Result<ExitCode> {
    let pipeline = Pipeline::from_config(cfg);
    tracing::info!(
        target: "app",
        urls = urls.len(),
        concurrency,
        raw,
        social_actor = cfg.social_actor(),
        document_actor = cfg.document_actor(),
        normalizer = pipeline.normalizer().is_available(),
        "app.crawl.start"
    );

    let pipeline = &pipeline;
    let results: Vec<(String, Category, Result<String, HarvestError>)> = stream::iter(urls)
        .map(|url| async move {
            let category = hint.unwrap_or_else(|| classify(&url));
            let outcome = if raw {
                pipeline.extract(&url, Some(category)).await.map(|(_, text)| text)
            } else {
                pipeline.run(&url, Some(category)).await
            };
            (url, category, outcome)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut failed = 0usize;
    for (url, category, outcome) in results {
        match outcome {
            Ok(text) => println!("==> {url} [{category}]\n{text}\n"),
            Err(e) => {
                failed += 1;
                eprintln!("[{category}] {url}: {e}");
            }
        }
    }

    tracing::info!(target: "app", failed, "app.crawl.finish");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
