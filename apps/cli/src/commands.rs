//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use siteqa_clients::{HttpEmbedder, OpenAiChat, RestVectorIndex};
use siteqa_core::pipeline::ProgressReporter;
use siteqa_shared::{AppConfig, api_key_from_env, init_config, load_config, save_json_pretty};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// siteqa — ask questions about one website's content.
#[derive(Parser)]
#[command(
    name = "siteqa",
    version,
    about = "Scrape, clean, and index a website, then answer questions over it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape a website into the raw corpus file.
    Scrape {
        /// Root URL of the site to scrape.
        url: String,

        /// Output file (defaults to the configured raw corpus path).
        #[arg(short, long)]
        out: Option<String>,

        /// Maximum number of linked pages to fetch.
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Clean the raw corpus: normalize, deduplicate, filter.
    Clean {
        /// Input file (defaults to the configured raw corpus path).
        #[arg(short, long)]
        input: Option<String>,

        /// Output file (defaults to the configured cleaned corpus path).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Chunk, embed, and upsert the cleaned corpus into the vector index.
    Index {
        /// Input file (defaults to the configured cleaned corpus path).
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Ask a question over the indexed site content.
    Ask {
        /// The question to answer.
        question: String,

        /// Number of chunks to retrieve as context.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the retrieved source chunks alongside the answer.
        #[arg(long)]
        show_sources: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "siteqa=info",
        1 => "siteqa=debug",
        _ => "siteqa=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            url,
            out,
            max_pages,
        } => cmd_scrape(&url, out.as_deref(), max_pages).await,
        Command::Clean { input, output } => cmd_clean(input.as_deref(), output.as_deref()),
        Command::Index { input } => cmd_index(input.as_deref()).await,
        Command::Ask {
            question,
            top_k,
            show_sources,
        } => cmd_ask(&question, top_k, show_sources).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_scrape(url: &str, out: Option<&str>, max_pages: Option<usize>) -> Result<()> {
    let config = load_config()?;

    let root_url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let mut scrape_config = config.scrape.clone();
    if let Some(n) = max_pages {
        scrape_config.max_pages = n;
    }

    let out_path = PathBuf::from(out.unwrap_or(&config.defaults.raw_corpus));

    info!(url, out = %out_path.display(), "scraping site");
    let spinner = spinner();
    spinner.set_message(format!("Scraping {url}"));

    let scraper = siteqa_scraper::SiteScraper::new(scrape_config)?;
    let (corpus, summary) = scraper.scrape_site(&root_url).await?;

    save_json_pretty(&out_path, &corpus)?;
    spinner.finish_and_clear();

    println!();
    println!("  Scrape complete!");
    println!("  Pages:   {}", summary.pages_fetched);
    println!("  Skipped: {}", summary.pages_skipped);
    println!("  Errors:  {}", summary.errors.len());
    println!("  Output:  {}", out_path.display());
    println!("  Time:    {:.1}s", summary.duration.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_clean(input: Option<&str>, output: Option<&str>) -> Result<()> {
    let config = load_config()?;

    let input_path = PathBuf::from(input.unwrap_or(&config.defaults.raw_corpus));
    let output_path = PathBuf::from(output.unwrap_or(&config.defaults.clean_corpus));

    let summary = siteqa_core::clean_corpus_file(&input_path, &output_path)?;

    println!();
    println!("  Cleaning complete!");
    println!(
        "  Pages:      {} in, {} kept",
        summary.pages_in, summary.pages_kept
    );
    println!("  Paragraphs: {}", summary.paragraphs_out);
    println!("  Output:     {}", output_path.display());
    println!();

    Ok(())
}

async fn cmd_index(input: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let input_path = PathBuf::from(input.unwrap_or(&config.defaults.clean_corpus));

    let (embedder, index) = build_index_clients(&config)?;

    let reporter = CliProgress::new();
    let summary = siteqa_core::index_corpus_file(
        &input_path,
        &embedder,
        &index,
        &config.chunking,
        config.index.batch_size,
        &reporter,
    )
    .await?;
    reporter.finish();

    println!();
    println!("  Indexing complete!");
    println!("  Records: {}", summary.records);
    println!("  Batches: {}", summary.batches);
    println!("  Index:   {}", config.index.name);
    println!();

    Ok(())
}

async fn cmd_ask(question: &str, top_k: Option<usize>, show_sources: bool) -> Result<()> {
    let config = load_config()?;
    let top_k = top_k.unwrap_or(config.defaults.top_k);

    let (embedder, index) = build_index_clients(&config)?;
    let chat = OpenAiChat::new(
        &config.chat,
        api_key_from_env(&config.chat.api_key_env)?,
    )?;

    let answer = siteqa_core::answer_question(question, &embedder, &index, &chat, top_k).await?;

    println!();
    println!("{}", answer.answer.trim());
    println!();

    if show_sources {
        println!("  Sources:");
        for chunk in &answer.chunks {
            println!("  - [{:.2}] {} ({})", chunk.score, chunk.source_url, chunk.id);
        }
        println!();
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Construct the embedding and vector-store clients from config, resolving
/// API keys from the configured env vars.
fn build_index_clients(config: &AppConfig) -> Result<(HttpEmbedder, RestVectorIndex)> {
    let embedder = HttpEmbedder::new(
        &config.embedding,
        api_key_from_env(&config.embedding.api_key_env)?,
    )?;
    let index = RestVectorIndex::new(
        &config.index,
        api_key_from_env(&config.index.api_key_env)?,
    )?;
    Ok((embedder, index))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        Self { spinner: spinner() }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn batch_indexed(&self, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Indexed batch {current}/{total}"));
    }
}
