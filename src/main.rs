use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use verdict_core::{AppConfig, CoreError, ErrorReporter, RedditCredentials};
use wordcloud::AccumulateMode;

const DEFAULT_FILTER: &str = "verdict=info,reddit_client=info,verdict_model=info,wordcloud=info";
const VERBOSE_FILTER: &str = "verdict=debug,reddit_client=debug,verdict_model=debug,wordcloud=debug";

#[derive(Parser)]
#[command(author, version, about = "Scrape AITA posts, train a verdict classifier, draw word clouds")]
struct Cli {
    /// TOML file overriding the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch posts from the search API and write them to CSV
    Scrape {
        /// CSV file to write
        #[arg(long)]
        output: Option<PathBuf>,
        /// Maximum number of posts
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Train the classifier on a scraped CSV file
    Train {
        /// CSV file to read
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Where to write the fitted model
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Filter text files and render one word cloud per category
    Wordcloud {
        /// Directory holding the input text files
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Start the accumulators empty or grow the existing ones
        #[arg(long, value_enum, default_value_t = ModeArg::Reset)]
        mode: ModeArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Reset,
    Continue,
}

impl From<ModeArg> for AccumulateMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Reset => AccumulateMode::Reset,
            ModeArg::Continue => AccumulateMode::Continue,
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn execute(command: Commands, mut config: AppConfig) -> Result<(), CoreError> {
    match command {
        Commands::Scrape { output, limit } => {
            if let Some(output) = output {
                config.scraper.output_path = output;
            }
            if let Some(limit) = limit {
                config.scraper.limit = limit;
            }
            let credentials = RedditCredentials::from_env()?;
            let summary = reddit_client::scrape(&config.scraper, &credentials).await?;
            tracing::info!(
                "Wrote {} posts to {}",
                summary.posts_written,
                summary.output_path.display()
            );
        }
        Commands::Train { dataset, model } => {
            if let Some(dataset) = dataset {
                config.trainer.dataset_path = dataset;
            }
            if let Some(model) = model {
                config.trainer.model_path = model;
            }
            let summary = tokio::task::spawn_blocking(move || verdict_model::train(&config.trainer))
                .await
                .map_err(|e| CoreError::Internal {
                    message: format!("training task failed: {e}"),
                })??;
            println!("{}", summary.report);
            tracing::info!(
                "Best parameters {} (cv accuracy {:.3}); model saved to {}",
                summary.best_params,
                summary.best_cv_score,
                summary.model_path.display()
            );
        }
        Commands::Wordcloud { dir, mode } => {
            if let Some(dir) = dir {
                config.wordcloud.input_dir = dir;
            }
            let outcomes = wordcloud::run(&config.wordcloud, mode.into())?;
            for outcome in outcomes {
                match outcome.image_path {
                    Some(path) => tracing::info!("'{}' -> {}", outcome.category, path.display()),
                    None => tracing::warn!("'{}' produced no image", outcome.category),
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => execute(cli.command, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(error) = result {
        ErrorReporter::new().report_error(&error);
        return Err(anyhow::Error::new(error).context("verdict failed"));
    }
    Ok(())
}
