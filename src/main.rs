use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use quotecoder::config::{self, Backend, Config};
use quotecoder::db::query::{QuoteQuery, DEFAULT_FOLLOWER_LIMIT};
use quotecoder::db::QuoteStore;
use quotecoder::pipeline::extract::{ExtractParams, SampleParams};
use quotecoder::pipeline::topics::TopicParams;
use quotecoder::sampling::{DEFAULT_CROSS_RATIO, DEFAULT_SAMPLE_NUM};
use quotecoder::topics::over_time::{DEFAULT_NR_BINS, DEFAULT_TOP_N_TOPICS};

/// quotecoder: coding worksheets and topic timelines from influencer quote tweets.
///
/// Pulls between-influencer quote tweets for a date range, samples them for
/// human stance coding, and charts what the quotes talk about over time.
#[derive(Parser)]
#[command(name = "quotecoder", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a local SQLite quote table
    Init,

    /// Query quote tweets and write the full data and a coding worksheet
    Extract {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// First day to exclude (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Where to write the sampled coding worksheet
        #[arg(long)]
        sample_out: PathBuf,

        /// Where to write every matching row
        #[arg(long)]
        full_out: PathBuf,

        /// Number of quotes to sample (default: 500)
        #[arg(long, default_value_t = DEFAULT_SAMPLE_NUM)]
        sample_num: usize,

        /// Share of the sample drawn from cross-cluster quotes (default: 0.5)
        #[arg(long, default_value_t = DEFAULT_CROSS_RATIO)]
        cross_ratio: f64,

        /// Minimum followers for both quoting and quoted accounts (default: 200000)
        #[arg(long, default_value_t = DEFAULT_FOLLOWER_LIMIT)]
        follower_limit: i64,

        /// Extra cluster code to exclude; repeat for several (1 and 4 always are)
        #[arg(long = "exclude-cluster")]
        exclude_clusters: Vec<i32>,

        /// Quote table to read (overrides QUOTECODER_TABLE)
        #[arg(long)]
        table: Option<String>,

        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Draw a new worksheet from an existing full-data CSV
    Resample {
        /// Full-data CSV written by `extract`
        #[arg(long)]
        input: PathBuf,

        /// Where to write the sampled coding worksheet
        #[arg(long)]
        sample_out: PathBuf,

        /// Number of quotes to sample (default: 500)
        #[arg(long, default_value_t = DEFAULT_SAMPLE_NUM)]
        sample_num: usize,

        /// Share of the sample drawn from cross-cluster quotes (default: 0.5)
        #[arg(long, default_value_t = DEFAULT_CROSS_RATIO)]
        cross_ratio: f64,

        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Model topics in a full-data CSV and chart them over time as HTML
    Topics {
        /// Full-data CSV (needs `tweet` and `created_at` columns)
        #[arg(long)]
        input: PathBuf,

        /// Where to write the HTML chart
        #[arg(long)]
        output: PathBuf,

        /// Number of equal-width time bins (default: 15)
        #[arg(long, default_value_t = DEFAULT_NR_BINS)]
        bins: usize,

        /// Number of most frequent topics to chart (default: 20)
        #[arg(long, default_value_t = DEFAULT_TOP_N_TOPICS)]
        top_n: usize,

        /// Upper bound on topics fitted (default: 30)
        #[arg(long, default_value = "30")]
        max_topics: usize,

        /// Page title
        #[arg(long)]
        title: Option<String>,

        /// Also save the fitted topics and per-bin counts as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,
    },

    /// Show the backend in use and a summary of the quote table
    Status {
        /// Quote table to summarize (overrides QUOTECODER_TABLE)
        #[arg(long)]
        table: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quotecoder=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let config = Config::load()?;
            init_database(&config)?;
            println!("Database initialized at: {}", config.db_path);
            println!("Quote table ready: {}", config.table);
            println!("\nLoad quote tweets into it, then run: quotecoder status");
        }

        Commands::Extract {
            start,
            end,
            sample_out,
            full_out,
            sample_num,
            cross_ratio,
            follower_limit,
            exclude_clusters,
            table,
            seed,
        } => {
            let config = Config::load()?;
            let db = open_database(&config).await?;

            let mut query = QuoteQuery::new(
                table.unwrap_or_else(|| config.table.clone()),
                midnight(start)?,
                midnight(end)?,
            );
            query.follower_limit = follower_limit;
            for code in exclude_clusters {
                if !query.excluded_clusters.contains(&code) {
                    query.excluded_clusters.push(code);
                }
            }

            let params = ExtractParams {
                query,
                sample: SampleParams {
                    sample_num,
                    cross_ratio,
                },
                full_data_file: full_out,
                sample_data_file: sample_out,
            };

            println!(
                "Extracting quotes from {} to {} ({} sampled, {:.0}% cross-cluster)...",
                start,
                end,
                sample_num,
                cross_ratio * 100.0
            );

            let mut rng = make_rng(seed);
            let report =
                quotecoder::pipeline::extract::create_coding_files(db.as_ref(), &params, &mut rng)
                    .await?;

            quotecoder::output::terminal::display_extraction_report(&report);
            println!("\n{}", "Extraction complete.".bold());
        }

        Commands::Resample {
            input,
            sample_out,
            sample_num,
            cross_ratio,
            seed,
        } => {
            println!("Resampling from {}...", input.display());

            let mut rng = make_rng(seed);
            let report = quotecoder::pipeline::extract::resample_from_csv(
                &input,
                &SampleParams {
                    sample_num,
                    cross_ratio,
                },
                &sample_out,
                &mut rng,
            )?;

            quotecoder::output::terminal::display_extraction_report(&report);
            println!("\n{}", "Resample complete.".bold());
        }

        Commands::Topics {
            input,
            output,
            bins,
            top_n,
            max_topics,
            title,
            json_out,
        } => {
            println!("Modeling topics in {}...", input.display());

            let params = TopicParams {
                nr_bins: bins,
                top_n_topics: top_n,
                max_topics,
                title,
                json_out,
            };
            let report = quotecoder::pipeline::topics::run(&input, &output, &params)?;

            quotecoder::output::terminal::display_topic_report(&report);
            println!("\n{}", "Topic chart saved.".bold());
        }

        Commands::Status { table } => {
            let config = Config::load()?;
            let db = open_database(&config).await?;
            let db_display = match config.backend()? {
                Backend::Postgres { url } => config::redact_url(&url),
                Backend::Sqlite { path } => path,
            };
            let table = table.unwrap_or_else(|| config.table.clone());
            quotecoder::status::show(&db, &db_display, &table).await?;
        }
    }

    Ok(())
}

/// Select the database backend based on configuration.
///
/// DATABASE_URL or a credentials file selects PostgreSQL (requires the
/// `postgres` feature). Otherwise, falls back to SQLite.
async fn open_database(config: &Config) -> Result<Arc<dyn QuoteStore>> {
    match config.backend()? {
        Backend::Postgres { url } => {
            #[cfg(feature = "postgres")]
            {
                info!(url = %config::redact_url(&url), "Using PostgreSQL backend");
                return quotecoder::db::connect_postgres(&url).await;
            }
            #[cfg(not(feature = "postgres"))]
            anyhow::bail!(
                "{} points to PostgreSQL but the 'postgres' feature is not compiled in.\n\
                 Rebuild with: cargo build --features postgres",
                config::redact_url(&url)
            );
        }
        Backend::Sqlite { path } => {
            #[cfg(feature = "sqlite")]
            {
                info!(path = %path, "Using SQLite backend");
                return quotecoder::db::open_sqlite(&path);
            }
            #[cfg(not(feature = "sqlite"))]
            anyhow::bail!(
                "No PostgreSQL connection configured and SQLite support ({path}) is not compiled in.\n\
                 Set DATABASE_URL or QUOTECODER_DB_CONFIG, or rebuild with --features sqlite"
            );
        }
    }
}

/// Create the local SQLite quote table.
fn init_database(config: &Config) -> Result<()> {
    if let Backend::Postgres { url } = config.backend()? {
        anyhow::bail!(
            "`init` only manages a local SQLite copy; the quote table at {} is managed upstream.\n\
             Unset DATABASE_URL / QUOTECODER_DB_CONFIG to initialize {}.",
            config::redact_url(&url),
            config.db_path
        );
    }

    #[cfg(feature = "sqlite")]
    {
        info!("Initializing quotecoder database...");
        quotecoder::db::initialize_sqlite(&config.db_path, &config.table)?;
        return Ok(());
    }
    #[cfg(not(feature = "sqlite"))]
    anyhow::bail!("SQLite support is not compiled in. Rebuild with --features sqlite");
}

fn midnight(date: NaiveDate) -> Result<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid date {date}"))
}

/// Seeded when asked for a reproducible sample, otherwise from the OS.
fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            info!(seed, "Using seeded sampler");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    }
}
