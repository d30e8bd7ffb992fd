use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use compound_curator::app::ports::RateLimiterPort;
use compound_curator::app::resolve_use_case::{ResolveRequest, ResolveUseCase};
use compound_curator::config::Config;
use compound_curator::infra::{Limits, PubChemClient, RateLimiter};
use compound_curator::observability::init_logging;
use compound_curator::pipeline::name_candidates;

#[derive(Parser)]
#[command(name = "compound_curator")]
#[command(about = "Resolve compound names to PubChem CIDs and SMILES")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every name in a table and write full and clean result tables
    Resolve {
        /// Input table with a `Name` column
        #[arg(long)]
        input: PathBuf,
        /// Directory that receives the timestamped run folder
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// TOML config file (defaults to ./curator.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Minimum delay between records, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Per-request timeout, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Records resolved concurrently (1 = strictly sequential)
        #[arg(long)]
        workers: Option<usize>,
        /// Field delimiter for input and output tables
        #[arg(long)]
        delimiter: Option<char>,
        /// Also copy the clean table here for the prediction step
        #[arg(long)]
        handoff: Option<PathBuf>,
    },
    /// Print the spellings that would be tried for a name
    Candidates {
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    match cli.command {
        Commands::Candidates { name } => {
            for (i, candidate) in name_candidates(&name).iter().enumerate() {
                println!("{}. {}", i + 1, candidate);
            }
        }
        Commands::Resolve {
            input,
            output_dir,
            config,
            delay_ms,
            timeout_secs,
            workers,
            delimiter,
            handoff,
        } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(v) = delay_ms {
                config.delay_ms = v;
            }
            if let Some(v) = timeout_secs {
                config.timeout_secs = v;
            }
            if let Some(v) = workers {
                config.workers = v;
            }
            if let Some(v) = delimiter {
                config.delimiter = v;
            }
            if let Some(v) = output_dir {
                config.output_dir = v.to_string_lossy().to_string();
            }
            config.validate()?;

            let log_guard = init_logging(&config.log_dir);
            info!("Starting resolution run for {}", input.display());

            let request_limiter: Arc<dyn RateLimiterPort> =
                Arc::new(RateLimiter::new(Limits::with_delay_ms(config.request_delay_ms)));
            let client = PubChemClient::new(&config.base_url, config.timeout(), request_limiter)?;
            let pacer = Arc::new(RateLimiter::new(Limits::with_delay_ms(config.delay_ms)));
            let use_case = ResolveUseCase::new(Arc::new(client), pacer, config.timeout(), config.workers);

            let request = ResolveRequest {
                input,
                output_dir: PathBuf::from(&config.output_dir),
                delimiter: config.delimiter_byte()?,
                handoff,
            };

            match use_case.run(&request).await {
                Ok((summary, artifacts)) => {
                    println!("\n📊 Resolution Results:");
                    println!("   Total compounds: {}", summary.total);
                    println!("   Resolved: {}", summary.succeeded);
                    println!("   Failed: {}", summary.failed);
                    println!("   Success rate: {:.1}%", summary.success_rate);
                    println!("   Clean records: {}", summary.clean);
                    println!("   Full results: {}", artifacts.all_results.display());
                    println!("   Clean results: {}", artifacts.clean_results.display());
                    println!("   Run log: {}", artifacts.run_log.display());
                    if let Some(handoff) = &artifacts.handoff {
                        println!("   Hand-off file: {}", handoff.display());
                    }
                    if !summary.failed_names.is_empty() {
                        println!("\n⚠️  Could not resolve:");
                        for name in &summary.failed_names {
                            println!("   - {}", name);
                        }
                    }
                }
                Err(e) => {
                    error!("Resolution run failed: {}", e);
                    println!("❌ Process stopped: {}", e);
                    // Flush the file log before exiting
                    drop(log_guard);
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
