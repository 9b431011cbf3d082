//! txnvalidator CLI entry point

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use txnvalidator::config::cli::Cli;
use txnvalidator::config::toml as config_toml;
use txnvalidator::config::validator::validate_config;
use txnvalidator::config::Config;
use txnvalidator::job::{
    InMemoryJobRepository, JobCoordinator, JobExecution, JobRepository, JobStatus,
    StatusProjection,
};

const JOB_NAME: &str = "transaction-validation";

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse_args();

    println!("txnvalidator v{}", env!("CARGO_PKG_VERSION"));
    println!("Transaction file validation pipeline");
    println!();

    let config = config_toml::resolve_config(&cli)?;
    validate_config(&config).context("Configuration validation failed")?;
    print_configuration(&config);

    if cli.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    println!();
    println!("Starting job...");
    println!();

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let repository = Arc::new(InMemoryJobRepository::new());
    let config = Arc::new(config);

    let job = runtime.block_on(async {
        let coordinator = JobCoordinator::new(
            Arc::clone(&config),
            Arc::clone(&repository) as Arc<dyn JobRepository>,
        )
        .context("Failed to create job coordinator")?;
        run_with_progress(&coordinator, &repository, cli.status_interval).await
    })?;

    println!();
    let projection = StatusProjection::from_job(&job);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
    } else {
        println!("{}", projection.render_text());
    }

    if job.status != JobStatus::Completed {
        std::process::exit(1);
    }
    Ok(())
}

/// Run the job while printing a periodic progress line
async fn run_with_progress(
    coordinator: &JobCoordinator,
    repository: &Arc<InMemoryJobRepository>,
    interval_secs: u64,
) -> Result<JobExecution> {
    if interval_secs == 0 {
        return coordinator.run(JOB_NAME).await;
    }

    let run = coordinator.run(JOB_NAME);
    tokio::pin!(run);

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; skip it so the first line carries
    // real progress.
    ticker.tick().await;

    loop {
        tokio::select! {
            result = &mut run => return result,
            _ = ticker.tick() => {
                if let Some(job) = repository.latest_job() {
                    println!("{}", StatusProjection::from_job(&job).render_progress_line());
                }
            }
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Print configuration summary
fn print_configuration(config: &Config) {
    println!("Configuration:");
    println!("  Input:      {}", config.input_file.display());
    println!("  Output dir: {}", config.output_dir().display());
    println!("  Chunk size: {}", config.chunk_size);
    println!("  Grid size:  {}", config.grid_size);
    println!("  Services:");
    println!("    Config:   {}", config.config_service.base_url);
    println!(
        "    Accounts: {}",
        config.account_validation_service.base_url
    );
    println!("  Bulkheads:");
    println!(
        "    config: {} permits, {}ms max wait",
        config.bulkheads.config.max_concurrent_calls,
        config.bulkheads.config.max_wait_duration_ms
    );
    println!(
        "    pool:   {}-{} workers, queue {}, keep-alive {}ms",
        config.bulkheads.pool.core_pool_size,
        config.bulkheads.pool.max_pool_size,
        config.bulkheads.pool.queue_capacity,
        config.bulkheads.pool.keep_alive_duration_ms
    );
}
