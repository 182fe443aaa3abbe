use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sigdesk")]
#[command(about = "sigdesk command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one source sync against DATABASE_URL and print the report.
    Sync {
        #[arg(value_enum)]
        source: SyncSource,
    },
    /// Print triage metrics across all signals.
    Metrics,
    /// Apply pending database migrations.
    Migrate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SyncSource {
    Hackernews,
    Producthunt,
    Github,
    Yc,
    Reddit,
    Jobs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = sigdesk_core::load_app_config()?;
    let pool_config = sigdesk_db::PoolConfig::from_app_config(&config);
    let pool = sigdesk_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Sync { source } => {
            sigdesk_db::run_migrations(&pool).await?;
            let report = match source {
                SyncSource::Hackernews => sigdesk_pipeline::sync_hackernews(&pool, &config).await?,
                SyncSource::Producthunt => {
                    sigdesk_pipeline::sync_producthunt(&pool, &config).await?
                }
                SyncSource::Github => sigdesk_pipeline::sync_github(&pool, &config).await?,
                SyncSource::Yc => sigdesk_pipeline::sync_yc(&pool, &config).await?,
                SyncSource::Reddit => sigdesk_pipeline::sync_reddit(&pool, &config).await?,
                SyncSource::Jobs => sigdesk_pipeline::sync_jobs(&pool, &config).await?,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Metrics => {
            let metrics = sigdesk_db::action_metrics(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        Commands::Migrate => {
            sigdesk_db::run_migrations(&pool).await?;
            println!("migrations applied");
        }
    }

    Ok(())
}
