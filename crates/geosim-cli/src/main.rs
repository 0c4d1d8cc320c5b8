mod analyze;
mod generate;
mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use analyze::AnalyzeCommands;

#[derive(Debug, Parser)]
#[command(name = "geosim-cli")]
#[command(about = "Synthetic geospatial order data and spatial predicate analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Generate synthetic orders and load them in chunks
    Generate {
        /// Number of orders (defaults to GEOSIM_GENERATOR_ORDER_COUNT)
        #[arg(long)]
        orders: Option<usize>,
        /// Trailing window of order dates, in days
        #[arg(long)]
        days: Option<u32>,
        /// Rows per INSERT (defaults to GEOSIM_INSERT_CHUNK_SIZE)
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        chunk_size: Option<usize>,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Add to existing orders instead of refusing to run
        #[arg(long)]
        append: bool,
        /// Print a sample without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Zone reference data
    Zones {
        #[command(subcommand)]
        command: ZoneCommands,
    },
    /// Show row counts and headline order figures
    Status,
    /// Run a spatial analysis over stored orders
    Analyze {
        #[command(subcommand)]
        command: AnalyzeCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Subcommand)]
enum ZoneCommands {
    /// Upsert the catalog's zones into `geo_zones`
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = geosim_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("geosim-cli ready; run with --help for commands");
        return Ok(());
    };

    let catalog = config.catalog()?;

    // A dry run never touches the database.
    if let Commands::Generate {
        orders,
        days,
        seed,
        dry_run: true,
        ..
    } = &command
    {
        return generate::run_generate_preview(&config, &catalog, *orders, *days, *seed);
    }

    let pool = geosim_db::connect_pool(
        &config.database_url,
        geosim_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            geosim_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = geosim_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Generate {
            orders,
            days,
            chunk_size,
            seed,
            append,
            dry_run: _,
        } => {
            let options = generate::GenerateOptions {
                orders: orders.unwrap_or(config.generator_order_count),
                days: days.unwrap_or(config.generator_window_days),
                chunk_size: chunk_size.unwrap_or(config.insert_chunk_size),
                seed,
                append,
            };
            generate::run_generate(&pool, &catalog, &options).await?;
        }
        Commands::Zones {
            command: ZoneCommands::Seed,
        } => generate::run_zones_seed(&pool, &catalog).await?,
        Commands::Status => status::run_status(&pool, &catalog).await?,
        Commands::Analyze { command } => analyze::run_analyze(&pool, &config, &catalog, command).await?,
    }

    Ok(())
}
