mod locate;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "retailmap-cli")]
#[command(about = "Store locator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Geocode a city or zip code and list nearby retailers
    Search {
        query: String,
        /// Search radius in miles (defaults to `RETAILMAP_SEARCH_RADIUS_MI`)
        #[arg(long)]
        radius: Option<f64>,
        /// Also print the map commands the widget would issue, as JSON
        #[arg(long, default_value_t = false)]
        commands: bool,
    },
    /// List every retailer in the collection
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("retailmap-cli ready; try `retailmap-cli search <city or zip>`");
        return Ok(());
    };

    let config = retailmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Search {
            query,
            radius,
            commands,
        } => locate::run_search(&config, &query, radius, commands).await,
        Commands::List => locate::run_list(&config).await,
    }
}
