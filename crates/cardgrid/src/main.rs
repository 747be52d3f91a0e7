use crate::prelude::*;
use clap::Parser;

mod adapter;
mod anime;
mod browse;
mod config;
mod controller;
mod crypto;
mod debounce;
mod domain;
mod error;
mod output;
mod pokemon;
mod prelude;
mod recipes;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Searchable, sortable, paginated card lists backed by public APIs"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Request timeout in seconds (overrides CARDGRID_TIMEOUT_SECS)
    #[clap(long, global = true)]
    timeout: Option<u64>,

    /// Search debounce in milliseconds (overrides CARDGRID_DEBOUNCE_MS)
    #[clap(long, global = true)]
    debounce_ms: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "CARDGRID_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Pokémon (PokeAPI or local backend)
    Pokemon(crate::pokemon::App),

    /// Recipes (TheMealDB or local backend)
    Recipes(crate::recipes::App),

    /// Top anime (Jikan or local backend)
    Anime(crate::anime::App),

    /// Coin markets (CoinGecko)
    Crypto(crate::crypto::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();
    let config = config::CardgridConfig::from_env()?
        .with_overrides(app.global.timeout, app.global.debounce_ms);
    log::debug!("{config:?}");

    match app.command {
        SubCommands::Pokemon(sub_app) => crate::pokemon::run(sub_app, app.global, config).await,
        SubCommands::Recipes(sub_app) => crate::recipes::run(sub_app, app.global, config).await,
        SubCommands::Anime(sub_app) => crate::anime::run(sub_app, app.global, config).await,
        SubCommands::Crypto(sub_app) => crate::crypto::run(sub_app, app.global, config).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
