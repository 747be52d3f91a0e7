use colored::Colorize;

use cardgrid_core::crypto::{CoinGecko, CoinGeckoNormalizer};

use crate::browse::run_browse;
use crate::config::CardgridConfig;
use crate::domain::{run_list, BrowseOptions, Domain, ListOptions};
use crate::prelude::{eprintln, *};

const DOMAIN: Domain = Domain {
    name: "crypto",
    title: "Crypto Market",
    page_size: 24,
};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Backend {
    /// CoinGecko `/coins/markets`, paged on the server
    Coingecko,
}

#[derive(Debug, clap::Parser)]
#[command(name = "crypto")]
#[command(about = "Coin market data from CoinGecko")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List coins by market cap
    #[clap(name = "list")]
    List(ListCommand),

    /// Browse coins interactively
    #[clap(name = "browse")]
    Browse(BrowseCommand),
}

#[derive(Debug, clap::Args)]
pub struct ListCommand {
    /// Backend to fetch from
    #[arg(short, long, value_enum, default_value = "coingecko")]
    pub backend: Backend,

    #[command(flatten)]
    pub options: ListOptions,
}

#[derive(Debug, clap::Args)]
pub struct BrowseCommand {
    /// Backend to fetch from
    #[arg(short, long, value_enum, default_value = "coingecko")]
    pub backend: Backend,

    #[command(flatten)]
    pub options: BrowseOptions,
}

pub async fn run(app: App, global: crate::Global, config: CardgridConfig) -> Result<()> {
    if global.verbose {
        eprintln!("{}: {}", "Currency".green(), config.vs_currency);
    }

    let endpoint = |base_url: Option<String>| {
        CoinGecko::new(
            base_url.unwrap_or_else(|| config.base_urls.coingecko.clone()),
            config.vs_currency.clone(),
        )
    };

    match app.command {
        Commands::List(ListCommand { backend, options }) => match backend {
            Backend::Coingecko => {
                let endpoint = endpoint(options.base_url.clone());
                run_list(&DOMAIN, endpoint, CoinGeckoNormalizer, options, &config, &global).await
            }
        },
        Commands::Browse(BrowseCommand { backend, options }) => match backend {
            Backend::Coingecko => {
                let endpoint = endpoint(options.base_url.clone());
                run_browse(&DOMAIN, endpoint, CoinGeckoNormalizer, options, &config, &global).await
            }
        },
    }
}
