use cardgrid_core::anime::{AnimeBackend, BackendNormalizer, Jikan, JikanNormalizer};

use crate::browse::run_browse;
use crate::config::CardgridConfig;
use crate::domain::{run_list, BrowseOptions, Domain, ListOptions};
use crate::prelude::*;

const DOMAIN: Domain = Domain {
    name: "anime",
    title: "Top Anime",
    page_size: 24,
};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Backend {
    /// Jikan (MyAnimeList) top anime, at most 25 per page
    Jikan,
    /// The local anime backend on port 3001
    Local,
}

#[derive(Debug, clap::Parser)]
#[command(name = "anime")]
#[command(about = "Top anime from Jikan or the local backend")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List anime as cards
    #[clap(name = "list")]
    List(ListCommand),

    /// Browse anime interactively
    #[clap(name = "browse")]
    Browse(BrowseCommand),
}

#[derive(Debug, clap::Args)]
pub struct ListCommand {
    /// Backend to fetch from
    #[arg(short, long, value_enum, default_value = "jikan")]
    pub backend: Backend,

    #[command(flatten)]
    pub options: ListOptions,
}

#[derive(Debug, clap::Args)]
pub struct BrowseCommand {
    /// Backend to fetch from
    #[arg(short, long, value_enum, default_value = "jikan")]
    pub backend: Backend,

    #[command(flatten)]
    pub options: BrowseOptions,
}

pub async fn run(app: App, global: crate::Global, config: CardgridConfig) -> Result<()> {
    let urls = &config.base_urls;

    match app.command {
        Commands::List(ListCommand { backend, options }) => match backend {
            Backend::Jikan => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.jikan.clone());
                run_list(
                    &DOMAIN,
                    Jikan::new(base),
                    JikanNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
            Backend::Local => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.anime_backend.clone());
                run_list(
                    &DOMAIN,
                    AnimeBackend::new(base),
                    BackendNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
        },
        Commands::Browse(BrowseCommand { backend, options }) => match backend {
            Backend::Jikan => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.jikan.clone());
                run_browse(
                    &DOMAIN,
                    Jikan::new(base),
                    JikanNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
            Backend::Local => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.anime_backend.clone());
                run_browse(
                    &DOMAIN,
                    AnimeBackend::new(base),
                    BackendNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
        },
    }
}
