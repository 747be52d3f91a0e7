use cardgrid_core::recipes::{BackendNormalizer, MealDb, MealDbNormalizer, RecipesBackend};

use crate::browse::run_browse;
use crate::config::CardgridConfig;
use crate::domain::{run_list, BrowseOptions, Domain, ListOptions};
use crate::prelude::*;

const DOMAIN: Domain = Domain {
    name: "recipes",
    title: "Recipes",
    page_size: 12,
};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Backend {
    /// TheMealDB meal categories
    Mealdb,
    /// The local recipes backend on port 3000
    Local,
}

#[derive(Debug, clap::Parser)]
#[command(name = "recipes")]
#[command(about = "Recipes from TheMealDB or the local backend")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List recipes as cards
    #[clap(name = "list")]
    List(ListCommand),

    /// Browse recipes interactively
    #[clap(name = "browse")]
    Browse(BrowseCommand),
}

#[derive(Debug, clap::Args)]
pub struct ListCommand {
    /// Backend to fetch from
    #[arg(short, long, value_enum, default_value = "mealdb")]
    pub backend: Backend,

    #[command(flatten)]
    pub options: ListOptions,
}

#[derive(Debug, clap::Args)]
pub struct BrowseCommand {
    /// Backend to fetch from
    #[arg(short, long, value_enum, default_value = "mealdb")]
    pub backend: Backend,

    #[command(flatten)]
    pub options: BrowseOptions,
}

pub async fn run(app: App, global: crate::Global, config: CardgridConfig) -> Result<()> {
    let urls = &config.base_urls;

    match app.command {
        Commands::List(ListCommand { backend, options }) => match backend {
            Backend::Mealdb => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.mealdb.clone());
                run_list(
                    &DOMAIN,
                    MealDb::new(base),
                    MealDbNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
            Backend::Local => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.recipes_backend.clone());
                run_list(
                    &DOMAIN,
                    RecipesBackend::new(base),
                    BackendNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
        },
        Commands::Browse(BrowseCommand { backend, options }) => match backend {
            Backend::Mealdb => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.mealdb.clone());
                run_browse(
                    &DOMAIN,
                    MealDb::new(base),
                    MealDbNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
            Backend::Local => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.recipes_backend.clone());
                run_browse(
                    &DOMAIN,
                    RecipesBackend::new(base),
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
