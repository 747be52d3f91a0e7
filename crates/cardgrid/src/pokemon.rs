use colored::Colorize;

use cardgrid_core::endpoint::Normalizer;
use cardgrid_core::item::Item;
use cardgrid_core::pokemon::{
    detail_request, BackendNormalizer, DetailNormalizer, PokeApi, PokeApiNormalizer,
    PokemonBackend, PokemonDetail,
};

use crate::adapter::{create_client, fetch_json};
use crate::browse::run_browse;
use crate::config::CardgridConfig;
use crate::domain::{run_list, BrowseOptions, Domain, ListOptions};
use crate::output::format_view_json;
use crate::prelude::{eprintln, println, *};

const DOMAIN: Domain = Domain {
    name: "pokemon",
    title: "Pokémon",
    page_size: 20,
};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Backend {
    /// pokeapi.co, paged on the server
    Pokeapi,
    /// The local backend on port 8000, paged locally
    Local,
}

#[derive(Debug, clap::Parser)]
#[command(name = "pokemon")]
#[command(about = "Pokémon from PokeAPI or the local backend")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List Pokémon as cards
    #[clap(name = "list")]
    List(ListCommand),

    /// Browse Pokémon interactively
    #[clap(name = "browse")]
    Browse(BrowseCommand),

    /// Show one Pokémon from PokeAPI
    #[clap(name = "show")]
    Show(ShowOptions),
}

#[derive(Debug, clap::Args)]
pub struct ListCommand {
    /// Backend to fetch from
    #[arg(short, long, value_enum, default_value = "pokeapi")]
    pub backend: Backend,

    #[command(flatten)]
    pub options: ListOptions,
}

#[derive(Debug, clap::Args)]
pub struct BrowseCommand {
    /// Backend to fetch from
    #[arg(short, long, value_enum, default_value = "pokeapi")]
    pub backend: Backend,

    #[command(flatten)]
    pub options: BrowseOptions,
}

#[derive(Debug, clap::Args)]
pub struct ShowOptions {
    /// Pokémon name or National Pokédex number
    #[arg(value_name = "NAME_OR_ID")]
    pub name: String,

    /// Override the PokeAPI base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, global: crate::Global, config: CardgridConfig) -> Result<()> {
    let urls = &config.base_urls;

    match app.command {
        Commands::List(ListCommand { backend, options }) => match backend {
            Backend::Pokeapi => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.pokeapi.clone());
                run_list(
                    &DOMAIN,
                    PokeApi::new(base),
                    PokeApiNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
            Backend::Local => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.pokemon_backend.clone());
                run_list(
                    &DOMAIN,
                    PokemonBackend::new(base),
                    BackendNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
        },
        Commands::Browse(BrowseCommand { backend, options }) => match backend {
            Backend::Pokeapi => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.pokeapi.clone());
                run_browse(
                    &DOMAIN,
                    PokeApi::new(base),
                    PokeApiNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
            Backend::Local => {
                let base = options.base_url.clone().unwrap_or_else(|| urls.pokemon_backend.clone());
                run_browse(
                    &DOMAIN,
                    PokemonBackend::new(base),
                    BackendNormalizer,
                    options,
                    &config,
                    &global,
                )
                .await
            }
        },
        Commands::Show(options) => show(options, &global, &config).await,
    }
}

/// Fetch and print one PokeAPI detail record
async fn show(options: ShowOptions, global: &crate::Global, config: &CardgridConfig) -> Result<()> {
    let base = options
        .base_url
        .unwrap_or_else(|| config.base_urls.pokeapi.clone());
    let request = detail_request(&base, &options.name).ok_or(Error::MissingName)?;

    if global.verbose {
        eprintln!("{}: {}", "URL".green(), request.url.cyan());
    }

    let client = create_client(config.timeout)?;
    let detail: PokemonDetail = fetch_json(&client, &request)
        .await
        .map_err(Error::from)
        .wrap_err_with(|| format!("Failed to fetch Pokémon '{}'", options.name))?;
    let card = DetailNormalizer.normalize(detail).card();

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&card)
                .map_err(|e| eyre!("JSON serialization failed: {}", e))?
        );
        return Ok(());
    }

    let mut table = crate::prelude::new_detail_table();
    table.add_row(prettytable::row!["Name", card.title]);
    if let Some(number) = &card.subtitle {
        table.add_row(prettytable::row!["Number", number]);
    }
    for field in &card.fields {
        table.add_row(prettytable::row![field.label, field.value]);
    }
    if let Some(url) = &card.image_url {
        table.add_row(prettytable::row!["Sprite", url]);
    }
    table.printstd();

    Ok(())
}
