//! Pieces shared by the four domain commands.

use colored::Colorize;

use cardgrid_core::endpoint::Endpoint;
use cardgrid_core::endpoint::Normalizer;
use cardgrid_core::item::{Item, PageOptions};
use cardgrid_core::state::Query;
use cardgrid_core::view::View;

use crate::adapter::HttpAdapter;
use crate::config::CardgridConfig;
use crate::controller::{Controller, Settings};
use crate::output::{output_view, ListContext};
use crate::prelude::{eprintln, *};

/// Static description of one domain
#[derive(Debug, Clone, Copy)]
pub struct Domain {
    /// CLI name, e.g. `pokemon`
    pub name: &'static str,
    pub title: &'static str,
    pub page_size: usize,
}

impl Domain {
    pub fn context<'a>(&'a self, backend: &'a str) -> ListContext<'a> {
        ListContext {
            domain: self.name,
            title: self.title,
            backend,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct ListOptions {
    /// Override the backend's base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Case-insensitive search text
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Sort key (defaults to the domain's first key)
    #[arg(long)]
    pub sort: Option<String>,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Number of cards per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct BrowseOptions {
    /// Override the backend's base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Initial sort key
    #[arg(long)]
    pub sort: Option<String>,

    /// Number of cards per page
    #[arg(long)]
    pub page_size: Option<usize>,
}

/// Parse a sort key name, falling back to the item's default
pub fn parse_sort<I: Item>(sort: Option<&str>) -> Result<I::SortKey> {
    match sort {
        Some(name) => Ok(name.parse::<I::SortKey>().map_err(Error::from)?),
        None => Ok(I::SortKey::default()),
    }
}

/// Build settings from CLI options and configuration
pub fn settings<E: Endpoint, I: Item>(
    domain: &Domain,
    endpoint: &E,
    page_size: Option<usize>,
    query: Query<I::SortKey>,
    config: &CardgridConfig,
) -> Settings<I::SortKey> {
    Settings::for_endpoint(endpoint, page_size.unwrap_or(domain.page_size))
        .with_debounce(config.debounce)
        .with_query(query)
}

pub fn print_verbose<E: Endpoint>(endpoint: &E, page: usize, page_size: usize) {
    let request = endpoint.request(PageOptions::new(page as u32, page_size as u32));
    eprintln!("{}: {}", "Backend".green(), endpoint.backend());
    eprintln!("{}: {}", "URL".green(), request.url.cyan());
    eprintln!("{}: {:?}", "Pagination".green(), endpoint.pagination());
    eprintln!();
}

/// Fetch one page of a list and print it
pub async fn run_list<E, N>(
    domain: &Domain,
    endpoint: E,
    normalizer: N,
    options: ListOptions,
    config: &CardgridConfig,
    global: &crate::Global,
) -> Result<()>
where
    E: Endpoint,
    N: Normalizer<Raw = E::Raw>,
{
    let query = Query {
        search: options.search.clone(),
        sort: parse_sort::<N::Item>(options.sort.as_deref())?,
        page: options.page.max(1),
    };
    let settings = settings::<E, N::Item>(domain, &endpoint, options.page_size, query, config);

    if global.verbose {
        print_verbose(&endpoint, options.page.max(1), settings.page_size);
    }

    let backend = endpoint.backend();
    let adapter = HttpAdapter::new(endpoint, config.timeout)?;
    let mut controller = Controller::new(adapter, normalizer, settings);

    controller.init();
    controller.settle().await;

    let view = controller.view();
    output_view(&view, &domain.context(backend), options.json)?;

    match view {
        View::Error { error, .. } => Err(Error::Fetch(error).into()),
        _ => Ok(()),
    }
}
