use cardgrid_core::error::FetchError;
use cardgrid_core::item::UnknownSortKey;
use cardgrid_core::state::StateError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown command '{0}', type 'help' for the list of commands")]
    UnknownCommand(String),

    #[error("A Pokémon name or number is required")]
    MissingName,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    SortKey(#[from] UnknownSortKey),

    #[error("Request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    State(#[from] StateError),
}
