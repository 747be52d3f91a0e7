use std::time::Duration;

use cardgrid_core::{anime, crypto, pokemon, recipes};

use crate::prelude::*;

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Base URL of every supported backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls {
    pub pokeapi: String,
    pub pokemon_backend: String,
    pub mealdb: String,
    pub recipes_backend: String,
    pub jikan: String,
    pub anime_backend: String,
    pub coingecko: String,
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            pokeapi: pokemon::POKEAPI_BASE_URL.to_string(),
            pokemon_backend: pokemon::BACKEND_BASE_URL.to_string(),
            mealdb: recipes::MEALDB_BASE_URL.to_string(),
            recipes_backend: recipes::BACKEND_BASE_URL.to_string(),
            jikan: anime::JIKAN_BASE_URL.to_string(),
            anime_backend: anime::BACKEND_BASE_URL.to_string(),
            coingecko: crypto::COINGECKO_BASE_URL.to_string(),
        }
    }
}

/// Runtime configuration shared by every domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardgridConfig {
    pub timeout: Duration,
    pub debounce: Duration,
    pub vs_currency: String,
    pub base_urls: BaseUrls,
}

impl Default for CardgridConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            vs_currency: crypto::DEFAULT_VS_CURRENCY.to_string(),
            base_urls: BaseUrls::default(),
        }
    }
}

impl CardgridConfig {
    /// Load configuration from environment variables
    ///
    /// Every variable is optional:
    /// - `CARDGRID_TIMEOUT_SECS`, `CARDGRID_DEBOUNCE_MS`, `CARDGRID_VS_CURRENCY`
    /// - `POKEAPI_BASE_URL`, `POKEMON_BACKEND_URL`, `MEALDB_BASE_URL`,
    ///   `RECIPES_BACKEND_URL`, `JIKAN_BASE_URL`, `ANIME_BACKEND_URL`,
    ///   `COINGECKO_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CardgridConfig::from_env`] with an explicit variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let url = |key: &str, default: String| var(key).unwrap_or(default);

        let timeout = match var("CARDGRID_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("CARDGRID_TIMEOUT_SECS", &raw)?),
            None => defaults.timeout,
        };
        let debounce = match var("CARDGRID_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(parse_number("CARDGRID_DEBOUNCE_MS", &raw)?),
            None => defaults.debounce,
        };

        let base = defaults.base_urls;
        Ok(Self {
            timeout,
            debounce,
            vs_currency: var("CARDGRID_VS_CURRENCY")
                .map(|v| v.to_lowercase())
                .unwrap_or(defaults.vs_currency),
            base_urls: BaseUrls {
                pokeapi: url("POKEAPI_BASE_URL", base.pokeapi),
                pokemon_backend: url("POKEMON_BACKEND_URL", base.pokemon_backend),
                mealdb: url("MEALDB_BASE_URL", base.mealdb),
                recipes_backend: url("RECIPES_BACKEND_URL", base.recipes_backend),
                jikan: url("JIKAN_BASE_URL", base.jikan),
                anime_backend: url("ANIME_BACKEND_URL", base.anime_backend),
                coingecko: url("COINGECKO_BASE_URL", base.coingecko),
            },
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, timeout_secs: Option<u64>, debounce_ms: Option<u64>) -> Self {
        if let Some(secs) = timeout_secs.filter(|secs| *secs > 0) {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = debounce_ms {
            self.debounce = Duration::from_millis(ms);
        }
        self
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|_| Error::Config(format!("{key} must be a whole number, got '{raw}'")).into())
}

fn parse_positive(key: &str, raw: &str) -> Result<u64> {
    match parse_number(key, raw)? {
        0 => Err(Error::Config(format!("{key} must be greater than zero")).into()),
        value => Ok(value),
    }
}
