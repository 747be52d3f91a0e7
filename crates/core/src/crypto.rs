use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::endpoint::{non_empty, Endpoint, Normalizer, Request};
use crate::engine::numeric_desc;
use crate::format::{format_currency, format_percentage};
use crate::item::{Item, PageOptions, Pagination, SortKey, UnknownSortKey};
use crate::view::{Card, Tone};

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_VS_CURRENCY: &str = "usd";

const COINGECKO_MAX_PER_PAGE: u32 = 250;
const COIN_PAGE_URL: &str = "https://www.coingecko.com/en/coins";
const UNNAMED: &str = "Unknown coin";

/// Normalized market entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image_url: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub change_24h: Option<f64>,
    pub detail_url: Option<String>,
}

impl Coin {
    pub fn named(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: String::new(),
            name: name.to_string(),
            image_url: None,
            current_price: None,
            market_cap: None,
            change_24h: None,
            detail_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CryptoSort {
    #[default]
    MarketCap,
    Price,
    Change,
}

impl std::fmt::Display for CryptoSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoSort::MarketCap => write!(f, "market_cap"),
            CryptoSort::Price => write!(f, "price"),
            CryptoSort::Change => write!(f, "change"),
        }
    }
}

impl std::str::FromStr for CryptoSort {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "market_cap" | "market-cap" | "mcap" => Ok(CryptoSort::MarketCap),
            "price" => Ok(CryptoSort::Price),
            "change" => Ok(CryptoSort::Change),
            other => Err(UnknownSortKey::new::<Coin, CryptoSort>(other)),
        }
    }
}

impl SortKey<Coin> for CryptoSort {
    const ALL: &'static [Self] = &[CryptoSort::MarketCap, CryptoSort::Price, CryptoSort::Change];

    fn compare(self, a: &Coin, b: &Coin) -> Ordering {
        match self {
            CryptoSort::MarketCap => numeric_desc(a.market_cap, b.market_cap),
            CryptoSort::Price => numeric_desc(a.current_price, b.current_price),
            CryptoSort::Change => numeric_desc(a.change_24h, b.change_24h),
        }
    }
}

impl Item for Coin {
    type SortKey = CryptoSort;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.symbol]
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn detail_url(&self) -> Option<&str> {
        self.detail_url.as_deref()
    }

    fn card(&self) -> Card {
        let mut card = Card::for_item(self);
        if !self.symbol.is_empty() {
            card.title = format!("{} ({})", self.name, self.symbol.to_uppercase());
        }

        card.field("Mcap", format_currency(self.market_cap))
            .field("Price", format_currency(self.current_price))
            .badge(format_percentage(self.change_24h), Tone::of(self.change_24h))
    }
}

// ============================================================================
// CoinGecko
// ============================================================================

/// Record of `GET /coins/markets`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoinGeckoCoin {
    pub id: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_24h_in_currency: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoinGeckoNormalizer;

impl Normalizer for CoinGeckoNormalizer {
    type Raw = CoinGeckoCoin;
    type Item = Coin;

    fn normalize(&self, raw: CoinGeckoCoin) -> Coin {
        let symbol = non_empty(raw.symbol).unwrap_or_default();
        let name = non_empty(raw.name)
            .or_else(|| (!symbol.is_empty()).then(|| symbol.to_uppercase()))
            .unwrap_or_else(|| UNNAMED.to_string());
        let id = non_empty(raw.id);

        Coin {
            symbol,
            image_url: non_empty(raw.image),
            current_price: raw.current_price,
            market_cap: raw.market_cap,
            change_24h: raw
                .price_change_percentage_24h
                .or(raw.price_change_percentage_24h_in_currency),
            detail_url: id.as_ref().map(|id| format!("{COIN_PAGE_URL}/{id}")),
            ..Coin::named(id.as_deref().unwrap_or(&name), &name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoinGecko {
    base_url: String,
    vs_currency: String,
}

impl CoinGecko {
    pub fn new(base_url: impl Into<String>, vs_currency: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            vs_currency: vs_currency.into(),
        }
    }
}

impl Endpoint for CoinGecko {
    type Raw = CoinGeckoCoin;

    fn backend(&self) -> &'static str {
        "coingecko"
    }

    fn max_per_page(&self) -> u32 {
        COINGECKO_MAX_PER_PAGE
    }

    fn request(&self, options: PageOptions) -> Request {
        let options = options.clamped(COINGECKO_MAX_PER_PAGE);
        Request::get(&self.base_url, "coins/markets")
            .param("vs_currency", &self.vs_currency)
            .param("order", "market_cap_desc")
            .param("per_page", options.per_page)
            .param("page", options.page)
            .param("sparkline", false)
            .param("price_change_percentage", "24h")
    }

    fn pagination(&self) -> Pagination {
        Pagination::Server
    }
}
