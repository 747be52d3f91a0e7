use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::endpoint::{id_to_string, non_empty, Endpoint, Normalizer, Request};
use crate::engine::{numeric_asc, text_asc};
use crate::format::capitalize;
use crate::item::{Item, PageOptions, Pagination, SortKey, UnknownSortKey};
use crate::view::Card;

pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const BACKEND_BASE_URL: &str = "http://127.0.0.1:8000";

const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";
const POKEAPI_MAX_LIMIT: u32 = 1000;
const BACKEND_BATCH: u32 = 1000;
const UNKNOWN_NAME: &str = "unknown";

/// Normalized Pokémon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    /// Single type reported by the bespoke backend
    pub kind: Option<String>,
    /// Types reported by PokeAPI detail records
    pub types: Vec<String>,
    pub level: Option<u32>,
    pub weight: Option<u32>,
    pub height: Option<u32>,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
}

impl Pokemon {
    pub fn named(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: None,
            types: vec![],
            level: None,
            weight: None,
            height: None,
            image_url: None,
            detail_url: None,
        }
    }

    fn type_label(&self) -> Option<String> {
        if !self.types.is_empty() {
            return Some(capitalize(&self.types.join(" / ")));
        }
        self.kind.as_deref().map(capitalize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PokemonSort {
    #[default]
    Id,
    Name,
    Weight,
    Level,
}

impl std::fmt::Display for PokemonSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PokemonSort::Id => write!(f, "id"),
            PokemonSort::Name => write!(f, "name"),
            PokemonSort::Weight => write!(f, "weight"),
            PokemonSort::Level => write!(f, "level"),
        }
    }
}

impl std::str::FromStr for PokemonSort {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(PokemonSort::Id),
            "name" => Ok(PokemonSort::Name),
            "weight" => Ok(PokemonSort::Weight),
            "level" => Ok(PokemonSort::Level),
            other => Err(UnknownSortKey::new::<Pokemon, PokemonSort>(other)),
        }
    }
}

impl SortKey<Pokemon> for PokemonSort {
    const ALL: &'static [Self] = &[
        PokemonSort::Id,
        PokemonSort::Name,
        PokemonSort::Weight,
        PokemonSort::Level,
    ];

    fn compare(self, a: &Pokemon, b: &Pokemon) -> Ordering {
        match self {
            PokemonSort::Id => a.id.cmp(&b.id),
            PokemonSort::Name => text_asc(&a.name, &b.name),
            PokemonSort::Weight => numeric_asc(a.weight.map(f64::from), b.weight.map(f64::from)),
            PokemonSort::Level => numeric_asc(a.level.map(f64::from), b.level.map(f64::from)),
        }
    }
}

impl Item for Pokemon {
    type SortKey = PokemonSort;

    fn key(&self) -> String {
        if self.id > 0 {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name]
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn detail_url(&self) -> Option<&str> {
        self.detail_url.as_deref()
    }

    fn card(&self) -> Card {
        let mut card = Card::for_item(self);
        card.title = capitalize(&self.name);

        let mut card = card.subtitle(if self.id > 0 {
            format!("#{:03}", self.id)
        } else {
            String::new()
        });

        if let Some(label) = self.type_label() {
            card = card.field("Type", label);
        }
        if let Some(level) = self.level {
            card = card.field("Level", level.to_string());
        }
        if let Some(weight) = self.weight {
            card = card.field("Weight", weight.to_string());
        }
        if let Some(height) = self.height {
            card = card.field("Height", height.to_string());
        }
        card
    }
}

// ============================================================================
// PokeAPI list
// ============================================================================

/// Entry of `GET /pokemon`: only a name and the detail URL
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PokeApiEntry {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Extract the numeric id from a resource URL such as `.../pokemon/4/`
pub fn id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

pub fn sprite_url(id: u32) -> String {
    format!("{SPRITE_BASE_URL}/{id}.png")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PokeApiNormalizer;

impl Normalizer for PokeApiNormalizer {
    type Raw = PokeApiEntry;
    type Item = Pokemon;

    fn normalize(&self, raw: PokeApiEntry) -> Pokemon {
        let id = raw.url.as_deref().and_then(id_from_url).unwrap_or(0);
        let name = non_empty(raw.name).unwrap_or_else(|| UNKNOWN_NAME.to_string());

        Pokemon {
            image_url: (id > 0).then(|| sprite_url(id)),
            detail_url: non_empty(raw.url),
            ..Pokemon::named(id, &name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PokeApi {
    base_url: String,
}

impl PokeApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Endpoint for PokeApi {
    type Raw = PokeApiEntry;

    fn backend(&self) -> &'static str {
        "pokeapi"
    }

    fn max_per_page(&self) -> u32 {
        POKEAPI_MAX_LIMIT
    }

    fn request(&self, options: PageOptions) -> Request {
        let options = options.clamped(POKEAPI_MAX_LIMIT);
        Request::get(&self.base_url, "pokemon")
            .param("limit", options.per_page)
            .param("offset", options.offset())
    }

    fn pagination(&self) -> Pagination {
        Pagination::Server
    }
}

// ============================================================================
// PokeAPI detail
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PokemonDetail {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub weight: Option<u32>,
    pub height: Option<u32>,
    pub sprites: Option<Sprites>,
    pub types: Vec<TypeSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sprites {
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: Option<NamedResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamedResource {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DetailNormalizer;

impl Normalizer for DetailNormalizer {
    type Raw = PokemonDetail;
    type Item = Pokemon;

    fn normalize(&self, raw: PokemonDetail) -> Pokemon {
        let id = raw.id.unwrap_or(0);
        let name = non_empty(raw.name).unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let image_url = raw
            .sprites
            .and_then(|s| non_empty(s.front_default))
            .or_else(|| (id > 0).then(|| sprite_url(id)));

        Pokemon {
            types: raw
                .types
                .into_iter()
                .filter_map(|slot| slot.kind.and_then(|k| non_empty(k.name)))
                .collect(),
            weight: raw.weight,
            height: raw.height,
            image_url,
            ..Pokemon::named(id, &name)
        }
    }
}

/// Request for one PokeAPI detail record by name or id
///
/// A blank name would address the list endpoint instead, so it yields `None`.
pub fn detail_request(base_url: &str, name_or_id: &str) -> Option<Request> {
    let name = name_or_id.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some(Request::get(base_url, &format!("pokemon/{name}")))
}

// ============================================================================
// Bespoke backend
// ============================================================================

/// Record of the local backend's `GET /pokemons`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendPokemon {
    pub id: Option<serde_json::Value>,
    #[serde(rename = "_id")]
    pub mongo_id: Option<serde_json::Value>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub level: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BackendNormalizer;

impl Normalizer for BackendNormalizer {
    type Raw = BackendPokemon;
    type Item = Pokemon;

    fn normalize(&self, raw: BackendPokemon) -> Pokemon {
        let id = [raw.id, raw.mongo_id]
            .iter()
            .filter_map(|id| id_to_string(id.as_ref()))
            .find_map(|id| id.parse().ok())
            .unwrap_or(0);
        let name = non_empty(raw.name).unwrap_or_else(|| UNKNOWN_NAME.to_string());

        Pokemon {
            kind: non_empty(raw.kind),
            level: raw.level,
            ..Pokemon::named(id, &name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PokemonBackend {
    base_url: String,
}

impl PokemonBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Endpoint for PokemonBackend {
    type Raw = BackendPokemon;

    fn backend(&self) -> &'static str {
        "local"
    }

    fn max_per_page(&self) -> u32 {
        BACKEND_BATCH
    }

    /// The backend returns its whole collection and takes no paging parameters.
    fn request(&self, _options: PageOptions) -> Request {
        Request::get(&self.base_url, "pokemons")
    }

    fn pagination(&self) -> Pagination {
        Pagination::Client {
            batch_size: BACKEND_BATCH,
        }
    }
}
