use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::endpoint::{id_to_string, non_empty, Endpoint, Normalizer, Request};
use crate::engine::{numeric_desc, text_asc};
use crate::format::{clean_synopsis, format_date, year_of};
use crate::item::{Item, PageOptions, Pagination, SortKey, UnknownSortKey};
use crate::view::{Card, Tone};

pub const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";
pub const BACKEND_BASE_URL: &str = "http://127.0.0.1:3001";

const JIKAN_MAX_LIMIT: u32 = 25;
const BACKEND_MAX_LIMIT: u32 = 100;
const UNTITLED: &str = "Untitled";

/// Normalized anime
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anime {
    pub id: String,
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub image_url: Option<String>,
    pub aired_from: Option<String>,
    pub year: Option<i32>,
    pub kind: Option<String>,
    pub episodes: Option<u32>,
    pub score: Option<f64>,
    pub synopsis: Option<String>,
    pub url: Option<String>,
}

impl Anime {
    pub fn titled(id: u64, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            title_english: None,
            title_japanese: None,
            image_url: None,
            aired_from: None,
            year: None,
            kind: None,
            episodes: None,
            score: None,
            synopsis: None,
            url: None,
        }
    }

    /// `03/04/1998 · TV · 26 ep.`
    fn meta_line(&self) -> String {
        let when = match (&self.aired_from, self.year) {
            (Some(date), _) => format_date(Some(date.as_str())),
            (None, Some(year)) => year.to_string(),
            (None, None) => "N/A".to_string(),
        };

        let mut parts = vec![when];
        if let Some(kind) = &self.kind {
            parts.push(kind.clone());
        }
        if let Some(episodes) = self.episodes.filter(|e| *e > 0) {
            parts.push(format!("{episodes} ep."));
        }
        parts.join(" · ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimeSort {
    #[default]
    Score,
    Title,
    Year,
    Episodes,
}

impl std::fmt::Display for AnimeSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimeSort::Score => write!(f, "score"),
            AnimeSort::Title => write!(f, "title"),
            AnimeSort::Year => write!(f, "year"),
            AnimeSort::Episodes => write!(f, "episodes"),
        }
    }
}

impl std::str::FromStr for AnimeSort {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "score" => Ok(AnimeSort::Score),
            "title" => Ok(AnimeSort::Title),
            "year" => Ok(AnimeSort::Year),
            "episodes" => Ok(AnimeSort::Episodes),
            other => Err(UnknownSortKey::new::<Anime, AnimeSort>(other)),
        }
    }
}

impl SortKey<Anime> for AnimeSort {
    const ALL: &'static [Self] = &[
        AnimeSort::Score,
        AnimeSort::Title,
        AnimeSort::Year,
        AnimeSort::Episodes,
    ];

    fn compare(self, a: &Anime, b: &Anime) -> Ordering {
        match self {
            AnimeSort::Score => numeric_desc(a.score, b.score),
            AnimeSort::Title => text_asc(&a.title, &b.title),
            AnimeSort::Year => numeric_desc(a.year.map(f64::from), b.year.map(f64::from)),
            AnimeSort::Episodes => {
                numeric_desc(a.episodes.map(f64::from), b.episodes.map(f64::from))
            }
        }
    }
}

impl Item for Anime {
    type SortKey = AnimeSort;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            self.title_english.as_deref(),
            self.title_japanese.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn detail_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn card(&self) -> Card {
        let score = self
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        Card::for_item(self)
            .subtitle(self.meta_line())
            .badge(format!("⭐ {score}"), Tone::Neutral)
            .summary(clean_synopsis(self.synopsis.as_deref()))
    }
}

// ============================================================================
// Jikan
// ============================================================================

/// Record of Jikan's `GET /top/anime`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanAnime {
    pub mal_id: Option<u64>,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub images: Option<JikanImages>,
    pub aired: Option<JikanAired>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub episodes: Option<u32>,
    pub score: Option<f64>,
    pub synopsis: Option<String>,
    pub url: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanImages {
    pub jpg: Option<JikanImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanImage {
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanAired {
    pub from: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JikanNormalizer;

impl Normalizer for JikanNormalizer {
    type Raw = JikanAnime;
    type Item = Anime;

    fn normalize(&self, raw: JikanAnime) -> Anime {
        let title_english = non_empty(raw.title_english);
        let title = non_empty(raw.title)
            .or_else(|| title_english.clone())
            .unwrap_or_else(|| UNTITLED.to_string());
        let id = raw.mal_id.map(|id| id.to_string()).unwrap_or_else(|| title.clone());
        let aired_from = raw.aired.and_then(|a| non_empty(a.from));
        let year = raw.year.or_else(|| year_of(aired_from.as_deref()));

        Anime {
            id,
            title,
            title_english,
            title_japanese: non_empty(raw.title_japanese),
            image_url: raw
                .images
                .and_then(|images| images.jpg)
                .and_then(|jpg| non_empty(jpg.image_url)),
            aired_from,
            year,
            kind: non_empty(raw.kind),
            episodes: raw.episodes,
            score: raw.score,
            synopsis: non_empty(raw.synopsis),
            url: non_empty(raw.url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Jikan {
    base_url: String,
}

impl Jikan {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Endpoint for Jikan {
    type Raw = JikanAnime;

    fn backend(&self) -> &'static str {
        "jikan"
    }

    fn max_per_page(&self) -> u32 {
        JIKAN_MAX_LIMIT
    }

    fn request(&self, options: PageOptions) -> Request {
        let options = options.clamped(JIKAN_MAX_LIMIT);
        Request::get(&self.base_url, "top/anime")
            .param("limit", options.per_page)
            .param("page", options.page)
    }

    fn pagination(&self) -> Pagination {
        Pagination::Server
    }
}

// ============================================================================
// Bespoke backend
// ============================================================================

/// Record of the local backend's `GET /anime` (already flattened)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendAnime {
    pub id: Option<serde_json::Value>,
    #[serde(rename = "_id")]
    pub mongo_id: Option<serde_json::Value>,
    pub mal_id: Option<serde_json::Value>,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub image_url: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub episodes: Option<u32>,
    pub score: Option<f64>,
    pub synopsis: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BackendNormalizer;

impl Normalizer for BackendNormalizer {
    type Raw = BackendAnime;
    type Item = Anime;

    fn normalize(&self, raw: BackendAnime) -> Anime {
        let title_english = non_empty(raw.title_english);
        let title = non_empty(raw.title)
            .or_else(|| title_english.clone())
            .unwrap_or_else(|| UNTITLED.to_string());
        let id = [raw.id, raw.mal_id, raw.mongo_id]
            .iter()
            .find_map(|id| id_to_string(id.as_ref()))
            .unwrap_or_else(|| title.clone());

        Anime {
            id,
            title,
            title_english,
            title_japanese: non_empty(raw.title_japanese),
            image_url: non_empty(raw.image_url),
            aired_from: None,
            year: raw.year,
            kind: non_empty(raw.kind),
            episodes: raw.episodes,
            score: raw.score,
            synopsis: non_empty(raw.synopsis),
            url: non_empty(raw.url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimeBackend {
    base_url: String,
}

impl AnimeBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Endpoint for AnimeBackend {
    type Raw = BackendAnime;

    fn backend(&self) -> &'static str {
        "local"
    }

    fn max_per_page(&self) -> u32 {
        BACKEND_MAX_LIMIT
    }

    fn request(&self, options: PageOptions) -> Request {
        let options = options.clamped(BACKEND_MAX_LIMIT);
        Request::get(&self.base_url, "anime")
            .param("limit", options.per_page)
            .param("page", options.page)
    }

    fn pagination(&self) -> Pagination {
        Pagination::Server
    }
}
