use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::endpoint::{id_to_string, non_empty, Endpoint, Normalizer, Request};
use crate::engine::text_asc;
use crate::format::{capitalize, truncate};
use crate::item::{Item, PageOptions, Pagination, SortKey, UnknownSortKey};
use crate::view::Card;

pub const MEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const BACKEND_BASE_URL: &str = "http://127.0.0.1:3000";

const BACKEND_MAX_LIMIT: u32 = 100;
const MEALDB_BATCH: u32 = 100;
const UNTITLED: &str = "Untitled recipe";
const SUMMARY_CHARS: usize = 100;

/// Normalized recipe or recipe category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl Recipe {
    pub fn named(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: None,
            description: None,
            image_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipeSort {
    #[default]
    Name,
    Category,
}

impl std::fmt::Display for RecipeSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeSort::Name => write!(f, "name"),
            RecipeSort::Category => write!(f, "category"),
        }
    }
}

impl std::str::FromStr for RecipeSort {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(RecipeSort::Name),
            "category" => Ok(RecipeSort::Category),
            other => Err(UnknownSortKey::new::<Recipe, RecipeSort>(other)),
        }
    }
}

impl SortKey<Recipe> for RecipeSort {
    const ALL: &'static [Self] = &[RecipeSort::Name, RecipeSort::Category];

    fn compare(self, a: &Recipe, b: &Recipe) -> Ordering {
        match self {
            RecipeSort::Name => text_asc(&a.name, &b.name),
            RecipeSort::Category => text_asc(
                a.category.as_deref().unwrap_or_default(),
                b.category.as_deref().unwrap_or_default(),
            )
            .then_with(|| text_asc(&a.name, &b.name)),
        }
    }
}

impl Item for Recipe {
    type SortKey = RecipeSort;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        if let Some(category) = &self.category {
            fields.push(category);
        }
        fields
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn detail_url(&self) -> Option<&str> {
        None
    }

    fn card(&self) -> Card {
        Card::for_item(self)
            .subtitle(self.category.as_deref().map(capitalize).unwrap_or_default())
            .summary(
                self.description
                    .as_deref()
                    .map(|text| truncate(text, SUMMARY_CHARS)),
            )
    }
}

// ============================================================================
// TheMealDB
// ============================================================================

/// Record of `GET /categories.php`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MealDbCategory {
    #[serde(rename = "idCategory")]
    pub id: Option<String>,
    #[serde(rename = "strCategory")]
    pub name: Option<String>,
    #[serde(rename = "strCategoryThumb")]
    pub thumb: Option<String>,
    #[serde(rename = "strCategoryDescription")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MealDbNormalizer;

impl Normalizer for MealDbNormalizer {
    type Raw = MealDbCategory;
    type Item = Recipe;

    fn normalize(&self, raw: MealDbCategory) -> Recipe {
        let name = non_empty(raw.name).unwrap_or_else(|| UNTITLED.to_string());
        let id = non_empty(raw.id).unwrap_or_else(|| name.clone());

        Recipe {
            description: non_empty(raw.description),
            image_url: non_empty(raw.thumb),
            ..Recipe::named(&id, &name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct MealDb {
    base_url: String,
}

impl MealDb {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Endpoint for MealDb {
    type Raw = MealDbCategory;

    fn backend(&self) -> &'static str {
        "mealdb"
    }

    fn max_per_page(&self) -> u32 {
        MEALDB_BATCH
    }

    /// The categories endpoint has no paging; every category comes back at once.
    fn request(&self, _options: PageOptions) -> Request {
        Request::get(&self.base_url, "categories.php")
    }

    fn pagination(&self) -> Pagination {
        Pagination::Client {
            batch_size: MEALDB_BATCH,
        }
    }
}

// ============================================================================
// Bespoke backend
// ============================================================================

/// Record of the local backend's `GET /recetas` (MongoDB documents)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendRecipe {
    pub id: Option<serde_json::Value>,
    #[serde(rename = "_id")]
    pub mongo_id: Option<serde_json::Value>,
    pub nombre: Option<String>,
    pub name: Option<String>,
    pub categoria: Option<String>,
    pub category: Option<String>,
    pub instrucciones: Option<String>,
    pub instructions: Option<String>,
    pub imagen: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BackendNormalizer;

impl Normalizer for BackendNormalizer {
    type Raw = BackendRecipe;
    type Item = Recipe;

    fn normalize(&self, raw: BackendRecipe) -> Recipe {
        let name = non_empty(raw.nombre)
            .or_else(|| non_empty(raw.name))
            .unwrap_or_else(|| UNTITLED.to_string());
        let id = id_to_string(raw.id.as_ref())
            .or_else(|| id_to_string(raw.mongo_id.as_ref()))
            .unwrap_or_else(|| name.clone());

        Recipe {
            category: non_empty(raw.categoria).or_else(|| non_empty(raw.category)),
            description: non_empty(raw.instrucciones).or_else(|| non_empty(raw.instructions)),
            image_url: non_empty(raw.imagen).or_else(|| non_empty(raw.image)),
            ..Recipe::named(&id, &name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecipesBackend {
    base_url: String,
}

impl RecipesBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Endpoint for RecipesBackend {
    type Raw = BackendRecipe;

    fn backend(&self) -> &'static str {
        "local"
    }

    fn max_per_page(&self) -> u32 {
        BACKEND_MAX_LIMIT
    }

    fn request(&self, options: PageOptions) -> Request {
        let options = options.clamped(BACKEND_MAX_LIMIT);
        Request::get(&self.base_url, "recetas")
            .param("page", options.page)
            .param("limit", options.per_page)
    }

    fn pagination(&self) -> Pagination {
        Pagination::Client {
            batch_size: BACKEND_MAX_LIMIT,
        }
    }
}
