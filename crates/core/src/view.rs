//! View rendering: list state in, display structure out.
//!
//! Rendering never touches the network or the state it reads.

use serde::Serialize;

use crate::error::FetchError;
use crate::item::{Item, Pagination};
use crate::state::{ListState, Phase};

/// How a badge should be emphasised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    pub fn of(value: Option<f64>) -> Self {
        match value {
            Some(v) if v > 0.0 => Tone::Positive,
            Some(v) if v < 0.0 => Tone::Negative,
            _ => Tone::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

/// One rendered item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub key: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub fields: Vec<Field>,
    pub badge: Option<Badge>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
}

impl Card {
    /// Start a card from the fields every item has
    pub fn for_item<I: Item>(item: &I) -> Self {
        Self {
            key: item.key(),
            title: item.display_name().to_string(),
            subtitle: None,
            fields: vec![],
            badge: None,
            summary: None,
            image_url: item.image_url().map(str::to_string),
            detail_url: item.detail_url().map(str::to_string),
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        let subtitle = subtitle.into();
        if !subtitle.is_empty() {
            self.subtitle = Some(subtitle);
        }
        self
    }

    pub fn field(mut self, label: &str, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            label: label.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn badge(mut self, text: impl Into<String>, tone: Tone) -> Self {
        self.badge = Some(Badge {
            text: text.into(),
            tone,
        });
        self
    }

    pub fn summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }
}

/// Position within the list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: Option<usize>,
    pub page_size: usize,
    /// 1-based index of the first visible item (0 when nothing is visible)
    pub showing_from: usize,
    pub showing_to: usize,
    /// Matching items across the whole list; unknown when paged on the server
    pub total_items: Option<usize>,
    pub has_prev: bool,
    pub has_next: bool,
    pub pagination: Pagination,
}

/// Shown above stale data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "notice")]
pub enum Notice {
    /// A reload is in flight; the cards are from the previous fetch
    Refreshing,
    /// The last reload failed; the cards are from the previous fetch
    Stale { error: FetchError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "view")]
pub enum View {
    Idle,
    Loading,
    /// Nothing was ever loaded and the fetch failed
    Error { error: FetchError, retryable: bool },
    /// Data is loaded but the search leaves nothing to show
    Empty {
        search: String,
        notice: Option<Notice>,
    },
    Grid {
        cards: Vec<Card>,
        page: PageInfo,
        sort: String,
        search: String,
        notice: Option<Notice>,
    },
}

/// Render the current state of a list
pub fn render<I: Item>(state: &ListState<I>) -> View {
    let notice = match state.phase() {
        Phase::Idle => return View::Idle,
        Phase::Loading if state.items().is_empty() => return View::Loading,
        Phase::Error if state.items().is_empty() => {
            let error = state
                .last_error()
                .cloned()
                .unwrap_or_else(|| FetchError::network("unknown failure"));
            let retryable = error.is_retryable();
            return View::Error { error, retryable };
        }
        Phase::Loading => Some(Notice::Refreshing),
        Phase::Error => state
            .last_error()
            .cloned()
            .map(|error| Notice::Stale { error }),
        Phase::Ready => None,
    };

    if state.filtered().is_empty() {
        return View::Empty {
            search: state.search().to_string(),
            notice,
        };
    }

    View::Grid {
        cards: render_cards(state.visible()),
        page: page_info(state),
        sort: state.sort().to_string(),
        search: state.search().to_string(),
        notice,
    }
}

pub fn render_cards<I: Item>(items: &[I]) -> Vec<Card> {
    items.iter().map(Item::card).collect()
}

fn page_info<I: Item>(state: &ListState<I>) -> PageInfo {
    let visible = state.visible().len();
    let total_items = match state.pagination() {
        Pagination::Server => None,
        Pagination::Client { .. } => Some(state.filtered().len()),
    };

    let (showing_from, showing_to) = if visible == 0 {
        (0, 0)
    } else {
        let first = (state.page() - 1) * state.page_size() + 1;
        (first, first + visible - 1)
    };

    PageInfo {
        page: state.page(),
        total_pages: state.total_pages(),
        page_size: state.page_size(),
        showing_from,
        showing_to,
        total_items,
        has_prev: state.has_prev(),
        has_next: state.has_next(),
        pagination: state.pagination(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokemon::Pokemon;
    use crate::state::Query;

    const CLIENT: Pagination = Pagination::Client { batch_size: 100 };

    fn ready(items: Vec<Pokemon>, page_size: usize) -> ListState<Pokemon> {
        let mut state = ListState::new(page_size, CLIENT);
        let ticket = state.begin_fetch(1);
        state.resolve(ticket.token, Ok(items));
        state
    }

    fn starters() -> Vec<Pokemon> {
        vec![
            Pokemon::named(1, "bulbasaur"),
            Pokemon::named(4, "charmander"),
            Pokemon::named(7, "squirtle"),
        ]
    }

    #[test]
    fn test_idle_view() {
        let state: ListState<Pokemon> = ListState::new(10, CLIENT);
        assert_eq!(render(&state), View::Idle);
    }

    #[test]
    fn test_loading_view_on_first_fetch() {
        let mut state: ListState<Pokemon> = ListState::new(10, CLIENT);
        state.begin_fetch(1);
        assert_eq!(render(&state), View::Loading);
    }

    #[test]
    fn test_error_view_on_first_failure() {
        let mut state: ListState<Pokemon> = ListState::new(10, CLIENT);
        let ticket = state.begin_fetch(1);
        state.resolve(ticket.token, Err(FetchError::http_status(500, "")));

        match render(&state) {
            View::Error { error, retryable } => {
                assert_eq!(error.detail, "status 500");
                assert!(retryable);
            }
            other => panic!("expected error view, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_grid_after_failed_reload() {
        let mut state = ready(starters(), 10);
        let ticket = state.begin_fetch(1);
        state.resolve(ticket.token, Err(FetchError::network("timed out")));

        match render(&state) {
            View::Grid { cards, notice, .. } => {
                assert_eq!(cards.len(), 3);
                assert!(matches!(notice, Some(Notice::Stale { .. })));
            }
            other => panic!("expected stale grid, got {other:?}"),
        }
    }

    #[test]
    fn test_refreshing_grid_while_reloading() {
        let mut state = ready(starters(), 10);
        state.begin_fetch(1);

        match render(&state) {
            View::Grid { notice, .. } => assert_eq!(notice, Some(Notice::Refreshing)),
            other => panic!("expected grid, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_view_keeps_search() {
        let mut state = ready(starters(), 10);
        state.set_search("mewtwo");

        assert_eq!(
            render(&state),
            View::Empty {
                search: "mewtwo".to_string(),
                notice: None
            }
        );
    }

    #[test]
    fn test_grid_cards_follow_filter_and_sort() {
        let mut state = ready(starters(), 10);
        state.set_search("char");

        match render(&state) {
            View::Grid {
                cards, sort, search, ..
            } => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].title, "Charmander");
                assert_eq!(cards[0].key, "4");
                assert_eq!(sort, "id");
                assert_eq!(search, "char");
            }
            other => panic!("expected grid, got {other:?}"),
        }
    }

    #[test]
    fn test_page_info_counts() {
        let items: Vec<Pokemon> = (1..=25)
            .map(|id| Pokemon::named(id, &format!("mon-{id}")))
            .collect();
        let mut state = ready(items, 10);
        state.change_page(2).unwrap();

        match render(&state) {
            View::Grid { page, cards, .. } => {
                assert_eq!(cards.len(), 5);
                assert_eq!(page.page, 3);
                assert_eq!(page.total_pages, Some(3));
                assert_eq!(page.showing_from, 21);
                assert_eq!(page.showing_to, 25);
                assert_eq!(page.total_items, Some(25));
                assert!(page.has_prev);
                assert!(!page.has_next);
            }
            other => panic!("expected grid, got {other:?}"),
        }
    }

    #[test]
    fn test_server_page_info_offsets_by_remote_page() {
        let query = Query {
            page: 3,
            ..Query::default()
        };
        let mut state: ListState<Pokemon> = ListState::with_query(20, Pagination::Server, query);
        let ticket = state.begin_fetch(3);
        let items = (41..=60).map(|id| Pokemon::named(id, "x")).collect();
        state.resolve(ticket.token, Ok(items));

        match render(&state) {
            View::Grid { page, .. } => {
                assert_eq!(page.showing_from, 41);
                assert_eq!(page.showing_to, 60);
                assert_eq!(page.total_items, None);
                assert_eq!(page.total_pages, None);
                assert!(page.has_next);
            }
            other => panic!("expected grid, got {other:?}"),
        }
    }

    #[test]
    fn test_tone_of() {
        assert_eq!(Tone::of(Some(1.2)), Tone::Positive);
        assert_eq!(Tone::of(Some(-0.1)), Tone::Negative);
        assert_eq!(Tone::of(Some(0.0)), Tone::Neutral);
        assert_eq!(Tone::of(None), Tone::Neutral);
    }

    #[test]
    fn test_view_serializes_with_tag() {
        let json = serde_json::to_value(View::Loading).unwrap();
        assert_eq!(json["view"], "loading");
    }
}
