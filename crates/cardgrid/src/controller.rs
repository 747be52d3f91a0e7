//! Async list controller.
//!
//! The controller drives one [`ListState`] from a single task. Fetches run on
//! spawned tasks and report back over a channel; the state's request tokens
//! decide whether a completion still counts. Starting a new fetch aborts the
//! previous task, so at most one request is in flight per controller.

use std::sync::Arc;
use std::time::Duration;

use cardgrid_core::endpoint::{Endpoint, Normalizer};
use cardgrid_core::error::FetchError;
use cardgrid_core::item::{Item, Pagination};
use cardgrid_core::state::{ListState, PageMove, Query, RequestToken, Resolution, StateError};
use cardgrid_core::view::{render, View};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::adapter::Adapter;
use crate::config::DEFAULT_DEBOUNCE_MS;
use crate::debounce::Debounce;

type SortOf<N> = <<N as Normalizer>::Item as Item>::SortKey;

/// How a controller is set up
#[derive(Debug, Clone)]
pub struct Settings<K> {
    pub page_size: usize,
    pub pagination: Pagination,
    pub debounce: Duration,
    pub query: Query<K>,
}

impl<K: Default> Settings<K> {
    pub fn new(page_size: usize, pagination: Pagination) -> Self {
        Self {
            page_size: page_size.max(1),
            pagination,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            query: Query::default(),
        }
    }

    /// Settings for an endpoint; server-side page sizes are capped at what the
    /// remote API accepts
    pub fn for_endpoint<E: Endpoint>(endpoint: &E, page_size: usize) -> Self {
        let pagination = endpoint.pagination();
        let requested = page_size.max(1);
        let page_size = match pagination {
            Pagination::Server => requested.min(endpoint.max_per_page() as usize),
            Pagination::Client { .. } => requested,
        };

        if page_size != requested {
            log::warn!(
                "{} accepts at most {} items per page, using {}",
                endpoint.backend(),
                endpoint.max_per_page(),
                page_size
            );
        }

        Self::new(page_size, pagination)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_query(mut self, query: Query<K>) -> Self {
        self.query = query;
        self
    }
}

/// A user interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<K> {
    SearchInput(String),
    SortChange(K),
    PageChange(i64),
    Reload,
}

/// Something that changed the view outside of a direct call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// The latest fetch finished; `Applied` or `Failed`
    Loaded(Resolution),
    /// The debounced search text was applied
    Searched(String),
}

struct Completion<I> {
    token: RequestToken,
    outcome: Result<Vec<I>, FetchError>,
}

pub struct Controller<A, N>
where
    A: Adapter,
    N: Normalizer<Raw = A::Raw>,
{
    adapter: Arc<A>,
    normalizer: Arc<N>,
    state: ListState<N::Item>,
    debounce: Debounce<String>,
    in_flight: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<Completion<N::Item>>,
    completions: mpsc::UnboundedReceiver<Completion<N::Item>>,
}

impl<A, N> Controller<A, N>
where
    A: Adapter,
    N: Normalizer<Raw = A::Raw>,
{
    pub fn new(adapter: A, normalizer: N, settings: Settings<SortOf<N>>) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();

        Self {
            adapter: Arc::new(adapter),
            normalizer: Arc::new(normalizer),
            state: ListState::with_query(settings.page_size, settings.pagination, settings.query),
            debounce: Debounce::new(settings.debounce),
            in_flight: None,
            completions_tx,
            completions,
        }
    }

    pub fn state(&self) -> &ListState<N::Item> {
        &self.state
    }

    pub fn view(&self) -> View {
        render(&self.state)
    }

    /// True while a fetch or a debounced search is outstanding
    pub fn is_busy(&self) -> bool {
        self.state.is_fetching() || self.debounce.is_pending()
    }

    /// First load, using the configured query and page
    pub fn init(&mut self) {
        self.fetch(self.state.page());
    }

    /// Queue a search; it is applied once typing pauses
    pub fn on_search_input(&mut self, text: impl Into<String>) {
        self.debounce.push(text.into());
    }

    pub fn on_sort_change(&mut self, sort: SortOf<N>) {
        log::debug!("sort -> {sort}");
        self.state.set_sort(sort);
    }

    /// Reset search and sort to their defaults and fetch the first page again
    pub fn on_reload(&mut self) {
        self.debounce.cancel();
        self.state.reset_query();
        self.fetch(1);
    }

    pub fn on_page_change(&mut self, delta: i64) -> Result<PageMove, StateError> {
        let page_move = self.state.change_page(delta)?;
        if let PageMove::Fetch(page) = page_move {
            self.fetch(page);
        }
        Ok(page_move)
    }

    pub fn dispatch(&mut self, event: Event<SortOf<N>>) -> Result<(), StateError> {
        match event {
            Event::SearchInput(text) => self.on_search_input(text),
            Event::SortChange(sort) => self.on_sort_change(sort),
            Event::PageChange(delta) => {
                self.on_page_change(delta)?;
            }
            Event::Reload => self.on_reload(),
        }
        Ok(())
    }

    /// Wait for the next completed fetch or debounced search
    ///
    /// Stale completions are dropped without returning. Pends forever when
    /// nothing is outstanding. Cancel-safe, so it can sit in a `select!`.
    pub async fn next_update(&mut self) -> Update {
        loop {
            tokio::select! {
                search = self.debounce.fire() => {
                    log::debug!("search -> {search:?}");
                    self.state.set_search(search.clone());
                    return Update::Searched(search);
                }
                Some(done) = self.completions.recv() => {
                    match self.state.resolve(done.token, done.outcome) {
                        Resolution::Stale => {
                            log::debug!("discarding stale response {:?}", done.token);
                        }
                        resolution => {
                            self.in_flight = None;
                            log::debug!("{:?} -> {}", done.token, self.state.phase());
                            return Update::Loaded(resolution);
                        }
                    }
                }
            }
        }
    }

    /// Apply updates until nothing is outstanding
    pub async fn settle(&mut self) -> Vec<Update> {
        let mut updates = vec![];
        while self.is_busy() {
            updates.push(self.next_update().await);
        }
        updates
    }

    fn fetch(&mut self, page: usize) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let ticket = self.state.begin_fetch(page);
        log::debug!(
            "{:?}: fetching page {} ({} per page)",
            ticket.token,
            ticket.options.page,
            ticket.options.per_page
        );

        let adapter = Arc::clone(&self.adapter);
        let normalizer = Arc::clone(&self.normalizer);
        let completions = self.completions_tx.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = adapter.fetch_items(ticket.options).await.map(|raw| {
                raw.into_iter()
                    .map(|record| normalizer.normalize(record))
                    .collect()
            });
            // The receiver only goes away with the controller itself.
            let _ = completions.send(Completion {
                token: ticket.token,
                outcome,
            });
        }));
    }
}

impl<A, N> Drop for Controller<A, N>
where
    A: Adapter,
    N: Normalizer<Raw = A::Raw>,
{
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardgrid_core::anime::Jikan;
    use cardgrid_core::pokemon::{Pokemon, PokemonSort};
    use cardgrid_core::recipes::MealDb;
    use cardgrid_core::state::Phase;
    use cardgrid_core::item::PageOptions;
    use cardgrid_core::view::Notice;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;
    use tokio::time::Instant;

    type Scripted = (Duration, Result<Vec<Pokemon>, FetchError>);

    /// Replays canned responses, each after its own delay
    struct ScriptedAdapter {
        script: Mutex<VecDeque<Scripted>>,
        calls: Arc<Mutex<Vec<PageOptions>>>,
    }

    impl ScriptedAdapter {
        fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Arc::default(),
            }
        }
    }

    impl Adapter for ScriptedAdapter {
        type Raw = Pokemon;

        fn fetch_items(
            &self,
            options: PageOptions,
        ) -> impl Future<Output = Result<Vec<Pokemon>, FetchError>> + Send {
            self.calls.lock().unwrap().push(options);
            let (delay, outcome) = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Duration::ZERO, Ok(vec![])));

            async move {
                tokio::time::sleep(delay).await;
                outcome
            }
        }
    }

    struct Identity;

    impl Normalizer for Identity {
        type Raw = Pokemon;
        type Item = Pokemon;

        fn normalize(&self, raw: Pokemon) -> Pokemon {
            raw
        }
    }

    const CLIENT: Pagination = Pagination::Client { batch_size: 100 };

    fn ok(items: Vec<Pokemon>) -> Scripted {
        (Duration::from_millis(10), Ok(items))
    }

    fn starters() -> Vec<Pokemon> {
        vec![
            Pokemon::named(1, "bulbasaur"),
            Pokemon::named(4, "charmander"),
            Pokemon::named(7, "squirtle"),
        ]
    }

    fn numbered(ids: std::ops::RangeInclusive<u32>) -> Vec<Pokemon> {
        ids.map(|id| Pokemon::named(id, &format!("mon-{id}"))).collect()
    }

    fn controller(
        script: Vec<Scripted>,
        settings: Settings<PokemonSort>,
    ) -> (Controller<ScriptedAdapter, Identity>, Arc<Mutex<Vec<PageOptions>>>) {
        let adapter = ScriptedAdapter::new(script);
        let calls = Arc::clone(&adapter.calls);
        (Controller::new(adapter, Identity, settings), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_loads_items() {
        let (mut controller, calls) = controller(vec![ok(starters())], Settings::new(10, CLIENT));
        assert_eq!(controller.state().phase(), Phase::Idle);

        controller.init();
        assert_eq!(controller.state().phase(), Phase::Loading);
        assert_eq!(controller.view(), View::Loading);

        let updates = controller.settle().await;

        assert_eq!(updates, vec![Update::Loaded(Resolution::Applied)]);
        assert_eq!(controller.state().phase(), Phase::Ready);
        assert_eq!(controller.state().items().len(), 3);
        assert_eq!(calls.lock().unwrap()[0], PageOptions::new(1, 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_load_failure_shows_error() {
        let script = vec![(Duration::ZERO, Err(FetchError::network("connection refused")))];
        let (mut controller, _) = controller(script, Settings::new(10, CLIENT));

        controller.init();
        controller.settle().await;

        assert_eq!(controller.state().phase(), Phase::Error);
        assert!(matches!(controller.view(), View::Error { retryable: true, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reload_keeps_previous_items() {
        let script = vec![
            ok(starters()),
            (Duration::ZERO, Err(FetchError::http_status(500, ""))),
        ];
        let (mut controller, _) = controller(script, Settings::new(10, CLIENT));
        controller.init();
        controller.settle().await;

        controller.on_reload();
        let updates = controller.settle().await;

        assert!(matches!(updates[..], [Update::Loaded(Resolution::Failed(_))]));
        assert_eq!(controller.state().phase(), Phase::Error);
        assert_eq!(controller.state().items(), starters().as_slice());
        match controller.view() {
            View::Grid { cards, notice, .. } => {
                assert_eq!(cards.len(), 3);
                assert!(matches!(notice, Some(Notice::Stale { .. })));
            }
            other => panic!("expected stale grid, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_reloads_keep_only_last_response() {
        let script = vec![
            ok(starters()),
            (Duration::from_millis(500), Ok(vec![Pokemon::named(150, "mewtwo")])),
            (Duration::from_millis(100), Ok(vec![Pokemon::named(151, "mew")])),
        ];
        let (mut controller, calls) = controller(script, Settings::new(10, CLIENT));
        controller.init();
        controller.settle().await;

        controller.on_reload();
        controller.on_reload();
        let updates = controller.settle().await;

        assert_eq!(updates, vec![Update::Loaded(Resolution::Applied)]);
        assert_eq!(calls.lock().unwrap().len(), 3);
        let names: Vec<&str> = controller.state().items().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["mew"]);

        // Nothing from the first reload shows up later.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!controller.is_busy());
        assert_eq!(controller.state().items()[0].name, "mew");
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_is_debounced() {
        let settings = Settings::new(10, CLIENT).with_debounce(Duration::from_millis(300));
        let (mut controller, calls) = controller(vec![ok(starters())], settings);
        controller.init();
        controller.settle().await;

        controller.on_search_input("c");
        tokio::time::advance(Duration::from_millis(100)).await;
        controller.on_search_input("char");
        assert_eq!(controller.state().search(), "");

        let start = Instant::now();
        let update = controller.next_update().await;

        assert_eq!(update, Update::Searched("char".to_string()));
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert_eq!(controller.state().filtered().len(), 1);
        assert_eq!(controller.state().phase(), Phase::Ready);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sort_change_is_immediate() {
        let (mut controller, _) = controller(vec![ok(starters())], Settings::new(10, CLIENT));
        controller.init();
        controller.settle().await;

        controller.dispatch(Event::SortChange(PokemonSort::Name)).unwrap();

        assert!(!controller.is_busy());
        assert_eq!(controller.state().sort(), PokemonSort::Name);
        assert_eq!(controller.state().filtered()[0].name, "bulbasaur");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_resets_query() {
        let script = vec![ok(starters()), ok(starters())];
        let (mut controller, _) = controller(script, Settings::new(10, CLIENT));
        controller.init();
        controller.settle().await;
        controller.on_sort_change(PokemonSort::Name);
        controller.on_search_input("squ");
        controller.settle().await;
        assert_eq!(controller.state().filtered().len(), 1);

        controller.dispatch(Event::Reload).unwrap();
        controller.settle().await;

        assert_eq!(controller.state().search(), "");
        assert_eq!(controller.state().sort(), PokemonSort::Id);
        assert_eq!(controller.state().filtered().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_change_rejected_while_loading() {
        let (mut controller, _) = controller(vec![ok(starters())], Settings::new(10, CLIENT));
        controller.init();

        assert_eq!(
            controller.on_page_change(1),
            Err(StateError::NotReady(Phase::Loading))
        );
        assert!(controller.dispatch(Event::PageChange(1)).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_page_change_reslices_without_fetch() {
        let (mut controller, calls) =
            controller(vec![ok(numbered(1..=25))], Settings::new(10, CLIENT));
        controller.init();
        controller.settle().await;

        assert_eq!(controller.on_page_change(1), Ok(PageMove::Resliced));
        assert_eq!(controller.state().page(), 2);
        assert_eq!(controller.state().visible()[0].id, 11);
        assert_eq!(controller.on_page_change(5), Ok(PageMove::Resliced));
        assert_eq!(controller.state().page(), 3);
        assert_eq!(controller.on_page_change(1), Ok(PageMove::Unchanged));
        assert!(!controller.is_busy());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_page_change_fetches_next_page() {
        let script = vec![ok(numbered(1..=2)), ok(numbered(3..=4))];
        let (mut controller, calls) = controller(script, Settings::new(2, Pagination::Server));
        controller.init();
        controller.settle().await;

        assert_eq!(controller.on_page_change(1), Ok(PageMove::Fetch(2)));
        assert_eq!(controller.state().page(), 1);
        controller.settle().await;

        assert_eq!(controller.state().page(), 2);
        assert_eq!(controller.state().visible()[0].id, 3);
        assert_eq!(calls.lock().unwrap()[1], PageOptions::new(2, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_page_failure_keeps_cursor() {
        let script = vec![
            ok(numbered(1..=2)),
            (Duration::ZERO, Err(FetchError::parse("expected value"))),
        ];
        let (mut controller, _) = controller(script, Settings::new(2, Pagination::Server));
        controller.init();
        controller.settle().await;

        controller.on_page_change(1).unwrap();
        controller.settle().await;

        assert_eq!(controller.state().phase(), Phase::Error);
        assert_eq!(controller.state().page(), 1);
        assert_eq!(controller.state().items().len(), 2);
    }

    #[test]
    fn test_settings_cap_server_page_size() {
        let settings: Settings<PokemonSort> =
            Settings::for_endpoint(&Jikan::new("http://localhost"), 100);
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.pagination, Pagination::Server);

        let settings: Settings<PokemonSort> =
            Settings::for_endpoint(&MealDb::new("http://localhost"), 500);
        assert_eq!(settings.page_size, 500);
        assert!(matches!(settings.pagination, Pagination::Client { .. }));
    }
}
