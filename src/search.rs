// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

//! Incremental search over offset/limit-paged endpoints.
//!
//! A [`SearchSession`] owns the accumulated result list for one search
//! surface (the movie catalog, the people picker). Keystrokes feed
//! [`SearchSession::set_query`], which debounces, supersedes any in-flight
//! first-page fetch, and guarantees stale responses are never applied.
//! Scrolling feeds [`SearchSession::load_more`], which appends pages in
//! strictly increasing offset order, one fetch in flight at a time.

use crate::api::{ApiError, Movie, Page, Person, PersonRole, PhimHubClient};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Boxed future returned by dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Items that can be deduplicated across merged pages.
pub trait Keyed {
    fn key(&self) -> u64;
}

impl Keyed for Person {
    fn key(&self) -> u64 {
        self.id
    }
}

impl Keyed for Movie {
    fn key(&self) -> u64 {
        self.id
    }
}

/// A paged, queryable data source. Implementations capture whatever fixed
/// filters they need (person role, genre) so the session only sees text.
pub trait PagedSource<T>: Send + Sync {
    fn fetch_page(&self, query: String, limit: u64, offset: u64)
    -> BoxFuture<'_, Result<Page<T>, ApiError>>;
}

/// `/people/selection` with a fixed role filter.
pub struct PeopleSelectionSource {
    api: Arc<PhimHubClient>,
    role: PersonRole,
}

impl PeopleSelectionSource {
    pub fn new(api: Arc<PhimHubClient>, role: PersonRole) -> Self {
        Self { api, role }
    }
}

impl PagedSource<Person> for PeopleSelectionSource {
    fn fetch_page(
        &self,
        query: String,
        limit: u64,
        offset: u64,
    ) -> BoxFuture<'_, Result<Page<Person>, ApiError>> {
        Box::pin(async move { self.api.search_people(self.role, &query, limit, offset).await })
    }
}

/// `/movies` free-text search, optionally pinned to a genre or type.
pub struct MovieSearchSource {
    api: Arc<PhimHubClient>,
    pub genre: Option<String>,
    pub kind: Option<String>,
}

impl MovieSearchSource {
    pub fn new(api: Arc<PhimHubClient>) -> Self {
        Self {
            api,
            genre: None,
            kind: None,
        }
    }
}

impl PagedSource<Movie> for MovieSearchSource {
    fn fetch_page(
        &self,
        query: String,
        limit: u64,
        offset: u64,
    ) -> BoxFuture<'_, Result<Page<Movie>, ApiError>> {
        Box::pin(async move {
            let query = crate::api::MovieQuery {
                q: if query.is_empty() { None } else { Some(query) },
                genre: self.genre.clone(),
                kind: self.kind.clone(),
                country: None,
                limit,
                offset,
            };
            self.api.fetch_movies(&query).await
        })
    }
}

/// Order-preserving, deduplicating merge of successive pages.
#[derive(Debug)]
pub struct PageAccumulator<T> {
    items: Vec<T>,
    seen: HashSet<u64>,
    total: u64,
    limit: u64,
    pages_applied: u64,
    last_page_len: usize,
}

impl<T: Keyed> PageAccumulator<T> {
    pub fn new(limit: u64) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            total: 0,
            limit: limit.max(1),
            pages_applied: 0,
            last_page_len: 0,
        }
    }

    /// First page of a new session: prior state is discarded entirely.
    pub fn replace(&mut self, items: Vec<T>, total: u64) {
        self.items.clear();
        self.seen.clear();
        self.total = total;
        self.pages_applied = 0;
        self.append(items);
    }

    /// Page N>0: drop ids already present, concatenate in arrival order.
    pub fn append(&mut self, items: Vec<T>) {
        self.last_page_len = items.len();
        self.pages_applied += 1;
        for item in items {
            if self.seen.insert(item.key()) {
                self.items.push(item);
            }
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// More pages remain iff the last page was full and the next offset is
    /// still below the server-reported total.
    pub fn has_more(&self) -> bool {
        self.pages_applied > 0
            && self.last_page_len as u64 == self.limit
            && self.pages_applied * self.limit < self.total
    }

    /// Offset for the next fetch; advances monotonically within a session.
    pub fn next_offset(&self) -> u64 {
        self.pages_applied * self.limit
    }

    /// 1-based page number for display; 0 before the first page lands.
    pub fn current_page(&self) -> u64 {
        self.pages_applied
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit)
    }
}

#[derive(Debug)]
enum FetchKind {
    First,
    More,
}

#[derive(Debug)]
pub struct SessionUpdate<T> {
    generation: u64,
    kind: FetchKind,
    result: Result<Page<T>, String>,
}

/// One search surface: debounced query input, superseding first-page
/// fetches, serialized load-more appends.
///
/// The session is single-writer: fetches run on spawned tasks and report
/// back over a channel; only [`SearchSession::apply`] mutates state, so the
/// owning event loop decides when results land.
pub struct SearchSession<T: Keyed + Send + 'static> {
    source: Arc<dyn PagedSource<T>>,
    query: String,
    debounce: Duration,
    acc: PageAccumulator<T>,
    generation: u64,
    loading: bool,
    loading_more: bool,
    error: Option<String>,
    first_fetch: Option<JoinHandle<()>>,
    more_fetch: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SessionUpdate<T>>,
    rx: mpsc::UnboundedReceiver<SessionUpdate<T>>,
}

impl<T: Keyed + Send + 'static> SearchSession<T> {
    pub fn new(source: Arc<dyn PagedSource<T>>, limit: u64, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            query: String::new(),
            debounce,
            acc: PageAccumulator::new(limit),
            generation: 0,
            loading: false,
            loading_more: false,
            error: None,
            first_fetch: None,
            more_fetch: None,
            tx,
            rx,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn items(&self) -> &[T] {
        self.acc.items()
    }

    pub fn total(&self) -> u64 {
        self.acc.total()
    }

    pub fn has_more(&self) -> bool {
        self.acc.has_more()
    }

    pub fn current_page(&self) -> u64 {
        self.acc.current_page()
    }

    pub fn total_pages(&self) -> u64 {
        self.acc.total_pages()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    /// Kick off the initial (empty-query) load.
    pub fn open(&mut self) {
        self.dispatch_first(Duration::ZERO);
    }

    /// Record a keystroke. A repeat of the current query is a no-op; any
    /// other value supersedes pending and in-flight first-page work.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query == self.query && self.acc.current_page() > 0 {
            return;
        }
        self.query = query;
        self.dispatch_first(self.debounce);
    }

    /// Re-fetch the first page for the current query, bypassing debounce.
    pub fn refresh(&mut self) {
        self.dispatch_first(Duration::ZERO);
    }

    fn dispatch_first(&mut self, delay: Duration) {
        // A newer intent supersedes everything: pending debounce timers,
        // an in-flight first page, and any append still running.
        self.generation += 1;
        if let Some(handle) = self.first_fetch.take() {
            handle.abort();
        }
        if let Some(handle) = self.more_fetch.take() {
            handle.abort();
        }
        self.loading = true;
        self.loading_more = false;

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let query = self.query.clone();
        let limit = self.limit();
        let tx = self.tx.clone();

        self.first_fetch = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let result = source
                .fetch_page(query, limit, 0)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(SessionUpdate {
                generation,
                kind: FetchKind::First,
                result,
            });
        }));
    }

    /// Request the next page. Returns false (and issues no fetch) when no
    /// pages remain or a fetch is already in flight.
    pub fn load_more(&mut self) -> bool {
        if !self.acc.has_more() || self.loading || self.loading_more {
            return false;
        }
        self.loading_more = true;
        self.error = None;

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let query = self.query.clone();
        let limit = self.limit();
        let offset = self.acc.next_offset();
        let tx = self.tx.clone();

        self.more_fetch = Some(tokio::spawn(async move {
            let result = source
                .fetch_page(query, limit, offset)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(SessionUpdate {
                generation,
                kind: FetchKind::More,
                result,
            });
        }));

        true
    }

    /// Receive the next completed fetch. `None` only if the session's own
    /// sender was dropped, which cannot happen while `self` is alive.
    pub async fn next_update(&mut self) -> Option<SessionUpdate<T>> {
        self.rx.recv().await
    }

    pub fn try_update(&mut self) -> Option<SessionUpdate<T>> {
        self.rx.try_recv().ok()
    }

    /// Merge a completed fetch into session state. Results from a
    /// superseded generation are dropped without touching anything.
    pub fn apply(&mut self, update: SessionUpdate<T>) {
        if update.generation != self.generation {
            debug!("dropping stale search response");
            return;
        }

        match update.kind {
            FetchKind::First => {
                self.loading = false;
                match update.result {
                    Ok(page) => {
                        self.error = None;
                        self.acc.replace(page.items, page.total);
                    }
                    Err(message) => {
                        self.error = Some(message);
                    }
                }
            }
            FetchKind::More => {
                self.loading_more = false;
                match update.result {
                    Ok(page) => {
                        self.error = None;
                        self.acc.append(page.items);
                    }
                    Err(message) => {
                        // Accumulated items stay put; the caller may retry.
                        self.error = Some(message);
                    }
                }
            }
        }
    }

    /// Apply updates until no fetch is pending. Used by one-shot CLI paths
    /// and tests; the TUI applies updates from its own event loop instead.
    pub async fn settle(&mut self) {
        while self.loading || self.loading_more {
            match self.rx.recv().await {
                Some(update) => self.apply(update),
                None => break,
            }
        }
    }

    /// Tear down pending work; no state update can land after this.
    pub fn close(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.first_fetch.take() {
            handle.abort();
        }
        if let Some(handle) = self.more_fetch.take() {
            handle.abort();
        }
        self.loading = false;
        self.loading_more = false;
    }

    fn limit(&self) -> u64 {
        self.acc.limit
    }
}

impl<T: Keyed + Send + 'static> Drop for SearchSession<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn person(id: u64, name: &str) -> Person {
        Person {
            id,
            name: name.to_string(),
            photo_url: None,
            nationality: None,
            dob: None,
        }
    }

    #[test]
    fn accumulator_dedupes_across_pages() {
        let mut acc = PageAccumulator::new(3);
        acc.replace(vec![person(1, "a"), person(2, "b"), person(3, "c")], 6);
        // Server shifted under us: id 3 reappears on page 1.
        acc.append(vec![person(3, "c"), person(4, "d"), person(5, "e")]);

        let ids: Vec<u64> = acc.items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn accumulator_preserves_first_seen_order() {
        let mut acc = PageAccumulator::new(2);
        acc.replace(vec![person(2, "b"), person(1, "a")], 4);
        acc.append(vec![person(1, "dup"), person(3, "c")]);

        let ids: Vec<u64> = acc.items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(acc.items()[1].name, "a");
    }

    #[test]
    fn offsets_advance_monotonically() {
        let mut acc = PageAccumulator::new(50);
        assert_eq!(acc.next_offset(), 0);
        acc.replace((0..50).map(|i| person(i, "p")).collect(), 120);
        assert_eq!(acc.next_offset(), 50);
        acc.append((50..100).map(|i| person(i, "p")).collect());
        assert_eq!(acc.next_offset(), 100);
        acc.append((100..120).map(|i| person(i, "p")).collect());
        assert_eq!(acc.next_offset(), 150);
        assert!(!acc.has_more());
    }

    #[test]
    fn fifty_of_one_twenty_scenario() {
        let mut acc = PageAccumulator::new(50);
        acc.replace((0..50).map(|i| person(i, "p")).collect(), 120);

        assert!(acc.has_more());
        assert_eq!(acc.current_page(), 1);
        assert_eq!(acc.total_pages(), 3);

        acc.append((50..100).map(|i| person(i, "p")).collect());
        assert!(acc.has_more());

        acc.append((100..120).map(|i| person(i, "p")).collect());
        assert_eq!(acc.len(), 120);
        assert!(!acc.has_more());
    }

    #[test]
    fn exact_multiple_of_limit_terminates() {
        let mut acc = PageAccumulator::new(50);
        acc.replace((0..50).map(|i| person(i, "p")).collect(), 100);
        assert!(acc.has_more());
        acc.append((50..100).map(|i| person(i, "p")).collect());
        // Last page was full but the next offset would pass total.
        assert!(!acc.has_more());
    }

    #[test]
    fn legacy_shape_never_has_more() {
        // `{ data: [...] }` with 5 items decodes to total == 5.
        let mut acc = PageAccumulator::new(50);
        acc.replace((0..5).map(|i| person(i, "p")).collect(), 5);
        assert_eq!(acc.total(), 5);
        assert!(!acc.has_more());
    }

    /// Source that serves from a canned script and records every request.
    struct ScriptedSource {
        responses: Mutex<Vec<(String, u64, Result<Page<Person>, ApiError>)>>,
        calls: Mutex<Vec<(String, u64)>>,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(delay: Duration) -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
                delay,
            }
        }

        fn respond(&self, query: &str, offset: u64, result: Result<Page<Person>, ApiError>) {
            self.responses
                .lock()
                .unwrap()
                .push((query.to_string(), offset, result));
        }

        fn calls(&self) -> Vec<(String, u64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PagedSource<Person> for ScriptedSource {
        fn fetch_page(
            &self,
            query: String,
            _limit: u64,
            offset: u64,
        ) -> BoxFuture<'_, Result<Page<Person>, ApiError>> {
            Box::pin(async move {
                self.calls.lock().unwrap().push((query.clone(), offset));
                tokio::time::sleep(self.delay).await;
                let mut responses = self.responses.lock().unwrap();
                let position = responses
                    .iter()
                    .position(|(q, o, _)| *q == query && *o == offset)
                    .unwrap_or_else(|| panic!("no scripted response for {:?}@{}", query, offset));
                responses.remove(position).2
            })
        }
    }

    fn page(range: std::ops::Range<u64>, total: u64) -> Page<Person> {
        Page {
            items: range.map(|i| person(i, "p")).collect(),
            total,
        }
    }

    fn decode_error() -> ApiError {
        ApiError::Decode("boom".to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_coalesce_to_one_fetch() {
        let source = Arc::new(ScriptedSource::new(Duration::ZERO));
        source.respond("john", 0, Ok(page(0..3, 3)));

        let mut session: SearchSession<Person> =
            SearchSession::new(source.clone(), 50, Duration::from_millis(300));

        for q in ["j", "jo", "joh", "john"] {
            session.set_query(q);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        session.settle().await;

        // Only the final value reached the network.
        assert_eq!(source.calls(), vec![("john".to_string(), 0)]);
        assert_eq!(session.items().len(), 3);
        assert!(session.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_response_is_never_applied() {
        let source = Arc::new(ScriptedSource::new(Duration::from_secs(5)));
        source.respond("a", 0, Ok(page(0..10, 10)));
        source.respond("b", 0, Ok(page(90..95, 5)));

        let mut session: SearchSession<Person> =
            SearchSession::new(source.clone(), 50, Duration::from_millis(300));

        session.set_query("a");
        // Past the debounce: the fetch for "a" is now in flight.
        tokio::time::sleep(Duration::from_millis(400)).await;
        session.set_query("b");
        session.settle().await;

        let ids: Vec<u64> = session.items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![90, 91, 92, 93, 94]);
        assert_eq!(session.total(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_dropped_even_without_abort() {
        let source = Arc::new(ScriptedSource::new(Duration::ZERO));
        source.respond("a", 0, Ok(page(0..10, 10)));
        source.respond("b", 0, Ok(page(20..21, 1)));

        let mut session: SearchSession<Person> =
            SearchSession::new(source.clone(), 50, Duration::ZERO);

        session.set_query("a");
        let update = session.next_update().await.unwrap();
        // The query moves on before the loop gets to apply the result.
        session.set_query("b");
        session.apply(update);

        assert!(session.items().is_empty());
        assert!(session.is_loading());
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn load_more_walks_pages_then_stops() {
        let source = Arc::new(ScriptedSource::new(Duration::ZERO));
        source.respond("john", 0, Ok(page(0..50, 120)));
        source.respond("john", 50, Ok(page(50..100, 120)));
        source.respond("john", 100, Ok(page(100..120, 120)));

        let mut session: SearchSession<Person> =
            SearchSession::new(source.clone(), 50, Duration::ZERO);

        session.set_query("john");
        session.settle().await;
        assert_eq!(session.items().len(), 50);
        assert!(session.has_more());
        assert_eq!(session.current_page(), 1);
        assert_eq!(session.total_pages(), 3);

        assert!(session.load_more());
        session.settle().await;
        assert!(session.load_more());
        session.settle().await;

        assert_eq!(session.items().len(), 120);
        assert!(!session.has_more());

        // Terminal: no further fetch is issued.
        assert!(!session.load_more());
        assert_eq!(
            source.calls(),
            vec![
                ("john".to_string(), 0),
                ("john".to_string(), 50),
                ("john".to_string(), 100),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_load_more_is_a_noop_while_in_flight() {
        let source = Arc::new(ScriptedSource::new(Duration::from_millis(100)));
        source.respond("q", 0, Ok(page(0..50, 120)));
        source.respond("q", 50, Ok(page(50..100, 120)));

        let mut session: SearchSession<Person> =
            SearchSession::new(source.clone(), 50, Duration::ZERO);
        session.set_query("q");
        session.settle().await;

        assert!(session.load_more());
        assert!(!session.load_more());
        session.settle().await;

        assert_eq!(session.items().len(), 100);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_append_preserves_accumulated_items() {
        let source = Arc::new(ScriptedSource::new(Duration::ZERO));
        source.respond("q", 0, Ok(page(0..50, 120)));
        source.respond("q", 50, Err(decode_error()));
        source.respond("q", 50, Ok(page(50..100, 120)));

        let mut session: SearchSession<Person> =
            SearchSession::new(source.clone(), 50, Duration::ZERO);
        session.set_query("q");
        session.settle().await;

        assert!(session.load_more());
        session.settle().await;

        assert_eq!(session.items().len(), 50);
        assert!(session.error().is_some());
        assert!(!session.is_loading_more());

        // Explicit retry resumes from the same offset and clears the error.
        assert!(session.load_more());
        session.settle().await;
        assert_eq!(session.items().len(), 100);
        assert!(session.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_first_page_keeps_previous_results_visible() {
        let source = Arc::new(ScriptedSource::new(Duration::ZERO));
        source.respond("ok", 0, Ok(page(0..5, 5)));
        source.respond("bad", 0, Err(decode_error()));

        let mut session: SearchSession<Person> =
            SearchSession::new(source.clone(), 50, Duration::ZERO);
        session.set_query("ok");
        session.settle().await;
        assert_eq!(session.items().len(), 5);

        session.set_query("bad");
        session.settle().await;
        assert!(session.error().is_some());
        assert_eq!(session.items().len(), 5);
    }
}
