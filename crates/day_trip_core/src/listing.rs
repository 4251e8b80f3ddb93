//! crates/day_trip_core/src/listing.rs
//!
//! The listing query engine: turns a keyword and a page cursor into backend
//! fetches, grows the ordered list of loaded attractions and tracks whether
//! the current query is exhausted.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::domain::{AttractionSummary, Cursor, INITIAL_CURSOR};
use crate::ports::{BackendGateway, PortResult, RenderSink};
use crate::render;

/// The state of one keyword query. Recreated, never reused, when the keyword changes.
#[derive(Debug)]
struct QueryState {
    keyword: String,
    cursor: Option<Cursor>,
    loaded_items: Vec<AttractionSummary>,
    fetch_in_flight: bool,
    /// The first page never arrived; the same keyword may be searched again.
    first_page_failed: bool,
    generation: u64,
}

impl QueryState {
    fn new(keyword: String, generation: u64) -> Self {
        Self {
            keyword,
            cursor: Some(INITIAL_CURSOR),
            loaded_items: Vec::new(),
            fetch_in_flight: false,
            first_page_failed: false,
            generation,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    query: Option<QueryState>,
    generation: u64,
}

/// A read-only copy of the engine's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSnapshot {
    pub keyword: Option<String>,
    pub cursor: Option<Cursor>,
    pub items: Vec<AttractionSummary>,
    pub fetch_in_flight: bool,
}

/// What a `search` or `load_next` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived and `count` items were applied.
    Loaded { count: usize },
    /// `search` was called with the keyword already active.
    SameKeyword,
    /// Another fetch for this query is still outstanding.
    InFlight,
    /// The query has no further pages.
    Exhausted,
    /// No search has run yet.
    NoQuery,
    /// The response belonged to a query replaced by a newer search and was dropped.
    Superseded,
}

pub struct ListingQueryEngine {
    gateway: Arc<dyn BackendGateway>,
    sink: Arc<dyn RenderSink>,
    inner: Mutex<Inner>,
}

impl ListingQueryEngine {
    pub fn new(gateway: Arc<dyn BackendGateway>, sink: Arc<dyn RenderSink>) -> Self {
        Self {
            gateway,
            sink,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Starts a fresh query for `keyword` and loads its first page.
    ///
    /// Repeating the active keyword is ignored entirely, including while its
    /// first page is still loading. A keyword whose first page failed can be
    /// searched again.
    pub async fn search(&self, keyword: &str) -> PortResult<LoadOutcome> {
        let keyword = keyword.trim().to_string();

        let generation = {
            let mut inner = self.inner.lock().await;
            if inner
                .query
                .as_ref()
                .is_some_and(|q| q.keyword == keyword && !q.first_page_failed)
            {
                debug!(keyword = %keyword, "Ignoring repeated search.");
                return Ok(LoadOutcome::SameKeyword);
            }
            inner.generation += 1;
            let generation = inner.generation;
            let mut query = QueryState::new(keyword.clone(), generation);
            query.fetch_in_flight = true;
            inner.query = Some(query);
            generation
        };

        info!(keyword = %keyword, "Searching attractions.");
        let result = self.gateway.list_attractions(&keyword, INITIAL_CURSOR).await;

        let mut inner = self.inner.lock().await;
        let Some(query) = inner
            .query
            .as_mut()
            .filter(|q| q.generation == generation)
        else {
            debug!(keyword = %keyword, "Dropping response of a superseded search.");
            return Ok(LoadOutcome::Superseded);
        };
        query.fetch_in_flight = false;

        match result {
            Ok(page) => {
                let count = page.items.len();
                query.loaded_items = page.items;
                query.cursor = page.next_cursor;
                self.sink
                    .replace_listing(render::listing(&query.loaded_items));
                Ok(LoadOutcome::Loaded { count })
            }
            Err(e) => {
                error!("Failed to load attractions for '{}': {:?}", keyword, e);
                query.first_page_failed = true;
                self.sink.replace_listing(Vec::new());
                self.sink.show_alert(&e.user_message());
                Err(e)
            }
        }
    }

    pub async fn search_by_station(&self, station: &str) -> PortResult<LoadOutcome> {
        self.search(station).await
    }

    /// Fetches the page at the current cursor and appends it.
    ///
    /// A no-op while a fetch is outstanding or once the query is exhausted.
    /// On failure the cursor is left untouched so a later call retries it.
    pub async fn load_next(&self) -> PortResult<LoadOutcome> {
        let (keyword, cursor, generation) = {
            let mut inner = self.inner.lock().await;
            let Some(query) = inner.query.as_mut() else {
                return Ok(LoadOutcome::NoQuery);
            };
            if query.fetch_in_flight {
                return Ok(LoadOutcome::InFlight);
            }
            let Some(cursor) = query.cursor else {
                return Ok(LoadOutcome::Exhausted);
            };
            query.fetch_in_flight = true;
            (query.keyword.clone(), cursor, query.generation)
        };

        debug!(keyword = %keyword, cursor, "Loading next listing page.");
        let result = self.gateway.list_attractions(&keyword, cursor).await;

        let mut inner = self.inner.lock().await;
        let Some(query) = inner
            .query
            .as_mut()
            .filter(|q| q.generation == generation)
        else {
            debug!(keyword = %keyword, cursor, "Dropping page of a superseded search.");
            return Ok(LoadOutcome::Superseded);
        };
        query.fetch_in_flight = false;

        match result {
            Ok(page) => {
                let count = page.items.len();
                let cards = render::listing(&page.items);
                query.loaded_items.extend(page.items);
                query.cursor = page.next_cursor;
                if query.cursor.is_none() {
                    info!(keyword = %keyword, "No more attractions to load.");
                }
                self.sink.append_listing(cards);
                Ok(LoadOutcome::Loaded { count })
            }
            Err(e) => {
                error!(
                    "Failed to load page {} for '{}': {:?}",
                    cursor, keyword, e
                );
                Err(e)
            }
        }
    }

    /// Loads the MRT station filter bar.
    pub async fn stations(&self) -> PortResult<Vec<String>> {
        match self.gateway.list_stations().await {
            Ok(stations) => {
                self.sink.show_stations(render::station_list(&stations));
                Ok(stations)
            }
            Err(e) => {
                error!("Failed to load MRT stations: {:?}", e);
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> ListingSnapshot {
        let inner = self.inner.lock().await;
        match &inner.query {
            Some(query) => ListingSnapshot {
                keyword: Some(query.keyword.clone()),
                cursor: query.cursor,
                items: query.loaded_items.clone(),
                fetch_in_flight: query.fetch_in_flight,
            },
            None => ListingSnapshot {
                keyword: None,
                cursor: None,
                items: Vec::new(),
                fetch_in_flight: false,
            },
        }
    }
}
