//! View state for one list screen.
//!
//! A screen issues a [`LoadTicket`] per read. Only the newest ticket may
//! deliver results, and nothing is delivered once the screen is closed, so a
//! slow read can never overwrite newer data or a view that is gone.

use tracing::debug;

use crate::entity::{Entity, ListQuery};
use crate::remote::RemoteStore;
use crate::store::KeyValueStore;
use crate::sync::{Listing, ListingSource, SyncLayer};

/// Case-insensitive substring match against the record's search fields.
/// An empty query matches everything.
pub fn matches<E: Entity>(record: &E, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || record.search_text().contains(&query)
}

/// Records matching `query`, in their original order.
pub fn filter<'a, E: Entity>(records: &'a [E], query: &str) -> Vec<&'a E> {
    records.iter().filter(|r| matches(*r, query)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone)]
pub struct Screen<E> {
    records: Vec<E>,
    source: Option<ListingSource>,
    warning: Option<String>,
    search: String,
    generation: u64,
    closed: bool,
}

impl<E: Entity> Default for Screen<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            source: None,
            warning: None,
            search: String::new(),
            generation: 0,
            closed: false,
        }
    }
}

impl<E: Entity> Screen<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a read. Any ticket handed out earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Applies a finished read. Returns false, leaving the state untouched,
    /// when the ticket is stale or the screen was closed.
    pub fn finish_load(&mut self, ticket: LoadTicket, listing: Listing<E>) -> bool {
        if self.closed || ticket.0 != self.generation {
            debug!(kind = %E::KIND, "discarding stale load");
            return false;
        }

        self.records = listing.records;
        self.source = Some(listing.source);
        self.warning = listing.warning;
        true
    }

    /// Reads through `layer` and applies the result.
    pub async fn refresh<S, R>(&mut self, layer: &SyncLayer<S, R>, query: ListQuery) -> bool
    where
        S: KeyValueStore,
        R: RemoteStore,
    {
        let ticket = self.begin_load();
        let listing = layer.list::<E>(query).await;
        self.finish_load(ticket, listing)
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    pub fn source(&self) -> Option<ListingSource> {
        self.source
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Records passing the current search.
    pub fn visible(&self) -> Vec<&E> {
        filter(&self.records, &self.search)
    }
}
