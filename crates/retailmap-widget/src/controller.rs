//! The store locator controller.
//!
//! Owns all widget state: the loaded collection, the rows behind the results
//! panel, the search input, the map adapter and the scroll guard. Every page
//! or map event is a method call on [`LocatorController`].
//!
//! Searches are split into [`LocatorController::begin_search`] and
//! [`LocatorController::complete_search`] around the geocoder call. Each
//! search gets a sequence number; a completion whose ticket is no longer the
//! latest (a newer search or a "show all" happened meanwhile) is dropped.

use std::sync::Arc;

use retailmap_client::{ClientError, Geocoder, RetailerLoader};
use retailmap_core::{RetailerCollection, RetailerFeature, SearchOrigin};

use crate::map::{CameraSettings, MapAdapter, MapSurface};
use crate::page::PageElements;
use crate::render;
use crate::scroll::{ScrollEvent, ScrollGuard};

pub const DEFAULT_SEARCH_RADIUS_MI: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No collection loaded (yet, or the load failed).
    Uninitialized,
    /// Showing the full collection.
    Idle,
    Searching,
    /// Showing the result of a search.
    Filtered,
}

/// Handed out by [`LocatorController::begin_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    query: String,
}

impl SearchTicket {
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The page has no search form; nothing happened.
    Ignored,
    /// The input was blank; the visitor was prompted.
    Prompted,
    Found { origin: SearchOrigin, count: usize },
    NoMatch,
    Failed,
    /// A newer search or a reset superseded this one.
    Stale,
}

pub struct LocatorController<S, G> {
    map: MapAdapter<S>,
    geocoder: G,
    page: PageElements,
    radius_mi: f64,
    collection: Option<Arc<RetailerCollection>>,
    rows: Vec<RetailerFeature>,
    panel: Option<String>,
    input: String,
    phase: Phase,
    phase_before_search: Phase,
    latest_seq: u64,
    scroll: ScrollGuard,
}

impl<S: MapSurface, G: Geocoder> LocatorController<S, G> {
    pub fn new(surface: S, geocoder: G, page: PageElements, camera: CameraSettings) -> Self {
        Self {
            map: MapAdapter::new(surface, camera),
            geocoder,
            page,
            radius_mi: DEFAULT_SEARCH_RADIUS_MI,
            collection: None,
            rows: Vec::new(),
            panel: None,
            input: String::new(),
            phase: Phase::Uninitialized,
            phase_before_search: Phase::Uninitialized,
            latest_seq: 0,
            scroll: ScrollGuard::default(),
        }
    }

    #[must_use]
    pub fn with_radius(mut self, radius_mi: f64) -> Self {
        self.radius_mi = radius_mi;
        self
    }

    /// Loads the retailer collection once the map reports ready.
    ///
    /// Returns whether a collection is now installed. Load failures are
    /// logged and leave the widget without pins.
    pub async fn on_map_ready<L: RetailerLoader>(&mut self, loader: &L) -> bool {
        match loader.load().await {
            Ok(collection) => {
                self.install_collection(Arc::new(collection));
                true
            }
            Err(error) => {
                self.load_failed(&error);
                false
            }
        }
    }

    /// Shows the full collection as pins and fits the camera to it.
    pub fn install_collection(&mut self, collection: Arc<RetailerCollection>) {
        self.map.set_pins(collection.features());
        self.map.fit_to_features(collection.features());
        tracing::info!(count = collection.len(), "retailer pins rendered");
        self.collection = Some(collection);
        self.phase = Phase::Idle;
    }

    pub fn load_failed(&mut self, error: &ClientError) {
        tracing::warn!(%error, "failed to load retailer collection; map will show no pins");
        self.collection = None;
    }

    /// Mirrors the text in the page's search input.
    pub fn set_input(&mut self, text: &str) {
        if self.page.search_input {
            text.clone_into(&mut self.input);
        }
    }

    /// Runs a full search for the current input.
    pub async fn submit(&mut self) -> SearchOutcome {
        if !self.page.search_form {
            return SearchOutcome::Ignored;
        }
        let ticket = match self.begin_search() {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };
        let result = self.geocoder.geocode(ticket.query()).await;
        self.complete_search(&ticket, result)
    }

    /// Validates the input and starts a search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchOutcome::Prompted`] when the input is blank; no ticket
    /// is issued and nothing should be sent to the geocoder.
    pub fn begin_search(&mut self) -> Result<SearchTicket, SearchOutcome> {
        let query = self.input.trim();
        if query.is_empty() {
            self.show_message(render::MSG_PROMPT);
            return Err(SearchOutcome::Prompted);
        }
        let query = query.to_owned();

        self.latest_seq += 1;
        if self.phase != Phase::Searching {
            self.phase_before_search = self.phase;
        }
        self.phase = Phase::Searching;
        self.show_message(render::MSG_SEARCHING);
        tracing::debug!(seq = self.latest_seq, query = %query, "search started");

        Ok(SearchTicket {
            seq: self.latest_seq,
            query,
        })
    }

    /// Applies the geocoder's answer for `ticket`.
    pub fn complete_search(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Option<SearchOrigin>, ClientError>,
    ) -> SearchOutcome {
        if ticket.seq != self.latest_seq {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding stale search result"
            );
            return SearchOutcome::Stale;
        }

        match result {
            Ok(Some(origin)) => self.show_nearby(origin),
            Ok(None) => {
                tracing::info!(query = ticket.query(), "no geocoding match");
                self.show_no_match()
            }
            Err(error) if error.is_status() => {
                tracing::warn!(query = ticket.query(), %error, "geocoding rejected");
                self.show_no_match()
            }
            Err(error) => {
                tracing::error!(query = ticket.query(), %error, "search failed");
                self.show_message(render::MSG_FAILED);
                self.phase = self.phase_before_search;
                SearchOutcome::Failed
            }
        }
    }

    fn show_nearby(&mut self, origin: SearchOrigin) -> SearchOutcome {
        let filtered = self
            .collection
            .as_deref()
            .map(|c| c.within_radius(origin.position(), self.radius_mi))
            .unwrap_or_default();

        self.map.set_pins(&filtered);
        if filtered.is_empty() {
            let zoom = self.map.camera().origin_zoom;
            self.map.fly_to_zoom(origin.position(), zoom);
        } else {
            self.map.fit_to_features(&filtered);
        }

        let count = filtered.len();
        tracing::info!(label = %origin.label, count, radius_mi = self.radius_mi, "search complete");
        self.show_rows(filtered);
        self.phase = self.settled_phase();
        SearchOutcome::Found { origin, count }
    }

    /// No geocoding match: the pin layer follows the (empty) result set.
    fn show_no_match(&mut self) -> SearchOutcome {
        self.map.set_pins(&[]);
        self.rows.clear();
        self.show_message(render::MSG_NO_RESULTS);
        self.phase = self.settled_phase();
        SearchOutcome::NoMatch
    }

    fn settled_phase(&self) -> Phase {
        if self.collection.is_some() {
            Phase::Filtered
        } else {
            Phase::Uninitialized
        }
    }

    /// "Show all": restores the full collection and clears the search.
    ///
    /// Also supersedes any search still waiting on the geocoder. Does nothing
    /// at all while no collection is loaded.
    pub fn show_all(&mut self) {
        if !self.page.show_all {
            return;
        }
        let Some(collection) = self.collection.clone() else {
            return;
        };
        self.latest_seq += 1;

        self.map.set_pins(collection.features());
        self.map.fit_to_features(collection.features());
        self.map.close_popup();
        self.input.clear();
        self.show_rows(collection.features().to_vec());
        self.phase = Phase::Idle;
    }

    /// A click on result row `idx`. Returns false if no such row exists.
    pub fn select_result(&mut self, idx: usize) -> bool {
        let Some(feature) = self.rows.get(idx) else {
            return false;
        };
        self.map.focus(feature);
        true
    }

    /// A click on a pin.
    pub fn select_pin(&mut self, feature: &RetailerFeature) {
        self.map.focus(feature);
    }

    pub fn pointer_entered_map(&mut self) {
        if self.page.map {
            self.scroll.pointer_entered();
        }
    }

    pub fn pointer_left_map(&mut self) {
        self.scroll.pointer_left();
    }

    #[must_use]
    pub fn should_prevent_scroll(&self, event: ScrollEvent) -> bool {
        self.scroll.should_prevent(event)
    }

    fn show_rows(&mut self, rows: Vec<RetailerFeature>) {
        if self.page.results {
            self.panel = Some(render::render_results(&rows).into_string());
        }
        self.rows = rows;
    }

    fn show_message(&mut self, message: &str) {
        if self.page.results {
            self.panel = Some(render::render_message(message).into_string());
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn rows(&self) -> &[RetailerFeature] {
        &self.rows
    }

    /// Current markup of the results container, if the page has one.
    #[must_use]
    pub fn panel_html(&self) -> Option<&str> {
        self.panel.as_deref()
    }

    #[must_use]
    pub fn collection(&self) -> Option<&RetailerCollection> {
        self.collection.as_deref()
    }

    #[must_use]
    pub fn radius_mi(&self) -> f64 {
        self.radius_mi
    }

    pub fn map(&self) -> &MapAdapter<S> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapAdapter<S> {
        &mut self.map
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
