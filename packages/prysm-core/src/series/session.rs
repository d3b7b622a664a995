//! Chart state machine with stale-response protection.

use super::feed::FetchError;
use super::window::{build_view, SeriesView, TimeRange};
use crate::types::PricePoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the chart should show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChartState {
    /// A fetch is in flight
    Loading,
    /// The window has at least one point
    Ready(SeriesView),
    /// The fetch succeeded but no point falls inside the window
    Empty { range: TimeRange },
    /// The fetch failed; the caller may retry
    Failed { message: String },
}

impl ChartState {
    /// Turn a fetch outcome into a chart state.
    pub fn from_fetch(
        result: Result<Vec<PricePoint>, FetchError>,
        range: TimeRange,
        today: NaiveDate,
    ) -> Self {
        match result {
            Ok(feed) => Self::from_feed(&feed, range, today),
            Err(err) => ChartState::Failed {
                message: err.to_string(),
            },
        }
    }

    /// Window a feed that is already in hand.
    pub fn from_feed(feed: &[PricePoint], range: TimeRange, today: NaiveDate) -> Self {
        let view = build_view(feed, range, today);
        if view.is_empty() {
            ChartState::Empty { range }
        } else {
            ChartState::Ready(view)
        }
    }

    pub fn view(&self) -> Option<&SeriesView> {
        match self {
            ChartState::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ChartState::Failed { .. })
    }
}

/// Identifies one fetch issued by a [`ChartSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTicket {
    pub generation: u64,
    pub symbol: String,
    pub range: TimeRange,
}

/// Tracks the current symbol and range for one chart.
///
/// Each call to [`request`](ChartSession::request) bumps the generation; a
/// response carrying an older ticket is discarded by
/// [`resolve`](ChartSession::resolve).
#[derive(Debug)]
pub struct ChartSession {
    symbol: String,
    range: TimeRange,
    generation: u64,
    state: ChartState,
}

impl ChartSession {
    pub fn new(symbol: &str, range: TimeRange) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            range,
            generation: 0,
            state: ChartState::Loading,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    /// Start a fetch for the current symbol and range, superseding any
    /// outstanding one.
    pub fn refresh(&mut self) -> FeedTicket {
        self.generation += 1;
        self.state = ChartState::Loading;
        FeedTicket {
            generation: self.generation,
            symbol: self.symbol.clone(),
            range: self.range,
        }
    }

    /// Switch symbol and range, then start a fetch.
    pub fn request(&mut self, symbol: &str, range: TimeRange) -> FeedTicket {
        self.symbol = symbol.to_uppercase();
        self.range = range;
        self.refresh()
    }

    /// Switch only the range, then start a fetch.
    pub fn set_range(&mut self, range: TimeRange) -> FeedTicket {
        self.range = range;
        self.refresh()
    }

    /// Whether a response for `ticket` should still be applied.
    pub fn is_current(&self, ticket: &FeedTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a fetch result if its ticket is still current.
    ///
    /// Returns `false` and leaves the state untouched for stale tickets.
    pub fn resolve(
        &mut self,
        ticket: &FeedTicket,
        result: Result<Vec<PricePoint>, FetchError>,
        today: NaiveDate,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                symbol = %ticket.symbol,
                range = %ticket.range,
                stale = ticket.generation,
                current = self.generation,
                "Discarding stale price feed"
            );
            return false;
        }

        self.state = ChartState::from_fetch(result, ticket.range, today);
        if let ChartState::Failed { message } = &self.state {
            tracing::warn!(symbol = %ticket.symbol, "Price feed failed: {}", message);
        }
        true
    }
}
