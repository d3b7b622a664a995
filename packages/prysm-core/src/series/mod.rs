//! Historical price series for the chart.
//!
//! - **Window**: filter a raw feed to a [`TimeRange`] and compute aggregates
//! - **Feed**: fetch the raw feed over HTTP
//! - **Session**: track the current request and drop stale responses

mod feed;
mod session;
mod window;

pub use feed::{parse_feed, FeedClient, FetchError, DEFAULT_FEED_URL};
pub use session::{ChartSession, ChartState, FeedTicket};
pub use window::{
    average_volume_millions, build_view, overall_change, period_high, period_low, ChartPoint,
    OverallChange, SeriesView, TimeRange,
};
