//! Persisted sweep outcomes and plot series.

mod series;
mod store;

pub use series::{PlotSink, Series, SeriesExporter, extract_series};
pub use store::ResultStore;
