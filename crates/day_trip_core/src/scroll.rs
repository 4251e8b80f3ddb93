//! crates/day_trip_core/src/scroll.rs
//!
//! Turns viewport scroll notifications into `load_next` calls.

use serde::Deserialize;
use std::sync::Arc;

use crate::listing::{ListingQueryEngine, LoadOutcome};
use crate::ports::PortResult;

/// Distance from the bottom of the document, in pixels, at which the next page is requested.
pub const SCROLL_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn near_bottom(&self) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height - SCROLL_THRESHOLD
    }
}

/// Fires on every qualifying scroll event with no throttling of its own; the
/// engine's in-flight guard is what keeps fetches to one at a time.
pub struct ScrollTrigger {
    engine: Arc<ListingQueryEngine>,
}

impl ScrollTrigger {
    pub fn new(engine: Arc<ListingQueryEngine>) -> Self {
        Self { engine }
    }

    /// Returns `None` when the viewport is not near the bottom.
    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> PortResult<Option<LoadOutcome>> {
        if !metrics.near_bottom() {
            return Ok(None);
        }
        self.engine.load_next().await.map(Some)
    }
}
