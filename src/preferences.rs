//! Per-series view preferences: layout mode and scroll position.

use crate::storage::{KeyValueStore, read_best_effort, write_best_effort};
use crate::types::DisplayMode;
use log::debug;

pub fn layout_key(series_id: &str) -> String {
    format!("layout-preference-{}", series_id)
}

pub fn scroll_key(series_id: &str) -> String {
    format!("scroll-position-{}", series_id)
}

/// Stored display mode of a series, if any.
///
/// Unknown values are treated as absent.
pub fn load_display_mode(store: &dyn KeyValueStore, series_id: &str) -> Option<DisplayMode> {
    let raw = read_best_effort(store, &layout_key(series_id))?;
    match raw.parse() {
        Ok(mode) => Some(mode),
        Err(e) => {
            debug!("Ignoring stored layout for {}: {}", series_id, e);
            None
        }
    }
}

pub fn save_display_mode(store: &mut dyn KeyValueStore, series_id: &str, mode: DisplayMode) {
    write_best_effort(store, &layout_key(series_id), mode.as_str());
}

/// Stored scroll offset of a series, if any.
pub fn load_scroll_position(store: &dyn KeyValueStore, series_id: &str) -> Option<usize> {
    read_best_effort(store, &scroll_key(series_id))?
        .trim()
        .parse()
        .ok()
}

pub fn save_scroll_position(store: &mut dyn KeyValueStore, series_id: &str, offset: usize) {
    write_best_effort(store, &scroll_key(series_id), &offset.to_string());
}
