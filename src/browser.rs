//! Episode browser model.
//!
//! Holds the state behind the episode list: search text, active interval,
//! display mode, scroll offset and the watched set of the current series.
//! Everything else (interval options, the visible episodes, the row layout
//! flag) is derived on demand from the episode list.
//!
//! The selected episode id is owned by the caller. User selections go
//! through [`EpisodeBrowser::select_episode`]; selections arriving from
//! elsewhere are reported with [`EpisodeBrowser::sync_selection`].

use crate::history::{WatchedRepository, WatchedSet};
use crate::pagination::{self, DEFAULT_PAGE_SIZE, Interval};
use crate::preferences;
use crate::storage::KeyValueStore;
use crate::types::{DisplayMode, Episode};
use log::{debug, info};

/// State of one mounted episode list.
pub struct EpisodeBrowser {
    series_id: Option<String>,
    episodes: Vec<Episode>,
    selected_id: Option<String>,
    page_size: usize,
    interval: Interval,
    search: String,
    display_mode: DisplayMode,
    scroll_offset: usize,
    /// Set on the first user selection and never cleared for this mount.
    user_navigated: bool,
    watched: WatchedSet,
    store: Box<dyn KeyValueStore>,
}

impl EpisodeBrowser {
    /// Mount a browser for a series.
    ///
    /// Without a series id nothing is read from or written to the store.
    pub fn mount(
        series_id: Option<String>,
        episodes: Vec<Episode>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        Self::with_page_size(series_id, episodes, store, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(
        series_id: Option<String>,
        episodes: Vec<Episode>,
        store: Box<dyn KeyValueStore>,
        page_size: usize,
    ) -> Self {
        let page_size = page_size.max(1);
        let mut browser = Self {
            series_id: None,
            episodes: Vec::new(),
            selected_id: None,
            page_size,
            interval: Interval::new(0, page_size - 1),
            search: String::new(),
            display_mode: DisplayMode::List,
            scroll_offset: 0,
            user_navigated: false,
            watched: WatchedSet::new(),
            store,
        };
        browser.change_series(series_id, episodes);
        browser
    }

    /// Switch to another series, reloading its persisted state.
    ///
    /// Transient state (search, interval, the user-navigation flag) starts
    /// over as for a fresh mount.
    pub fn change_series(&mut self, series_id: Option<String>, episodes: Vec<Episode>) {
        self.series_id = series_id;
        self.episodes = episodes;
        self.search.clear();
        self.interval = Interval::new(0, self.page_size - 1);
        self.user_navigated = false;
        self.scroll_offset = 0;
        self.watched = WatchedSet::new();
        self.display_mode = DisplayMode::default_for(&self.episodes);

        if let Some(id) = self.series_id.clone() {
            self.display_mode = preferences::load_display_mode(self.store.as_ref(), &id)
                .unwrap_or(self.display_mode);
            preferences::save_display_mode(self.store.as_mut(), &id, self.display_mode);

            self.watched = WatchedRepository::new(self.store.as_mut()).get(&id);
            self.scroll_offset =
                preferences::load_scroll_position(self.store.as_ref(), &id).unwrap_or(0);

            debug!(
                "Mounted series {} ({} episodes, {} watched, {} mode)",
                id,
                self.episodes.len(),
                self.watched.len(),
                self.display_mode
            );
        }

        self.follow_external_selection();
    }

    /// Replace the episode list of the current series.
    ///
    /// Windows are recomputed and the active one keeps its position: window
    /// k stays window k (with its new bounds). When there is no window k any
    /// more the first window becomes active.
    pub fn set_episodes(&mut self, episodes: Vec<Episode>) {
        let index = self.active_interval_index();
        self.episodes = episodes;

        let options = self.interval_options();
        self.interval = index
            .and_then(|k| options.get(k))
            .or_else(|| options.first())
            .copied()
            .unwrap_or(Interval::new(0, self.page_size - 1));

        self.follow_external_selection();
    }

    pub fn series_id(&self) -> Option<&str> {
        self.series_id.as_deref()
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    // ── Pagination ──────────────────────────────────────────────────

    /// Windows over the current episode list.
    pub fn interval_options(&self) -> Vec<Interval> {
        pagination::interval_options(self.episodes.len(), self.page_size)
    }

    pub fn active_interval(&self) -> Interval {
        self.interval
    }

    /// Position of the active window among the options.
    pub fn active_interval_index(&self) -> Option<usize> {
        self.interval_options()
            .iter()
            .position(|i| *i == self.interval)
    }

    /// Make `interval` active if it is one of the current options.
    pub fn set_interval(&mut self, interval: Interval) -> bool {
        if self.interval_options().contains(&interval) {
            self.interval = interval;
            true
        } else {
            false
        }
    }

    pub fn select_interval_index(&mut self, index: usize) -> bool {
        match self.interval_options().get(index) {
            Some(interval) => {
                self.interval = *interval;
                true
            }
            None => false,
        }
    }

    pub fn next_interval(&mut self) -> bool {
        let next = self.active_interval_index().map_or(0, |i| i + 1);
        self.select_interval_index(next)
    }

    pub fn previous_interval(&mut self) -> bool {
        match self.active_interval_index() {
            Some(i) if i > 0 => self.select_interval_index(i - 1),
            _ => false,
        }
    }

    // ── Search ──────────────────────────────────────────────────────

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_searching(&self) -> bool {
        !self.search.is_empty()
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Episodes to render.
    ///
    /// While searching this is every episode whose title (ignoring case) or
    /// number contains the search text; otherwise the active window.
    pub fn displayed_episodes(&self) -> Vec<&Episode> {
        if self.search.is_empty() {
            return self.interval.slice(&self.episodes).iter().collect();
        }

        let query = self.search.to_lowercase();
        self.episodes
            .iter()
            .filter(|e| {
                e.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&query))
                    || e.number.to_string().contains(&query)
            })
            .collect()
    }

    // ── Display mode ────────────────────────────────────────────────

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn is_row_layout(&self) -> bool {
        self.display_mode.is_row_layout()
    }

    /// Advance `list → grid → imageList → list` and persist the result.
    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.next();
        if let Some(id) = &self.series_id {
            preferences::save_display_mode(self.store.as_mut(), id, self.display_mode);
        }
        self.display_mode
    }

    // ── Selection and watch tracking ────────────────────────────────

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id.as_deref() == Some(id)
    }

    pub fn user_navigated(&self) -> bool {
        self.user_navigated
    }

    pub fn watched(&self) -> &WatchedSet {
        &self.watched
    }

    pub fn is_watched(&self, id: &str) -> bool {
        self.watched.contains(id)
    }

    /// Handle a selection made by the user.
    ///
    /// The episode is marked watched, the user-navigation flag is set, and
    /// only then is `on_select` called with the id.
    pub fn select_episode<F>(&mut self, id: &str, on_select: F)
    where
        F: FnOnce(&str),
    {
        self.mark_watched(id);
        self.user_navigated = true;
        info!("Selected episode {}", id);
        on_select(id);
    }

    /// Report the selected id currently held by the caller.
    ///
    /// Until the user has selected something themselves, a new selection is
    /// marked watched and the active window jumps to the one containing it.
    pub fn sync_selection(&mut self, selected_id: Option<&str>) {
        if self.selected_id.as_deref() == selected_id {
            return;
        }
        self.selected_id = selected_id.map(str::to_string);
        self.follow_external_selection();
    }

    /// Add an episode of the current list to the watched set.
    ///
    /// Returns false, without touching the store, when the id is unknown or
    /// already watched.
    pub fn mark_watched(&mut self, id: &str) -> bool {
        let Some(episode) = self.episodes.iter().find(|e| e.id == id) else {
            debug!("Cannot mark unknown episode {} as watched", id);
            return false;
        };

        if !self.watched.insert(episode.clone()) {
            return false;
        }

        if let Some(series_id) = &self.series_id {
            WatchedRepository::new(self.store.as_mut()).put(series_id, &self.watched);
        }
        true
    }

    fn follow_external_selection(&mut self) {
        if self.user_navigated {
            return;
        }
        let Some(id) = self.selected_id.clone() else {
            return;
        };

        self.mark_watched(&id);

        let Some(number) = self.episodes.iter().find(|e| e.id == id).map(|e| e.number) else {
            return;
        };
        if let Some(interval) = pagination::interval_for_number(&self.interval_options(), number)
        {
            if interval != self.interval {
                debug!("Jumping to {} for episode {}", interval.label(), number);
            }
            self.interval = interval;
        }
    }

    // ── Scroll position ─────────────────────────────────────────────

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Remember the list's scroll offset, persisting it on every call.
    pub fn record_scroll(&mut self, offset: usize) {
        self.scroll_offset = offset;
        if let Some(id) = &self.series_id {
            preferences::save_scroll_position(self.store.as_mut(), id, offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::history::WATCHED_KEY;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn episodes(count: i64) -> Vec<Episode> {
        (1..=count)
            .map(|n| Episode::new(n.to_string(), n).with_title(format!("Episode {}", n)))
            .collect()
    }

    fn browser(count: i64) -> EpisodeBrowser {
        EpisodeBrowser::mount(
            Some("show".to_string()),
            episodes(count),
            Box::new(MemoryStore::new()),
        )
    }

    /// Store that appends every write to a shared log.
    #[derive(Clone, Default)]
    struct RecordingStore {
        inner: MemoryStore,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl KeyValueStore for RecordingStore {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
            self.log.borrow_mut().push(format!("set {}", key));
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_interval_options_for_150_episodes() {
        let b = browser(150);
        assert_eq!(
            b.interval_options(),
            vec![Interval::new(0, 99), Interval::new(100, 149)]
        );
        assert_eq!(b.active_interval(), Interval::new(0, 99));
        assert_eq!(b.displayed_episodes().len(), 100);
    }

    #[test]
    fn test_external_selection_jumps_interval() {
        let mut b = browser(150);
        b.sync_selection(Some("120"));

        assert_eq!(b.active_interval(), Interval::new(100, 149));
        assert!(b.is_watched("120"));
        assert!(!b.user_navigated());
        assert_eq!(b.displayed_episodes()[0].number, 101);
    }

    #[test]
    fn test_external_selection_after_user_navigation_does_not_jump() {
        let mut b = browser(150);
        b.select_episode("5", |_| {});
        b.sync_selection(Some("5"));
        b.sync_selection(Some("120"));

        assert_eq!(b.active_interval(), Interval::new(0, 99));
        assert!(!b.is_watched("120"));
        assert!(b.is_selected("120"));
    }

    #[test]
    fn test_user_selection_order() {
        let store = RecordingStore::default();
        let log = store.log.clone();
        let mut b = EpisodeBrowser::mount(Some("show".to_string()), episodes(3), Box::new(store));
        log.borrow_mut().clear();

        let callback_log = log.clone();
        b.select_episode("2", move |id| {
            callback_log.borrow_mut().push(format!("select {}", id))
        });

        assert_eq!(
            *log.borrow(),
            vec![
                "set watched-episodes".to_string(),
                "set watched-episodes-show".to_string(),
                "select 2".to_string(),
            ]
        );
        assert!(b.user_navigated());
        assert!(b.is_watched("2"));
    }

    #[test]
    fn test_marking_twice_writes_once() {
        let store = RecordingStore::default();
        let log = store.log.clone();
        let mut b = EpisodeBrowser::mount(Some("show".to_string()), episodes(3), Box::new(store));
        log.borrow_mut().clear();

        assert!(b.mark_watched("1"));
        assert!(!b.mark_watched("1"));
        b.select_episode("1", |_| {});

        assert_eq!(b.watched().len(), 1);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_unknown_episode_is_not_marked() {
        let mut b = browser(3);
        assert!(!b.mark_watched("nope"));
        assert!(b.watched().is_empty());
    }

    #[test]
    fn test_search_ignores_interval() {
        let mut b = browser(150);
        b.set_search("14");

        let numbers: Vec<i64> = b.displayed_episodes().iter().map(|e| e.number).collect();
        let expected: Vec<i64> = (1..=150)
            .filter(|n| n.to_string().contains("14"))
            .collect();
        assert_eq!(numbers, expected);
        assert!(numbers.contains(&140));
        assert!(b.is_searching());

        b.clear_search();
        assert!(!b.is_searching());
        assert_eq!(b.displayed_episodes().len(), 100);
    }

    #[test]
    fn test_search_is_case_insensitive_on_titles() {
        let eps = vec![
            Episode::new("a", 1).with_title("The Journey Begins"),
            Episode::new("b", 2).with_title("Return"),
            Episode::new("c", 3),
        ];
        let mut b = EpisodeBrowser::mount(None, eps, Box::new(MemoryStore::new()));

        b.set_search("JOURN");
        let ids: Vec<&str> = b.displayed_episodes().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        b.set_search("3");
        let ids: Vec<&str> = b.displayed_episodes().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_search_editing() {
        let mut b = browser(20);
        b.push_search_char('1');
        b.push_search_char('2');
        assert_eq!(b.search(), "12");
        assert_eq!(b.displayed_episodes().len(), 1);
        b.pop_search_char();
        assert_eq!(b.displayed_episodes().len(), 11);
    }

    #[test]
    fn test_toggle_display_mode_persists_each_step() {
        let mut b = browser(3);
        assert_eq!(b.display_mode(), DisplayMode::List);

        for expected in [DisplayMode::Grid, DisplayMode::ImageList, DisplayMode::List] {
            assert_eq!(b.toggle_display_mode(), expected);
            assert_eq!(
                preferences::load_display_mode(b.store(), "show"),
                Some(expected)
            );
        }
        assert!(b.is_row_layout());
    }

    #[test]
    fn test_default_mode_is_grid_with_missing_titles() {
        let eps = vec![Episode::new("1", 1).with_title("A"), Episode::new("2", 2)];
        let b = EpisodeBrowser::mount(Some("s".to_string()), eps, Box::new(MemoryStore::new()));
        assert_eq!(b.display_mode(), DisplayMode::Grid);
        assert!(!b.is_row_layout());
        // The default is written back on mount.
        assert_eq!(
            preferences::load_display_mode(b.store(), "s"),
            Some(DisplayMode::Grid)
        );
    }

    #[test]
    fn test_mount_restores_persisted_state() {
        let mut store = MemoryStore::new();
        preferences::save_display_mode(&mut store, "show", DisplayMode::ImageList);
        preferences::save_scroll_position(&mut store, "show", 17);
        WatchedRepository::new(&mut store).put("show", &WatchedSet::from(episodes(2)));

        let b = EpisodeBrowser::mount(Some("show".to_string()), episodes(10), Box::new(store));
        assert_eq!(b.display_mode(), DisplayMode::ImageList);
        assert_eq!(b.scroll_offset(), 17);
        assert!(b.is_watched("1"));
        assert!(b.is_watched("2"));
        assert!(!b.is_watched("3"));
    }

    #[test]
    fn test_malformed_stored_state_is_ignored() {
        let mut store = MemoryStore::new();
        store.set_item(WATCHED_KEY, "{{{").unwrap();
        store.set_item("layout-preference-show", "mosaic").unwrap();
        store.set_item("scroll-position-show", "far").unwrap();

        let b = EpisodeBrowser::mount(Some("show".to_string()), episodes(3), Box::new(store));
        assert!(b.watched().is_empty());
        assert_eq!(b.display_mode(), DisplayMode::List);
        assert_eq!(b.scroll_offset(), 0);
    }

    #[test]
    fn test_without_series_id_nothing_is_stored() {
        let store = RecordingStore::default();
        let log = store.log.clone();
        let mut b = EpisodeBrowser::mount(None, episodes(3), Box::new(store));

        b.select_episode("1", |_| {});
        b.toggle_display_mode();
        b.record_scroll(4);

        assert!(log.borrow().is_empty());
        assert!(b.is_watched("1"));
        assert_eq!(b.scroll_offset(), 4);
    }

    #[test]
    fn test_record_scroll_persists_every_call() {
        let store = RecordingStore::default();
        let log = store.log.clone();
        let mut b = EpisodeBrowser::mount(Some("show".to_string()), episodes(3), Box::new(store));
        log.borrow_mut().clear();

        b.record_scroll(1);
        b.record_scroll(2);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(preferences::load_scroll_position(b.store(), "show"), Some(2));
    }

    #[test]
    fn test_empty_episode_list() {
        let mut b = browser(0);
        assert!(b.interval_options().is_empty());
        assert!(b.displayed_episodes().is_empty());
        assert!(!b.next_interval());
        b.sync_selection(Some("1"));
        b.set_search("x");
        assert!(b.displayed_episodes().is_empty());
    }

    #[test]
    fn test_shrinking_list_falls_back_to_first_window() {
        let mut b = browser(250);
        assert!(b.select_interval_index(2));
        assert_eq!(b.active_interval(), Interval::new(200, 249));

        b.set_episodes(episodes(120));
        assert_eq!(b.active_interval(), Interval::new(0, 99));
        assert_eq!(b.displayed_episodes().len(), 100);
    }

    #[test]
    fn test_growing_list_keeps_window() {
        let mut b = browser(150);
        b.select_interval_index(1);
        b.set_episodes(episodes(250));
        assert_eq!(b.active_interval(), Interval::new(100, 199));
        assert_eq!(b.displayed_episodes().len(), 100);

        b.set_episodes(episodes(260));
        assert_eq!(b.active_interval(), Interval::new(100, 199));
        assert_eq!(b.active_interval_index(), Some(1));
    }

    #[test]
    fn test_partial_last_window_follows_new_bounds() {
        let mut b = browser(250);
        assert!(b.select_interval_index(2));

        b.set_episodes(episodes(230));
        assert_eq!(b.active_interval(), Interval::new(200, 229));
        assert_eq!(b.displayed_episodes().len(), 30);
    }

    #[test]
    fn test_interval_navigation() {
        let mut b = browser(250);
        assert!(!b.previous_interval());
        assert!(b.next_interval());
        assert!(b.next_interval());
        assert!(!b.next_interval());
        assert_eq!(b.active_interval_index(), Some(2));
        assert!(b.previous_interval());
        assert_eq!(b.active_interval(), Interval::new(100, 199));

        assert!(!b.set_interval(Interval::new(5, 10)));
        assert!(b.set_interval(Interval::new(0, 99)));
    }

    #[test]
    fn test_change_series_reloads_state() {
        let mut b = browser(10);
        b.select_episode("3", |_| {});
        b.set_search("x");
        b.toggle_display_mode();

        b.change_series(Some("other".to_string()), episodes(5));
        assert!(!b.user_navigated());
        assert!(!b.is_searching());
        assert!(!b.is_watched("3"));
        assert_eq!(b.display_mode(), DisplayMode::List);

        b.change_series(Some("show".to_string()), episodes(10));
        assert!(b.is_watched("3"));
        assert_eq!(b.display_mode(), DisplayMode::Grid);
    }
}
