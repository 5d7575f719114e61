//! Episode browsing widgets for a video-streaming front-end.
//!
//! episode-browser provides the state behind two widgets and a terminal
//! front-end that hosts them:
//!
//! - an info card for a media item ([`info_card`]);
//! - a searchable, paginated episode list with watch tracking
//!   ([`browser`]), persisting its per-series state in a key-value store
//!   ([`storage`], [`history`], [`preferences`]).
//!
//! # Usage
//!
//! ```bash
//! # Browse a series file
//! cargo run -- series.json
//!
//! # Start on a given episode, without touching the store
//! cargo run -- series.json --selected ep-120 --no-persist
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod history;
pub mod info_card;
pub mod pagination;
pub mod preferences;
pub mod storage;
pub mod tui;
pub mod types;
