//! Type definitions for the episode-browser application.
//!
//! This module contains the core data structures shared by the widgets:
//! episodes, display modes, media info and the series file format read by
//! the binary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An episode of a series.
///
/// Supplied by the caller and never mutated by the browser. The serialized
/// form is also what ends up in the watched-episodes store entries.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    /// Unique identifier for the episode.
    pub id: String,

    /// Episode number.
    pub number: i64,

    /// Optional episode title.
    #[serde(default)]
    pub title: Option<String>,

    /// Optional thumbnail reference (URL or path).
    #[serde(default)]
    pub image: Option<String>,
}

impl Episode {
    /// Create an untitled episode without a thumbnail.
    pub fn new(id: impl Into<String>, number: i64) -> Self {
        Self {
            id: id.into(),
            number,
            title: None,
            image: None,
        }
    }

    /// Builder-style title setter.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder-style thumbnail setter.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Whether the episode carries a non-empty title.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Title text, empty when absent.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Format the episode for display in list rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use episode_browser::types::Episode;
    ///
    /// let ep = Episode::new("ep1", 1).with_title("The Beginning");
    /// assert_eq!(ep.to_display(), "1. The Beginning");
    ///
    /// let untitled = Episode::new("ep2", 2);
    /// assert_eq!(untitled.to_display(), "2. ");
    /// ```
    pub fn to_display(&self) -> String {
        format!("{}. {}", self.number, self.title_or_empty())
    }
}

/// The three rendering styles of the episode list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Single column, number and title.
    #[serde(rename = "list")]
    List,
    /// Multi-column cells with bare numbers.
    #[serde(rename = "grid")]
    Grid,
    /// Single column, number, title and thumbnail.
    #[serde(rename = "imageList")]
    ImageList,
}

impl DisplayMode {
    /// The next mode in the toggle cycle `list → grid → imageList → list`.
    pub fn next(self) -> Self {
        match self {
            DisplayMode::List => DisplayMode::Grid,
            DisplayMode::Grid => DisplayMode::ImageList,
            DisplayMode::ImageList => DisplayMode::List,
        }
    }

    /// Mode used when nothing is stored: `list` when every episode has a
    /// title, `grid` otherwise.
    ///
    /// ```
    /// use episode_browser::types::{DisplayMode, Episode};
    ///
    /// let titled = vec![Episode::new("1", 1).with_title("A")];
    /// assert_eq!(DisplayMode::default_for(&titled), DisplayMode::List);
    ///
    /// let bare = vec![Episode::new("1", 1).with_title("A"), Episode::new("2", 2)];
    /// assert_eq!(DisplayMode::default_for(&bare), DisplayMode::Grid);
    /// ```
    pub fn default_for(episodes: &[Episode]) -> Self {
        if episodes.iter().all(Episode::has_title) {
            DisplayMode::List
        } else {
            DisplayMode::Grid
        }
    }

    /// List and image-list render as a single column of rows.
    pub fn is_row_layout(self) -> bool {
        matches!(self, DisplayMode::List | DisplayMode::ImageList)
    }

    /// The string stored under the layout preference key.
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::List => "list",
            DisplayMode::Grid => "grid",
            DisplayMode::ImageList => "imageList",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(DisplayMode::List),
            "grid" => Ok(DisplayMode::Grid),
            "imageList" => Ok(DisplayMode::ImageList),
            other => Err(format!("unknown display mode '{}'", other)),
        }
    }
}

/// Descriptive data for a media item, as shown by the info card.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    /// Description, possibly containing HTML markup.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Accent color as a hex string (`#rgb` or `#rrggbb`).
    #[serde(default)]
    pub color: Option<String>,
    /// Media format, e.g. "TV" or "MOVIE".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Cover image reference.
    #[serde(default)]
    pub cover: Option<String>,
}

/// A series file: media info plus its episodes.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Series {
    /// Series identifier used to scope persisted state.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub info: MediaInfo,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

/// Accepted on-disk shapes: a full series object or a bare episode array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SeriesSource {
    Episodes(Vec<Episode>),
    Full(Series),
}

impl From<SeriesSource> for Series {
    fn from(source: SeriesSource) -> Self {
        match source {
            SeriesSource::Full(series) => series,
            SeriesSource::Episodes(episodes) => Series {
                episodes,
                ..Series::default()
            },
        }
    }
}
