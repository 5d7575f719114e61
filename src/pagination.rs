//! Interval pagination over an episode sequence.
//!
//! The sequence is cut into consecutive windows of `page_size` items. Each
//! window is an inclusive pair of 0-based indices; labels use 1-based
//! numbering.

use crate::error::AppError;
use std::fmt;
use std::str::FromStr;

/// Default number of episodes per window.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Inclusive index range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of indices covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    /// Whether a 1-based episode number falls inside this window.
    pub fn contains_number(&self, number: i64) -> bool {
        number >= self.start as i64 + 1 && number <= self.end as i64 + 1
    }

    /// The part of `items` covered by this window, clamped to its length.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start.min(items.len());
        let end = self.end.saturating_add(1).min(items.len()).max(start);
        &items[start..end]
    }

    /// Human-facing label.
    ///
    /// ```
    /// use episode_browser::pagination::Interval;
    ///
    /// assert_eq!(Interval::new(100, 149).label(), "Episodes 101 - 150");
    /// ```
    pub fn label(&self) -> String {
        format!("Episodes {} - {}", self.start + 1, self.end + 1)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for Interval {
    type Err = AppError;

    /// Parse the `start-end` option value form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |what: &str| AppError::InvalidInput(format!("{} in interval '{}'", what, s));

        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| invalid("missing '-'"))?;
        let start: usize = start.trim().parse().map_err(|_| invalid("bad start"))?;
        let end: usize = end.trim().parse().map_err(|_| invalid("bad end"))?;

        if start > end {
            return Err(invalid("start after end"));
        }

        Ok(Interval { start, end })
    }
}

/// Cut `len` items into windows of `page_size`.
///
/// ```
/// use episode_browser::pagination::{interval_options, Interval};
///
/// assert_eq!(
///     interval_options(150, 100),
///     vec![Interval::new(0, 99), Interval::new(100, 149)]
/// );
/// assert!(interval_options(0, 100).is_empty());
/// ```
pub fn interval_options(len: usize, page_size: usize) -> Vec<Interval> {
    let page_size = page_size.max(1);
    (0..len)
        .step_by(page_size)
        .map(|start| Interval::new(start, (start + page_size - 1).min(len - 1)))
        .collect()
}

/// First window whose 1-based range contains `number`.
pub fn interval_for_number(options: &[Interval], number: i64) -> Option<Interval> {
    options.iter().copied().find(|i| i.contains_number(number))
}
