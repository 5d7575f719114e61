//! Hover info card for a media item.
//!
//! [`InfoCard::build`] turns raw [`MediaInfo`] into everything the renderer
//! needs: plain-text truncated description, uppercased status, a capped
//! list of genre tags and colors derived from the item's accent color.

use crate::types::MediaInfo;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Default maximum description length in characters.
pub const DEFAULT_MAX_DESCRIPTION_LENGTH: usize = 100;

/// Default number of genre tags.
pub const DEFAULT_MAX_GENRES: usize = 3;

/// Background image reference used when the item has no cover.
pub const DEFAULT_COVER: &str = "placeholder-cover.webp";

/// Accent used when the item has no usable color.
pub const DEFAULT_ACCENT: Rgb = Rgb(0x8a, 0x8a, 0xd6);

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break pattern"));
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rgb` or `#rrggbb`, with or without the leading `#`.
    ///
    /// ```
    /// use episode_browser::info_card::Rgb;
    ///
    /// assert_eq!(Rgb::parse("#ff8000"), Some(Rgb(255, 128, 0)));
    /// assert_eq!(Rgb::parse("f80"), Some(Rgb(255, 136, 0)));
    /// assert_eq!(Rgb::parse("var(--accent)"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => None,
        }
    }

    /// WCAG relative luminance in `[0, 1]`.
    pub fn relative_luminance(self) -> f64 {
        fn linear(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.0) + 0.7152 * linear(self.1) + 0.0722 * linear(self.2)
    }

    /// Raise HSL lightness by `amount` (clamped).
    pub fn lighten(self, amount: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l + amount).clamp(0.0, 1.0))
    }

    /// Lower HSL lightness by `amount` (clamped).
    pub fn darken(self, amount: f64) -> Self {
        self.lighten(-amount)
    }

    fn to_hsl(self) -> (f64, f64, f64) {
        let r = self.0 as f64 / 255.0;
        let g = self.1 as f64 / 255.0;
        let b = self.2 as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        (h / 6.0, s, l)
    }

    fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

        if s == 0.0 {
            let v = to_byte(l);
            return Rgb(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f64| {
            let t = t.rem_euclid(1.0);
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };

        Rgb(
            to_byte(channel(h + 1.0 / 3.0)),
            to_byte(channel(h)),
            to_byte(channel(h - 1.0 / 3.0)),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Two-stop background gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub from: Rgb,
    pub to: Rgb,
}

impl Gradient {
    /// The accent followed by the accent lightened by 0.1.
    pub fn from_accent(accent: Rgb) -> Self {
        Self {
            from: accent,
            to: accent.lighten(0.1),
        }
    }
}

/// Readable text color on top of `background`.
///
/// Light backgrounds get a darker shade of themselves, dark ones a lighter
/// shade.
pub fn text_color_for(background: Rgb) -> Rgb {
    if background.relative_luminance() > 0.179 {
        background.darken(0.35)
    } else {
        background.lighten(0.35)
    }
}

/// Remove markup tags and decode the common HTML entities.
///
/// ```
/// use episode_browser::info_card::strip_html_tags;
///
/// assert_eq!(strip_html_tags("<i>Hello</i><br>World &amp; co"), "Hello\nWorld & co");
/// ```
pub fn strip_html_tags(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Keep the first `max` characters and append `...` when longer.
pub fn truncate_description(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Everything the info card renders.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoCard {
    pub title: String,
    /// `type | episodes | STATUS | release date`, present only when type,
    /// episode count and status are all known.
    pub metadata: Option<String>,
    pub description: String,
    pub genres: Vec<String>,
    pub accent: Rgb,
    pub gradient: Gradient,
    pub genre_text: Rgb,
    pub cover: String,
}

impl InfoCard {
    /// Build a card with the default description and genre limits.
    pub fn new(info: &MediaInfo) -> Self {
        Self::build(info, DEFAULT_MAX_DESCRIPTION_LENGTH, DEFAULT_MAX_GENRES)
    }

    pub fn build(info: &MediaInfo, max_description_length: usize, max_genres: usize) -> Self {
        let plain = strip_html_tags(info.description.as_deref().unwrap_or(""));
        let description = truncate_description(plain.trim(), max_description_length);
        let status = info.status.as_deref().unwrap_or("").to_uppercase();

        let metadata = match (&info.kind, info.total_episodes, status.is_empty()) {
            (Some(kind), Some(total), false) if total > 0 => {
                let mut parts = vec![kind.clone(), total.to_string(), status.clone()];
                if let Some(date) = &info.release_date {
                    parts.push(date.clone());
                }
                Some(parts.join(" | "))
            }
            _ => None,
        };

        let accent = info
            .color
            .as_deref()
            .and_then(Rgb::parse)
            .unwrap_or(DEFAULT_ACCENT);

        Self {
            title: info.title.clone().unwrap_or_default(),
            metadata,
            description,
            genres: info.genres.iter().take(max_genres).cloned().collect(),
            accent,
            gradient: Gradient::from_accent(accent),
            genre_text: text_color_for(accent),
            cover: info
                .cover
                .clone()
                .unwrap_or_else(|| DEFAULT_COVER.to_string()),
        }
    }
}
