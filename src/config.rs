//! Configuration file support for episode-browser.
//!
//! This module loads user preferences from a TOML configuration file.

use crate::pagination::DEFAULT_PAGE_SIZE;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Episodes per interval window
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Description length in characters before the info card truncates it
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,

    /// Number of genre tags shown on the info card
    #[serde(default = "default_max_genres")]
    pub max_genres: usize,

    /// Store file (overrides the platform data directory)
    #[serde(default)]
    pub storage_path: Option<String>,

    /// Whether the info card panel is visible on startup
    #[serde(default = "default_show_info_panel")]
    pub show_info_panel: bool,

    /// Key bindings
    #[serde(default)]
    pub keybindings: Keybindings,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_description_length() -> usize {
    100
}

fn default_max_genres() -> usize {
    3
}

fn default_show_info_panel() -> bool {
    true
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            page_size: default_page_size(),
            max_description_length: default_max_description_length(),
            max_genres: default_max_genres(),
            storage_path: None,
            show_info_panel: default_show_info_panel(),
            keybindings: Keybindings::default(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/episode-browser/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("episode-browser");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> crate::error::Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Key bindings, each a list of key names.
///
/// Names are single characters (`"j"`), named keys (`"up"`, `"enter"`,
/// `"esc"`, `"tab"`, `"backspace"`, `"pageup"`, ...), optionally prefixed
/// with `ctrl+`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub select: Vec<String>,
    pub search: Vec<String>,
    pub next_interval: Vec<String>,
    pub previous_interval: Vec<String>,
    pub toggle_layout: Vec<String>,
    pub toggle_info: Vec<String>,
    pub help: Vec<String>,
    pub quit: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            up: keys(&["k", "up"]),
            down: keys(&["j", "down"]),
            left: keys(&["h", "left"]),
            right: keys(&["l", "right"]),
            select: keys(&["enter"]),
            search: keys(&["/"]),
            next_interval: keys(&["]", "pagedown"]),
            previous_interval: keys(&["[", "pageup"]),
            toggle_layout: keys(&["v"]),
            toggle_info: keys(&["i"]),
            help: keys(&["?"]),
            quit: keys(&["q"]),
        }
    }
}

impl Keybindings {
    /// Check whether `key` matches any of the names in `binding`.
    pub fn matches(&self, binding: &[String], key: &KeyEvent) -> bool {
        binding.iter().any(|name| key_matches(name, key))
    }
}

fn key_matches(name: &str, key: &KeyEvent) -> bool {
    let lower = name.to_lowercase();
    let (wants_ctrl, base) = match lower.strip_prefix("ctrl+") {
        Some(rest) => (true, rest),
        None => (false, lower.as_str()),
    };

    if wants_ctrl != key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    let code = match base {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "space" => KeyCode::Char(' '),
        _ => {
            // Single characters keep their case ("G" vs "g").
            let mut chars = name.chars().skip(if wants_ctrl { 5 } else { 0 });
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return false,
            }
        }
    };

    key.code == code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_new_config_has_defaults() {
        let config = Config::new();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_description_length, 100);
        assert_eq!(config.max_genres, 3);
        assert!(config.storage_path.is_none());
        assert!(config.show_info_panel);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            page_size: 50,
            storage_path: Some("/tmp/store.json".to_string()),
            ..Config::new()
        };

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("page_size = 50"));
        assert!(toml_str.contains("storage_path = \"/tmp/store.json\""));
        assert!(toml_str.contains("[keybindings]"));
    }

    #[test]
    fn test_config_partial_deserialization() {
        // Only specify some fields, rest should use defaults
        let toml_str = r#"
            page_size = 25

            [keybindings]
            quit = ["x"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.max_description_length, 100); // default
        assert_eq!(config.keybindings.quit, vec!["x".to_string()]);
        assert_eq!(config.keybindings.up, Keybindings::default().up); // default
    }

    #[test]
    fn test_default_keybindings_match() {
        let kb = Keybindings::default();
        assert!(kb.matches(&kb.up, &press(KeyCode::Char('k'))));
        assert!(kb.matches(&kb.up, &press(KeyCode::Up)));
        assert!(kb.matches(&kb.select, &press(KeyCode::Enter)));
        assert!(kb.matches(&kb.next_interval, &press(KeyCode::Char(']'))));
        assert!(!kb.matches(&kb.quit, &press(KeyCode::Char('Q'))));
    }

    #[test]
    fn test_layout_and_grid_keys_do_not_overlap() {
        let kb = Keybindings::default();
        assert!(kb.matches(&kb.toggle_layout, &press(KeyCode::Char('v'))));
        assert!(kb.matches(&kb.right, &press(KeyCode::Char('l'))));
        assert!(kb.matches(&kb.left, &press(KeyCode::Char('h'))));

        let v = press(KeyCode::Char('v'));
        for binding in [&kb.up, &kb.down, &kb.left, &kb.right, &kb.select] {
            assert!(!kb.matches(binding, &v));
        }
    }

    #[test]
    fn test_ctrl_binding() {
        let binding = vec!["ctrl+d".to_string()];
        let kb = Keybindings::default();
        assert!(kb.matches(
            &binding,
            &KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL)
        ));
        assert!(!kb.matches(&binding, &press(KeyCode::Char('d'))));
    }
}
