//! Configuration management for the annotation pipeline

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::html::HighlightConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub selection: SelectionConfig,
    pub navigation: NavigationConfig,
    pub markers: HighlightConfig,
    pub normalizer: NormalizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// User whose highlights the store reads and writes
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Minimum trimmed selection length, in chars
    pub min_length: usize,
    /// Context captured on each side of a selection, in chars
    pub context_chars: usize,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// How long a navigated-to marker stays emphasized
    pub emphasis_ms: u64,
    /// Delay before the single retry when the marker is not rendered yet
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Minimum text length for a prioritized main-content match to win outright
    pub min_main_text: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: "sqlite:./annotations.db".to_string(),
            user_id: "local".to_string(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            min_length: 3,
            context_chars: 50,
            debounce_ms: 200,
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            emphasis_ms: 2000,
            retry_delay_ms: 150,
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig { min_main_text: 140 }
    }
}

impl SelectionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl NavigationConfig {
    pub fn emphasis(&self) -> Duration {
        Duration::from_millis(self.emphasis_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Config {
    /// Read configuration from the environment; unset or unparseable values
    /// keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                user_id: env::var("ANNOTATE_USER_ID").unwrap_or(defaults.database.user_id),
            },
            selection: SelectionConfig {
                min_length: env_or("SELECTION_MIN_LENGTH", defaults.selection.min_length),
                context_chars: env_or("SELECTION_CONTEXT_CHARS", defaults.selection.context_chars),
                debounce_ms: env_or("SELECTION_DEBOUNCE_MS", defaults.selection.debounce_ms),
            },
            navigation: NavigationConfig {
                emphasis_ms: env_or("NAVIGATION_EMPHASIS_MS", defaults.navigation.emphasis_ms),
                retry_delay_ms: env_or("NAVIGATION_RETRY_MS", defaults.navigation.retry_delay_ms),
            },
            markers: HighlightConfig {
                class_prefix: env::var("HIGHLIGHT_CLASS_PREFIX")
                    .unwrap_or(defaults.markers.class_prefix),
                id_attribute: env::var("HIGHLIGHT_ID_ATTRIBUTE")
                    .unwrap_or(defaults.markers.id_attribute),
            },
            normalizer: NormalizerConfig {
                min_main_text: env_or(
                    "NORMALIZER_MIN_MAIN_TEXT",
                    defaults.normalizer.min_main_text,
                ),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key = key, value = %raw, "Ignoring unparseable config value");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.selection.min_length, 3);
        assert_eq!(config.selection.context_chars, 50);
        assert_eq!(config.selection.debounce(), Duration::from_millis(200));
        assert_eq!(config.navigation.emphasis(), Duration::from_secs(2));
        assert_eq!(config.markers.id_attribute, "data-highlight-id");
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("STORY_ANNOTATIONS_TEST_NUMBER", "not-a-number");
        assert_eq!(env_or("STORY_ANNOTATIONS_TEST_NUMBER", 7usize), 7);
        env::set_var("STORY_ANNOTATIONS_TEST_NUMBER", " 42 ");
        assert_eq!(env_or("STORY_ANNOTATIONS_TEST_NUMBER", 7usize), 42);
        env::remove_var("STORY_ANNOTATIONS_TEST_NUMBER");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config =
            serde_json::from_str(r#"{"selection": {"min_length": 5}}"#).unwrap();
        assert_eq!(config.selection.min_length, 5);
        assert_eq!(config.selection.context_chars, 50);
        assert_eq!(config.database.user_id, "local");
    }
}
