use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

pub const API_VERSION: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

/// Site-specific knobs of the content pipeline. Patterns are regular
/// expressions compiled when the pipeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub read_more_patterns: Vec<String>,
    pub read_more_paragraph_limit: usize,
    pub site_url_pattern: String,
    pub story_url_pattern: String,
    pub site_anchor_pattern: String,
    pub source_from_url_pattern: String,
    pub preserved_classes: Vec<String>,
    pub chart_hosts: Vec<String>,
    pub chart_fallback_label: String,
    pub excluded_lookup_sources: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            read_more_patterns: vec![
                r"(?i)mehr\s+(\w+\s+)*in".to_string(),
                r"(?i)lesen\s+(\w+\s+)*mehr".to_string(),
            ],
            read_more_paragraph_limit: 4,
            site_url_pattern: r"(?i)^https://.*orf\.at.*".to_string(),
            story_url_pattern: r"(?i)^https://.*orf\.at/(.+/)?stories/\d+".to_string(),
            site_anchor_pattern: r"(?i)orf\.at.*#".to_string(),
            source_from_url_pattern: r"(?i)^https://(?P<source>\w+)\.orf\.at".to_string(),
            preserved_classes: vec!["fact".to_string(), "keyword".to_string(), "slideshow".to_string()],
            chart_hosts: vec!["datawrapper.dwcdn.net".to_string()],
            chart_fallback_label: "Grafik".to_string(),
            excluded_lookup_sources: vec!["oesterreich".to_string()],
        }
    }
}

/// `Cache-Control` lifetimes for extracted content, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub default_max_age: u64,
    pub new_story_max_age: u64,
    pub new_story_threshold_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_max_age: 21600,
            new_story_max_age: 3600,
            new_story_threshold_hours: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("nr/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub content: ContentConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
}

impl Config {
    /// Load a JSON config file; missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.page_size == 0 {
            return Err(Error::Config("search.page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
