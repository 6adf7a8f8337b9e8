//! Content extraction pipeline.
//!
//! Fetch, pre-clean, extract, post-clean, sanitize and derive speech text.
//! Each stage is a function over an explicit [`Document`] value; this
//! module only sequences them and merges the outcome of best-effort
//! sub-fetches. Documents are not `Send`, so only serialized HTML is held
//! across an await.

use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use nr_core::config::ContentConfig;
use nr_core::{Error, Fetcher, LookupScope, Result, StoryContent, StoryReference, StorySource, StoryStorage};

use crate::charts::{self, ChartRules};
use crate::cleanup;
use crate::dom::{body_html, Document};
use crate::read_more::{self, ReadMoreRules};
use crate::readability;
use crate::sanitize;
use crate::slideshow;
use crate::speech;
use crate::tables;

struct Patterns {
    read_more: Vec<Regex>,
    site_url: Regex,
    story_url: Regex,
    site_anchor: Regex,
    source_from_url: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("Invalid pattern '{}': {}", pattern, e)))
}

impl Patterns {
    fn new(config: &ContentConfig) -> Result<Self> {
        Ok(Self {
            read_more: config
                .read_more_patterns
                .iter()
                .map(|p| compile(p))
                .collect::<Result<Vec<_>>>()?,
            site_url: compile(&config.site_url_pattern)?,
            story_url: compile(&config.story_url_pattern)?,
            site_anchor: compile(&config.site_anchor_pattern)?,
            source_from_url: compile(&config.source_from_url_pattern)?,
        })
    }
}

/// Raw page plus whatever storage knows about it.
struct Page {
    url: String,
    story: Option<StoryReference>,
    html: String,
}

enum ReadMore {
    Substituted { page: Page, source: Option<String> },
    NotFound,
    Fallback,
}

pub struct ContentPipeline {
    storage: Arc<dyn StoryStorage>,
    fetcher: Arc<dyn Fetcher>,
    config: ContentConfig,
    patterns: Patterns,
}

fn pre_clean(html: &str) -> String {
    cleanup::pre_clean(Document::from(html)).html().to_string()
}

impl ContentPipeline {
    pub fn new(storage: Arc<dyn StoryStorage>, fetcher: Arc<dyn Fetcher>, config: ContentConfig) -> Result<Self> {
        let patterns = Patterns::new(&config)?;
        Ok(Self {
            storage,
            fetcher,
            config,
            patterns,
        })
    }

    /// Whether `url` belongs to the site this pipeline knows how to clean.
    pub fn is_site_url(&self, url: &str) -> bool {
        self.patterns.site_url.is_match(url)
    }

    pub async fn fetch_story_content(&self, url: &str, fetch_read_more: bool) -> Result<StoryContent> {
        info!("📰 Fetch content with url='{}' and fetch_read_more={}", url, fetch_read_more);

        let mut page = self.load_page(url, LookupScope::AllSources).await?;
        let mut source = None;

        if fetch_read_more {
            match self.resolve_read_more(&page).await {
                ReadMore::Substituted { page: read_more, source: name } => {
                    source = name.map(|name| StorySource {
                        name,
                        url: read_more.url.clone(),
                    });
                    page = read_more;
                }
                ReadMore::NotFound => debug!(url, "No read more link"),
                ReadMore::Fallback => {}
            }
        }

        let chart_rules = ChartRules {
            hosts: &self.config.chart_hosts,
            fallback_label: &self.config.chart_fallback_label,
        };
        let working = pre_clean(&page.html);
        let working = charts::replace_chart_widgets(working, &page.url, self.fetcher.as_ref(), &chart_rules).await;

        let (content, content_text) = self.optimize(&page, &working)?;

        info!("✨ Extracted {} bytes of content from url='{}'", content.len(), page.url);
        Ok(StoryContent {
            content,
            content_text,
            id: page.story.as_ref().map(|story| story.id.clone()),
            timestamp: page.story.as_ref().map(|story| story.timestamp),
            source,
        })
    }

    /// Extract, post-clean and sanitize `working`, cross-referencing the
    /// untouched page for galleries, footer and keyword. Returns the
    /// sanitized HTML and its speech text.
    fn optimize(&self, page: &Page, working: &str) -> Result<(String, String)> {
        let base = Url::parse(&page.url).map_err(|e| Error::InvalidUrl(format!("{}: {}", page.url, e)))?;

        let extracted = readability::extract_main_content(working, &page.url, &self.config.preserved_classes)
            .ok_or_else(|| {
                warn!("Error transforming content with url='{}'", page.url);
                Error::OptimizedContentIsEmpty(format!("Optimized content from url='{}' is empty", page.url))
            })?;

        let original = Document::from(page.html.as_str());
        let optimized = Document::from(extracted);
        let optimized = cleanup::remove_navigation(optimized);
        let optimized = cleanup::remove_site_anchors(optimized, &base, &self.patterns.site_anchor);
        let optimized = slideshow::inject_slideshows(optimized, &original);
        let optimized = cleanup::inject_story_footer(optimized, &original);
        let optimized = cleanup::adjust_anchors(optimized);
        let optimized = cleanup::remove_empty_list_items(optimized);
        let optimized = tables::normalize_tables(optimized);

        let content = sanitize::sanitize_html(&body_html(&optimized));
        let content_text = speech::text_for_speech(&optimized, &original);
        Ok((content, content_text))
    }

    /// Storage lookup and page fetch, run concurrently. Only the fetch is fatal.
    async fn load_page(&self, url: &str, scope: LookupScope) -> Result<Page> {
        let (story, html) = tokio::join!(self.storage.find_by_url(url, scope), self.fetcher.fetch_text(url));

        let html = html.map_err(|e| {
            warn!(url, error = %e, "Fetching content failed");
            Error::ContentNotFound(format!("Content from url='{}' cannot be loaded", url))
        })?;
        let story = story.unwrap_or_else(|e| {
            warn!(url, error = %e, "Story lookup failed");
            None
        });

        Ok(Page {
            url: url.to_string(),
            story,
            html,
        })
    }

    fn find_read_more_url(&self, page: &Page) -> Option<String> {
        let base = Url::parse(&page.url).ok()?;
        let rules = ReadMoreRules {
            phrases: &self.patterns.read_more,
            story_url: &self.patterns.story_url,
            paragraph_limit: self.config.read_more_paragraph_limit,
        };
        read_more::find_read_more_url(&Document::from(page.html.as_str()), &base, &rules)
    }

    async fn resolve_read_more(&self, page: &Page) -> ReadMore {
        let Some(read_more_url) = self.find_read_more_url(page) else {
            return ReadMore::NotFound;
        };

        info!("📎 Fetch content with read more url='{}'", read_more_url);
        let scope = LookupScope::ExcludeSources(self.config.excluded_lookup_sources.clone());
        match self.load_page(&read_more_url, scope).await {
            Ok(page) => {
                let source = page
                    .story
                    .as_ref()
                    .map(|story| story.source.clone())
                    .or_else(|| read_more::source_from_url(&page.url, &self.patterns.source_from_url));
                ReadMore::Substituted { page, source }
            }
            Err(e) => {
                warn!(url = %read_more_url, error = %e, "Keeping original content");
                ReadMore::Fallback
            }
        }
    }
}
