use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::types::StoryReference;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Category,
    Source,
}

impl TextField {
    pub fn column(&self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Category => "category",
            TextField::Source => "source",
        }
    }

    fn value<'a>(&self, story: &'a StoryReference) -> &'a str {
        match self {
            TextField::Title => &story.title,
            TextField::Category => &story.category,
            TextField::Source => &story.source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Lte,
    Eq,
    Gte,
    Gt,
}

impl Comparison {
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Eq => "=",
            Comparison::Gte => ">=",
            Comparison::Gt => ">",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Gt => ordering == Ordering::Greater,
        }
    }
}

/// Storage-agnostic filter over stories.
///
/// `And(vec![])` matches every story, `Or(vec![])` matches none.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    /// Case-insensitive substring match. `needle` is expected lowercased.
    Contains { field: TextField, needle: String },
    Timestamp(Comparison, DateTime<Utc>),
    Id(Comparison, String),
    SourceIn(Vec<String>),
    SourceNotIn(Vec<String>),
    UrlEq(String),
}

impl Predicate {
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn matches(&self, story: &StoryReference) -> bool {
        match self {
            Predicate::And(parts) => parts.iter().all(|p| p.matches(story)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(story)),
            Predicate::Contains { field, needle } => {
                field.value(story).to_lowercase().contains(&needle.to_lowercase())
            }
            Predicate::Timestamp(cmp, value) => cmp.holds(story.timestamp.cmp(value)),
            Predicate::Id(cmp, value) => cmp.holds(story.id.as_str().cmp(value.as_str())),
            Predicate::SourceIn(sources) => sources.iter().any(|s| *s == story.source),
            Predicate::SourceNotIn(sources) => !sources.iter().any(|s| *s == story.source),
            Predicate::UrlEq(url) => story.url == *url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Orders stories by `(timestamp, id)` in this direction.
    pub fn compare(&self, a: &StoryReference, b: &StoryReference) -> Ordering {
        let ordering = a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id));
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoryQuery {
    pub predicate: Predicate,
    pub direction: SortDirection,
    pub limit: usize,
}

/// Which stories a URL lookup may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupScope {
    AllSources,
    ExcludeSources(Vec<String>),
}

impl LookupScope {
    pub fn predicate(&self, url: &str) -> Predicate {
        match self {
            LookupScope::AllSources => Predicate::UrlEq(url.to_string()),
            LookupScope::ExcludeSources(sources) => Predicate::And(vec![
                Predicate::UrlEq(url.to_string()),
                Predicate::SourceNotIn(sources.clone()),
            ]),
        }
    }
}

#[async_trait]
pub trait StoryStorage: Send + Sync {
    /// Run a filtered, sorted and limited range query
    async fn query(&self, query: &StoryQuery) -> Result<Vec<StoryReference>>;

    /// Point lookup by story URL
    async fn find_by_url(&self, url: &str, scope: LookupScope) -> Result<Option<StoryReference>>;

    /// Insert or replace a story
    async fn store_story(&self, story: &StoryReference) -> Result<()>;
}
