pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use fetch::Fetcher;
pub use storage::{LookupScope, Predicate, SortDirection, StoryQuery, StoryStorage};
pub use types::{
    DateFilter, NewsPage, NewsUpdates, SearchFilterParameters, SearchRequest, StoryContent, StoryReference,
    StorySource,
};
