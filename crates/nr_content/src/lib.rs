pub mod charts;
pub mod cleanup;
pub mod dom;
pub mod fetch;
pub mod pipeline;
pub mod read_more;
pub mod readability;
pub mod sanitize;
pub mod slideshow;
pub mod speech;
pub mod tables;

pub use dom::Document;
pub use fetch::HttpFetcher;
pub use pipeline::ContentPipeline;

pub mod prelude {
    pub use super::{ContentPipeline, HttpFetcher};
    pub use nr_core::{Error, Result, StoryContent};
}
