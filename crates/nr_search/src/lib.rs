pub mod cursor;
pub mod engine;
pub mod query;

pub use cursor::{Direction, PageCursor};
pub use engine::NewsSearch;

pub mod prelude {
    pub use super::{Direction, NewsSearch, PageCursor};
    pub use nr_core::{NewsPage, NewsUpdates, SearchFilterParameters};
}
