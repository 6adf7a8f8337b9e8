use std::sync::Arc;
use tracing::{debug, info};

use nr_core::{NewsPage, NewsUpdates, Result, SearchFilterParameters, SortDirection, StoryQuery, StoryStorage};

use crate::cursor::{Direction, PageCursor};
use crate::query::{build_filter_predicate, paginate};

/// Keyset-paginated search over the story collection.
///
/// Pages are always newest first. A first page carries both keys, a page
/// reached through a `next` key only a `next` key and one reached through
/// a `prev` key only a `prev` key. A key is absent when nothing lies
/// further in its direction.
pub struct NewsSearch {
    storage: Arc<dyn StoryStorage>,
    page_size: usize,
}

impl NewsSearch {
    pub fn new(storage: Arc<dyn StoryStorage>, page_size: usize) -> Self {
        Self {
            storage,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn search(&self, filters: &SearchFilterParameters, page_key: Option<&str>) -> Result<NewsPage> {
        info!("🔍 Search news with filters={:?} and page_key={:?}", filters, page_key);

        let cursor = page_key.and_then(PageCursor::decode);
        let cursor_direction = cursor.as_ref().map(|c| c.direction);
        let query = paginate(build_filter_predicate(filters), cursor.as_ref());

        // one lookahead row tells whether a next page exists
        let limit = match cursor_direction {
            Some(Direction::Prev) => self.page_size,
            _ => self.page_size + 1,
        };
        let mut stories = self
            .storage
            .query(&StoryQuery {
                predicate: query.predicate,
                direction: query.direction,
                limit,
            })
            .await?;

        if query.direction == SortDirection::Ascending {
            stories.reverse();
        }

        let prev_key = match cursor_direction {
            Some(Direction::Next) => None,
            _ => stories.first().map(|story| PageCursor::at(story, Direction::Prev).encode()),
        };
        let next_key = match cursor_direction {
            Some(Direction::Prev) => None,
            _ if stories.len() > self.page_size => {
                Some(PageCursor::at(&stories[self.page_size - 1], Direction::Next).encode())
            }
            _ => None,
        };
        stories.truncate(self.page_size);

        debug!(count = stories.len(), has_prev = prev_key.is_some(), has_next = next_key.is_some(), "Search done");
        Ok(NewsPage {
            stories,
            prev_key,
            next_key,
        })
    }

    /// Whether a story newer than the key's position matches `filters`.
    /// Any key is read as "newer than this row"; without a usable key
    /// there is nothing to compare against.
    pub async fn check_updates(&self, filters: &SearchFilterParameters, page_key: Option<&str>) -> Result<NewsUpdates> {
        let Some(cursor) = page_key.and_then(PageCursor::decode) else {
            debug!("No usable page key, reporting no updates");
            return Ok(NewsUpdates::default());
        };
        let cursor = PageCursor {
            direction: Direction::Prev,
            ..cursor
        };

        let query = paginate(build_filter_predicate(filters), Some(&cursor));
        let newer = self
            .storage
            .query(&StoryQuery {
                predicate: query.predicate,
                direction: query.direction,
                limit: 1,
            })
            .await?;

        Ok(NewsUpdates {
            update_available: !newer.is_empty(),
        })
    }
}
