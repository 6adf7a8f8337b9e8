use async_trait::async_trait;
use nr_core::storage::{LookupScope, StoryQuery, StoryStorage};
use nr_core::{Result, StoryReference};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MemoryStore {
    stories: Vec<StoryReference>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { stories: Vec::new() }
    }

    pub fn store_story(&mut self, story: &StoryReference) {
        if let Some(existing) = self.stories.iter_mut().find(|s| s.id == story.id) {
            *existing = story.clone();
        } else {
            self.stories.push(story.clone());
        }
    }

    pub fn query(&self, query: &StoryQuery) -> Vec<StoryReference> {
        let mut stories = self
            .stories
            .iter()
            .filter(|story| query.predicate.matches(story))
            .cloned()
            .collect::<Vec<_>>();
        stories.sort_by(|a, b| query.direction.compare(a, b));
        stories.truncate(query.limit);
        stories
    }

    pub fn find_by_url(&self, url: &str, scope: &LookupScope) -> Option<StoryReference> {
        let predicate = scope.predicate(url);
        self.stories.iter().find(|story| predicate.matches(story)).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Story collection held in process memory.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_stories(stories: impl IntoIterator<Item = StoryReference>) -> Self {
        let storage = Self::new();
        {
            let mut store = storage.store.write().await;
            for story in stories {
                store.store_story(&story);
            }
        }
        storage
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.stories.len()
    }
}

#[async_trait]
impl StoryStorage for InMemoryStorage {
    async fn query(&self, query: &StoryQuery) -> Result<Vec<StoryReference>> {
        let store = self.store.read().await;
        Ok(store.query(query))
    }

    async fn find_by_url(&self, url: &str, scope: LookupScope) -> Result<Option<StoryReference>> {
        let store = self.store.read().await;
        Ok(store.find_by_url(url, &scope))
    }

    async fn store_story(&self, story: &StoryReference) -> Result<()> {
        let mut store = self.store.write().await;
        store.store_story(story);
        Ok(())
    }
}
