use nr_core::{Error, Result, StoryStorage};
use std::sync::Arc;
use tracing::info;

pub mod backends;

pub use backends::*;

/// Build the named backend. `url` is the database location for backends that need one.
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn StoryStorage>> {
    match kind {
        "memory" => {
            info!("💾 Using in-memory story storage");
            Ok(Arc::new(InMemoryStorage::new()))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = std::path::PathBuf::from(url.unwrap_or("stories.db"));
            info!(path = %path.display(), "💾 Using SQLite story storage");
            Ok(Arc::new(SQLiteStorage::new_with_path(&path).await?))
        }
        other => {
            let _ = url;
            Err(Error::Config(format!("Unsupported storage backend: {}", other)))
        }
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::create_storage;
}
