use nr_content::ContentPipeline;
use nr_core::Config;
use nr_search::NewsSearch;

pub struct AppState {
    pub search: NewsSearch,
    pub content: ContentPipeline,
    pub config: Config,
}
