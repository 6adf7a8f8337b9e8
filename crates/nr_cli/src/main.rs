use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use nr_content::{ContentPipeline, HttpFetcher};
use nr_core::logging::{init_logging, LogFormat};
use nr_core::{Config, DateFilter, Result, SearchFilterParameters, StoryReference, StoryStorage};
use nr_search::NewsSearch;
use nr_web::AppState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON config file; missing keys keep their defaults
    #[arg(long, env = "NR_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "NR_STORAGE", default_value = "memory", help = "Storage backend: memory (default) or sqlite")]
    storage: String,
    #[arg(long, env = "NR_DATABASE_URL")]
    database_url: Option<String>,
    /// Stories (JSON array) loaded into storage before running the command
    #[arg(long)]
    seed: Option<PathBuf>,
    #[arg(long, env = "NR_PAGE_SIZE")]
    page_size: Option<usize>,
    #[arg(long, env = "NR_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
    /// Extract the readable content of one story
    Content {
        url: String,
        /// Follow a "mehr dazu" link and extract that story instead
        #[arg(long)]
        read_more: bool,
    },
    /// Print one page of search results
    Search {
        #[command(flatten)]
        filters: FilterArgs,
        /// Page key from a previous search
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Check for stories newer than a page key
    Updates {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        cursor: String,
    },
    /// Store stories from a JSON array
    Import { file: PathBuf },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Whitespace-separated terms, all of which must match
    #[arg(long)]
    text: Option<String>,
    /// Inclusive lower bound, RFC 3339
    #[arg(long)]
    from: Option<DateTime<Utc>>,
    /// Inclusive upper bound, RFC 3339
    #[arg(long)]
    to: Option<DateTime<Utc>>,
    /// Source key, repeatable
    #[arg(long = "source")]
    sources: Vec<String>,
}

impl From<FilterArgs> for SearchFilterParameters {
    fn from(args: FilterArgs) -> Self {
        let date_filter = if args.from.is_some() || args.to.is_some() {
            Some(DateFilter {
                from: args.from,
                to: args.to,
            })
        } else {
            None
        };
        SearchFilterParameters {
            text_filter: args.text,
            date_filter,
            sources: (!args.sources.is_empty()).then_some(args.sources),
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(page_size) = cli.page_size {
        config.search.page_size = page_size;
    }
    config.validate()?;
    Ok(config)
}

async fn import_stories(storage: &Arc<dyn StoryStorage>, file: &Path) -> Result<usize> {
    let raw = tokio::fs::read_to_string(file).await?;
    let stories: Vec<StoryReference> = serde_json::from_str(&raw)?;
    for story in &stories {
        storage.store_story(story).await?;
    }
    info!("📥 Imported {} stories from {}", stories.len(), file.display());
    Ok(stories.len())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    let config = load_config(&cli)?;

    let storage = nr_storage::create_storage(cli.storage.as_str(), cli.database_url.as_deref()).await?;
    info!("✨ Storage initialized successfully (using {})", cli.storage);
    if let Some(seed) = &cli.seed {
        import_stories(&storage, seed).await?;
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
    let search = NewsSearch::new(storage.clone(), config.search.page_size);
    let content = ContentPipeline::new(storage.clone(), fetcher, config.content.clone())?;

    match cli.command {
        Commands::Serve { bind } => {
            let app = nr_web::create_app(AppState { search, content, config }).await;
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("🌐 Listening on {}", bind);
            axum::serve(listener, app).await?;
        }
        Commands::Content { url, read_more } => {
            let story = content.fetch_story_content(&url, read_more).await?;
            print_json(&story)?;
        }
        Commands::Search { filters, cursor } => {
            let page = search.search(&filters.into(), cursor.as_deref()).await?;
            print_json(&page)?;
        }
        Commands::Updates { filters, cursor } => {
            let updates = search.check_updates(&filters.into(), Some(&cursor)).await?;
            print_json(&updates)?;
        }
        Commands::Import { file } => {
            let count = import_stories(&storage, &file).await?;
            println!("Imported {} stories", count);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from([
            "nr",
            "--log-format",
            "json",
            "search",
            "--text",
            "wahl wien",
            "--from",
            "2025-01-01T00:00:00Z",
            "--source",
            "news",
            "--source",
            "sport",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);

        let Commands::Search { filters, cursor } = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cursor, None);
        let filters = SearchFilterParameters::from(filters);
        assert_eq!(filters.text_filter.as_deref(), Some("wahl wien"));
        assert_eq!(filters.date_filter.and_then(|d| d.from).map(|d| d.to_rfc3339()), Some("2025-01-01T00:00:00+00:00".to_string()));
        assert_eq!(filters.sources, Some(vec!["news".to_string(), "sport".to_string()]));
    }

    #[test]
    fn test_empty_filters() {
        let cli = Cli::try_parse_from(["nr", "updates", "--cursor", "abc"]).unwrap();
        let Commands::Updates { filters, .. } = cli.command else {
            panic!("expected updates");
        };
        assert_eq!(SearchFilterParameters::from(filters), SearchFilterParameters::default());
    }

    #[test]
    fn test_page_size_override_validated() {
        let cli = Cli::try_parse_from(["nr", "--page-size", "0", "import", "stories.json"]).unwrap();
        assert!(load_config(&cli).is_err());

        let cli = Cli::try_parse_from(["nr", "--page-size", "25", "import", "stories.json"]).unwrap();
        assert_eq!(load_config(&cli).unwrap().search.page_size, 25);
    }

    #[tokio::test]
    async fn test_import_stories() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"1","title":"Wahl","category":"Inland","url":"https://orf.at/stories/1/","timestamp":"2025-01-01T10:00:00Z","source":"news"}}]"#
        )
        .unwrap();

        let storage = nr_storage::create_storage("memory", None).await.unwrap();
        assert_eq!(import_stories(&storage, file.path()).await.unwrap(), 1);
        let found = storage
            .find_by_url("https://orf.at/stories/1/", nr_core::LookupScope::AllSources)
            .await
            .unwrap();
        assert_eq!(found.map(|s| s.id), Some("1".to_string()));
    }
}
