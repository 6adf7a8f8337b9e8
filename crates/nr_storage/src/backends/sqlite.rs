use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nr_core::storage::{LookupScope, Predicate, SortDirection, StoryQuery, StoryStorage};
use nr_core::{Error, Result, StoryReference};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::sync::Arc;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS stories (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        category TEXT NOT NULL,
        url TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        source TEXT NOT NULL,
        title_lower TEXT NOT NULL,
        category_lower TEXT NOT NULL,
        source_lower TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS stories_timestamp_id ON stories (timestamp, id)",
    "CREATE INDEX IF NOT EXISTS stories_url ON stories (url)",
];

const COLUMNS: &str = "id, title, category, url, timestamp, source";

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new().filename(db_path).create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool: Arc::new(pool) })
    }

    async fn fetch(&self, sql: &str, binds: &[String]) -> Result<Vec<StoryReference>> {
        let mut query = sqlx::query(sql);
        for value in binds {
            query = query.bind(value.as_str());
        }
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to query stories: {}", e)))?;

        rows.iter().map(row_to_story).collect()
    }
}

/// Fixed-width RFC 3339 so that text order equals time order.
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn row_to_story(row: &SqliteRow) -> Result<StoryReference> {
    let timestamp: String = row.get("timestamp");
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| Error::Storage(format!("Failed to parse timestamp '{}': {}", timestamp, e)))?
        .with_timezone(&Utc);

    Ok(StoryReference {
        id: row.get("id"),
        title: row.get("title"),
        category: row.get("category"),
        url: row.get("url"),
        timestamp,
        source: row.get("source"),
    })
}

/// Render a predicate as a SQL condition with positional parameters.
fn compile(predicate: &Predicate, binds: &mut Vec<String>) -> String {
    match predicate {
        Predicate::And(parts) if parts.is_empty() => "1 = 1".to_string(),
        Predicate::Or(parts) if parts.is_empty() => "1 = 0".to_string(),
        Predicate::And(parts) => join(parts, " AND ", binds),
        Predicate::Or(parts) => join(parts, " OR ", binds),
        // SQLite's lower() only folds ASCII; match against the columns
        // lowercased on insert instead.
        Predicate::Contains { field, needle } => {
            binds.push(needle.to_lowercase());
            format!("instr({}_lower, ?) > 0", field.column())
        }
        Predicate::Timestamp(cmp, value) => {
            binds.push(format_timestamp(value));
            format!("timestamp {} ?", cmp.operator())
        }
        Predicate::Id(cmp, value) => {
            binds.push(value.clone());
            format!("id {} ?", cmp.operator())
        }
        Predicate::SourceIn(sources) if sources.is_empty() => "1 = 0".to_string(),
        Predicate::SourceNotIn(sources) if sources.is_empty() => "1 = 1".to_string(),
        Predicate::SourceIn(sources) => format!("source IN ({})", placeholders(sources, binds)),
        Predicate::SourceNotIn(sources) => format!("source NOT IN ({})", placeholders(sources, binds)),
        Predicate::UrlEq(url) => {
            binds.push(url.clone());
            "url = ?".to_string()
        }
    }
}

fn join(parts: &[Predicate], separator: &str, binds: &mut Vec<String>) -> String {
    let clauses = parts.iter().map(|p| compile(p, binds)).collect::<Vec<_>>();
    format!("({})", clauses.join(separator))
}

fn placeholders(values: &[String], binds: &mut Vec<String>) -> String {
    binds.extend(values.iter().cloned());
    vec!["?"; values.len()].join(", ")
}

#[async_trait]
impl StoryStorage for SQLiteStorage {
    async fn query(&self, query: &StoryQuery) -> Result<Vec<StoryReference>> {
        let mut binds = Vec::new();
        let condition = compile(&query.predicate, &mut binds);
        let order = match query.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        binds.push(query.limit.to_string());

        let sql = format!(
            "SELECT {COLUMNS} FROM stories WHERE {condition} ORDER BY timestamp {order}, id {order} LIMIT CAST(? AS INTEGER)"
        );
        self.fetch(&sql, &binds).await
    }

    async fn find_by_url(&self, url: &str, scope: LookupScope) -> Result<Option<StoryReference>> {
        let mut binds = Vec::new();
        let condition = compile(&scope.predicate(url), &mut binds);
        let sql = format!("SELECT {COLUMNS} FROM stories WHERE {condition} LIMIT 1");
        Ok(self.fetch(&sql, &binds).await?.into_iter().next())
    }

    async fn store_story(&self, story: &StoryReference) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO stories
                (id, title, category, url, timestamp, source, title_lower, category_lower, source_lower)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&story.id)
        .bind(&story.title)
        .bind(&story.category)
        .bind(&story.url)
        .bind(format_timestamp(&story.timestamp))
        .bind(&story.source)
        .bind(story.title.to_lowercase())
        .bind(story.category.to_lowercase())
        .bind(story.source.to_lowercase())
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to store story: {}", e)))?;

        Ok(())
    }
}
