use chrono::{DateTime, Utc};
use kataribe_core::StoreSettings;
use pgvector::Vector;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::errors::{RagError, RagResult};
use crate::models::{NearestQuery, SearchResult, StoreStats};

/// pgvector accepts `hnsw.ef_search` values in `1..=1000`.
pub const MAX_EF_SEARCH: usize = 1000;

/// Read-only access to persisted chunk embeddings.
#[async_trait::async_trait]
pub trait ChunkStore: Send + Sync {
    /// Top-`limit` rows by cosine similarity to `query.vector`.
    async fn nearest(&self, query: &NearestQuery) -> RagResult<Vec<SearchResult>>;

    async fn stats(&self) -> RagResult<StoreStats>;
}

/// Postgres + pgvector chunk store.
///
/// Expects a table shaped like
/// `(chunk_id text primary key, content text, embedding vector(N), message_date timestamptz null)`
/// with an HNSW index using `vector_cosine_ops`. Rows are written by the
/// ingestion job; nothing here mutates them.
#[derive(Debug, Clone)]
pub struct PgChunkStore {
    pool: PgPool,
    table: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ChunkRow {
    chunk_id: String,
    content: String,
    message_date: Option<DateTime<Utc>>,
    similarity: f64,
}

impl From<ChunkRow> for SearchResult {
    fn from(row: ChunkRow) -> Self {
        Self {
            chunk_id: row.chunk_id,
            content: row.content,
            message_date: row.message_date,
            similarity: row.similarity,
        }
    }
}

impl PgChunkStore {
    pub async fn connect(database_url: &str, settings: &StoreSettings) -> RagResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections.max(1))
            .connect(database_url)
            .await?;
        Self::from_pool(pool, &settings.table)
    }

    pub fn from_pool(pool: PgPool, table: &str) -> RagResult<Self> {
        Ok(Self {
            pool,
            table: qualified_table(table)?,
        })
    }

    fn nearest_sql(&self) -> String {
        // The HNSW index only serves a bare `ORDER BY <distance>`. Which of several
        // rows tied at the LIMIT cutoff come back is up to Postgres; the caller only
        // orders the returned rows.
        format!(
            "SELECT chunk_id, content, message_date, \
             (1 - (embedding <=> $1))::float8 AS similarity \
             FROM {} ORDER BY embedding <=> $1 LIMIT $2",
            self.table
        )
    }
}

#[async_trait::async_trait]
impl ChunkStore for PgChunkStore {
    async fn nearest(&self, query: &NearestQuery) -> RagResult<Vec<SearchResult>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        let (ef_search, set_ef_search) = ef_search_statement(query.ef_search);

        // `SET LOCAL` is scoped to `tx`; the select must run on the same connection.
        let mut tx = self.pool.begin().await?;
        sqlx::query(&set_ef_search).execute(&mut *tx).await?;

        let sql = self.nearest_sql();
        let rows: Vec<ChunkRow> = sqlx::query_as(&sql)
            .bind(Vector::from(query.vector.clone()))
            .bind(query.limit as i64)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(
            limit = query.limit,
            ef_search,
            rows = rows.len(),
            "nearest-neighbour query complete"
        );
        Ok(rows.into_iter().map(SearchResult::from).collect())
    }

    async fn stats(&self) -> RagResult<StoreStats> {
        let sql = format!(
            "SELECT COUNT(*)::int8, COUNT(message_date)::int8 FROM {}",
            self.table
        );
        let (chunk_count, dated_chunk_count): (i64, i64) =
            sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(StoreStats {
            chunk_count,
            dated_chunk_count,
        })
    }
}

/// Transaction-scoped recall setting, clamped to what pgvector accepts.
fn ef_search_statement(ef_search: usize) -> (usize, String) {
    let ef_search = ef_search.clamp(1, MAX_EF_SEARCH);
    (ef_search, format!("SET LOCAL hnsw.ef_search = {ef_search}"))
}

/// Quote `table` or `schema.table` as Postgres identifiers.
pub fn qualified_table(name: &str) -> RagResult<String> {
    let parts: Vec<&str> = name.split('.').map(str::trim).collect();
    if parts.is_empty() || parts.len() > 2 || parts.iter().any(|part| part.is_empty()) {
        return Err(RagError::Validation(format!(
            "invalid store table name: {name:?}"
        )));
    }
    Ok(parts
        .into_iter()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join("."))
}

fn quote_ident(input: &str) -> String {
    format!("\"{}\"", input.replace('"', "\"\""))
}
