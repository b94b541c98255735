// file: src/index/store.rs
// description: LanceDB chunk store with whole-collection rebuild and vector search
// reference: https://docs.rs/lancedb

use crate::config::DatabaseConfig;
use crate::error::{PipelineError, Result};
use crate::index::schema::chunks_schema;
use crate::models::{Chunk, SearchResult};
use arrow_array::{
    Array, BooleanArray, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator,
    StringArray, UInt64Array,
};
use futures::StreamExt;
use lance_arrow::FixedSizeListArrayExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table, connect};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct LanceDbStore {
    connection: Connection,
    config: DatabaseConfig,
}

impl LanceDbStore {
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        info!("Connecting to LanceDB at {}", config.uri);

        let connection = connect(&config.uri)
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to connect to LanceDB: {e}")))?;

        Ok(Self { connection, config })
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking LanceDB connection");

        match self.connection.table_names().execute().await {
            Ok(_) => Ok(true),
            Err(e) => Err(PipelineError::Database(format!(
                "LanceDB connection failed: {e}"
            ))),
        }
    }

    pub async fn table_exists(&self) -> Result<bool> {
        let names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to list tables: {e}")))?;

        Ok(names.iter().any(|name| name == &self.config.table_name))
    }

    async fn get_table(&self) -> Result<Table> {
        self.connection
            .open_table(&self.config.table_name)
            .execute()
            .await
            .map_err(|e| {
                PipelineError::Database(format!(
                    "Failed to open table {}: {e}",
                    self.config.table_name
                ))
            })
    }

    pub async fn chunk_count(&self) -> Result<u64> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        let table = self.get_table().await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to count rows: {e}")))?;

        Ok(count as u64)
    }

    /// Replace the whole chunk table with a new build. Rebuilds are never
    /// partial: the previous table is dropped before the new one is created,
    /// so no stored chunk is ever mutated in place.
    pub async fn rebuild(
        &self,
        chunks: &[Chunk],
        embeddings: Vec<Vec<f32>>,
        content_hash: &str,
    ) -> Result<()> {
        if chunks.is_empty() {
            return Err(PipelineError::Database(
                "refusing to build an empty index".to_string(),
            ));
        }
        if chunks.len() != embeddings.len() {
            return Err(PipelineError::Database(format!(
                "chunk/embedding count mismatch: {} vs {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        self.drop_table().await?;

        let schema = chunks_schema(self.config.embedding_dim);
        let batch = create_record_batch(schema.clone(), chunks, &embeddings, content_hash)?;

        self.connection
            .create_table(
                &self.config.table_name,
                RecordBatchIterator::new(vec![Ok(batch)], schema),
            )
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to create table: {e}")))?;

        info!(
            "Rebuilt table {} with {} chunks",
            self.config.table_name,
            chunks.len()
        );
        Ok(())
    }

    pub async fn drop_table(&self) -> Result<()> {
        if self.table_exists().await? {
            self.connection
                .drop_table(&self.config.table_name)
                .await
                .map_err(|e| {
                    PipelineError::Database(format!(
                        "Failed to drop table {}: {e}",
                        self.config.table_name
                    ))
                })?;
            info!("Dropped table: {}", self.config.table_name);
        }
        Ok(())
    }

    /// Content hash of the build currently stored, used to skip rebuilding
    /// the same bytes. The hash is constant across all rows of one build.
    pub async fn latest_content_hash(&self) -> Result<Option<String>> {
        if !self.table_exists().await? {
            return Ok(None);
        }

        let table = self.get_table().await?;
        let mut stream = table
            .query()
            .limit(1)
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to scan table: {e}")))?;

        while let Some(batch) = stream.next().await {
            let batch =
                batch.map_err(|e| PipelineError::Database(format!("Failed to read batch: {e}")))?;
            if batch.num_rows() == 0 {
                continue;
            }
            let hashes = string_column(&batch, "content_hash")?;
            return Ok(Some(hashes.value(0).to_string()));
        }

        Ok(None)
    }

    /// Search for chunks by vector similarity, ordered by similarity
    /// (highest first).
    pub async fn vector_search(
        &self,
        query_embedding: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if !self.table_exists().await? {
            warn!("Table does not exist, returning empty results");
            return Ok(Vec::new());
        }

        let table = self.get_table().await?;
        debug!("Performing vector search with limit {limit}");

        let mut stream = table
            .vector_search(query_embedding)
            .map_err(|e| PipelineError::Database(format!("Failed to create vector search: {e}")))?
            .limit(limit)
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Vector search failed: {e}")))?;

        let mut results = Vec::new();

        while let Some(batch) = stream.next().await {
            let batch = batch
                .map_err(|e| PipelineError::Database(format!("Failed to read result batch: {e}")))?;

            let ids = string_column(&batch, "id")?;
            let sources = string_column(&batch, "source")?;
            let doc_types = string_column(&batch, "doc_type")?;
            let texts = string_column(&batch, "text")?;
            let priorities = string_column(&batch, "priority")?;

            let chunk_ids = batch
                .column_by_name("chunk_id")
                .and_then(|col| col.as_any().downcast_ref::<UInt64Array>())
                .ok_or_else(|| PipelineError::Database("Missing 'chunk_id' column".to_string()))?;

            let distances = batch
                .column_by_name("_distance")
                .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

            for i in 0..batch.num_rows() {
                let (score, distance) = match distances {
                    Some(array) => {
                        let d = array.value(i);
                        // lower distance is more similar
                        (1.0 / (1.0 + d), Some(d))
                    }
                    None => (1.0, None),
                };

                results.push(SearchResult::new(
                    ids.value(i).to_string(),
                    sources.value(i).to_string(),
                    doc_types.value(i).to_string(),
                    texts.value(i).to_string(),
                    priorities.value(i).to_string(),
                    chunk_ids.value(i),
                    score,
                    distance,
                ));
            }
        }

        debug!("Vector search returned {} results", results.len());
        Ok(results)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::Database(format!("Missing '{name}' column")))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| PipelineError::Database(format!("Invalid '{name}' column type")))
}

/// Build one Arrow RecordBatch covering an entire index build.
fn create_record_batch(
    schema: Arc<arrow_schema::Schema>,
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
    content_hash: &str,
) -> Result<RecordBatch> {
    let ids: StringArray = chunks
        .iter()
        .map(|_| Some(uuid::Uuid::new_v4().to_string()))
        .collect();

    let sources: StringArray = chunks
        .iter()
        .map(|c| Some(c.metadata.source.clone()))
        .collect();

    let doc_types: StringArray = chunks
        .iter()
        .map(|c| Some(c.metadata.doc_type.as_str().to_string()))
        .collect();

    let texts: StringArray = chunks.iter().map(|c| Some(c.text.clone())).collect();

    let chunk_ids: UInt64Array = chunks.iter().map(|c| Some(c.chunk_id as u64)).collect();

    let chunk_sizes: UInt64Array = chunks.iter().map(|c| Some(c.chunk_size as u64)).collect();

    let priorities: StringArray = chunks
        .iter()
        .map(|c| Some(c.priority.as_str().to_string()))
        .collect();

    let totals: BooleanArray = chunks.iter().map(|c| Some(c.contains_totals)).collect();
    let calculations: BooleanArray = chunks
        .iter()
        .map(|c| Some(c.contains_calculations))
        .collect();
    let records: BooleanArray = chunks.iter().map(|c| Some(c.contains_records)).collect();

    let pages: UInt64Array = chunks
        .iter()
        .map(|c| c.metadata.page.map(|p| p as u64))
        .collect();

    let sheets: StringArray = chunks.iter().map(|c| c.metadata.sheet.clone()).collect();

    let hashes: StringArray = chunks
        .iter()
        .map(|_| Some(content_hash.to_string()))
        .collect();

    let embedding_values: Float32Array = embeddings
        .iter()
        .flat_map(|e| e.iter().copied())
        .collect();

    let embedding_list =
        FixedSizeListArray::try_new_from_values(embedding_values, embeddings[0].len() as i32)
            .map_err(|e| PipelineError::Database(format!("Failed to create embedding array: {e}")))?;

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(ids),
            Arc::new(sources),
            Arc::new(doc_types),
            Arc::new(texts),
            Arc::new(chunk_ids),
            Arc::new(chunk_sizes),
            Arc::new(priorities),
            Arc::new(totals),
            Arc::new(calculations),
            Arc::new(records),
            Arc::new(pages),
            Arc::new(sheets),
            Arc::new(hashes),
            Arc::new(embedding_list),
        ],
    )
    .map_err(|e| PipelineError::Database(format!("Failed to create record batch: {e}")))
}
