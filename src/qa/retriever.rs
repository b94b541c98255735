// file: src/qa/retriever.rs
// description: multi-query retrieval over the chunk index
// reference: retrieval layer of the QA pipeline

use crate::error::{PipelineError, Result};
use crate::index::{LanceDbStore, OllamaEmbeddingClient};
use crate::models::SearchResult;
use crate::qa::generation::OllamaGenerationClient;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Generates query variants with the model, searches the index once per
/// variant plus once for the original question, and merges the results.
/// Chunked spreadsheet data scatters one logical table across many rows,
/// so each search uses a deliberately large k.
pub struct MultiQueryRetriever<'a> {
    store: &'a LanceDbStore,
    embedder: &'a OllamaEmbeddingClient,
    generator: &'a OllamaGenerationClient,
    k: usize,
}

impl<'a> MultiQueryRetriever<'a> {
    pub fn new(
        store: &'a LanceDbStore,
        embedder: &'a OllamaEmbeddingClient,
        generator: &'a OllamaGenerationClient,
        k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
            k,
        }
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let mut queries = match self.generator.generate(&query_generation_prompt(question)).await {
            Ok(text) => parse_generated_queries(&text),
            Err(e) => {
                warn!("query generation failed: {e}, retrieving with the original question only");
                Vec::new()
            }
        };
        queries.push(question.to_string());

        debug!("retrieving with {} queries", queries.len());

        let mut batches = Vec::with_capacity(queries.len());
        for query in &queries {
            let embedding = self.embedder.embed(query).await;
            let batch = self
                .store
                .vector_search(embedding, self.k)
                .await
                .map_err(|e| PipelineError::Retrieval(e.to_string()))?;
            batches.push(batch);
        }

        let merged = merge_results(batches);
        info!(
            "retrieved {} unique chunks for: '{}'",
            merged.len(),
            truncate_for_log(question, 50)
        );
        Ok(merged)
    }

    /// Single-query search used by the `search` command. Logs the priority
    /// distribution of what came back, which is the fastest way to spot an
    /// index where the summary chunks are being drowned out.
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await;
        let results = self
            .store
            .vector_search(embedding, k)
            .await
            .map_err(|e| PipelineError::Retrieval(e.to_string()))?;

        info!(
            "retrieved {} chunks for: '{}'",
            results.len(),
            truncate_for_log(query, 50)
        );
        info!("priority distribution: {:?}", priority_distribution(&results));
        Ok(results)
    }
}

pub fn query_generation_prompt(question: &str) -> String {
    format!(
        "You are a financial analyst generating search queries for document retrieval.\n\
         Create 3 different search queries to find comprehensive information.\n\
         \n\
         Original question: {question}\n\
         \n\
         Generate these specific queries:\n\
         1. Query for summary and totals\n\
         2. Query for detailed data records\n\
         3. Query for calculations and breakdowns\n\
         \n\
         Query 1:\n\
         Query 2:\n\
         Query 3:"
    )
}

/// Parse up to 3 non-empty query lines out of the model's output, tolerating
/// the `Query N:` and `N.` prefixes models like to echo back.
pub fn parse_generated_queries(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_query_prefix)
        .filter(|line| !line.is_empty())
        .take(3)
        .map(|line| line.to_string())
        .collect()
}

fn strip_query_prefix(line: &str) -> &str {
    let line = line.trim();
    let rest = line
        .strip_prefix("Query ")
        .or_else(|| line.strip_prefix("query "))
        .unwrap_or(line);
    // drop a leading "N:" or "N." marker
    let rest = match rest.split_once([':', '.']) {
        Some((head, tail)) if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => tail,
        _ => rest,
    };
    rest.trim()
}

/// Merge search batches, keeping the first occurrence of each chunk id.
pub fn merge_results(batches: Vec<Vec<SearchResult>>) -> Vec<SearchResult> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for batch in batches {
        for result in batch {
            if seen.insert(result.id.clone()) {
                merged.push(result);
            }
        }
    }
    merged
}

pub fn priority_distribution(results: &[SearchResult]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for result in results {
        *counts.entry(result.priority.clone()).or_insert(0) += 1;
    }
    counts
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(id: &str, priority: &str) -> SearchResult {
        SearchResult::new(
            id.to_string(),
            "sales.csv".to_string(),
            "csv_complete".to_string(),
            format!("chunk {id}"),
            priority.to_string(),
            0,
            0.5,
            Some(1.0),
        )
    }

    #[test]
    fn test_parse_queries_strips_prefixes() {
        let text = "Query 1: total revenue summary\nQuery 2: individual sales records\nQuery 3: average breakdown by region";
        assert_eq!(
            parse_generated_queries(text),
            vec![
                "total revenue summary",
                "individual sales records",
                "average breakdown by region"
            ]
        );
    }

    #[test]
    fn test_parse_queries_numbered_list_and_blanks() {
        let text = "\n1. summary of totals\n\n2. data rows\n3. calculations\n4. extra should be dropped";
        let queries = parse_generated_queries(text);
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], "summary of totals");
        assert_eq!(queries[2], "calculations");
    }

    #[test]
    fn test_parse_queries_plain_lines_pass_through() {
        let queries = parse_generated_queries("what is the total amount?");
        assert_eq!(queries, vec!["what is the total amount?"]);
    }

    #[test]
    fn test_merge_dedups_by_id_keeping_first() {
        let merged = merge_results(vec![
            vec![result("a", "critical"), result("b", "low")],
            vec![result("b", "low"), result("c", "medium")],
            vec![result("a", "critical")],
        ]);
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_priority_distribution_counts() {
        let results = vec![
            result("a", "critical"),
            result("b", "critical"),
            result("c", "low"),
        ];
        let counts = priority_distribution(&results);
        assert_eq!(counts.get("critical"), Some(&2));
        assert_eq!(counts.get("low"), Some(&1));
    }

    #[tokio::test]
    async fn test_search_failure_surfaces_as_retrieval_error() {
        use crate::config::DatabaseConfig;
        use crate::models::document::{DocType, DocumentMetadata};
        use crate::models::Chunk;

        let dir = tempfile::tempdir().unwrap();
        let store = LanceDbStore::connect(DatabaseConfig {
            uri: dir.path().display().to_string(),
            table_name: "chunks".to_string(),
            embedding_dim: 8,
        })
        .await
        .unwrap();

        let meta = DocumentMetadata::new("sales.csv", DocType::CsvComplete);
        let chunks = vec![Chunk::new("TOTAL: 100".to_string(), meta, 0)];
        store.rebuild(&chunks, vec![vec![0.5f32; 8]], "hash").await.unwrap();

        // embedder dimension disagrees with the stored table, so every
        // query vector is rejected by the search
        let embedder = OllamaEmbeddingClient::new(
            "http://127.0.0.1:1".to_string(),
            "nomic-embed-text".to_string(),
            4,
        );
        let generator = crate::qa::generation::OllamaGenerationClient::new(
            "http://127.0.0.1:1".to_string(),
            "llama3".to_string(),
        );

        let retriever = MultiQueryRetriever::new(&store, &embedder, &generator, 10);
        let err = retriever.retrieve("what is the total?").await.unwrap_err();
        assert!(matches!(err, crate::error::PipelineError::Retrieval(_)));
    }

    #[test]
    fn test_query_prompt_contains_question() {
        let prompt = query_generation_prompt("What is the total revenue?");
        assert!(prompt.contains("Original question: What is the total revenue?"));
        assert!(prompt.contains("Query 3:"));
    }
}
