// file: src/index/mod.rs
// description: vector index layer (schema, embeddings, LanceDB store)
// reference: module organization

pub mod embeddings;
pub mod schema;
pub mod store;

pub use embeddings::OllamaEmbeddingClient;
pub use schema::chunks_schema;
pub use store::LanceDbStore;
