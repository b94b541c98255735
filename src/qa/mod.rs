// file: src/qa/mod.rs
// description: question answering layer (generation, retrieval, answers)
// reference: module organization

pub mod answer;
pub mod generation;
pub mod retriever;

pub use answer::AnswerEngine;
pub use generation::OllamaGenerationClient;
pub use retriever::MultiQueryRetriever;
