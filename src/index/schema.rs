// file: src/index/schema.rs
// description: Arrow schema for the chunk table with vector embeddings
// reference: https://docs.rs/lancedb

use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Arrow schema for indexed chunks. `content_hash` is the build-level file
/// hash used for the rebuild cache; `embedding` drives similarity search.
pub fn chunks_schema(embedding_dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("doc_type", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("chunk_id", DataType::UInt64, false),
        Field::new("chunk_size", DataType::UInt64, false),
        Field::new("priority", DataType::Utf8, false),
        Field::new("contains_totals", DataType::Boolean, false),
        Field::new("contains_calculations", DataType::Boolean, false),
        Field::new("contains_records", DataType::Boolean, false),
        Field::new("page", DataType::UInt64, true),
        Field::new("sheet", DataType::Utf8, true),
        Field::new("content_hash", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                embedding_dim as i32,
            ),
            false,
        ),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_shape() {
        let schema = chunks_schema(768);
        assert_eq!(schema.fields().len(), 14);

        let embedding = schema.field_with_name("embedding").unwrap();
        assert!(matches!(
            embedding.data_type(),
            DataType::FixedSizeList(_, 768)
        ));
        assert!(schema.field_with_name("priority").is_ok());
        assert!(schema.field_with_name("content_hash").is_ok());
    }
}
