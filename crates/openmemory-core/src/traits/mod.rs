pub mod classifier;
pub mod content_filter;
pub mod embedding;
pub mod store;
pub mod transaction;
pub mod vector_store;

pub use classifier::Classifier;
pub use content_filter::ContentFilter;
pub use embedding::EmbeddingProvider;
pub use store::Store;
pub use transaction::Transaction;
pub use vector_store::VectorStore;
