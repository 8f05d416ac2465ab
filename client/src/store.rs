//! Document-store boundary. Firestore-shaped: flat collections of JSON
//! documents addressed by string id, with equality-filtered queries. The
//! engine never sees a concrete backend, only this trait.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const BOUNTIES: &str = "bounties";
pub const SUBMISSIONS: &str = "submissions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Equality filter on a top-level document field.
#[derive(Clone, Debug)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError>;

    /// Creates or fully replaces a document.
    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    /// Merges top-level fields of `patch` into an existing document.
    /// Last write wins; there is no transactional read-modify-write.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;
}
