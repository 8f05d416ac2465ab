//! A single-file JSON document store for local development, shaped like the
//! Firestore surface the production deployment injects.

use async_trait::async_trait;
use serde_json::Value;
use stallion_client::store::{
    DocumentStore,
    Filter,
    StoreError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

type Collections = HashMap<String, HashMap<String, Value>>;

pub struct JsonStore {
    path: PathBuf,
    data: Mutex<Collections>,
}

impl JsonStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let data = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Collections::new(),
            Err(err) => return Err(StoreError::Unavailable(err.to_string())),
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn flush(&self, data: &Collections) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(data)?;
        std::fs::write(&self.path, bytes).map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for JsonStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filters.iter().all(|f| f.matches(doc)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        data.entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        self.flush(&data)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        let doc = data
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::Unavailable(format!("no document {collection}/{id}")))?;
        if let (Value::Object(target), Value::Object(fields)) = (doc, patch) {
            for (k, v) in fields {
                target.insert(k, v);
            }
        }
        self.flush(&data)
    }
}
