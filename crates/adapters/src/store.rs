// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document store port.
//!
//! One JSON document per `(collection, doc_id)`. The engine persists
//! structured reports here; persistence is required for a campaign to
//! finish `completed`.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write {collection}/{doc_id} failed: {message}")]
    WriteFailed {
        collection: String,
        doc_id: String,
        message: String,
    },
    #[error("read {collection}/{doc_id} failed: {message}")]
    ReadFailed {
        collection: String,
        doc_id: String,
        message: String,
    },
}

/// Port to the document store.
#[async_trait]
pub trait StoreAdapter: Clone + Send + Sync + 'static {
    /// Write one document, replacing any existing one.
    async fn put(
        &self,
        collection: &str,
        doc_id: &str,
        doc: &serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Read one document; `None` if absent.
    async fn get(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<serde_json::Value>, StoreError>;
}

/// Filesystem-backed store: `{root}/{collection}/{doc_id}.json`.
#[derive(Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn doc_path(&self, collection: &str, doc_id: &str) -> PathBuf {
        self.root.join(collection).join(format!("{doc_id}.json"))
    }
}

#[async_trait]
impl StoreAdapter for FsStore {
    async fn put(
        &self,
        collection: &str,
        doc_id: &str,
        doc: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let write_failed = |message: String| StoreError::WriteFailed {
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
            message,
        };
        let path = self.doc_path(collection, doc_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failed(e.to_string()))?;
        }
        let json = serde_json::to_vec_pretty(doc).map_err(|e| write_failed(e.to_string()))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| write_failed(e.to_string()))
    }

    async fn get(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.doc_path(collection, doc_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::ReadFailed {
                    collection: collection.to_string(),
                    doc_id: doc_id.to_string(),
                    message: e.to_string(),
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::ReadFailed {
                collection: collection.to_string(),
                doc_id: doc_id.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::MemoryStore;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{StoreAdapter, StoreError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct MemoryStoreState {
        docs: HashMap<(String, String), serde_json::Value>,
        fail_puts: bool,
    }

    /// In-memory store with write-failure injection for tests.
    #[derive(Clone)]
    pub struct MemoryStore {
        inner: Arc<Mutex<MemoryStoreState>>,
    }

    impl Default for MemoryStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(MemoryStoreState {
                    docs: HashMap::new(),
                    fail_puts: false,
                })),
            }
        }

        /// Make every subsequent `put` fail.
        pub fn fail_puts(&self) {
            self.inner.lock().fail_puts = true;
        }

        pub fn document_count(&self) -> usize {
            self.inner.lock().docs.len()
        }
    }

    #[async_trait]
    impl StoreAdapter for MemoryStore {
        async fn put(
            &self,
            collection: &str,
            doc_id: &str,
            doc: &serde_json::Value,
        ) -> Result<(), StoreError> {
            let mut state = self.inner.lock();
            if state.fail_puts {
                return Err(StoreError::WriteFailed {
                    collection: collection.to_string(),
                    doc_id: doc_id.to_string(),
                    message: "scripted failure".to_string(),
                });
            }
            state
                .docs
                .insert((collection.to_string(), doc_id.to_string()), doc.clone());
            Ok(())
        }

        async fn get(
            &self,
            collection: &str,
            doc_id: &str,
        ) -> Result<Option<serde_json::Value>, StoreError> {
            Ok(self
                .inner
                .lock()
                .docs
                .get(&(collection.to_string(), doc_id.to_string()))
                .cloned())
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
