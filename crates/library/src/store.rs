//! Where a session's editable fields are persisted between runs.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use movr_cache::{Repository, StoredRecord};
use tokio::sync::Mutex;

/// An ordered list of records, each identified by its original source path
/// (which may repeat for duplicated records); every stored field is optional.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Replace whatever was stored with `records`.
    async fn save(&self, records: &[StoredRecord]) -> Result<()>;

    async fn load(&self) -> Result<Vec<StoredRecord>>;

    async fn clear(&self) -> Result<()>;
}

#[async_trait]
impl SessionStore for Repository {
    async fn save(&self, records: &[StoredRecord]) -> Result<()> {
        self.save_session(records).await.or_raise(|| ErrorKind::Store)
    }

    async fn load(&self) -> Result<Vec<StoredRecord>> {
        self.load_session().await.or_raise(|| ErrorKind::Store)
    }

    async fn clear(&self) -> Result<()> {
        self.clear_session().await.map(|_| ()).or_raise(|| ErrorKind::Store)
    }
}

/// Keeps the session in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: Mutex<Vec<StoredRecord>>,
}
impl MemorySessionStore {
    pub fn new(records: Vec<StoredRecord>) -> Self {
        Self { records: Mutex::new(records) }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, records: &[StoredRecord]) -> Result<()> {
        *self.records.lock().await = records.to_vec();
        Ok(())
    }

    async fn load(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        self.records.lock().await.clear();
        Ok(())
    }
}
