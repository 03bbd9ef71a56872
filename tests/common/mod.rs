//! Shared setup for integration tests: a migrated in-memory sqlite database
//! and an in-process stand-in for Drive.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use offboarding_tracker::commands::seed::seed_accounts;
use offboarding_tracker::errors::AppResult;
use offboarding_tracker::infra::{Database, DocumentStore, DriveFile, UserStore};

/// Fresh migrated database; one pooled connection so every query sees the same memory db.
pub async fn memory_db() -> Database {
    let db = Database::open_url("sqlite::memory:", 1)
        .await
        .expect("memory database");
    db.migrate_up().await.expect("migrations");
    db
}

/// Fresh database holding the five development accounts.
pub async fn seeded_db() -> Database {
    let db = memory_db().await;
    let users = UserStore::new(db.conn());
    seed_accounts(&users).await.expect("seed");
    db
}

/// One call to `upload_bytes`.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub filename: String,
    pub mime_type: String,
    pub size: usize,
}

/// Keeps uploads in memory and hands out sequential file ids.
#[derive(Default)]
pub struct InMemoryDrive {
    uploads: Mutex<Vec<StoredUpload>>,
}

impl InMemoryDrive {
    pub fn uploads(&self) -> Vec<StoredUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDrive {
    async fn upload_bytes(
        &self,
        content: Vec<u8>,
        filename: String,
        mime_type: String,
        _folder_id: Option<String>,
    ) -> AppResult<DriveFile> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(StoredUpload {
            filename: filename.clone(),
            mime_type: mime_type.clone(),
            size: content.len(),
        });
        let id = format!("file{}", uploads.len());

        Ok(DriveFile {
            web_view_link: Some(format!("https://drive.example/{}", id)),
            id,
            name: filename,
            mime_type,
            web_content_link: None,
            parents: vec![],
        })
    }
}
