use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token::generate_secret;
use crate::documents::{
    Document, DocumentError, DocumentRepository, DownloadToken, FileDownloadRepository, FileStorage,
};

/// File bytes ready to be sent
#[derive(Debug)]
pub struct DownloadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Documents on disk and their single-use download grants
pub struct DocumentService {
    documents: DocumentRepository,
    downloads: FileDownloadRepository,
    storage: FileStorage,
    token_ttl: chrono::Duration,
}

impl DocumentService {
    pub fn new(pool: PgPool, storage: FileStorage, token_ttl: Duration) -> Self {
        Self {
            documents: DocumentRepository::new(pool.clone()),
            downloads: FileDownloadRepository::new(pool),
            storage,
            token_ttl: chrono::Duration::from_std(token_ttl).unwrap_or_else(|_| chrono::Duration::hours(1)),
        }
    }

    /// Write an upload to disk and record it
    pub async fn upload(&self, directory: &str, file_name: &str, bytes: &[u8]) -> Result<Document, DocumentError> {
        let stored = self.storage.store(directory, file_name, bytes).await?;

        match self.documents.create(&stored.name, &stored.relative_path).await {
            Ok(document) => {
                tracing::info!("Stored document {} at {} ({} bytes)", document.id, document.path, bytes.len());
                Ok(document)
            }
            Err(e) => {
                // keep disk and table in step
                if let Err(cleanup) = self.storage.remove(&stored.relative_path).await {
                    tracing::error!("Could not remove orphan file {}: {}", stored.relative_path, cleanup);
                }
                Err(e.into())
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<Document>, DocumentError> {
        Ok(self.documents.find_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Document, DocumentError> {
        self.documents.find_by_id(id).await?.ok_or(DocumentError::NotFound)
    }

    /// Grant a single download of a document, valid for the configured TTL
    pub async fn create_download_token(&self, id: Uuid, now: DateTime<Utc>) -> Result<DownloadToken, DocumentError> {
        let document = self.get(id).await?;
        let grant = self
            .downloads
            .create(&document.path, &generate_secret(), now + self.token_ttl)
            .await?;

        tracing::debug!("Download grant {} created for document {}", grant.id, document.id);
        Ok(DownloadToken {
            token: grant.download_token,
            expires_at: grant.expires_at,
        })
    }

    /// Serve the file behind a download token, consuming the token
    pub async fn download(&self, token: &str, now: DateTime<Utc>) -> Result<DownloadedFile, DocumentError> {
        let grant = self
            .downloads
            .find_by_token(token)
            .await?
            .ok_or(DocumentError::DownloadNotFound)?;
        grant.check_usable(now)?;

        let bytes = self.storage.read(&grant.file_path).await?;

        if !self.downloads.mark_used(grant.id, now).await? {
            // another request consumed it first
            return Err(DocumentError::TokenAlreadyUsed);
        }

        let file_name = grant
            .file_path
            .rsplit('/')
            .next()
            .unwrap_or(grant.file_path.as_str())
            .to_string();

        tracing::info!("Download grant {} used for {}", grant.id, grant.file_path);
        Ok(DownloadedFile { file_name, bytes })
    }

    /// Remove the record, then the file. Documents still referenced elsewhere
    /// are refused so that no row ever points at a missing file.
    pub async fn delete(&self, id: Uuid) -> Result<(), DocumentError> {
        let document = self.get(id).await?;
        if self.documents.is_referenced(id).await? {
            return Err(DocumentError::InUse);
        }

        let deleted = self.documents.delete(id).await.map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => DocumentError::InUse,
            _ => DocumentError::from(e),
        })?;
        if !deleted {
            return Err(DocumentError::NotFound);
        }

        // the row is gone; a file left behind is only wasted space
        if let Err(e) = self.storage.remove(&document.path).await {
            tracing::error!("Document {} deleted but its file {} remains: {}", id, document.path, e);
        }
        tracing::info!("Deleted document {}", id);
        Ok(())
    }

    /// Delete documents that belonged to a removed record, keeping any still
    /// referenced by something else
    pub async fn delete_unreferenced(&self, ids: &[Uuid]) -> Result<(), DocumentError> {
        let mut seen = std::collections::HashSet::new();
        for id in ids {
            if !seen.insert(*id) {
                continue;
            }
            match self.delete(*id).await {
                Ok(()) | Err(DocumentError::NotFound) => {}
                Err(DocumentError::InUse) => {
                    tracing::debug!("Document {} kept, still referenced", id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
