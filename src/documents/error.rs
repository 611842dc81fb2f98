use crate::error::ApiError;

/// Error types for document storage and downloads
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("fileName header is missing")]
    MissingFileNameHeader,

    #[error("filePath header is missing")]
    MissingFilePathHeader,

    #[error("File path leaves the storage root")]
    InvalidFilePath,

    #[error("File name is not a plain file name")]
    InvalidFileName,

    #[error("Document not found")]
    NotFound,

    #[error("Document is still referenced")]
    InUse,

    #[error("Download token not found")]
    DownloadNotFound,

    #[error("Download token expired")]
    DownloadTokenExpired,

    #[error("Download token already used")]
    TokenAlreadyUsed,

    #[error("Stored file is missing")]
    FileMissing,

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::MissingFileNameHeader => ApiError::bad_request("missingFileNameHeader"),
            DocumentError::MissingFilePathHeader => ApiError::bad_request("missingFilePathHeader"),
            DocumentError::InvalidFilePath => ApiError::bad_request("invalidFilePath"),
            DocumentError::InvalidFileName => ApiError::bad_request("invalidFileName"),
            DocumentError::NotFound => ApiError::not_found("document"),
            DocumentError::InUse => ApiError::conflict("documentInUse"),
            DocumentError::DownloadNotFound => ApiError::not_found("fileDownload"),
            DocumentError::DownloadTokenExpired => ApiError::gone("downloadTokenExpired"),
            DocumentError::TokenAlreadyUsed => ApiError::forbidden("tokenAlreadyUsed"),
            DocumentError::FileMissing => ApiError::not_found("file"),
            DocumentError::Io(io_err) => ApiError::InternalError(format!("storage: {}", io_err)),
            DocumentError::Database(db_err) => ApiError::DatabaseError(db_err),
        }
    }
}
