// Uploaded files on local disk

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::documents::DocumentError;

/// Upper bound on name suffixes tried before giving up
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// File written to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Final file name, possibly suffixed
    pub name: String,
    /// Path relative to the storage root, `/`-separated
    pub relative_path: String,
}

/// Directory tree holding uploaded documents
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored relative path
    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf, DocumentError> {
        let normalized = normalize_relative_path(relative_path)?;
        Ok(self.root.join(normalized))
    }

    /// Write `bytes` as `file_name` under `directory`.
    ///
    /// The name gets a numeric suffix when taken (`scan.dcm`, `scan-1.dcm`, ...).
    /// Files are opened with `create_new`, so two uploads never share a name.
    pub async fn store(
        &self,
        directory: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, DocumentError> {
        let directory = normalize_relative_path(directory)?;
        validate_file_name(file_name)?;

        let target_dir = self.root.join(&directory);
        tokio::fs::create_dir_all(&target_dir).await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = candidate_name(file_name, attempt);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(target_dir.join(&name))
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    let relative_path = if directory.is_empty() {
                        name.clone()
                    } else {
                        format!("{}/{}", directory, name)
                    };
                    return Ok(StoredFile { name, relative_path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(DocumentError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free name for {}", file_name),
        )))
    }

    /// Read a stored file
    pub async fn read(&self, relative_path: &str) -> Result<Vec<u8>, DocumentError> {
        match tokio::fs::read(self.resolve(relative_path)?).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DocumentError::FileMissing),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored file; a file already gone is not an error
    pub async fn remove(&self, relative_path: &str) -> Result<(), DocumentError> {
        match tokio::fs::remove_file(self.resolve(relative_path)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Normalize a caller-supplied relative path.
/// Absolute paths, backslashes and `..` components are refused; `.` and empty
/// components are dropped.
pub fn normalize_relative_path(path: &str) -> Result<String, DocumentError> {
    if path.starts_with('/') || path.contains('\\') || path.contains('\0') {
        return Err(DocumentError::InvalidFilePath);
    }

    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => return Err(DocumentError::InvalidFilePath),
            part => parts.push(part),
        }
    }
    Ok(parts.join("/"))
}

fn validate_file_name(name: &str) -> Result<(), DocumentError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        Err(DocumentError::InvalidFileName)
    } else {
        Ok(())
    }
}

/// `scan.dcm` for attempt 0, `scan-1.dcm` for attempt 1, ...
fn candidate_name(file_name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, attempt, ext),
        None => format!("{}-{}", stem, attempt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::Component;

    #[test]
    fn test_candidate_names() {
        assert_eq!(candidate_name("scan.dcm", 0), "scan.dcm");
        assert_eq!(candidate_name("scan.dcm", 1), "scan-1.dcm");
        assert_eq!(candidate_name("archive.tar.gz", 2), "archive.tar-2.gz");
        assert_eq!(candidate_name("README", 3), "README-3");
    }

    #[test]
    fn test_normalize_relative_path() {
        assert_eq!(normalize_relative_path("patients/42").unwrap(), "patients/42");
        assert_eq!(normalize_relative_path("./patients//42/").unwrap(), "patients/42");
        assert_eq!(normalize_relative_path("").unwrap(), "");
        assert!(matches!(normalize_relative_path("/etc"), Err(DocumentError::InvalidFilePath)));
        assert!(matches!(normalize_relative_path("a/../../etc"), Err(DocumentError::InvalidFilePath)));
        assert!(matches!(normalize_relative_path("a\\b"), Err(DocumentError::InvalidFilePath)));
    }

    #[test]
    fn test_file_names() {
        assert!(validate_file_name("scan.dcm").is_ok());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("a/b.dcm").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[tokio::test]
    async fn test_store_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        let first = storage.store("patients/42", "scan.dcm", b"first").await.unwrap();
        let second = storage.store("patients/42", "scan.dcm", b"second").await.unwrap();

        assert_eq!(first.relative_path, "patients/42/scan.dcm");
        assert_eq!(second.name, "scan-1.dcm");
        assert_eq!(storage.read(&first.relative_path).await.unwrap(), b"first");
        assert_eq!(storage.read(&second.relative_path).await.unwrap(), b"second");

        storage.remove(&first.relative_path).await.unwrap();
        assert!(matches!(storage.read(&first.relative_path).await, Err(DocumentError::FileMissing)));
        // removing twice is fine
        storage.remove(&first.relative_path).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_rejects_escape() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let result = storage.store("../outside", "scan.dcm", b"x").await;
        assert!(matches!(result, Err(DocumentError::InvalidFilePath)));
    }

    proptest! {
        #[test]
        fn prop_normalized_paths_stay_under_root(path in "[a-z./]{0,24}") {
            if let Ok(normalized) = normalize_relative_path(&path) {
                let root = Path::new("/srv/storage");
                let joined = root.join(&normalized);
                prop_assert!(joined.starts_with(root));
                prop_assert!(Path::new(&normalized)
                    .components()
                    .all(|c| matches!(c, Component::Normal(_))));
            }
        }
    }
}
