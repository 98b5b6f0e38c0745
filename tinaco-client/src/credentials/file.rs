use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tinaco_core::Credential;
use tokio::fs;
use tokio::sync::Mutex;

use super::CredentialStore;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("credential storage unavailable: {0}")]
    Io(#[from] io::Error),
}

/// Credential store backed by a single token file.
///
/// Writes go to a staging file next to the target and are published with a
/// rename, so a concurrent `load` sees either the old value or the new one,
/// never a torn write.
#[derive(Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staged = self.path.as_os_str().to_owned();
        staged.push(".tmp");
        PathBuf::from(staged)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    type Error = FileStoreError;

    async fn save(&self, credential: &Credential) -> Result<(), FileStoreError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let staged = self.staging_path();
        fs::write(&staged, credential.as_str()).await?;
        fs::rename(&staged, &self.path).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<Credential>, FileStoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(token) => Ok(Some(Credential::new(token))),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(FileStoreError::Io(error)),
        }
    }

    async fn clear(&self) -> Result<(), FileStoreError> {
        let _guard = self.write_lock.lock().await;

        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(FileStoreError::Io(error)),
        }
    }
}
