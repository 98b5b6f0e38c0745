use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use tinaco_core::Credential;
use tokio::sync::RwLock;

use super::CredentialStore;

/// In memory credential store. Primarily intended for tests and as a
/// reference implementation of the trait.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(credential))),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    type Error = Infallible;

    async fn save(&self, credential: &Credential) -> Result<(), Infallible> {
        *self.slot.write().await = Some(credential.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Credential>, Infallible> {
        Ok(self.slot.read().await.clone())
    }

    async fn clear(&self) -> Result<(), Infallible> {
        *self.slot.write().await = None;
        Ok(())
    }
}
