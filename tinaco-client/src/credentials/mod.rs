//! Persistence for the session credential.
//!
//! Exactly one credential is held at a time. `load` answering `None` means
//! signed out; a store error means the backing storage itself is unavailable,
//! which is a different condition and is surfaced as such.

mod file;
mod memory;

pub use file::{FileCredentialStore, FileStoreError};
pub use memory::MemoryCredentialStore;

use async_trait::async_trait;
use tinaco_core::Credential;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the credential, replacing any previous one. Once this
    /// returns, `load` sees the new value. Never a partial write.
    async fn save(&self, credential: &Credential) -> Result<(), Self::Error>;

    /// The stored credential, or `None` when signed out.
    async fn load(&self) -> Result<Option<Credential>, Self::Error>;

    /// Remove the credential. Clearing an empty store is fine.
    async fn clear(&self) -> Result<(), Self::Error>;
}
