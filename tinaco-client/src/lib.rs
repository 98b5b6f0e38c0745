//! Typed client for the water container monitoring API.
//!
//! Every outbound request funnels through one [`gateway::Gateway`], which
//! resolves the stored credential, attaches it as a bearer header and
//! classifies the result. [`client::ApiClient`] layers the typed resource
//! operations on top.

pub mod api;
pub mod client;
pub mod credentials;
pub mod gateway;
pub mod view;

pub use client::ApiClient;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use gateway::{ApiError, Gateway, Outcome, RequestSpec};
pub use view::{ContainerLink, DispenserDetail, SensorDetail, ViewState};
