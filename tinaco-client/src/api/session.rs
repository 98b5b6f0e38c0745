use serde::Deserialize;

/// Response body for login and registration.
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub token: String,
}
