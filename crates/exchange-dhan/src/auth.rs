//! Session credentials for the Dhan trading API.
//!
//! Dhan authenticates requests with a bearer `access-token` header plus the
//! client id in order payloads. The browser session keeps these in local
//! storage; a CLI process takes them from the environment:
//!
//! - `DHAN_ACCESS_TOKEN`: the session JWT
//! - `DHAN_CLIENT_ID`: the login/client id

use crate::error::{DhanError, Result};
use secrecy::{ExposeSecret, SecretString};

/// Authenticated session context. Both fields are required before any
/// order-placing operation.
pub struct SessionAuth {
    access_token: SecretString,
    client_id: String,
}

impl std::fmt::Debug for SessionAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuth")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl SessionAuth {
    /// Creates a session from explicit credentials.
    ///
    /// # Errors
    /// Returns `DhanError::Authentication` if either value is empty.
    pub fn new(access_token: impl Into<String>, client_id: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();
        let client_id = client_id.into();
        if access_token.is_empty() || client_id.is_empty() {
            return Err(DhanError::Authentication(
                "access token and client id must both be present".to_string(),
            ));
        }
        Ok(Self {
            access_token: access_token.into(),
            client_id,
        })
    }

    /// Reads credentials from `DHAN_ACCESS_TOKEN` / `DHAN_CLIENT_ID`.
    ///
    /// # Errors
    /// Returns `DhanError::Authentication` if either variable is missing,
    /// naming the one that was absent.
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var("DHAN_ACCESS_TOKEN").map_err(|_| {
            DhanError::Authentication("DHAN_ACCESS_TOKEN is not set".to_string())
        })?;
        let client_id = std::env::var("DHAN_CLIENT_ID")
            .map_err(|_| DhanError::Authentication("DHAN_CLIENT_ID is not set".to_string()))?;
        Self::new(access_token, client_id)
    }

    /// The raw token for the `access-token` header.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// The client id placed in order payloads.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}
