//! Identity-provider boundary.
//!
//! The handshake itself (wallet connect, passkey, hosted login page) lives
//! behind [`IdentityProvider`]. The session manager only sees whether a
//! credential exists and what it is.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::Principal;

/// Opaque credential for an authenticated caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub principal: Principal,
    pub token: String,
}

impl Credential {
    pub fn new(principal: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            principal: Principal::new(principal),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("principal", &self.principal)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("login cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),

    #[error("identity provider unreachable: {0}")]
    Transport(String),
}

#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Return the credential of a session that already exists, if any.
    async fn existing(&self) -> Result<Option<Credential>, IdentityError>;

    /// Run the provider's login handshake.
    async fn login(&self) -> Result<Credential, IdentityError>;

    /// End the provider-side session.
    async fn logout(&self) -> Result<(), IdentityError>;
}
