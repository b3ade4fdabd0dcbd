use crate::gateway::GatewayError;
use crate::identity::IdentityError;

/// Message shown to the user when the gateway cannot be reached.
pub const TRANSPORT_MESSAGE: &str = "Could not reach the blog service, please try again";

/// Message shown when a write is attempted without a session.
pub const UNAUTHENTICATED_MESSAGE: &str = "You must be logged in to do that";

/// Every failure the synchronization layer surfaces to a caller.
///
/// None of these are fatal: the content store keeps its last-known-good
/// snapshot and the caller stays interactive.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    /// The gateway answered with `Err(reason)`; shown verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Network or protocol failure. `detail` is for logs only.
    #[error("{}", TRANSPORT_MESSAGE)]
    Transport { detail: String },

    #[error("{}", UNAUTHENTICATED_MESSAGE)]
    Unauthenticated,

    #[error("Login failed: {0}")]
    Identity(String),

    #[error("No comment edit in progress")]
    NoEditInProgress,
}

impl SyncError {
    pub fn validation(message: impl Into<String>) -> Self {
        SyncError::Validation(message.into())
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        SyncError::Transport {
            detail: detail.into(),
        }
    }

    /// Prefix a gateway rejection with the subject it concerns
    /// (e.g. `"release: duplicate"`). Other variants pass through.
    pub fn scoped(self, subject: &str) -> Self {
        match self {
            SyncError::Rejected(reason) => SyncError::Rejected(format!("{subject}: {reason}")),
            other => other,
        }
    }
}

impl From<GatewayError> for SyncError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Rejected(reason) => SyncError::Rejected(reason),
            GatewayError::Transport(detail) => SyncError::Transport { detail },
        }
    }
}

impl From<IdentityError> for SyncError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Transport(detail) => SyncError::Transport { detail },
            other => SyncError::Identity(other.to_string()),
        }
    }
}
