//! Browser identity provider.
//!
//! The login handshake runs on the gateway's `/auth/*` endpoints; this side
//! only learns whether a session exists and the credential it carries.

use async_trait::async_trait;
use blog_sync::{Credential, IdentityError, IdentityProvider};
use gloo_net::http::Request;
use serde::Deserialize;

#[derive(Deserialize)]
struct MeResponse {
    authenticated: bool,
    principal: Option<String>,
    token: Option<String>,
}

impl MeResponse {
    fn into_credential(self) -> Option<Credential> {
        match (self.authenticated, self.principal, self.token) {
            (true, Some(principal), Some(token)) => Some(Credential::new(principal, token)),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    principal: String,
    token: String,
    #[serde(default)]
    cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct BrowserIdentity {
    base: String,
}

impl BrowserIdentity {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/{path}", self.base)
    }
}

fn transport(e: gloo_net::Error) -> IdentityError {
    IdentityError::Transport(e.to_string())
}

#[async_trait(?Send)]
impl IdentityProvider for BrowserIdentity {
    async fn existing(&self) -> Result<Option<Credential>, IdentityError> {
        let response = Request::get(&self.url("me"))
            .send()
            .await
            .map_err(transport)?;
        if !response.ok() {
            return Ok(None);
        }
        let me: MeResponse = response.json().await.map_err(transport)?;
        Ok(me.into_credential())
    }

    async fn login(&self) -> Result<Credential, IdentityError> {
        let response = Request::post(&self.url("login"))
            .send()
            .await
            .map_err(transport)?;
        if !response.ok() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Failed(if body.trim().is_empty() {
                format!("HTTP error: {}", response.status())
            } else {
                body.trim().to_string()
            }));
        }
        let login: LoginResponse = response.json().await.map_err(transport)?;
        if login.cancelled {
            return Err(IdentityError::Cancelled);
        }
        Ok(Credential::new(login.principal, login.token))
    }

    async fn logout(&self) -> Result<(), IdentityError> {
        let response = Request::post(&self.url("logout"))
            .send()
            .await
            .map_err(transport)?;
        if response.ok() {
            Ok(())
        } else {
            Err(IdentityError::Failed(format!(
                "HTTP error: {}",
                response.status()
            )))
        }
    }
}
