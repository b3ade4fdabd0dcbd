//! Session manager: who the caller is and which gateway client speaks for them.
//!
//! ```text
//! Unauthenticated --login--> Authenticating --ok--> Authenticated
//!                            Authenticating --err--> Unauthenticated
//! Authenticated --logout--> Unauthenticated
//! ```
//!
//! Each identity gets its own client from the [`GatewayFactory`]; a client
//! is never re-pointed at another identity. Async work is split into
//! `begin_*` / `finish_*` halves so a UI can hold no borrow of the session
//! while the identity provider is busy.

use std::rc::Rc;

use crate::config::AccessPolicy;
use crate::error::SyncError;
use crate::gateway::{ContentGateway, GatewayFactory};
use crate::identity::{Credential, IdentityError, IdentityProvider};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated(Credential),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Ticket for a startup probe started by [`SessionManager::begin_initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializeProbe {
    generation: u64,
}

/// Ticket for a login started by [`SessionManager::begin_login`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttempt {
    generation: u64,
}

pub struct SessionManager {
    factory: Rc<dyn GatewayFactory>,
    policy: AccessPolicy,
    state: SessionState,
    anonymous: Rc<dyn ContentGateway>,
    bound: Option<Rc<dyn ContentGateway>>,
    initialized: bool,
    // Bumped on every login start and logout; older tickets are stale.
    generation: u64,
}

impl SessionManager {
    pub fn new(factory: Rc<dyn GatewayFactory>, policy: AccessPolicy) -> Self {
        let anonymous = factory.connect(None);
        Self {
            factory,
            policy,
            state: SessionState::Unauthenticated,
            anonymous,
            bound: None,
            initialized: false,
            generation: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn credential(&self) -> Option<&Credential> {
        match &self.state {
            SessionState::Authenticated(credential) => Some(credential),
            _ => None,
        }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Client for reads: the bound client when logged in, otherwise the
    /// anonymous one unless reads require a session.
    pub fn read_client(&self) -> Result<Rc<dyn ContentGateway>, SyncError> {
        self.client_for(self.policy.require_auth_for_reads)
    }

    /// Whether [`read_client`](Self::read_client) would hand out a client.
    pub fn can_read(&self) -> bool {
        self.bound.is_some() || !self.policy.require_auth_for_reads
    }

    /// Client for writes; same rule under `require_auth_for_writes`.
    pub fn write_client(&self) -> Result<Rc<dyn ContentGateway>, SyncError> {
        self.client_for(self.policy.require_auth_for_writes)
    }

    fn client_for(&self, require_auth: bool) -> Result<Rc<dyn ContentGateway>, SyncError> {
        match &self.bound {
            Some(client) => Ok(Rc::clone(client)),
            None if require_auth => Err(SyncError::Unauthenticated),
            None => Ok(Rc::clone(&self.anonymous)),
        }
    }

    /// Start the once-per-lifetime probe for an existing credential.
    /// Returns `None` if it already ran.
    pub fn begin_initialize(&mut self) -> Option<InitializeProbe> {
        if self.initialized {
            return None;
        }
        self.initialized = true;
        Some(InitializeProbe {
            generation: self.generation,
        })
    }

    /// Apply the probe result. A login or logout that happened while the
    /// probe was out wins over it.
    pub fn finish_initialize(
        &mut self,
        probe: InitializeProbe,
        result: Result<Option<Credential>, IdentityError>,
    ) {
        if probe.generation != self.generation || self.state != SessionState::Unauthenticated {
            tracing::debug!("Discarding stale session probe");
            return;
        }
        match result {
            Ok(Some(credential)) => {
                tracing::info!(principal = %credential.principal, "Restored existing session");
                self.bind(credential);
            }
            Ok(None) => tracing::info!("No existing session, continuing anonymously"),
            Err(e) => tracing::warn!(error = %e, "Session probe failed, continuing anonymously"),
        }
    }

    /// Move to `Authenticating`. Returns `None` (a no-op) unless currently
    /// unauthenticated, so only one login is ever in flight.
    pub fn begin_login(&mut self) -> Option<LoginAttempt> {
        if self.state != SessionState::Unauthenticated {
            tracing::debug!(state = ?self.state, "Ignoring login request");
            return None;
        }
        self.generation += 1;
        self.state = SessionState::Authenticating;
        tracing::info!("Login started");
        Some(LoginAttempt {
            generation: self.generation,
        })
    }

    /// Complete a login. Results for an attempt superseded by a logout are
    /// dropped. A cancelled login is not an error.
    pub fn finish_login(
        &mut self,
        attempt: LoginAttempt,
        result: Result<Credential, IdentityError>,
    ) -> Result<(), SyncError> {
        if attempt.generation != self.generation || self.state != SessionState::Authenticating {
            tracing::debug!("Discarding stale login result");
            return Ok(());
        }
        match result {
            Ok(credential) => {
                tracing::info!(principal = %credential.principal, "Login succeeded");
                self.bind(credential);
                Ok(())
            }
            Err(IdentityError::Cancelled) => {
                tracing::info!("Login cancelled");
                self.state = SessionState::Unauthenticated;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.state = SessionState::Unauthenticated;
                Err(e.into())
            }
        }
    }

    /// Drop the identity and its client locally. Never fails.
    pub fn end_session(&mut self) {
        if let Some(credential) = self.credential() {
            tracing::info!(principal = %credential.principal, "Logging out");
        }
        self.generation += 1;
        self.initialized = true;
        self.state = SessionState::Unauthenticated;
        self.bound = None;
        self.anonymous = self.factory.connect(None);
    }

    pub async fn initialize(&mut self, provider: &dyn IdentityProvider) {
        if let Some(probe) = self.begin_initialize() {
            let result = provider.existing().await;
            self.finish_initialize(probe, result);
        }
    }

    pub async fn login(&mut self, provider: &dyn IdentityProvider) -> Result<(), SyncError> {
        match self.begin_login() {
            Some(attempt) => {
                let result = provider.login().await;
                self.finish_login(attempt, result)
            }
            None => Ok(()),
        }
    }

    /// End the session here and at the provider. Provider errors are logged.
    pub async fn logout(&mut self, provider: &dyn IdentityProvider) {
        self.end_session();
        if let Err(e) = provider.logout().await {
            tracing::warn!(error = %e, "Identity provider logout failed");
        }
    }

    fn bind(&mut self, credential: Credential) {
        self.bound = Some(self.factory.connect(Some(&credential)));
        self.state = SessionState::Authenticated(credential);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use async_trait::async_trait;
    use shared_types::{Comment, CommentId, NewPost, Post, PostId, TagRegistry, UpdatePost};
    use std::cell::{Cell, RefCell};

    /// Gateway that only remembers who it was built for.
    struct Stub {
        principal: Option<String>,
    }

    fn offline() -> GatewayError {
        GatewayError::Transport("offline".to_string())
    }

    #[async_trait(?Send)]
    impl ContentGateway for Stub {
        async fn list_posts(&self) -> Result<Vec<Post>, GatewayError> {
            Err(offline())
        }
        async fn tag_registry(&self) -> Result<TagRegistry, GatewayError> {
            Err(offline())
        }
        async fn create_post(&self, _: &NewPost) -> Result<Post, GatewayError> {
            Err(offline())
        }
        async fn edit_post(&self, _: PostId, _: &UpdatePost) -> Result<Post, GatewayError> {
            Err(offline())
        }
        async fn add_comment(&self, _: PostId, _: &str) -> Result<Comment, GatewayError> {
            Err(offline())
        }
        async fn edit_comment(
            &self,
            _: PostId,
            _: CommentId,
            _: &str,
        ) -> Result<Comment, GatewayError> {
            Err(offline())
        }
        async fn remove_comment(&self, _: PostId, _: CommentId) -> Result<(), GatewayError> {
            Err(offline())
        }
        async fn add_tag(&self, _: &str) -> Result<(), GatewayError> {
            Err(offline())
        }
        async fn remove_tag(&self, _: &str) -> Result<(), GatewayError> {
            Err(offline())
        }
    }

    #[derive(Default)]
    struct StubFactory {
        connects: RefCell<Vec<Option<String>>>,
        last: RefCell<Option<Rc<Stub>>>,
    }

    impl GatewayFactory for StubFactory {
        fn connect(&self, credential: Option<&Credential>) -> Rc<dyn ContentGateway> {
            let principal = credential.map(|c| c.principal.to_string());
            self.connects.borrow_mut().push(principal.clone());
            let stub = Rc::new(Stub { principal });
            *self.last.borrow_mut() = Some(Rc::clone(&stub));
            stub
        }
    }

    #[derive(Default)]
    struct StubProvider {
        existing: Option<Credential>,
        login_calls: Cell<u32>,
        logout_fails: bool,
    }

    #[async_trait(?Send)]
    impl IdentityProvider for StubProvider {
        async fn existing(&self) -> Result<Option<Credential>, IdentityError> {
            Ok(self.existing.clone())
        }
        async fn login(&self) -> Result<Credential, IdentityError> {
            self.login_calls.set(self.login_calls.get() + 1);
            Ok(Credential::new("alice", "token-a"))
        }
        async fn logout(&self) -> Result<(), IdentityError> {
            if self.logout_fails {
                Err(IdentityError::Transport("gone".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn manager(policy: AccessPolicy) -> (Rc<StubFactory>, SessionManager) {
        let factory = Rc::new(StubFactory::default());
        let session = SessionManager::new(factory.clone(), policy);
        (factory, session)
    }

    #[test]
    fn test_second_login_while_authenticating_is_noop() {
        let (_, mut session) = manager(AccessPolicy::default());
        let attempt = session.begin_login().unwrap();
        assert_eq!(session.state(), &SessionState::Authenticating);
        assert!(session.begin_login().is_none());

        session
            .finish_login(attempt, Ok(Credential::new("alice", "t")))
            .unwrap();
        assert!(session.is_authenticated());
        assert!(session.begin_login().is_none());
    }

    #[test]
    fn test_failed_login_returns_to_unauthenticated() {
        let (_, mut session) = manager(AccessPolicy::default());
        let attempt = session.begin_login().unwrap();
        let err = session
            .finish_login(attempt, Err(IdentityError::Failed("bad passkey".to_string())))
            .unwrap_err();
        assert_eq!(err.to_string(), "Login failed: bad passkey");
        assert_eq!(session.state(), &SessionState::Unauthenticated);

        let attempt = session.begin_login().unwrap();
        assert!(session.finish_login(attempt, Err(IdentityError::Cancelled)).is_ok());
        assert_eq!(session.state(), &SessionState::Unauthenticated);
    }

    #[test]
    fn test_login_result_after_logout_is_discarded() {
        let (_, mut session) = manager(AccessPolicy::default());
        let attempt = session.begin_login().unwrap();
        session.end_session();

        session
            .finish_login(attempt, Ok(Credential::new("alice", "t")))
            .unwrap();
        assert_eq!(session.state(), &SessionState::Unauthenticated);
        assert!(session.credential().is_none());
    }

    #[test]
    fn test_probe_does_not_override_login() {
        let (_, mut session) = manager(AccessPolicy::default());
        let probe = session.begin_initialize().unwrap();
        let attempt = session.begin_login().unwrap();
        session
            .finish_login(attempt, Ok(Credential::new("alice", "t")))
            .unwrap();

        session.finish_initialize(probe, Ok(Some(Credential::new("mallory", "m"))));
        assert_eq!(
            session.credential().map(|c| c.principal.as_str()),
            Some("alice")
        );
    }

    #[test]
    fn test_write_client_requires_session_by_default() {
        let (factory, mut session) = manager(AccessPolicy::default());
        assert!(session.read_client().is_ok());
        assert_eq!(session.write_client().err(), Some(SyncError::Unauthenticated));

        let attempt = session.begin_login().unwrap();
        session
            .finish_login(attempt, Ok(Credential::new("alice", "t")))
            .unwrap();
        assert!(session.write_client().is_ok());
        assert_eq!(
            factory.last.borrow().as_ref().and_then(|s| s.principal.clone()),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_reads_can_require_session() {
        let (_, session) = manager(AccessPolicy {
            require_auth_for_reads: true,
            require_auth_for_writes: true,
        });
        assert_eq!(session.read_client().err(), Some(SyncError::Unauthenticated));
        assert!(!session.can_read());
    }

    #[test]
    fn test_can_read_follows_login_under_gated_reads() {
        let (_, mut session) = manager(AccessPolicy {
            require_auth_for_reads: true,
            require_auth_for_writes: true,
        });
        let attempt = session.begin_login().unwrap();
        session
            .finish_login(attempt, Ok(Credential::new("alice", "t")))
            .unwrap();
        assert!(session.can_read());

        session.end_session();
        assert!(!session.can_read());
        assert!(session.read_client().is_err());
    }

    #[tokio::test]
    async fn test_initialize_runs_once_and_restores_session() {
        let (factory, mut session) = manager(AccessPolicy::default());
        let provider = StubProvider {
            existing: Some(Credential::new("alice", "t")),
            ..StubProvider::default()
        };

        session.initialize(&provider).await;
        assert!(session.is_authenticated());
        assert_eq!(
            *factory.connects.borrow(),
            vec![None, Some("alice".to_string())]
        );

        session.logout(&provider).await;
        session.initialize(&provider).await;
        assert_eq!(session.state(), &SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_rebuilds_client_and_swallows_provider_errors() {
        let (factory, mut session) = manager(AccessPolicy::default());
        let provider = StubProvider {
            logout_fails: true,
            ..StubProvider::default()
        };

        session.login(&provider).await.unwrap();
        assert_eq!(provider.login_calls.get(), 1);
        let before = factory.connects.borrow().len();

        session.logout(&provider).await;
        assert_eq!(session.state(), &SessionState::Unauthenticated);
        assert_eq!(factory.connects.borrow().len(), before + 1);
        assert_eq!(factory.connects.borrow().last(), Some(&None));
        assert!(session.write_client().is_err());
    }
}
