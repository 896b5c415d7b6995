//! Mock user pool for testing.
//!
//! Outcomes are scripted per operation; every provider interaction is
//! counted and its arguments captured. Unscripted interactions fail with
//! a recognizable error rather than fabricating data, so a test that
//! forgot to script something fails loudly.

use crate::config::PoolConfig;
use crate::error::ProviderError;
use crate::providers::{
    AttributeEntry, AuthenticateOutcome, Credentials, PoolUser, ProviderResult, ProviderSession,
    SignUpOutcome, UserPool,
};
use crate::state::TokenSet;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unscripted(operation: &str) -> ProviderError {
    ProviderError::new(format!("mock: no scripted outcome for {operation}"))
}

#[derive(Debug, Default)]
struct PoolInner {
    config: Mutex<Option<PoolConfig>>,

    // Scripted outcomes
    current_username: Mutex<Option<String>>,
    session: Mutex<Option<ProviderResult<ProviderSession>>>,
    sign_up: Mutex<Option<ProviderResult<SignUpOutcome>>>,
    authenticate: Mutex<Option<ProviderResult<AuthenticateOutcome>>>,
    challenge: Mutex<Option<ProviderResult<ProviderSession>>>,
    failures: Mutex<HashMap<String, ProviderError>>,

    // Echoing attribute store backing update/get attribute round-trips
    attributes: Mutex<HashMap<String, String>>,

    // Observations
    calls: Mutex<HashMap<String, usize>>,
    restored: Mutex<Vec<(String, TokenSet)>>,
    last_sign_up: Mutex<Option<(String, String, Vec<AttributeEntry>)>>,
    last_confirmation: Mutex<Option<(String, String, bool)>>,
    last_change_password: Mutex<Option<(String, String)>>,
    last_new_password: Mutex<Option<(String, Vec<AttributeEntry>)>>,
}

impl PoolInner {
    fn record(&self, operation: &str) {
        *lock(&self.calls).entry(operation.to_string()).or_insert(0) += 1;
    }

    fn failure_for(&self, operation: &str) -> Option<ProviderError> {
        lock(&self.failures).get(operation).cloned()
    }
}

/// Mock user pool.
///
/// Cloning shares the underlying script and observation log, so tests
/// keep one handle for assertions while the orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct MockUserPool {
    inner: Arc<PoolInner>,
}

impl MockUserPool {
    /// Create an unscripted mock pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scripting ──────────────────────────────────────────────────────

    /// Script the cached current user.
    pub fn set_current_user(&self, username: impl Into<String>) {
        *lock(&self.inner.current_username) = Some(username.into());
    }

    /// Script the session returned by `PoolUser::session`.
    pub fn set_session(&self, session: ProviderSession) {
        *lock(&self.inner.session) = Some(Ok(session));
    }

    /// Script a session fetch failure.
    pub fn fail_session(&self, error: ProviderError) {
        *lock(&self.inner.session) = Some(Err(error));
    }

    /// Script the sign-up outcome.
    pub fn set_sign_up_outcome(&self, outcome: SignUpOutcome) {
        *lock(&self.inner.sign_up) = Some(Ok(outcome));
    }

    /// Script a sign-up failure.
    pub fn fail_sign_up(&self, error: ProviderError) {
        *lock(&self.inner.sign_up) = Some(Err(error));
    }

    /// Script the authentication outcome.
    pub fn set_authenticate_outcome(&self, outcome: AuthenticateOutcome) {
        *lock(&self.inner.authenticate) = Some(Ok(outcome));
    }

    /// Script an authentication failure.
    pub fn fail_authenticate(&self, error: ProviderError) {
        *lock(&self.inner.authenticate) = Some(Err(error));
    }

    /// Script the session issued on new-password challenge completion.
    pub fn set_challenge_session(&self, session: ProviderSession) {
        *lock(&self.inner.challenge) = Some(Ok(session));
    }

    /// Script a challenge completion failure.
    pub fn fail_challenge(&self, error: ProviderError) {
        *lock(&self.inner.challenge) = Some(Err(error));
    }

    /// Script `operation` (one of the unit-result operations:
    /// `confirm_registration`, `resend_confirmation_code`,
    /// `forgot_password`, `confirm_password`, `change_password`,
    /// `update_attributes`, `get_user_attributes`) to fail.
    pub fn fail_operation(&self, operation: impl Into<String>, error: ProviderError) {
        lock(&self.inner.failures).insert(operation.into(), error);
    }

    /// Seed the echoing attribute store.
    pub fn seed_attributes(&self, attributes: HashMap<String, String>) {
        *lock(&self.inner.attributes) = attributes;
    }

    // ── Observations ───────────────────────────────────────────────────

    /// The config this pool was connected with, if `connect` was used.
    #[must_use]
    pub fn config(&self) -> Option<PoolConfig> {
        lock(&self.inner.config).clone()
    }

    /// How many times `operation` was invoked.
    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        lock(&self.inner.calls).get(operation).copied().unwrap_or(0)
    }

    /// Total provider interactions across all operations.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        lock(&self.inner.calls).values().sum()
    }

    /// Sessions reconstructed locally via `restore_user`, in order.
    #[must_use]
    pub fn restored_sessions(&self) -> Vec<(String, TokenSet)> {
        lock(&self.inner.restored).clone()
    }

    /// Arguments of the last sign-up: `(username, password, attributes)`.
    #[must_use]
    pub fn last_sign_up(&self) -> Option<(String, String, Vec<AttributeEntry>)> {
        lock(&self.inner.last_sign_up).clone()
    }

    /// Arguments of the last confirmation:
    /// `(username, code, force_alias_creation)`.
    #[must_use]
    pub fn last_confirmation(&self) -> Option<(String, String, bool)> {
        lock(&self.inner.last_confirmation).clone()
    }

    /// Arguments of the last password change: `(old, new)`.
    #[must_use]
    pub fn last_change_password(&self) -> Option<(String, String)> {
        lock(&self.inner.last_change_password).clone()
    }

    /// Arguments of the last challenge answer:
    /// `(new_password, attributes)`.
    #[must_use]
    pub fn last_new_password(&self) -> Option<(String, Vec<AttributeEntry>)> {
        lock(&self.inner.last_new_password).clone()
    }

    /// Current contents of the echoing attribute store.
    #[must_use]
    pub fn stored_attributes(&self) -> HashMap<String, String> {
        lock(&self.inner.attributes).clone()
    }
}

impl UserPool for MockUserPool {
    type User = MockPoolUser;

    fn connect(config: PoolConfig) -> Self {
        let pool = Self::new();
        *lock(&pool.inner.config) = Some(config);
        pool
    }

    fn current_user(&self) -> Option<Self::User> {
        self.inner.record("current_user");
        lock(&self.inner.current_username)
            .clone()
            .map(|username| MockPoolUser {
                inner: Arc::clone(&self.inner),
                username,
                restored_tokens: None,
            })
    }

    fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[AttributeEntry],
    ) -> impl Future<Output = ProviderResult<SignUpOutcome>> + Send {
        self.inner.record("sign_up");
        *lock(&self.inner.last_sign_up) = Some((
            username.to_string(),
            password.to_string(),
            attributes.to_vec(),
        ));
        let result = lock(&self.inner.sign_up)
            .clone()
            .unwrap_or_else(|| Err(unscripted("sign_up")));

        async move { result }
    }

    fn user(&self, username: &str) -> Self::User {
        MockPoolUser {
            inner: Arc::clone(&self.inner),
            username: username.to_string(),
            restored_tokens: None,
        }
    }

    fn restore_user(&self, username: &str, tokens: &TokenSet) -> Self::User {
        lock(&self.inner.restored).push((username.to_string(), tokens.clone()));
        MockPoolUser {
            inner: Arc::clone(&self.inner),
            username: username.to_string(),
            restored_tokens: Some(tokens.clone()),
        }
    }
}

/// Mock user handle minted by [`MockUserPool`].
#[derive(Debug, Clone)]
pub struct MockPoolUser {
    inner: Arc<PoolInner>,
    username: String,
    restored_tokens: Option<TokenSet>,
}

impl MockPoolUser {
    /// Tokens this handle's session was restored from, if any.
    #[must_use]
    pub const fn restored_tokens(&self) -> Option<&TokenSet> {
        self.restored_tokens.as_ref()
    }

    fn unit_result(&self, operation: &str) -> ProviderResult<()> {
        match self.inner.failure_for(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl PoolUser for MockPoolUser {
    fn username(&self) -> String {
        self.username.clone()
    }

    fn authenticate(
        &self,
        _credentials: &Credentials,
    ) -> impl Future<Output = ProviderResult<AuthenticateOutcome>> + Send {
        self.inner.record("authenticate");
        let result = lock(&self.inner.authenticate)
            .clone()
            .unwrap_or_else(|| Err(unscripted("authenticate")));

        async move { result }
    }

    fn session(&self) -> impl Future<Output = ProviderResult<ProviderSession>> + Send {
        self.inner.record("get_session");
        let result = lock(&self.inner.session)
            .clone()
            .unwrap_or_else(|| Err(unscripted("get_session")));

        async move { result }
    }

    fn confirm_registration(
        &self,
        code: &str,
        force_alias_creation: bool,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        self.inner.record("confirm_registration");
        *lock(&self.inner.last_confirmation) =
            Some((self.username.clone(), code.to_string(), force_alias_creation));
        let result = self.unit_result("confirm_registration");

        async move { result }
    }

    fn resend_confirmation_code(&self) -> impl Future<Output = ProviderResult<()>> + Send {
        self.inner.record("resend_confirmation_code");
        let result = self.unit_result("resend_confirmation_code");

        async move { result }
    }

    fn forgot_password(&self) -> impl Future<Output = ProviderResult<()>> + Send {
        self.inner.record("forgot_password");
        let result = self.unit_result("forgot_password");

        async move { result }
    }

    fn confirm_password(
        &self,
        _code: &str,
        _new_password: &str,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        self.inner.record("confirm_password");
        let result = self.unit_result("confirm_password");

        async move { result }
    }

    fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        self.inner.record("change_password");
        *lock(&self.inner.last_change_password) =
            Some((old_password.to_string(), new_password.to_string()));
        let result = self.unit_result("change_password");

        async move { result }
    }

    fn complete_new_password_challenge(
        &self,
        new_password: &str,
        attributes: &[AttributeEntry],
    ) -> impl Future<Output = ProviderResult<ProviderSession>> + Send {
        self.inner.record("complete_new_password_challenge");
        *lock(&self.inner.last_new_password) =
            Some((new_password.to_string(), attributes.to_vec()));
        let result = lock(&self.inner.challenge)
            .clone()
            .unwrap_or_else(|| Err(unscripted("complete_new_password_challenge")));

        async move { result }
    }

    fn update_attributes(
        &self,
        attributes: &[AttributeEntry],
    ) -> impl Future<Output = ProviderResult<()>> + Send {
        self.inner.record("update_attributes");
        let result = match self.unit_result("update_attributes") {
            Ok(()) => {
                let mut stored = lock(&self.inner.attributes);
                for entry in attributes {
                    stored.insert(entry.name.clone(), entry.value.clone());
                }
                Ok(())
            }
            Err(error) => Err(error),
        };

        async move { result }
    }

    fn user_attributes(&self) -> impl Future<Output = ProviderResult<Vec<AttributeEntry>>> + Send {
        self.inner.record("get_user_attributes");
        let result = match self.inner.failure_for("get_user_attributes") {
            Some(error) => Err(error),
            None => {
                let mut entries: Vec<AttributeEntry> = lock(&self.inner.attributes)
                    .iter()
                    .map(|(name, value)| AttributeEntry::new(name, value))
                    .collect();
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(entries)
            }
        };

        async move { result }
    }

    fn sign_out(&self) {
        self.inner.record("sign_out");
    }
}
