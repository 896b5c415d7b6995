//! User-pool handle trait.

use super::{AttributeEntry, PoolUser, ProviderResult, SignUpOutcome};
use crate::config::PoolConfig;
use crate::state::TokenSet;
use std::future::Future;

/// Handle to one user pool at the identity provider.
///
/// Connected once per [`PoolConfig`] and held for the life of the module.
/// Everything user-scoped happens through [`PoolUser`] handles minted
/// here.
pub trait UserPool: Send + Sync {
    /// User handle type minted by this pool.
    type User: PoolUser;

    /// Connect to the pool described by `config`.
    ///
    /// Purely local construction; no network traffic until an operation
    /// is invoked.
    fn connect(config: PoolConfig) -> Self
    where
        Self: Sized;

    /// The provider's cached current user, if any.
    ///
    /// A local cache read; `None` means no user has authenticated on this
    /// client.
    fn current_user(&self) -> Option<Self::User>;

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns the provider's error verbatim (username taken, password
    /// policy violation, transport failure, ...).
    fn sign_up(
        &self,
        username: &str,
        password: &str,
        attributes: &[AttributeEntry],
    ) -> impl Future<Output = ProviderResult<SignUpOutcome>> + Send;

    /// Handle for `username` with no session attached.
    fn user(&self, username: &str) -> Self::User;

    /// Handle for `username` with its session reconstructed locally from
    /// `tokens`.
    ///
    /// Must not perform a network round-trip: the session object is
    /// rebuilt from the already-held token strings so that
    /// authenticated-only operations can run without re-authenticating.
    fn restore_user(&self, username: &str, tokens: &TokenSet) -> Self::User;
}
