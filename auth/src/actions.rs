//! Authentication actions.
//!
//! The orchestration layer: a fixed set of asynchronous operations, each
//! driving one identity-provider interaction, normalizing its outcome,
//! and committing at most one [`SessionMutation`] through the caller's
//! context.
//!
//! # Contract
//!
//! Every action resolves or rejects exactly once - never both, never
//! neither. The provider is invoked at most once per call and never
//! retried. Operations gated on an authenticated user read the state
//! snapshot and fail fast *before* any provider interaction, so callers
//! can assert the provider was never contacted. There is no timeout and
//! no cancellation: a caller that drops the returned future leaves the
//! provider call running, and a mutation it eventually commits still
//! applies.

use crate::config::PoolConfig;
use crate::error::{AuthError, Result};
use crate::mutations::SessionMutation;
use crate::providers::{
    attribute_list, attribute_map, AuthenticateOutcome, CodeDelivery, Credentials, PoolUser,
    ProviderSession, UserPool,
};
use crate::state::{SessionState, TokenSet, User};
use poolstore_core::store::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The context every action receives from its hosting store.
pub type AuthContext = Context<SessionState, SessionMutation>;

/// Result of a successful sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpResult {
    /// Whether the account still has to confirm a delivered code before
    /// it can authenticate.
    pub user_confirmation_necessary: bool,
}

/// Outcome of [`AuthActions::authenticate_user`].
///
/// Exhaustive over the provider's success-side callbacks; failures are
/// the error channel. Challenge variants commit nothing - state only
/// changes once a session is actually issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignIn {
    /// A session was issued and committed.
    Authenticated {
        /// The committed user record.
        user: User,

        /// Always `false` on this path; carried for parity with
        /// [`SignUpResult`].
        user_confirmation_necessary: bool,
    },

    /// The account must set a new password to finish signing in; answer
    /// with [`AuthActions::complete_new_password_challenge`].
    NewPasswordRequired {
        /// The user's current profile as reported by the provider.
        attributes: HashMap<String, String>,

        /// Attribute names that must accompany the new password.
        required: Vec<String>,
    },

    /// A multi-factor code was sent. Surfaced so callers can handle it
    /// exhaustively; this module provides no code-submission operation.
    MfaRequired {
        /// Where the code went.
        delivery: CodeDelivery,
    },
}

/// Build the canonical user record from a provider session.
fn session_user(username: String, session: &ProviderSession) -> User {
    User {
        username,
        tokens: Some(session.tokens()),
        attributes: HashMap::new(),
    }
}

/// The auth action orchestrator.
///
/// Constructed once per [`PoolConfig`]; holds the long-lived pool handle
/// and the transient new-password challenge context. The challenge
/// context is owned here - not in [`SessionState`] - and lives only from
/// the challenge being issued until it is completed.
pub struct AuthActions<P: UserPool> {
    pool: P,
    pending_challenge: Mutex<Option<P::User>>,
}

impl<P: UserPool> AuthActions<P> {
    /// Connect to the pool described by `config`.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self::with_pool(P::connect(config))
    }

    /// Wrap an existing pool handle.
    ///
    /// Tests use this to inject a prepared mock.
    #[must_use]
    pub const fn with_pool(pool: P) -> Self {
        Self {
            pool,
            pending_challenge: Mutex::new(None),
        }
    }

    /// The underlying pool handle.
    pub const fn pool(&self) -> &P {
        &self.pool
    }

    /// Whether a new-password challenge is waiting to be answered.
    pub fn has_pending_challenge(&self) -> bool {
        self.challenge_slot().is_some()
    }

    fn challenge_slot(&self) -> MutexGuard<'_, Option<P::User>> {
        self.pending_challenge
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Username and tokens of the authenticated user, or the canonical
    /// precondition rejection.
    ///
    /// "Unauthenticated" is the merged predicate: no user, or a user
    /// without tokens. Checked against a snapshot, before any provider
    /// call.
    fn authenticated_user(ctx: &AuthContext) -> Result<(String, TokenSet)> {
        match ctx.state().user {
            Some(User {
                username,
                tokens: Some(tokens),
                ..
            }) => Ok((username, tokens)),
            _ => Err(AuthError::Unauthenticated),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Session bootstrap
    // ═══════════════════════════════════════════════════════════════════

    /// Recover the provider's cached current user and commit their
    /// session.
    ///
    /// # Errors
    ///
    /// [`AuthError::NoCurrentUser`] when the provider holds no cached
    /// user; the provider's error verbatim when the session fetch fails.
    /// Nothing is committed on either failure.
    pub async fn get_current_user(&self, ctx: &AuthContext) -> Result<User> {
        let user = self.pool.current_user().ok_or(AuthError::NoCurrentUser)?;
        let session = user.session().await?;

        let constructed = session_user(user.username(), &session);
        ctx.commit(SessionMutation::Authenticate(constructed.clone()));
        Ok(constructed)
    }

    /// Authenticate with username and password.
    ///
    /// On an issued session the canonical user record is committed and
    /// returned. Challenge outcomes commit nothing: a new-password
    /// challenge parks the provider handle in the orchestrator until
    /// [`complete_new_password_challenge`](Self::complete_new_password_challenge)
    /// answers it.
    ///
    /// # Errors
    ///
    /// The provider's failure callback, verbatim. No mutation is
    /// committed on failure.
    pub async fn authenticate_user(
        &self,
        ctx: &AuthContext,
        credentials: Credentials,
    ) -> Result<SignIn> {
        tracing::debug!(username = %credentials.username, "authenticating user");
        let user = self.pool.user(&credentials.username);

        match user.authenticate(&credentials).await? {
            AuthenticateOutcome::Authenticated(session) => {
                let constructed = session_user(user.username(), &session);
                ctx.commit(SessionMutation::Authenticate(constructed.clone()));
                Ok(SignIn::Authenticated {
                    user: constructed,
                    user_confirmation_necessary: false,
                })
            }
            AuthenticateOutcome::NewPasswordRequired {
                mut attributes,
                required,
            } => {
                // Reflected by the provider but not valid to resubmit.
                attributes.remove("email_verified");

                tracing::debug!(username = %credentials.username, "new password required");
                *self.challenge_slot() = Some(user);
                Ok(SignIn::NewPasswordRequired {
                    attributes,
                    required,
                })
            }
            AuthenticateOutcome::MfaRequired { delivery } => {
                Ok(SignIn::MfaRequired { delivery })
            }
        }
    }

    /// Answer a pending new-password challenge.
    ///
    /// `attributes` are the required-attribute values to submit along
    /// with the new password. On success the issued session is committed
    /// and the challenge context cleared; on provider failure the
    /// challenge stays pending so the flow can be retried.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] when no challenge is pending;
    /// otherwise the provider's error verbatim.
    pub async fn complete_new_password_challenge(
        &self,
        ctx: &AuthContext,
        new_password: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<User> {
        let Some(user) = self.challenge_slot().take() else {
            return Err(AuthError::Unauthenticated);
        };

        let entries = attribute_list(attributes);
        match user.complete_new_password_challenge(new_password, &entries).await {
            Ok(session) => {
                let constructed = session_user(user.username(), &session);
                ctx.commit(SessionMutation::Authenticate(constructed.clone()));
                Ok(constructed)
            }
            Err(err) => {
                // Challenge not consumed; put the handle back.
                *self.challenge_slot() = Some(user);
                Err(err.into())
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════

    /// Register a new account.
    ///
    /// Commits the user with `tokens: None` - signed up, no session yet.
    ///
    /// # Errors
    ///
    /// Provider error verbatim; nothing committed.
    pub async fn sign_up(
        &self,
        ctx: &AuthContext,
        username: &str,
        password: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<SignUpResult> {
        tracing::debug!(username, "signing up");
        let entries = attribute_list(attributes);
        let outcome = self.pool.sign_up(username, password, &entries).await?;

        ctx.commit(SessionMutation::Authenticate(User::unconfirmed(
            outcome.username,
        )));
        Ok(SignUpResult {
            user_confirmation_necessary: !outcome.user_confirmed,
        })
    }

    /// Confirm a registration with a delivered code.
    ///
    /// Alias creation is forced, so a contested email/phone alias moves
    /// to this account. No state change.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    pub async fn confirm_registration(
        &self,
        _ctx: &AuthContext,
        username: &str,
        code: &str,
    ) -> Result<()> {
        self.pool
            .user(username)
            .confirm_registration(code, true)
            .await?;
        Ok(())
    }

    /// Resend the confirmation code. No state change.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    pub async fn resend_confirmation_code(&self, _ctx: &AuthContext, username: &str) -> Result<()> {
        self.pool.user(username).resend_confirmation_code().await?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Password recovery
    // ═══════════════════════════════════════════════════════════════════

    /// Start the forgot-password flow. No state change.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    pub async fn forgot_password(&self, _ctx: &AuthContext, username: &str) -> Result<()> {
        tracing::debug!(username, "starting password recovery");
        self.pool.user(username).forgot_password().await?;
        Ok(())
    }

    /// Complete the forgot-password flow with the delivered code. No
    /// state change.
    ///
    /// # Errors
    ///
    /// Provider error verbatim.
    pub async fn confirm_password(
        &self,
        _ctx: &AuthContext,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        self.pool
            .user(username)
            .confirm_password(code, new_password)
            .await?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Authenticated-only operations
    // ═══════════════════════════════════════════════════════════════════

    /// Change the authenticated user's password. No state change.
    ///
    /// The provider session is reconstructed locally from the stored
    /// tokens - no extra network round-trip before the change itself.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] before any provider contact when no
    /// user (or no tokens) is in state; otherwise the provider's error
    /// verbatim.
    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let (username, tokens) = Self::authenticated_user(ctx)?;

        let user = self.pool.restore_user(&username, &tokens);
        user.change_password(old_password, new_password).await?;
        Ok(())
    }

    /// Replace attributes on the provider side.
    ///
    /// Local state is *not* updated - attributes only land in state via
    /// [`get_user_attributes`](Self::get_user_attributes).
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] before any provider contact;
    /// otherwise the provider's error verbatim.
    pub async fn update_attributes(
        &self,
        ctx: &AuthContext,
        attributes: &HashMap<String, String>,
    ) -> Result<()> {
        let (username, tokens) = Self::authenticated_user(ctx)?;

        let entries = attribute_list(attributes);
        let user = self.pool.restore_user(&username, &tokens);
        user.update_attributes(&entries).await?;
        Ok(())
    }

    /// Fetch the authenticated user's attributes and commit them.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] before any provider contact;
    /// otherwise the provider's error verbatim (nothing committed).
    pub async fn get_user_attributes(
        &self,
        ctx: &AuthContext,
    ) -> Result<HashMap<String, String>> {
        let (username, tokens) = Self::authenticated_user(ctx)?;

        let user = self.pool.restore_user(&username, &tokens);
        let attributes = attribute_map(user.user_attributes().await?);

        ctx.commit(SessionMutation::Attributes(attributes.clone()));
        Ok(attributes)
    }

    /// Sign the authenticated user out.
    ///
    /// Provider sign-out is local (no network guarantee); the `SignOut`
    /// mutation is committed exactly once.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] before any provider contact when no
    /// user (or no tokens) is in state.
    pub async fn sign_out(&self, ctx: &AuthContext) -> Result<()> {
        let (username, _tokens) = Self::authenticated_user(ctx)?;
        tracing::debug!(username = %username, "signing out");

        self.pool.user(&username).sign_out();
        ctx.commit(SessionMutation::SignOut);
        Ok(())
    }
}
