//! Session state types.
//!
//! The single mutable record the module maintains. It is owned by the
//! hosting store and changed only through committed
//! [`SessionMutation`](crate::mutations::SessionMutation)s; everything in
//! this file is plain data plus pure derivations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three tokens issued by the provider after authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Identity token (JWT).
    pub id_token: String,

    /// Access token (JWT).
    pub access_token: String,

    /// Refresh token.
    pub refresh_token: String,

    /// Expiration of the id/access tokens, when the provider exposes one.
    pub expires_at: Option<DateTime<Utc>>,
}

/// The current user as known to the module.
///
/// `tokens: None` means the account has signed up but not yet completed
/// authentication (unconfirmed, or mid-challenge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Username the account was registered under.
    pub username: String,

    /// Session tokens, absent until authentication completes.
    pub tokens: Option<TokenSet>,

    /// Last attribute map fetched from the provider.
    pub attributes: HashMap<String, String>,
}

impl User {
    /// A user that has signed up but holds no session yet.
    #[must_use]
    pub fn unconfirmed(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            tokens: None,
            attributes: HashMap::new(),
        }
    }
}

/// Root session state.
///
/// Exactly one authoritative value exists per module instance; `user`
/// being `None` is the unauthenticated state.
///
/// # Examples
///
/// ```
/// # use poolstore_auth::state::SessionState;
/// let state = SessionState::default();
/// assert!(state.user.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current user, `None` when unauthenticated.
    pub user: Option<User>,
}

impl SessionState {
    /// Whether a user is authenticated at `now`.
    ///
    /// True iff a user is present, holds tokens, and the tokens have not
    /// expired. Tokens without a known expiration are treated as live.
    /// Pure and total.
    #[must_use]
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        match &self.user {
            Some(User {
                tokens: Some(tokens),
                ..
            }) => tokens.expires_at.is_none_or(|at| now <= at),
            _ => false,
        }
    }
}
