//! # Poolstore Authentication Module
//!
//! A reactive-store authentication module for hosted user-pool identity
//! providers: sign-up, sign-in, confirmation, password reset, attribute
//! management and sign-out behind a uniform action/mutation interface.
//!
//! ## Architecture
//!
//! The module is the reconciliation layer between an external identity
//! service and a small piece of shared session state:
//!
//! ```text
//! caller ──► action(ctx, payload) ──► provider capability
//!                   │                        │
//!                   │◄── normalized outcome ─┘
//!                   ▼
//!            ctx.commit(mutation) ──► SessionState
//! ```
//!
//! Actions call the provider at most once, normalize its outcome, commit
//! at most one mutation, and resolve or reject exactly once. The provider
//! itself is a black box behind the [`providers`] traits; the hosting
//! store supplies the dispatch context.
//!
//! ## Example
//!
//! ```
//! use poolstore_auth::mocks::MockUserPool;
//! use poolstore_auth::providers::{AuthenticateOutcome, Credentials, ProviderSession};
//! use poolstore_auth::{AuthModule, SignIn};
//!
//! # tokio_test::block_on(async {
//! let pool = MockUserPool::new();
//! pool.set_authenticate_outcome(AuthenticateOutcome::Authenticated(ProviderSession {
//!     id_token: "id".into(),
//!     access_token: "access".into(),
//!     refresh_token: "refresh".into(),
//!     expires_at: None,
//! }));
//!
//! let (actions, ctx) = AuthModule::with_pool(pool).mount();
//! let outcome = actions
//!     .authenticate_user(&ctx, Credentials::new("alice", "hunter2"))
//!     .await?;
//!
//! assert!(matches!(outcome, SignIn::Authenticated { .. }));
//! assert!(ctx.state().user.is_some());
//! # Ok::<(), poolstore_auth::AuthError>(())
//! # });
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod config;
pub mod error;
pub mod module;
pub mod mutations;
pub mod providers;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use actions::{AuthActions, AuthContext, SignIn, SignUpResult};
pub use config::PoolConfig;
pub use error::{AuthError, ProviderError, Result};
pub use module::AuthModule;
pub use mutations::SessionMutation;
pub use state::{SessionState, TokenSet, User};
