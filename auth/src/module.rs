//! Module factory.
//!
//! Bundles initial state and actions the way a hosting store consumes
//! them. The mutation table is [`SessionMutation`]'s
//! [`Mutation`](poolstore_core::mutation::Mutation) impl - the host needs
//! nothing else to apply commits.

use crate::actions::{AuthActions, AuthContext};
use crate::config::PoolConfig;
use crate::mutations::SessionMutation;
use crate::providers::UserPool;
use crate::state::SessionState;
use poolstore_core::store::{Context, MemoryStore};

/// One authentication module instance: initial state plus actions, bound
/// to one user pool.
///
/// # Examples
///
/// ```
/// use poolstore_auth::mocks::MockUserPool;
/// use poolstore_auth::{AuthModule, PoolConfig};
///
/// let module: AuthModule<MockUserPool> =
///     AuthModule::new(PoolConfig::new("eu-west-1_example", "client"));
/// assert!(module.state.user.is_none());
/// ```
pub struct AuthModule<P: UserPool> {
    /// Initial session state for the hosting store.
    pub state: SessionState,

    /// The action orchestrator.
    pub actions: AuthActions<P>,
}

impl<P: UserPool> AuthModule<P> {
    /// Create a module connected to the pool described by `config`.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            state: SessionState::default(),
            actions: AuthActions::new(config),
        }
    }

    /// Create a module around an existing pool handle.
    #[must_use]
    pub const fn with_pool(pool: P) -> Self {
        Self {
            state: SessionState {
                user: None,
            },
            actions: AuthActions::with_pool(pool),
        }
    }

    /// Host the module's state in a [`MemoryStore`] and hand back the
    /// pieces a caller drives directly: the actions and their context.
    ///
    /// Applications embedding the module in their own store framework
    /// build the [`AuthContext`] from that framework instead.
    #[must_use]
    pub fn mount(self) -> (AuthActions<P>, AuthContext) {
        let store: MemoryStore<SessionState> = MemoryStore::new(self.state);
        let ctx: Context<SessionState, SessionMutation> = Context::from_store(store);
        (self.actions, ctx)
    }
}
