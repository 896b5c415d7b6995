//! Session mutations.
//!
//! The only writers of [`SessionState`]. Each variant is a total,
//! synchronous handler: given a state and a payload it updates the state
//! and returns, with no other side effects and no failure path.

use crate::state::{SessionState, User};
use poolstore_core::mutation::Mutation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mutation table for the session state.
///
/// Actions commit these through the store dispatcher; nothing else
/// mutates [`SessionState`]. The `Authenticate` payload is always a
/// complete replacement [`User`] - every action emits that one canonical
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMutation {
    /// Replace the current user wholesale.
    Authenticate(User),

    /// Clear the current user. Idempotent.
    SignOut,

    /// Replace the current user's attribute map.
    ///
    /// Committing this while no user is present is a programming error in
    /// the orchestrator, not a recoverable condition: debug builds assert,
    /// release builds drop the payload with a warning.
    Attributes(HashMap<String, String>),
}

impl Mutation<SessionState> for SessionMutation {
    fn apply(self, state: &mut SessionState) {
        match self {
            Self::Authenticate(user) => {
                state.user = Some(user);
            }
            Self::SignOut => {
                state.user = None;
            }
            Self::Attributes(attributes) => {
                debug_assert!(
                    state.user.is_some(),
                    "Attributes mutation committed with no user in state"
                );
                match state.user.as_mut() {
                    Some(user) => user.attributes = attributes,
                    None => {
                        tracing::warn!("attributes mutation dropped: no user in state");
                    }
                }
            }
        }
    }
}
