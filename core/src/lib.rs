//! # Poolstore Core
//!
//! The contract between a poolstore module and the reactive store that
//! hosts it.
//!
//! A module bundles three things: a piece of state, a table of mutation
//! handlers, and a set of asynchronous actions. The hosting store owns the
//! state; actions never touch it directly. Instead, every action receives a
//! [`store::Context`] through which it can read a snapshot of the current
//! state and commit mutations, and the store applies each committed
//! mutation synchronously through [`mutation::Mutation::apply`].
//!
//! ## Core Concepts
//!
//! - **State**: owned data held by the hosting store
//! - **Mutation**: a total, synchronous state transition
//! - **StateStore**: the dispatcher the host supplies (snapshot + commit)
//! - **Context**: the cheap-clone handle actions are called with
//!
//! ## Example
//!
//! ```
//! use poolstore_core::mutation::Mutation;
//! use poolstore_core::store::{Context, MemoryStore};
//!
//! #[derive(Clone, Default)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! enum CounterMutation {
//!     Add(i64),
//! }
//!
//! impl Mutation<Counter> for CounterMutation {
//!     fn apply(self, state: &mut Counter) {
//!         match self {
//!             Self::Add(n) => state.count += n,
//!         }
//!     }
//! }
//!
//! let ctx: Context<Counter, CounterMutation> =
//!     Context::from_store(MemoryStore::new(Counter::default()));
//! ctx.commit(CounterMutation::Add(2));
//! assert_eq!(ctx.state().count, 2);
//! ```

/// Mutation module - the state transition protocol.
///
/// Mutations are the only way state changes. A mutation handler is a total,
/// synchronous function over `(state, payload)`: it never fails, never
/// performs I/O, and touches nothing but the state it is given.
pub mod mutation {
    /// A state transition that can be committed to a store.
    ///
    /// Implementations are typically enums with one variant per handler,
    /// matched exhaustively in [`apply`](Mutation::apply).
    ///
    /// # Laws
    ///
    /// - `apply` is total: every variant updates the state and returns
    /// - `apply` is synchronous and side-effect-free except for the state
    ///   fields it writes
    pub trait Mutation<State> {
        /// Apply this mutation to the state, in place.
        fn apply(self, state: &mut State);
    }
}

/// Store module - the dispatcher contract and a reference in-memory host.
///
/// The hosting framework supplies the [`StateStore`](store::StateStore)
/// implementation; modules only ever see it through a
/// [`Context`](store::Context). [`MemoryStore`](store::MemoryStore) is the
/// reference host used by tests and by applications without a store
/// framework of their own.
pub mod store {
    use crate::mutation::Mutation;
    use std::sync::{Arc, Mutex, PoisonError};

    /// The dispatcher a hosting store supplies to module actions.
    ///
    /// `snapshot` returns the state as of the call; `commit` applies one
    /// mutation synchronously. There are no other ways to observe or
    /// change module state.
    pub trait StateStore<State, M>: Send + Sync {
        /// Clone out the current state.
        fn snapshot(&self) -> State;

        /// Apply one mutation to the state.
        ///
        /// Commits are serialized by the store; a commit that has returned
        /// is visible to every later `snapshot`.
        fn commit(&self, mutation: M);
    }

    /// Handle through which actions read state and commit mutations.
    ///
    /// Cloning a `Context` is cheap and every clone addresses the same
    /// underlying store.
    pub struct Context<State, M> {
        store: Arc<dyn StateStore<State, M>>,
    }

    impl<State, M> Clone for Context<State, M> {
        fn clone(&self) -> Self {
            Self {
                store: Arc::clone(&self.store),
            }
        }
    }

    impl<State, M> Context<State, M> {
        /// Wrap an already-shared store.
        #[must_use]
        pub fn new(store: Arc<dyn StateStore<State, M>>) -> Self {
            Self { store }
        }

        /// Wrap an owned store.
        pub fn from_store<S>(store: S) -> Self
        where
            S: StateStore<State, M> + 'static,
        {
            Self {
                store: Arc::new(store),
            }
        }

        /// Snapshot of the current state.
        #[must_use]
        pub fn state(&self) -> State {
            self.store.snapshot()
        }

        /// Commit one mutation.
        pub fn commit(&self, mutation: M) {
            self.store.commit(mutation);
        }
    }

    /// In-memory reference store.
    ///
    /// Mutex-guarded shared state; commits lock, apply, unlock. A poisoned
    /// lock is recovered rather than propagated - mutations are total, so
    /// the state is never left half-written.
    pub struct MemoryStore<State> {
        state: Arc<Mutex<State>>,
    }

    impl<State> MemoryStore<State> {
        /// Create a store holding `initial` state.
        #[must_use]
        pub fn new(initial: State) -> Self {
            Self {
                state: Arc::new(Mutex::new(initial)),
            }
        }
    }

    impl<State> Clone for MemoryStore<State> {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
            }
        }
    }

    impl<State, M> StateStore<State, M> for MemoryStore<State>
    where
        State: Clone + Send,
        M: Mutation<State> + Send,
    {
        fn snapshot(&self) -> State {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn commit(&self, mutation: M) {
            tracing::trace!("applying mutation");
            let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            mutation.apply(&mut guard);
        }
    }
}

/// Clock module - the one ambient dependency every module needs.
///
/// Abstracting time keeps time-dependent derivations pure and
/// deterministic under test.
pub mod clock {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability.
    pub trait Clock: Send + Sync {
        /// Get the current time.
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Fixed clock for deterministic tests.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        /// The instant this clock always reports.
        pub time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a clock pinned to `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }
}
