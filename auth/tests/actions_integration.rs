//! Integration tests for the auth actions against the mock provider.
//!
//! These exercise the action/mutation protocol end to end: precondition
//! gating, outcome normalization, commit discipline, and the
//! at-most-once provider invocation rule.

#![allow(clippy::unwrap_used, clippy::panic)]

use poolstore_auth::mocks::MockUserPool;
use poolstore_auth::providers::{
    AttributeEntry, AuthenticateOutcome, Credentials, ProviderSession, SignUpOutcome,
};
use poolstore_auth::{
    AuthActions, AuthContext, AuthError, ProviderError, SessionMutation, SessionState, SignIn,
    TokenSet, User,
};
use poolstore_core::mutation::Mutation;
use poolstore_core::store::{Context, StateStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Store wrapper that records every committed mutation.
#[derive(Clone, Default)]
struct RecordingStore {
    state: Arc<Mutex<SessionState>>,
    commits: Arc<Mutex<Vec<SessionMutation>>>,
}

impl RecordingStore {
    fn with_state(state: SessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            commits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn commits(&self) -> Vec<SessionMutation> {
        self.commits.lock().unwrap().clone()
    }
}

impl StateStore<SessionState, SessionMutation> for RecordingStore {
    fn snapshot(&self) -> SessionState {
        self.state.lock().unwrap().clone()
    }

    fn commit(&self, mutation: SessionMutation) {
        self.commits.lock().unwrap().push(mutation.clone());
        mutation.apply(&mut self.state.lock().unwrap());
    }
}

fn session() -> ProviderSession {
    ProviderSession {
        id_token: "id".to_string(),
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: None,
    }
}

fn tokens() -> TokenSet {
    TokenSet {
        id_token: "id".to_string(),
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: None,
    }
}

fn authenticated_state() -> SessionState {
    SessionState {
        user: Some(User {
            username: "alice".to_string(),
            tokens: Some(tokens()),
            attributes: HashMap::new(),
        }),
    }
}

/// Actions plus a recording context over `state`.
fn harness(
    pool: &MockUserPool,
    state: SessionState,
) -> (AuthActions<MockUserPool>, AuthContext, RecordingStore) {
    let store = RecordingStore::with_state(state);
    let ctx = Context::from_store(store.clone());
    (AuthActions::with_pool(pool.clone()), ctx, store)
}

// ═══════════════════════════════════════════════════════════════════════
// Precondition gating
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn gated_operations_reject_before_contacting_the_provider() {
    let no_user = SessionState::default();
    let no_tokens = SessionState {
        user: Some(User::unconfirmed("alice")),
    };

    for state in [no_user, no_tokens] {
        let pool = MockUserPool::new();
        let (actions, ctx, store) = harness(&pool, state);

        let attrs = HashMap::from([("email".to_string(), "a@b.com".to_string())]);

        assert_eq!(
            actions.change_password(&ctx, "old", "new").await,
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(
            actions.update_attributes(&ctx, &attrs).await,
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(
            actions.get_user_attributes(&ctx).await,
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(actions.sign_out(&ctx).await, Err(AuthError::Unauthenticated));

        // The provider was never touched, not even for a local restore.
        assert_eq!(pool.total_calls(), 0);
        assert!(pool.restored_sessions().is_empty());
        assert!(store.commits().is_empty());
    }
}

#[tokio::test]
async fn unauthenticated_error_carries_the_canonical_message() {
    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, SessionState::default());

    let err = actions.sign_out(&ctx).await.unwrap_err();
    assert_eq!(err.to_string(), "User is unauthenticated");
    assert_eq!(err.provider_code(), None);
}

// ═══════════════════════════════════════════════════════════════════════
// Sign-up
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn sign_up_commits_a_user_without_tokens() {
    let pool = MockUserPool::new();
    pool.set_sign_up_outcome(SignUpOutcome {
        username: "alice".to_string(),
        user_confirmed: false,
    });
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    let attrs = HashMap::from([("email".to_string(), "a@b.com".to_string())]);
    let result = actions.sign_up(&ctx, "alice", "hunter2", &attrs).await.unwrap();

    assert!(result.user_confirmation_necessary);
    assert_eq!(
        store.commits(),
        vec![SessionMutation::Authenticate(User {
            username: "alice".to_string(),
            tokens: None,
            attributes: HashMap::new(),
        })]
    );

    // The attribute map crossed the boundary in the provider's list form.
    let (username, password, entries) = pool.last_sign_up().unwrap();
    assert_eq!(username, "alice");
    assert_eq!(password, "hunter2");
    assert_eq!(entries, vec![AttributeEntry::new("email", "a@b.com")]);
}

#[tokio::test]
async fn confirmed_sign_up_needs_no_confirmation() {
    let pool = MockUserPool::new();
    pool.set_sign_up_outcome(SignUpOutcome {
        username: "alice".to_string(),
        user_confirmed: true,
    });
    let (actions, ctx, _store) = harness(&pool, SessionState::default());

    let result = actions
        .sign_up(&ctx, "alice", "hunter2", &HashMap::new())
        .await
        .unwrap();
    assert!(!result.user_confirmation_necessary);
}

#[tokio::test]
async fn sign_up_failure_commits_nothing() {
    let pool = MockUserPool::new();
    pool.fail_sign_up(ProviderError::with_code(
        "UsernameExistsException",
        "User already exists",
    ));
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    let err = actions
        .sign_up(&ctx, "alice", "hunter2", &HashMap::new())
        .await
        .unwrap_err();

    assert_eq!(err.provider_code(), Some("UsernameExistsException"));
    assert!(store.commits().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Authentication
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn authenticate_commits_the_normalized_token_set() {
    let pool = MockUserPool::new();
    pool.set_authenticate_outcome(AuthenticateOutcome::Authenticated(session()));
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    let outcome = actions
        .authenticate_user(&ctx, Credentials::new("alice", "hunter2"))
        .await
        .unwrap();

    let SignIn::Authenticated {
        user,
        user_confirmation_necessary,
    } = outcome
    else {
        panic!("expected an authenticated outcome");
    };
    assert!(!user_confirmation_necessary);
    assert_eq!(user.username, "alice");
    assert_eq!(user.tokens, Some(tokens()));

    assert_eq!(
        store.commits(),
        vec![SessionMutation::Authenticate(user)]
    );
}

#[tokio::test]
async fn authenticate_failure_is_forwarded_verbatim() {
    let pool = MockUserPool::new();
    let provider_err =
        ProviderError::with_code("NotAuthorizedException", "Wrong username or password");
    pool.fail_authenticate(provider_err.clone());
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    let err = actions
        .authenticate_user(&ctx, Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::Provider(provider_err));
    assert!(store.commits().is_empty());
    assert!(ctx.state().user.is_none());
}

// ═══════════════════════════════════════════════════════════════════════
// Current user recovery
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn get_current_user_commits_the_cached_session() {
    let pool = MockUserPool::new();
    pool.set_current_user("alice");
    pool.set_session(session());
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    let user = actions.get_current_user(&ctx).await.unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.tokens, Some(tokens()));
    assert_eq!(store.commits(), vec![SessionMutation::Authenticate(user)]);
}

#[tokio::test]
async fn get_current_user_without_cache_rejects() {
    let pool = MockUserPool::new();
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    let err = actions.get_current_user(&ctx).await.unwrap_err();

    assert_eq!(err, AuthError::NoCurrentUser);
    assert_eq!(err.to_string(), "Can't retrieve the current user");
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn get_current_user_session_failure_commits_nothing() {
    let pool = MockUserPool::new();
    pool.set_current_user("alice");
    pool.fail_session(ProviderError::new("Can't retrieve user's session"));
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    let err = actions.get_current_user(&ctx).await.unwrap_err();

    assert!(matches!(err, AuthError::Provider(_)));
    assert!(store.commits().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Registration upkeep and password recovery
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn confirm_registration_forces_alias_creation() {
    let pool = MockUserPool::new();
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    actions
        .confirm_registration(&ctx, "alice", "123456")
        .await
        .unwrap();

    assert_eq!(
        pool.last_confirmation(),
        Some(("alice".to_string(), "123456".to_string(), true))
    );
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn stateless_operations_leave_state_untouched() {
    let pool = MockUserPool::new();
    let (actions, ctx, store) = harness(&pool, SessionState::default());

    actions
        .resend_confirmation_code(&ctx, "alice")
        .await
        .unwrap();
    actions.forgot_password(&ctx, "alice").await.unwrap();
    actions
        .confirm_password(&ctx, "alice", "123456", "NewPw1!")
        .await
        .unwrap();

    assert!(store.commits().is_empty());
    assert_eq!(pool.call_count("resend_confirmation_code"), 1);
    assert_eq!(pool.call_count("forgot_password"), 1);
    assert_eq!(pool.call_count("confirm_password"), 1);
}

#[tokio::test]
async fn forgot_password_failure_is_forwarded() {
    let pool = MockUserPool::new();
    let provider_err = ProviderError::with_code("LimitExceededException", "Attempt limit exceeded");
    pool.fail_operation("forgot_password", provider_err.clone());
    let (actions, ctx, _store) = harness(&pool, SessionState::default());

    let err = actions.forgot_password(&ctx, "alice").await.unwrap_err();
    assert_eq!(err, AuthError::Provider(provider_err));
}

// ═══════════════════════════════════════════════════════════════════════
// Authenticated-only operations
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn change_password_restores_the_session_locally() {
    let pool = MockUserPool::new();
    let (actions, ctx, store) = harness(&pool, authenticated_state());

    actions.change_password(&ctx, "old", "new").await.unwrap();

    assert_eq!(
        pool.last_change_password(),
        Some(("old".to_string(), "new".to_string()))
    );
    // Session came from the stored tokens, not a provider fetch.
    assert_eq!(
        pool.restored_sessions(),
        vec![("alice".to_string(), tokens())]
    );
    assert_eq!(pool.call_count("get_session"), 0);
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn attribute_round_trip_lands_in_state() {
    let pool = MockUserPool::new();
    let (actions, ctx, store) = harness(&pool, authenticated_state());

    let attrs = HashMap::from([("email".to_string(), "a@b.com".to_string())]);
    actions.update_attributes(&ctx, &attrs).await.unwrap();

    // Update alone does not touch local state.
    assert!(store.commits().is_empty());

    let fetched = actions.get_user_attributes(&ctx).await.unwrap();
    assert_eq!(fetched.get("email").map(String::as_str), Some("a@b.com"));

    assert_eq!(store.commits(), vec![SessionMutation::Attributes(fetched)]);
    let state = ctx.state();
    assert_eq!(
        state.user.unwrap().attributes.get("email").map(String::as_str),
        Some("a@b.com")
    );
}

#[tokio::test]
async fn sign_out_signs_out_once_and_clears_the_user() {
    let pool = MockUserPool::new();
    let (actions, ctx, store) = harness(&pool, authenticated_state());

    actions.sign_out(&ctx).await.unwrap();

    assert_eq!(pool.call_count("sign_out"), 1);
    assert_eq!(store.commits(), vec![SessionMutation::SignOut]);
    assert!(ctx.state().user.is_none());
}

#[tokio::test]
async fn sign_out_commit_is_idempotent() {
    let pool = MockUserPool::new();
    let (_actions, ctx, _store) = harness(&pool, SessionState::default());

    ctx.commit(SessionMutation::SignOut);
    ctx.commit(SessionMutation::SignOut);

    assert!(ctx.state().user.is_none());
}

// ═══════════════════════════════════════════════════════════════════════
// At-most-once provider invocation
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn every_operation_invokes_its_provider_method_at_most_once() {
    // (operation, primary provider method) pairs, each on a fresh pool.
    let pool = MockUserPool::new();
    pool.set_current_user("alice");
    pool.set_session(session());
    let (actions, ctx, _store) = harness(&pool, SessionState::default());
    actions.get_current_user(&ctx).await.unwrap();
    assert_eq!(pool.call_count("get_session"), 1);

    let pool = MockUserPool::new();
    pool.set_authenticate_outcome(AuthenticateOutcome::Authenticated(session()));
    let (actions, ctx, _store) = harness(&pool, SessionState::default());
    actions
        .authenticate_user(&ctx, Credentials::new("alice", "pw"))
        .await
        .unwrap();
    assert_eq!(pool.call_count("authenticate"), 1);

    let pool = MockUserPool::new();
    pool.set_sign_up_outcome(SignUpOutcome {
        username: "alice".to_string(),
        user_confirmed: true,
    });
    let (actions, ctx, _store) = harness(&pool, SessionState::default());
    actions
        .sign_up(&ctx, "alice", "pw", &HashMap::new())
        .await
        .unwrap();
    assert_eq!(pool.call_count("sign_up"), 1);

    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, SessionState::default());
    actions
        .confirm_registration(&ctx, "alice", "123456")
        .await
        .unwrap();
    assert_eq!(pool.call_count("confirm_registration"), 1);

    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, SessionState::default());
    actions
        .resend_confirmation_code(&ctx, "alice")
        .await
        .unwrap();
    assert_eq!(pool.call_count("resend_confirmation_code"), 1);

    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, SessionState::default());
    actions.forgot_password(&ctx, "alice").await.unwrap();
    assert_eq!(pool.call_count("forgot_password"), 1);

    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, SessionState::default());
    actions
        .confirm_password(&ctx, "alice", "123456", "NewPw1!")
        .await
        .unwrap();
    assert_eq!(pool.call_count("confirm_password"), 1);

    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, authenticated_state());
    actions.change_password(&ctx, "old", "new").await.unwrap();
    assert_eq!(pool.call_count("change_password"), 1);

    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, authenticated_state());
    actions
        .update_attributes(&ctx, &HashMap::new())
        .await
        .unwrap();
    assert_eq!(pool.call_count("update_attributes"), 1);

    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, authenticated_state());
    actions.get_user_attributes(&ctx).await.unwrap();
    assert_eq!(pool.call_count("get_user_attributes"), 1);

    let pool = MockUserPool::new();
    let (actions, ctx, _store) = harness(&pool, authenticated_state());
    actions.sign_out(&ctx).await.unwrap();
    assert_eq!(pool.call_count("sign_out"), 1);
}
