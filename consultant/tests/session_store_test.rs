//! Integration tests for [`consultant::SessionStore`]: resolve, promote, authenticate, discard.

mod common;

use common::setup;
use consultant::{ConsultantError, Credentials};

/// **Test: Absent, blank and unknown tokens each get a fresh anonymous session.**
///
/// **Setup:** Empty database.
/// **Action:** `resolve(None)`, `resolve(Some("  "))`, `resolve(Some("no-such-id"))`.
/// **Expected:** Three distinct anonymous sessions with empty context and an empty log.
#[tokio::test]
async fn test_resolve_creates_anonymous_session() {
    let env = setup("ok").await;
    let store = env.components.service.sessions();

    let a = store.resolve(None).await.expect("resolve none");
    let b = store.resolve(Some("  ")).await.expect("resolve blank");
    let c = store.resolve(Some("no-such-id")).await.expect("resolve unknown");

    for s in [&a, &b, &c] {
        assert!(!s.is_registered);
        assert_eq!(s.context, "");
        assert!(!s.context_compacted);
        assert_eq!(env.storage.messages.count(&s.id).await.expect("count"), 0);
    }
    assert_ne!(a.id, b.id);
    assert_ne!(b.id, c.id);
    assert_ne!(c.id, "no-such-id");
}

/// **Test: A known token resolves to the same session.**
#[tokio::test]
async fn test_resolve_known_token() {
    let env = setup("ok").await;
    let store = env.components.service.sessions();

    let first = store.resolve(None).await.expect("resolve");
    let again = store.resolve(Some(&first.id)).await.expect("resolve known");
    assert_eq!(again.id, first.id);
    assert_eq!(env.storage.sessions.list_all().await.expect("list").len(), 1);
}

/// **Test: Promotion moves history to a new registered session.**
///
/// **Setup:** Anonymous S1 with turn ("hi", "hello").
/// **Action:** `promote(S1, alice/pw1)`.
/// **Expected:** New registered S2 != S1 holding [("hi","hello")]; S1 and its log gone;
/// alice's session_id == S2.
#[tokio::test]
async fn test_promote_copies_history() {
    let env = setup("ok").await;
    let store = env.components.service.sessions();
    let anon = store.resolve(None).await.expect("resolve");
    env.storage
        .messages
        .append(&anon.id, "hi", "hello")
        .await
        .expect("append");

    let creds = Credentials::parse_key("alice_pw1").expect("creds");
    let registered = store.promote(&anon.id, &creds).await.expect("promote");

    assert!(registered.is_registered);
    assert_ne!(registered.id, anon.id);
    let turns = env.storage.messages.read_all(&registered.id).await.expect("read");
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].question, "hi");
    assert_eq!(turns[0].answer, "hello");

    assert!(env.storage.sessions.find(&anon.id).await.expect("find").is_none());
    assert_eq!(env.storage.messages.count(&anon.id).await.expect("count"), 0);

    let user = env
        .storage
        .users
        .find_by_login("alice")
        .await
        .expect("find user")
        .expect("user exists");
    assert_eq!(user.session_id.as_deref(), Some(registered.id.as_str()));
    assert_ne!(user.password_hash, "pw1");
}

/// **Test: Registering a taken login fails and leaves the anonymous session intact.**
#[tokio::test]
async fn test_promote_duplicate_login() {
    let env = setup("ok").await;
    let store = env.components.service.sessions();
    let creds = Credentials::new("alice", "pw1").expect("creds");

    let first = store.resolve(None).await.expect("resolve");
    store.promote(&first.id, &creds).await.expect("first promote");

    let second = store.resolve(None).await.expect("resolve");
    env.storage
        .messages
        .append(&second.id, "q", "a")
        .await
        .expect("append");
    let err = store
        .promote(&second.id, &Credentials::new("alice", "other").expect("creds"))
        .await
        .expect_err("duplicate login must fail");
    assert!(matches!(err, ConsultantError::AlreadyRegistered(_)));

    assert!(env.storage.sessions.find(&second.id).await.expect("find").is_some());
    assert_eq!(env.storage.messages.count(&second.id).await.expect("count"), 1);
}

/// **Test: Login returns the user's existing session and refreshes it.**
#[tokio::test]
async fn test_authenticate_returns_existing_session() {
    let env = setup("ok").await;
    let store = env.components.service.sessions();
    let creds = Credentials::new("alice", "pw1").expect("creds");
    let anon = store.resolve(None).await.expect("resolve");
    let registered = store.promote(&anon.id, &creds).await.expect("promote");
    env.storage
        .sessions
        .save_context(&registered.id, "laptop budget")
        .await
        .expect("save");

    let session = store.authenticate(&creds).await.expect("authenticate");
    assert_eq!(session.id, registered.id);
    assert!(!session.context_compacted);
    assert!(session.last_active >= registered.last_active);
}

/// **Test: Unknown login and wrong password are both UserNotFound.**
#[tokio::test]
async fn test_authenticate_rejects_bad_credentials() {
    let env = setup("ok").await;
    let store = env.components.service.sessions();
    let anon = store.resolve(None).await.expect("resolve");
    store
        .promote(&anon.id, &Credentials::new("alice", "pw1").expect("creds"))
        .await
        .expect("promote");

    let err = store
        .authenticate(&Credentials::new("bob", "pw1").expect("creds"))
        .await
        .expect_err("unknown login");
    assert!(matches!(err, ConsultantError::UserNotFound(_)));

    let err = store
        .authenticate(&Credentials::new("alice", "wrong").expect("creds"))
        .await
        .expect_err("wrong password");
    assert!(matches!(err, ConsultantError::UserNotFound(_)));
}

/// **Test: A dangling session reference gets a fresh registered session.**
///
/// **Setup:** alice registered, then her session deleted directly.
/// **Action:** `authenticate(alice/pw1)`.
/// **Expected:** New registered session; alice now points at it.
#[tokio::test]
async fn test_authenticate_dangling_session() {
    let env = setup("ok").await;
    let store = env.components.service.sessions();
    let creds = Credentials::new("alice", "pw1").expect("creds");
    let anon = store.resolve(None).await.expect("resolve");
    let registered = store.promote(&anon.id, &creds).await.expect("promote");
    store.discard(&registered.id).await.expect("discard");

    let session = store.authenticate(&creds).await.expect("authenticate");
    assert!(session.is_registered);
    assert_ne!(session.id, registered.id);

    let user = env
        .storage
        .users
        .find_by_login("alice")
        .await
        .expect("find")
        .expect("exists");
    assert_eq!(user.session_id.as_deref(), Some(session.id.as_str()));
}

/// **Test: get on a missing session is SessionNotFound.**
#[tokio::test]
async fn test_get_missing_session() {
    let env = setup("ok").await;
    let err = env
        .components
        .service
        .sessions()
        .get("missing")
        .await
        .expect_err("missing");
    assert!(matches!(err, ConsultantError::SessionNotFound(_)));
}
