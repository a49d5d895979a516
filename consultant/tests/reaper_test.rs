//! Integration tests for [`consultant::Reaper`] sweeps and [`consultant::Compactor`].

mod common;

use chrono::{Duration, Utc};
use common::{setup, TestEnv};
use consultant::{Credentials, SweepReport};
use llm_gateway::MessageRole;
use storage::SessionRecord;

async fn registered(env: &TestEnv, login: &str) -> SessionRecord {
    let store = env.components.service.sessions();
    let anon = store.resolve(None).await.expect("resolve");
    store
        .promote(&anon.id, &Credentials::new(login, "pw").expect("creds"))
        .await
        .expect("promote")
}

/// **Test: Idle anonymous session is evicted with its log.**
///
/// **Setup:** Anonymous session with one turn.
/// **Action:** Sweep 16 minutes later.
/// **Expected:** evicted == 1; session and turns gone; gateway not called.
#[tokio::test]
async fn test_sweep_evicts_idle_anonymous() {
    let env = setup("unused").await;
    let anon = env.components.service.sessions().resolve(None).await.expect("resolve");
    env.storage.messages.append(&anon.id, "hi", "hello").await.expect("append");

    let report = env
        .components
        .reaper
        .sweep_at(Utc::now() + Duration::minutes(16))
        .await
        .expect("sweep");

    assert_eq!(
        report,
        SweepReport {
            scanned: 1,
            evicted: 1,
            compacted: 0,
            failed: 0
        }
    );
    assert!(env.storage.sessions.find(&anon.id).await.expect("find").is_none());
    assert_eq!(env.storage.messages.count(&anon.id).await.expect("count"), 0);
    assert_eq!(env.gateway.call_count(), 0);
}

/// **Test: Active sessions are left alone.**
#[tokio::test]
async fn test_sweep_keeps_active_sessions() {
    let env = setup("unused").await;
    let anon = env.components.service.sessions().resolve(None).await.expect("resolve");
    let reg = registered(&env, "alice").await;

    let report = env
        .components
        .reaper
        .sweep_at(Utc::now() + Duration::minutes(10))
        .await
        .expect("sweep");

    assert_eq!(report.scanned, 2);
    assert_eq!(report.evicted + report.compacted + report.failed, 0);
    assert!(env.storage.sessions.find(&anon.id).await.expect("find").is_some());
    let reg = env.storage.sessions.find(&reg.id).await.expect("find").expect("exists");
    assert!(!reg.context_compacted);
}

/// **Test: Exactly the idle timeout is not yet idle.**
#[tokio::test]
async fn test_sweep_boundary_is_strict() {
    let env = setup("unused").await;
    let anon = env.components.service.sessions().resolve(None).await.expect("resolve");
    let stored = env.storage.sessions.find(&anon.id).await.expect("find").expect("exists");

    let report = env
        .components
        .reaper
        .sweep_at(stored.last_active + Duration::minutes(15))
        .await
        .expect("sweep");

    assert_eq!(report.evicted, 0);
    assert!(env.storage.sessions.find(&anon.id).await.expect("find").is_some());
}

/// **Test: Idle registered session is compacted through a system-role call; log kept.**
///
/// **Setup:** Registered session with two turns; gateway replies "  laptop gaming budget \n".
/// **Action:** Sweep 16 minutes later, then sweep again.
/// **Expected:** context == "laptop gaming budget", compacted; turns kept; the second sweep
/// makes no further gateway call.
#[tokio::test]
async fn test_sweep_compacts_idle_registered() {
    let env = setup("  laptop gaming budget \n").await;
    let reg = registered(&env, "alice").await;
    env.storage.messages.append(&reg.id, "need a laptop", "for what?").await.expect("append");
    env.storage.messages.append(&reg.id, "gaming, cheap", "try model A").await.expect("append");

    let later = Utc::now() + Duration::minutes(16);
    let report = env.components.reaper.sweep_at(later).await.expect("sweep");
    assert_eq!(report.compacted, 1);
    assert_eq!(report.failed, 0);

    let stored = env.storage.sessions.find(&reg.id).await.expect("find").expect("exists");
    assert!(stored.context_compacted);
    assert_eq!(stored.context, "laptop gaming budget");
    assert_eq!(env.storage.messages.count(&reg.id).await.expect("count"), 2);

    let calls = env.gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, MessageRole::System);
    assert!(calls[0].0.contains("EXTRACT KEYWORDS"));
    assert!(calls[0].0.contains("need a laptop:for what?\ngaming, cheap:try model A\n"));

    let report = env.components.reaper.sweep_at(later).await.expect("second sweep");
    assert_eq!(report.compacted, 0);
    assert_eq!(env.gateway.call_count(), 1);
}

/// **Test: Compaction failure leaves the session uncompacted and is retried next sweep.**
#[tokio::test]
async fn test_sweep_compaction_failure_retries() {
    let env = setup("phone battery").await;
    let reg = registered(&env, "alice").await;
    env.storage.messages.append(&reg.id, "battery life?", "two days").await.expect("append");
    env.gateway.set_failing(true);

    let later = Utc::now() + Duration::minutes(16);
    let report = env.components.reaper.sweep_at(later).await.expect("sweep");
    assert_eq!(report.failed, 1);
    assert_eq!(report.compacted, 0);
    let stored = env.storage.sessions.find(&reg.id).await.expect("find").expect("exists");
    assert!(!stored.context_compacted);
    assert_eq!(stored.context, "");

    env.gateway.set_failing(false);
    let report = env.components.reaper.sweep_at(later).await.expect("retry sweep");
    assert_eq!(report.compacted, 1);
    let stored = env.storage.sessions.find(&reg.id).await.expect("find").expect("exists");
    assert!(stored.context_compacted);
    assert_eq!(stored.context, "phone battery");
}

/// **Test: Empty history compacts to an empty context without a gateway call.**
#[tokio::test]
async fn test_sweep_compacts_empty_history() {
    let env = setup("should not be used").await;
    let reg = registered(&env, "alice").await;

    let report = env
        .components
        .reaper
        .sweep_at(Utc::now() + Duration::minutes(16))
        .await
        .expect("sweep");

    assert_eq!(report.compacted, 1);
    let stored = env.storage.sessions.find(&reg.id).await.expect("find").expect("exists");
    assert!(stored.context_compacted);
    assert_eq!(stored.context, "");
    assert_eq!(env.gateway.call_count(), 0);
}

/// **Test: New activity after compaction makes the session eligible again.**
#[tokio::test]
async fn test_touch_after_compaction_allows_recompaction() {
    let env = setup("first").await;
    let reg = registered(&env, "alice").await;
    env.storage.messages.append(&reg.id, "q1", "a1").await.expect("append");
    let store = env.components.service.sessions();

    let t1 = Utc::now() + Duration::minutes(16);
    env.components.reaper.sweep_at(t1).await.expect("sweep");

    store.touch_at(&reg.id, t1).await;
    env.storage.messages.append(&reg.id, "q2", "a2").await.expect("append");
    env.gateway.set_reply("second");

    let report = env
        .components
        .reaper
        .sweep_at(t1 + Duration::minutes(16))
        .await
        .expect("sweep");
    assert_eq!(report.compacted, 1);
    let stored = env.storage.sessions.find(&reg.id).await.expect("find").expect("exists");
    assert_eq!(stored.context, "second");
}

/// **Test: A sweep waiting on a session in use skips it once the question lands.**
///
/// **Setup:** Anonymous session last active 20 minutes ago; gateway held so a question
/// keeps the session lock.
/// **Action:** Start the question, start a sweep at the current time while the lock is held,
/// then release the gateway.
/// **Expected:** The sweep re-reads the freshly touched session and evicts nothing; the
/// session and its new turn remain.
#[tokio::test]
async fn test_sweep_skips_session_touched_while_waiting() {
    let env = setup("answer").await;
    let service = env.components.service.clone();
    let token = service.start(None).await.expect("start").session.token;
    env.storage
        .sessions
        .set_last_active(&token, Utc::now() - Duration::minutes(20))
        .await
        .expect("backdate");
    env.gateway.hold();

    let question = {
        let service = service.clone();
        let token = token.clone();
        tokio::spawn(async move { service.message(Some(&token), "still there?", None).await })
    };
    env.gateway.wait_entered().await;

    let sweep = {
        let reaper = env.components.reaper.clone();
        let now = Utc::now();
        tokio::spawn(async move { reaper.sweep_at(now).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!sweep.is_finished());

    env.gateway.release_one();
    let reply = question.await.expect("join").expect("message");
    assert_eq!(reply.session.token, token);
    let report = sweep.await.expect("join").expect("sweep");

    assert_eq!(report.scanned, 1);
    assert_eq!(report.evicted, 0);
    assert!(env.storage.sessions.find(&token).await.expect("find").is_some());
    assert_eq!(env.storage.messages.count(&token).await.expect("count"), 1);
}
