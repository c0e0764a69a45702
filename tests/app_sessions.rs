//! Integration tests for the application container.
//!
//! These tests exercise sessions end to end:
//! - in-memory store round trips (no file I/O)
//! - optimistic child-count checks
//! - one lock per session under concurrent use

mod common;

use std::{
    sync::{Arc, Barrier, mpsc},
    thread,
    time::Duration,
};

use movetree::{
    Error, SessionId, StorageRef, decode, encode,
    adapters::InMemoryStore,
    app::{App, SessionConfig},
    ports::TreeStore,
    tree::IdStrategy,
};

use common::{EchoEngine, START, branching_tree};

fn in_memory_app(store: &InMemoryStore) -> App {
    App::builder().with_store(store.clone()).build()
}

/// Store that announces each `put` and then holds it until released.
struct GatedStore {
    inner: InMemoryStore,
    entered: mpsc::Sender<()>,
    release: Arc<Barrier>,
}

impl TreeStore for GatedStore {
    fn put(&self, session: &SessionId, blob: &str) -> movetree::Result<StorageRef> {
        let _ = self.entered.send(());
        self.release.wait();
        self.inner.put(session, blob)
    }

    fn get(&self, reference: &StorageRef) -> movetree::Result<String> {
        self.inner.get(reference)
    }
}

#[test]
fn test_end_and_restore_session() {
    let store = InMemoryStore::new();
    let app = in_memory_app(&store);

    let session = app.start_session(START).unwrap();
    for code in ["e2e4", "e7e5", "g1f3"] {
        app.play_at_cursor(&session, &code.parse().unwrap()).unwrap();
    }
    let before = app.snapshot(&session).unwrap();

    let reference = app.end_session(&session).unwrap();
    assert_eq!(store.count(), 1);
    assert!(matches!(app.current(&session), Err(Error::UnknownSession { .. })));

    let restored = app.restore_session(&reference).unwrap();
    assert_eq!(app.snapshot(&restored).unwrap(), before);
    assert_eq!(app.current(&restored).unwrap().ply, 0);
}

#[test]
fn test_restore_rejects_invalid_tree() {
    let store = InMemoryStore::new();
    let app = in_memory_app(&store);

    let broken = r#"{"nodes": {
        "r": {"id": "r", "parentId": null, "children": ["a"], "fen": "p0", "ply": 0},
        "a": {"id": "a", "parentId": "r", "children": [], "fen": "p1", "ply": 5}
    }, "rootId": "r"}"#;
    let reference = store
        .put(&movetree::SessionId::new("external"), broken)
        .unwrap();

    let err = app.restore_session(&reference).unwrap_err();
    assert!(matches!(err, Error::InvalidTree { reason } if reason.contains("ply")));
    assert!(app.active_sessions().is_empty());
}

#[test]
fn test_restore_unknown_reference() {
    let app = App::new();
    let err = app
        .restore_session(&StorageRef::new("nowhere/1"))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_strict_ply_config_applies_on_restore() {
    let store = InMemoryStore::new();
    let app = App::builder()
        .with_store(store.clone())
        .with_config(SessionConfig::new().with_ply_policy(movetree::PlyPolicy::Strict))
        .build();

    let payload = r#"{"nodes": {"r": {"id": "r", "parentId": null, "children": [], "fen": "p0"}}, "rootId": "r"}"#;
    let reference = store
        .put(&movetree::SessionId::new("external"), payload)
        .unwrap();
    assert!(matches!(
        app.restore_session(&reference),
        Err(Error::FormatError { .. })
    ));
}

#[test]
fn test_stale_view_conflicts() {
    let app = App::new();
    let session = app.start_session(START).unwrap();
    let root = app.current(&session).unwrap();

    app.play(&session, &root.id, root.children.len(), &"e2e4".parse().unwrap())
        .unwrap();
    let err = app
        .play(&session, &root.id, root.children.len(), &"d2d4".parse().unwrap())
        .unwrap_err();

    assert!(matches!(err, Error::Conflict { expected: 0, found: 1, .. }));
    assert_eq!(app.snapshot(&session).unwrap().len(), 2);
}

#[test]
fn test_concurrent_plays_on_one_session_never_interleave() {
    let app = App::builder()
        .with_engine(EchoEngine)
        .with_config(SessionConfig::new().with_id_strategy(IdStrategy::Random))
        .build();
    let session = app.start_session(START).unwrap();
    let root = app.current(&session).unwrap().id;

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = ["a2a3", "b2b3", "c2c3", "d2d3"]
            .into_iter()
            .map(|code| {
                let app = &app;
                let session = &session;
                let root = &root;
                scope.spawn(move || app.play(session, root, 0, &code.parse().unwrap()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(Error::Conflict { .. })))
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(conflicts, 3);

    let tree = app.snapshot(&session).unwrap();
    assert_eq!(tree.len(), 2);
    assert!(movetree::validate(&tree).is_valid());
}

#[test]
fn test_distinct_sessions_progress_in_parallel() {
    let app = App::builder().with_engine(EchoEngine).build();
    let sessions: Vec<_> = (0..4).map(|_| app.start_session(START).unwrap()).collect();

    thread::scope(|scope| {
        for session in &sessions {
            let app = &app;
            scope.spawn(move || {
                for code in ["e2e4", "e7e5", "g1f3", "b8c6"] {
                    app.play_at_cursor(session, &code.parse().unwrap()).unwrap();
                }
            });
        }
    });

    for session in &sessions {
        assert_eq!(app.snapshot(session).unwrap().len(), 5);
    }
    assert_eq!(app.active_sessions().len(), 4);
}

#[test]
fn test_open_session_accepts_valid_tree() {
    let app = App::new();
    let tree = branching_tree(20, 5, 9);
    let session = app.open_session(tree.clone()).unwrap();

    let reference = app.end_session(&session).unwrap();
    let blob = app.store().get(&reference).unwrap();
    assert_eq!(blob, encode(&tree).unwrap());
}

#[test]
fn test_move_racing_end_session_is_rejected_not_lost() {
    let inner = InMemoryStore::new();
    let release = Arc::new(Barrier::new(2));
    let (entered, put_started) = mpsc::channel();
    let app = App::builder()
        .with_engine(EchoEngine)
        .with_store(GatedStore {
            inner: inner.clone(),
            entered,
            release: Arc::clone(&release),
        })
        .build();
    let session = app.start_session(START).unwrap();

    let (ended, raced) = thread::scope(|scope| {
        let ending = scope.spawn(|| app.end_session(&session));
        put_started.recv().unwrap();

        // the store is mid-put; a move arriving now must not slip in
        let racing = scope.spawn(|| app.play_at_cursor(&session, &"e2e4".parse().unwrap()));
        thread::sleep(Duration::from_millis(50));
        release.wait();

        (ending.join().unwrap(), racing.join().unwrap())
    });

    let reference = ended.unwrap();
    assert!(matches!(raced, Err(Error::UnknownSession { .. })));
    let stored = decode(&inner.get(&reference).unwrap()).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(app.active_sessions().is_empty());
}
