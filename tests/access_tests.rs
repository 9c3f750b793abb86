use async_trait::async_trait;
use std::sync::Arc;
use surprise_card::{
    FileStore, MemoryStore,
    auth::{ACCEPTED_CODE, ACCESS_KEY, AccessGate, can_navigate_to, validate},
    errors::{StoreError, ValidationError},
    models::{AccessState, PageId},
    storage::{KeyValueStore, StoreState},
};

// --- Test Utilities ---

/// Store that reads fine but refuses every write (full disk, read-only profile).
struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }
    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".to_string()))
    }
    async fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only".to_string()))
    }
}

async fn gate_over(store: &MemoryStore) -> AccessGate {
    AccessGate::load(Arc::new(store.clone()) as StoreState)
        .await
        .expect("memory store never fails to load")
}

// --- Navigation policy ---

#[test]
fn test_open_pages_always_allowed() {
    for state in [AccessState::locked(), AccessState::unlocked(ACCEPTED_CODE)] {
        assert!(can_navigate_to(PageId::Home, &state));
        assert!(can_navigate_to(PageId::Gate, &state));
    }
}

#[test]
fn test_gated_pages_follow_acceptance() {
    let locked = AccessState::locked();
    let unlocked = AccessState::unlocked(ACCEPTED_CODE);

    for page in PageId::ALL.into_iter().filter(|p| !p.is_open()) {
        assert!(!can_navigate_to(page, &locked), "{page} must be denied while locked");
        assert!(can_navigate_to(page, &unlocked), "{page} must be allowed once unlocked");
    }
}

#[test]
fn test_access_state_invariant() {
    let locked = AccessState::locked();
    assert!(!locked.accepted());
    assert_eq!(locked.code(), None);

    let unlocked = AccessState::unlocked("2912");
    assert!(unlocked.accepted());
    assert_eq!(unlocked.code(), Some("2912"));
}

// --- Code validation ---

#[test]
fn test_validate_accepts_only_the_birthday() {
    let code = validate("2912").expect("the accepted code must validate");
    assert_eq!(code.as_str(), "2912");
}

#[test]
fn test_validate_rejections() {
    assert_eq!(validate("2913"), Err(ValidationError::Mismatch));
    assert_eq!(validate("0000"), Err(ValidationError::Mismatch));
    assert_eq!(validate("291"), Err(ValidationError::Format));
    assert_eq!(validate("29a2"), Err(ValidationError::Format));
    assert_eq!(validate(""), Err(ValidationError::Format));
    assert_eq!(validate("29122"), Err(ValidationError::Format));
    assert_eq!(validate(" 2912"), Err(ValidationError::Format));
    // Non-ASCII digits are not decimal digits for the gate.
    assert_eq!(validate("٢٩١٢"), Err(ValidationError::Format));
}

// --- AccessGate ---

#[tokio::test]
async fn test_fresh_store_is_locked() {
    let store = MemoryStore::new();
    let gate = gate_over(&store).await;

    assert!(!gate.is_accepted());
    assert!(!gate.can_navigate_to(PageId::Unlocked1));
    assert!(gate.can_navigate_to(PageId::Gate));
}

#[tokio::test]
async fn test_accept_persists_and_unlocks() {
    let store = MemoryStore::new();
    let gate = gate_over(&store).await;

    gate.accept(validate(ACCEPTED_CODE).unwrap()).await.unwrap();

    assert!(gate.is_accepted());
    assert!(gate.can_navigate_to(PageId::Final));
    assert_eq!(store.peek(ACCESS_KEY).as_deref(), Some(ACCEPTED_CODE));
}

#[tokio::test]
async fn test_accept_is_idempotent() {
    let store = MemoryStore::new();
    let gate = gate_over(&store).await;

    gate.accept(validate("2912").unwrap()).await.unwrap();
    let first = gate.snapshot();
    gate.accept(validate("2912").unwrap()).await.unwrap();

    assert_eq!(gate.snapshot(), first);
    assert_eq!(gate.snapshot(), AccessState::unlocked("2912"));
    assert_eq!(store.peek(ACCESS_KEY).as_deref(), Some("2912"));
}

#[tokio::test]
async fn test_restart_restores_acceptance() {
    let store = MemoryStore::new();
    gate_over(&store)
        .await
        .accept(validate("2912").unwrap())
        .await
        .unwrap();

    // A second gate over the same store is what a reload sees.
    let reloaded = gate_over(&store).await;
    assert!(reloaded.is_accepted());
    assert_eq!(reloaded.snapshot().code(), Some("2912"));
}

#[tokio::test]
async fn test_reset_clears_flag() {
    let store = MemoryStore::new();
    let gate = gate_over(&store).await;
    gate.accept(validate("2912").unwrap()).await.unwrap();

    gate.reset().await.unwrap();

    assert!(!gate.is_accepted());
    assert!(!gate.can_navigate_to(PageId::Unlocked2));
    assert_eq!(store.peek(ACCESS_KEY), None);
    assert!(!gate_over(&store).await.is_accepted());
}

#[tokio::test]
async fn test_tampered_flag_is_ignored() {
    let store = MemoryStore::new();
    store.set(ACCESS_KEY, "1234").await.unwrap();

    let gate = gate_over(&store).await;
    assert!(!gate.is_accepted());
}

#[tokio::test]
async fn test_load_fails_when_store_unavailable() {
    let store = Arc::new(MemoryStore::new_failing()) as StoreState;
    let result = AccessGate::load(store).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

#[tokio::test]
async fn test_accept_unlocks_session_even_if_save_fails() {
    let gate = AccessGate::load(Arc::new(ReadOnlyStore) as StoreState)
        .await
        .unwrap();

    let result = gate.accept(validate("2912").unwrap()).await;

    assert!(result.is_err());
    assert!(gate.is_accepted());
}

#[tokio::test]
async fn test_reset_locks_session_even_if_remove_fails() {
    let gate = AccessGate::load(Arc::new(ReadOnlyStore) as StoreState)
        .await
        .unwrap();
    let _ = gate.accept(validate("2912").unwrap()).await;

    assert!(gate.reset().await.is_err());
    assert!(!gate.is_accepted());
}

// --- Concurrent mutations ---

/// Reloads the gate from `path` and checks it agrees with `gate` and the raw store.
async fn assert_persisted_matches(gate: &AccessGate, path: &std::path::Path) {
    let store = FileStore::new(path);
    let persisted = store.get(ACCESS_KEY).await.unwrap();
    assert_eq!(persisted.is_some(), gate.is_accepted(), "memory and persisted flag disagree");

    let reloaded = AccessGate::load(Arc::new(store) as StoreState).await.unwrap();
    assert_eq!(reloaded.snapshot(), gate.snapshot());
}

#[tokio::test]
async fn test_accept_racing_reset_leaves_store_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let gate = AccessGate::load(Arc::new(FileStore::new(&path)) as StoreState)
        .await
        .unwrap();

    let (accepted, reset) = tokio::join!(gate.accept(validate("2912").unwrap()), gate.reset());
    accepted.unwrap();
    reset.unwrap();

    // The reset was issued last, so it wins in memory and on disk.
    assert!(!gate.is_accepted());
    assert_persisted_matches(&gate, &path).await;
}

#[tokio::test]
async fn test_reset_racing_accept_leaves_store_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let gate = AccessGate::load(Arc::new(FileStore::new(&path)) as StoreState)
        .await
        .unwrap();
    gate.accept(validate("2912").unwrap()).await.unwrap();

    let (reset, accepted) = tokio::join!(gate.reset(), gate.accept(validate("2912").unwrap()));
    reset.unwrap();
    accepted.unwrap();

    assert!(gate.is_accepted());
    assert_persisted_matches(&gate, &path).await;
}
