//! Session-gate integration tests: end-to-end transitions, fail-closed
//! authorization, and the stale in-flight check guard.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use lifeboard::app::sign_in_through_gate;
use lifeboard::identity::{drive, GateState, GateView, IdentityService, LocalIdentityConfig, LocalIdentityService, Principal, SessionGate};
use lifeboard::store::{paths, Document, DocumentData, DocumentStore, MemoryStore, Query, StoreError};

/// Store wrapper that parks every point lookup until the test releases it.
struct HoldStore {
    inner: MemoryStore,
    permits: Arc<Semaphore>,
}

impl HoldStore {
    fn new(inner: MemoryStore) -> (Arc<Self>, Arc<Semaphore>) {
        let permits = Arc::new(Semaphore::new(0));
        (Arc::new(Self { inner, permits: permits.clone() }), permits)
    }
}

#[async_trait]
impl DocumentStore for HoldStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let _permit = self.permits.acquire().await.expect("permit");
        self.inner.get(collection, key).await
    }

    async fn set(&self, collection: &str, key: &str, fields: DocumentData) -> Result<(), StoreError> {
        self.inner.set(collection, key, fields).await
    }

    async fn add(&self, collection: &str, fields: DocumentData) -> Result<Document, StoreError> {
        self.inner.add(collection, fields).await
    }

    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError> {
        self.inner.query(collection, query).await
    }
}

/// Store whose reads always fail, for the fail-closed property.
struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn get(&self, _collection: &str, _key: &str) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Unavailable("injected outage".into()))
    }

    async fn set(&self, _collection: &str, _key: &str, _fields: DocumentData) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("injected outage".into()))
    }

    async fn add(&self, _collection: &str, _fields: DocumentData) -> Result<Document, StoreError> {
        Err(StoreError::Unavailable("injected outage".into()))
    }

    async fn query(&self, _collection: &str, _query: Query) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Unavailable("injected outage".into()))
    }
}

async fn allow(store: &MemoryStore, email: &str) {
    store.set(paths::allowed_users(), email, DocumentData::new()).await.unwrap();
}

#[tokio::test]
async fn allowed_sign_in_walks_unknown_checking_authorized() {
    let inner = MemoryStore::new();
    allow(&inner, "in@example.com").await;
    let (store, permits) = HoldStore::new(inner);
    let gate = Arc::new(SessionGate::new(store));
    let mut states = gate.subscribe();

    assert_eq!(gate.state(), GateState::Unknown);
    assert_eq!(gate.view(), GateView::Loading);

    let task = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.on_principal_changed(Some(Principal::new("u1", "in@example.com"))).await })
    };

    // The check parks in the store, so the intermediate state is observable.
    states.wait_for(|s| *s == GateState::CheckingAuthorization).await.unwrap();
    assert_eq!(gate.view(), GateView::Loading);

    permits.add_permits(1);
    states.wait_for(|s| matches!(s, GateState::Authorized(_))).await.unwrap();
    assert_eq!(gate.view(), GateView::Protected);
    assert!(matches!(task.await.unwrap(), GateState::Authorized(p) if p.email == "in@example.com"));
}

#[tokio::test]
async fn absent_email_never_reaches_authorized() {
    let store = Arc::new(MemoryStore::new());
    let gate = Arc::new(SessionGate::new(store));

    let settled = gate.on_principal_changed(Some(Principal::new("u1", "missing@example.com"))).await;
    assert_eq!(settled, GateState::Unauthorized);
    assert_eq!(gate.view(), GateView::RedirectToEntry);

    // Repeat sign-ins do not wear the check down into an allow.
    for _ in 0..3 {
        let settled = gate.on_principal_changed(Some(Principal::new("u1", "missing@example.com"))).await;
        assert_eq!(settled, GateState::Unauthorized);
    }
}

#[tokio::test]
async fn store_outage_is_fail_closed() {
    let gate = SessionGate::new(Arc::new(BrokenStore));
    let settled = gate.on_principal_changed(Some(Principal::new("u1", "in@example.com"))).await;
    assert_eq!(settled, GateState::Unauthorized);
    assert_eq!(gate.view(), GateView::RedirectToEntry);
}

#[tokio::test]
async fn stale_check_result_is_dropped_after_sign_out() {
    let inner = MemoryStore::new();
    allow(&inner, "in@example.com").await;
    let (store, permits) = HoldStore::new(inner);
    let gate = Arc::new(SessionGate::new(store));
    let mut states = gate.subscribe();

    // First check parks inside the store lookup.
    let stale = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.on_principal_changed(Some(Principal::new("u1", "in@example.com"))).await })
    };
    states.wait_for(|s| *s == GateState::CheckingAuthorization).await.unwrap();

    // The principal disappears while the check is in flight.
    assert_eq!(gate.on_principal_changed(None).await, GateState::SignedOut);

    // Releasing the old lookup must not resurrect the session.
    permits.add_permits(1);
    stale.await.unwrap();
    assert_eq!(gate.state(), GateState::SignedOut);
    assert_eq!(gate.view(), GateView::RedirectToEntry);
}

#[tokio::test]
async fn superseding_principal_wins_over_inflight_check() {
    let inner = MemoryStore::new();
    allow(&inner, "first@example.com").await;
    let (store, permits) = HoldStore::new(inner);
    let gate = Arc::new(SessionGate::new(store));
    let mut states = gate.subscribe();

    let first = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.on_principal_changed(Some(Principal::new("u1", "first@example.com"))).await })
    };
    states.wait_for(|s| *s == GateState::CheckingAuthorization).await.unwrap();

    // A second principal arrives before the first check resolves.
    let second = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.on_principal_changed(Some(Principal::new("u2", "second@example.com"))).await })
    };

    // Release both lookups; only the second check may settle the gate.
    permits.add_permits(2);
    first.await.unwrap();
    let settled = second.await.unwrap();
    assert_eq!(settled, GateState::Unauthorized);
    assert_eq!(gate.state(), GateState::Unauthorized);
}

#[tokio::test]
async fn login_flow_with_allowed_email_lands_on_protected() {
    let store = Arc::new(MemoryStore::new());
    allow(&store, "in@example.com").await;
    let identity = LocalIdentityService::new(LocalIdentityConfig { email: Some("in@example.com".into()) });
    let gate = SessionGate::new(store);

    let settled = sign_in_through_gate(&identity, &gate).await;
    assert!(matches!(settled, GateState::Authorized(ref p) if p.email == "in@example.com"));
    assert_eq!(gate.view(), GateView::Protected);
    assert!(identity.current().is_some());
}

#[tokio::test]
async fn login_flow_with_absent_email_redirects_and_signs_out() {
    let store = Arc::new(MemoryStore::new());
    let identity = LocalIdentityService::new(LocalIdentityConfig { email: Some("out@example.com".into()) });
    let gate = SessionGate::new(store);

    let settled = sign_in_through_gate(&identity, &gate).await;
    assert_eq!(settled, GateState::Unauthorized);
    assert_eq!(gate.view(), GateView::RedirectToEntry);
    // The rejected session does not linger: sign-out went through the adapter.
    assert!(identity.current().is_none());
}

#[tokio::test]
async fn drive_recomputes_on_every_identity_change() {
    let store = Arc::new(MemoryStore::new());
    allow(&store, "me@example.com").await;

    let identity = LocalIdentityService::new(LocalIdentityConfig { email: Some("me@example.com".into()) });
    let gate = Arc::new(SessionGate::new(store));
    let driver = drive(gate.clone(), identity.subscribe());
    let mut states = gate.subscribe();

    // No principal yet: the driver settles the gate on SignedOut.
    states.wait_for(|s| *s == GateState::SignedOut).await.unwrap();

    identity.sign_in_interactive().await.unwrap();
    states.wait_for(|s| matches!(s, GateState::Authorized(_))).await.unwrap();
    assert_eq!(gate.view(), GateView::Protected);

    identity.sign_out().await.unwrap();
    states.wait_for(|s| *s == GateState::SignedOut).await.unwrap();
    assert_eq!(gate.view(), GateView::RedirectToEntry);

    driver.abort();
}
