use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::authz;
use super::principal::Principal;
use crate::store::DocumentStore;

/// Session-gate state machine.
///
/// `Unknown` -> `CheckingAuthorization` -> `Authorized` | `Unauthorized`,
/// with `SignedOut` reachable from any state. The allow-list check re-runs
/// in full on every principal change; prior decisions are never cached
/// across sign-ins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Unknown,
    CheckingAuthorization,
    Authorized(Principal),
    Unauthorized,
    SignedOut,
}

/// What the shell should render for the current gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Render the protected child view.
    Protected,
    /// Render a neutral loading indicator.
    Loading,
    /// Redirect to the public entry view.
    RedirectToEntry,
}

/// Decides whether protected content is reachable.
///
/// State is published on a watch channel owned by this gate and handed down
/// explicitly to whoever renders. A generation counter guards the
/// asynchronous allow-list check: when the principal changes while a check
/// is still in flight, the superseded result is dropped instead of applied.
pub struct SessionGate {
    store: Arc<dyn DocumentStore>,
    state: watch::Sender<GateState>,
    generation: AtomicU64,
}

impl SessionGate {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (tx, _rx) = watch::channel(GateState::Unknown);
        Self { store, state: tx, generation: AtomicU64::new(0) }
    }

    pub fn state(&self) -> GateState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    /// Render decision for the current state. Protected content is reachable
    /// iff a principal is present, authorized, and no check is pending.
    pub fn view(&self) -> GateView {
        match &*self.state.borrow() {
            GateState::Authorized(_) => GateView::Protected,
            GateState::Unknown | GateState::CheckingAuthorization => GateView::Loading,
            GateState::Unauthorized | GateState::SignedOut => GateView::RedirectToEntry,
        }
    }

    /// React to a principal change from the identity service.
    ///
    /// A new principal starts a fresh authorization check under a new
    /// generation; the result is applied only if no later change has
    /// superseded it. Returns the state the gate settled in from this
    /// caller's point of view.
    pub async fn on_principal_changed(&self, principal: Option<Principal>) -> GateState {
        let Some(principal) = principal else {
            // Invalidate any in-flight check so it cannot resurrect a session.
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.transition(GateState::SignedOut);
            return GateState::SignedOut;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.transition(GateState::CheckingAuthorization);

        let allowed = authz::is_allowed(self.store.as_ref(), &principal.email).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(email = %principal.email, "authorization result superseded, dropping");
            return self.state();
        }

        let next = if allowed {
            GateState::Authorized(principal)
        } else {
            GateState::Unauthorized
        };
        self.transition(next.clone());
        next
    }

    /// Force `SignedOut` from any state: explicit sign-out or the
    /// inactivity monitor firing.
    pub fn force_signed_out(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.transition(GateState::SignedOut);
    }

    fn transition(&self, next: GateState) {
        let prev = self.state.send_replace(next.clone());
        if prev != next {
            info!(from = ?label(&prev), to = ?label(&next), "gate.transition");
        }
    }
}

fn label(state: &GateState) -> &'static str {
    match state {
        GateState::Unknown => "unknown",
        GateState::CheckingAuthorization => "checking",
        GateState::Authorized(_) => "authorized",
        GateState::Unauthorized => "unauthorized",
        GateState::SignedOut => "signed_out",
    }
}

/// Feed identity-service principal changes into the gate until the
/// identity service goes away. The current value is evaluated immediately,
/// then every change re-runs the full check.
pub fn drive(gate: Arc<SessionGate>, mut principals: watch::Receiver<Option<Principal>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let current = principals.borrow_and_update().clone();
            gate.on_principal_changed(current).await;
            if principals.changed().await.is_err() {
                break;
            }
        }
    })
}
