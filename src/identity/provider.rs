use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use super::principal::Principal;

/// External identity service collaborator.
///
/// The current principal is observable through a watch channel so the gate
/// can re-run its authorization check on every change. Sign-in and sign-out
/// are asynchronous and may fail; callers decide how failures surface.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Subscribe to principal changes. The receiver's current value is the
    /// principal at subscription time.
    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;

    /// The signed-in principal right now, if any.
    fn current(&self) -> Option<Principal>;

    /// Run the provider's interactive sign-in and publish the principal.
    async fn sign_in_interactive(&self) -> Result<Principal>;

    /// Destroy the current session and publish "no principal".
    async fn sign_out(&self) -> Result<()>;
}

/// Configuration for the local adapter. Fixed at construction; the adapter
/// itself is stateless beyond the published principal.
#[derive(Debug, Clone, Default)]
pub struct LocalIdentityConfig {
    /// Email to sign in with. When unset, one is derived from the OS
    /// account (`<username>@local`).
    pub email: Option<String>,
}

/// Local identity adapter: stands in for the hosted provider when running
/// the shell or the tests. Constructed once from configuration; sign-in
/// mints a fresh opaque uid each time, the way the external provider would.
pub struct LocalIdentityService {
    config: LocalIdentityConfig,
    current: watch::Sender<Option<Principal>>,
}

impl LocalIdentityService {
    pub fn new(config: LocalIdentityConfig) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { config, current: tx }
    }

    fn login_email(&self) -> String {
        self.config
            .email
            .clone()
            .unwrap_or_else(|| format!("{}@local", whoami::username()))
    }
}

#[async_trait]
impl IdentityService for LocalIdentityService {
    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.current.subscribe()
    }

    fn current(&self) -> Option<Principal> {
        self.current.borrow().clone()
    }

    async fn sign_in_interactive(&self) -> Result<Principal> {
        let principal = Principal::new(Uuid::new_v4().to_string(), self.login_email());
        info!(email = %principal.email, uid = %principal.uid, "identity.sign_in");
        self.current.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(p) = self.current.send_replace(None) {
            info!(email = %p.email, "identity.sign_out");
        }
        Ok(())
    }
}
