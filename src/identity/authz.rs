use tracing::{error, warn};

use crate::store::{paths, DocumentStore};

/// Allow-list membership check for a principal's email.
///
/// A single point lookup against `allowedUsers/{email}`; existence alone
/// grants access, no attributes are consulted. Fail-closed is a hard
/// requirement: an empty email, a missing entry, and a store failure all
/// answer `false`. Errors are logged and never treated as authorization.
pub async fn is_allowed(store: &dyn DocumentStore, email: &str) -> bool {
    if email.is_empty() {
        warn!("authorization check invoked with empty email");
        return false;
    }
    match store.get(paths::allowed_users(), email).await {
        Ok(entry) => entry.is_some(),
        Err(e) => {
            error!(email = %email, "allow-list lookup failed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentData, DocumentStore as _, MemoryStore};

    #[tokio::test]
    async fn present_entry_allows_absent_denies() {
        let store = MemoryStore::new();
        store
            .set(paths::allowed_users(), "in@example.com", DocumentData::new())
            .await
            .unwrap();
        assert!(is_allowed(&store, "in@example.com").await);
        assert!(!is_allowed(&store, "out@example.com").await);
    }

    #[tokio::test]
    async fn empty_email_is_denied_without_lookup() {
        let store = MemoryStore::new();
        assert!(!is_allowed(&store, "").await);
    }
}
