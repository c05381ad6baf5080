use serde::{Deserialize, Serialize};

/// The authenticated identity issued by the provider on sign-in.
/// `uid` is opaque and provider-issued; `email` is the key used for the
/// allow-list lookup. Read-only everywhere outside the identity adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

impl Principal {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self { uid: uid.into(), email: email.into() }
    }
}
