/// Centralized collection-path conventions for the document store.
/// Keeps path construction consistent across the gate, the dinner log,
/// and the dashboard.
#[inline]
pub fn allowed_users() -> &'static str {
    "allowedUsers"
}

#[inline]
pub fn dinners(uid: &str) -> String {
    format!("users/{uid}/dinners")
}
