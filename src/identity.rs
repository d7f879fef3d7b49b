use serde::{Deserialize, Serialize};

/// The user on whose behalf results are stored and egress is logged.
///
/// Passed explicitly into every persistence and logging call; nothing in the
/// crate reads a session from global state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Identity {
    user_id: String,
}

impl Identity {
    /// Build an identity, rejecting blank user ids
    pub fn new(user_id: impl Into<String>) -> Option<Self> {
        let user_id = user_id.into();
        let trimmed = user_id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                user_id: trimmed.to_string(),
            })
        }
    }

    /// Resolve the acting identity: an explicit id wins over the configured one.
    pub fn resolve(explicit: Option<&str>, configured: Option<&str>) -> Option<Self> {
        explicit
            .and_then(Identity::new)
            .or_else(|| configured.and_then(Identity::new))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_id)
    }
}
