use std::time::{Duration, Instant};

/// Server-side state for an authenticated client.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: Instant,
    pub last_accessed: Instant,
}

impl Session {
    pub fn new(id: String, username: impl Into<String>, role: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            id,
            username: username.into(),
            role: role.into(),
            created_at: now,
            last_accessed: now,
        }
    }

    /// The role as a granted authority, e.g. `ROLE_admin`.
    pub fn authority(&self) -> String {
        format!("ROLE_{}", self.role)
    }

    pub fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_accessed) >= idle_timeout
    }
}
