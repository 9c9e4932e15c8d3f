use std::collections::HashMap;
use std::time::Duration;

use crate::config::GateConfig;
use crate::models::Session;

use super::credential_store::CredentialStore;
use super::session_store::SessionStore;

/// Result of checking a request's session.
#[derive(Clone, Debug)]
pub enum Authorization {
    Authenticated(Session),
    Unauthenticated,
}

impl Authorization {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Authorization::Authenticated(_))
    }
}

/// Result of a login attempt. Unknown user and wrong password are not
/// distinguished.
#[derive(Clone, Debug)]
pub enum LoginOutcome {
    Success(Session),
    Failure,
}

/// Username and password as submitted on the login form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialInput {
    pub username: String,
    pub password: String,
}

impl CredentialInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Pull the credentials out of decoded form fields using the configured
    /// parameter names. Missing fields become empty strings.
    pub fn from_form(
        fields: &HashMap<String, Vec<String>>,
        username_param: &str,
        password_param: &str,
    ) -> Self {
        let first = |key: &str| {
            fields
                .get(key)
                .and_then(|v| v.first())
                .cloned()
                .unwrap_or_default()
        };
        Self {
            username: first(username_param),
            password: first(password_param),
        }
    }
}

/// Interceptor state: which paths skip authentication, which credentials are
/// accepted, and which sessions are live.
pub struct AuthGate {
    credentials: CredentialStore,
    sessions: SessionStore,
    exempt_prefixes: Vec<String>,
    permitted_paths: Vec<String>,
}

impl AuthGate {
    pub fn new(config: &GateConfig) -> Self {
        Self::with_credentials(config, CredentialStore::new(config.credentials.clone()))
    }

    pub fn with_credentials(config: &GateConfig, credentials: CredentialStore) -> Self {
        Self {
            credentials,
            sessions: SessionStore::new(Duration::from_secs(config.session_timeout_secs)),
            exempt_prefixes: config.exempt_prefixes.clone(),
            permitted_paths: vec![
                config.login_page.clone(),
                config.login_processing_url.clone(),
                config.logout_url.clone(),
            ],
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Static-asset paths bypass the gate entirely. `/css/` also covers the
    /// bare `/css`, like the ant pattern `/css/**`.
    pub fn is_exempt(&self, path: &str) -> bool {
        if !is_canonical_path(path) {
            return false;
        }
        self.exempt_prefixes.iter().any(|prefix| {
            path.starts_with(prefix.as_str()) || path == prefix.trim_end_matches('/')
        })
    }

    /// Login page, login processing URL and logout URL need no session.
    pub fn is_permitted(&self, path: &str) -> bool {
        self.permitted_paths.iter().any(|p| p == path)
    }

    pub fn authorize(&self, session_id: Option<&str>) -> Authorization {
        match session_id.and_then(|id| self.sessions.get(id)) {
            Some(session) => Authorization::Authenticated(session),
            None => Authorization::Unauthenticated,
        }
    }

    pub fn login(&self, input: &CredentialInput) -> LoginOutcome {
        match self.credentials.verify(&input.username, &input.password) {
            Some(record) => {
                let session = self.sessions.create(&record.username, &record.role);
                tracing::info!(username = %record.username, role = %record.role, "login succeeded");
                LoginOutcome::Success(session)
            }
            None => {
                tracing::warn!(username = %input.username, "login failed");
                LoginOutcome::Failure
            }
        }
    }

    pub fn logout(&self, session_id: &str) -> Option<Session> {
        let removed = self.sessions.remove(session_id);
        if let Some(session) = &removed {
            tracing::info!(username = %session.username, "logged out");
        }
        removed
    }
}

/// Rejects dot segments, empty segments and encoded separators so a path
/// cannot claim an exempt prefix and then climb out of it.
fn is_canonical_path(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }
    let lower = path.to_ascii_lowercase();
    if lower.contains("%2e") || lower.contains("%2f") || lower.contains("%5c") || path.contains('\\') {
        return false;
    }
    let mut segments = path[1..].split('/').peekable();
    while let Some(seg) = segments.next() {
        if seg == "." || seg == ".." {
            return false;
        }
        // a trailing slash leaves one empty final segment, which is fine
        if seg.is_empty() && segments.peek().is_some() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CredentialRecord;

    fn gate() -> AuthGate {
        AuthGate::new(&GateConfig::default())
    }

    #[test]
    fn static_prefixes_are_exempt() {
        let gate = gate();
        assert!(gate.is_exempt("/js/app.js"));
        assert!(gate.is_exempt("/css/login.css"));
        assert!(gate.is_exempt("/images/logo/small.png"));
        assert!(gate.is_exempt("/css/"));
        assert!(gate.is_exempt("/css"));
    }

    #[test]
    fn other_paths_are_not_exempt() {
        let gate = gate();
        assert!(!gate.is_exempt("/hello"));
        assert!(!gate.is_exempt("/"));
        assert!(!gate.is_exempt("/cssx/a.css"));
        assert!(!gate.is_exempt("/static/css/a.css"));
        assert!(!gate.is_exempt("/login.html"));
    }

    #[test]
    fn traversal_paths_are_not_exempt() {
        let gate = gate();
        assert!(!gate.is_exempt("/css/../hello"));
        assert!(!gate.is_exempt("/css/./a.css"));
        assert!(!gate.is_exempt("/css//a.css"));
        assert!(!gate.is_exempt("/css/%2e%2e/hello"));
        assert!(!gate.is_exempt("/css/..%2Fhello"));
        assert!(!gate.is_exempt("/css/..\\hello"));
    }

    #[test]
    fn login_endpoints_are_permitted() {
        let gate = gate();
        assert!(gate.is_permitted("/login.html"));
        assert!(gate.is_permitted("/doLogin"));
        assert!(gate.is_permitted("/logout"));
        assert!(!gate.is_permitted("/hello"));
    }

    #[test]
    fn login_with_stored_credentials_yields_admin_session() {
        let gate = gate();
        match gate.login(&CredentialInput::new("liuqi", "qwe123")) {
            LoginOutcome::Success(session) => {
                assert_eq!(session.username, "liuqi");
                assert_eq!(session.role, "admin");
                assert!(gate.authorize(Some(&session.id)).is_authenticated());
            }
            LoginOutcome::Failure => panic!("expected success"),
        }
    }

    #[test]
    fn wrong_password_and_unknown_user_fail() {
        let gate = gate();
        assert!(matches!(
            gate.login(&CredentialInput::new("liuqi", "wrong")),
            LoginOutcome::Failure
        ));
        assert!(matches!(
            gate.login(&CredentialInput::new("someoneelse", "qwe123")),
            LoginOutcome::Failure
        ));
        assert!(gate.sessions().is_empty());
    }

    #[test]
    fn each_login_gets_a_new_session() {
        let gate = gate();
        let input = CredentialInput::new("liuqi", "qwe123");
        let (LoginOutcome::Success(a), LoginOutcome::Success(b)) = (gate.login(&input), gate.login(&input)) else {
            panic!("expected two successes");
        };
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn authorize_without_session_is_unauthenticated() {
        let gate = gate();
        assert!(!gate.authorize(None).is_authenticated());
        assert!(!gate.authorize(Some("not-a-session")).is_authenticated());
    }

    #[test]
    fn logout_ends_the_session() {
        let gate = gate();
        let LoginOutcome::Success(session) = gate.login(&CredentialInput::new("liuqi", "qwe123")) else {
            panic!("expected success");
        };
        assert!(gate.logout(&session.id).is_some());
        assert!(!gate.authorize(Some(&session.id)).is_authenticated());
        assert!(gate.logout(&session.id).is_none());
    }

    #[test]
    fn alternate_credential_sets_can_be_injected() {
        let store = CredentialStore::new(vec![CredentialRecord::new("ops", "s3cret", "operator")]);
        let gate = AuthGate::with_credentials(&GateConfig::default(), store);
        assert!(matches!(
            gate.login(&CredentialInput::new("liuqi", "qwe123")),
            LoginOutcome::Failure
        ));
        let LoginOutcome::Success(session) = gate.login(&CredentialInput::new("ops", "s3cret")) else {
            panic!("expected success");
        };
        assert_eq!(session.authority(), "ROLE_operator");
    }

    #[test]
    fn credential_input_uses_configured_field_names() {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), vec!["liuqi".to_string()]);
        fields.insert("passwd".to_string(), vec!["qwe123".to_string()]);
        fields.insert("username".to_string(), vec!["ignored".to_string()]);
        let input = CredentialInput::from_form(&fields, "name", "passwd");
        assert_eq!(input, CredentialInput::new("liuqi", "qwe123"));

        let missing = CredentialInput::from_form(&fields, "user", "pass");
        assert_eq!(missing, CredentialInput::default());
    }
}
