use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::models::CredentialRecord;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_USERNAME: &str = "liuqi";
pub const DEFAULT_PASSWORD: &str = "qwe123";
pub const DEFAULT_ROLE: &str = "admin";
pub const DEFAULT_LOGIN_PAGE: &str = "/login.html";
pub const DEFAULT_LOGIN_PROCESSING_URL: &str = "/doLogin";
pub const DEFAULT_LOGOUT_URL: &str = "/logout";
pub const DEFAULT_USERNAME_PARAM: &str = "name";
pub const DEFAULT_PASSWORD_PARAM: &str = "passwd";
pub const DEFAULT_EXEMPT_PREFIXES: [&str; 3] = ["/js/", "/css/", "/images/"];
pub const DEFAULT_SUCCESS_URL: &str = "/hello";
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_STATIC_DIR: &str = "static";

pub const HELLO_PATH: &str = "/hello";

pub const SESSION_COOKIE: &str = "session_id";
pub const SAVED_REQUEST_COOKIE: &str = "saved_request";
pub const CSRF_COOKIE: &str = "XSRF-TOKEN";
pub const CSRF_PARAM: &str = "_csrf";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("{field} must be an absolute path starting with '/', got '{value}'")]
    NotAbsolutePath { field: &'static str, value: String },

    #[error("exempt prefix '{0}' must start and end with '/'")]
    InvalidExemptPrefix(String),

    #[error("exempt prefix '{0}' is listed more than once")]
    DuplicateExemptPrefix(String),

    #[error("exempt prefix '{inner}' is nested inside '{outer}'")]
    NestedExemptPrefix { outer: String, inner: String },

    #[error("{0} must not be empty")]
    EmptyParameterName(&'static str),

    #[error("username and password parameters must differ (both are '{0}')")]
    DuplicateParameterName(String),

    #[error("path '{0}' is claimed by more than one route")]
    ConflictingPaths(String),

    #[error("session timeout must be greater than zero")]
    ZeroSessionTimeout,

    #[error("invalid value '{value}' for {var}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Everything the authentication gate and router are built from.
#[derive(Clone, Debug, Serialize)]
pub struct GateConfig {
    #[serde(skip)]
    pub credentials: Vec<CredentialRecord>,
    pub login_page: String,
    pub login_processing_url: String,
    pub logout_url: String,
    pub username_param: String,
    pub password_param: String,
    pub exempt_prefixes: Vec<String>,
    pub csrf_protection: bool,
    pub default_success_url: String,
    pub always_use_default_success_url: bool,
    pub session_timeout_secs: u64,
    pub static_dir: PathBuf,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            credentials: vec![CredentialRecord::new(
                DEFAULT_USERNAME,
                DEFAULT_PASSWORD,
                DEFAULT_ROLE,
            )],
            login_page: DEFAULT_LOGIN_PAGE.into(),
            login_processing_url: DEFAULT_LOGIN_PROCESSING_URL.into(),
            logout_url: DEFAULT_LOGOUT_URL.into(),
            username_param: DEFAULT_USERNAME_PARAM.into(),
            password_param: DEFAULT_PASSWORD_PARAM.into(),
            exempt_prefixes: DEFAULT_EXEMPT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            csrf_protection: false,
            default_success_url: DEFAULT_SUCCESS_URL.into(),
            always_use_default_success_url: false,
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl GateConfig {
    /// Build the configuration from environment variables, falling back to
    /// the defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            credentials: vec![get_credential_record()],
            login_page: env_or("GATE_LOGIN_PAGE", DEFAULT_LOGIN_PAGE),
            login_processing_url: env_or("GATE_LOGIN_PROCESSING_URL", DEFAULT_LOGIN_PROCESSING_URL),
            logout_url: env_or("GATE_LOGOUT_URL", DEFAULT_LOGOUT_URL),
            username_param: env_or("GATE_USERNAME_PARAM", DEFAULT_USERNAME_PARAM),
            password_param: env_or("GATE_PASSWORD_PARAM", DEFAULT_PASSWORD_PARAM),
            exempt_prefixes: get_exempt_prefixes(),
            csrf_protection: get_flag("GATE_CSRF_PROTECTION"),
            default_success_url: env_or("GATE_DEFAULT_SUCCESS_URL", DEFAULT_SUCCESS_URL),
            always_use_default_success_url: get_flag("GATE_ALWAYS_USE_DEFAULT_SUCCESS_URL"),
            session_timeout_secs: get_session_timeout_secs()?,
            static_dir: PathBuf::from(env_or("GATE_STATIC_DIR", DEFAULT_STATIC_DIR)),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.iter().any(|c| c.username.is_empty()) {
            return Err(ConfigError::EmptyUsername);
        }
        for (field, value) in [
            ("login page", &self.login_page),
            ("login processing url", &self.login_processing_url),
            ("logout url", &self.logout_url),
            ("default success url", &self.default_success_url),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::NotAbsolutePath {
                    field,
                    value: value.clone(),
                });
            }
        }
        for prefix in &self.exempt_prefixes {
            if prefix.trim_matches('/').is_empty() || !prefix.starts_with('/') || !prefix.ends_with('/') {
                return Err(ConfigError::InvalidExemptPrefix(prefix.clone()));
            }
        }
        self.check_exempt_mounts()?;
        if self.username_param.is_empty() {
            return Err(ConfigError::EmptyParameterName("username parameter"));
        }
        if self.password_param.is_empty() {
            return Err(ConfigError::EmptyParameterName("password parameter"));
        }
        if self.username_param == self.password_param {
            return Err(ConfigError::DuplicateParameterName(self.username_param.clone()));
        }
        self.check_path_conflicts()?;
        if self.session_timeout_secs == 0 {
            return Err(ConfigError::ZeroSessionTimeout);
        }
        Ok(())
    }

    /// Each exempt prefix becomes its own static mount, so no two may
    /// coincide or nest.
    fn check_exempt_mounts(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for prefix in &self.exempt_prefixes {
            if !seen.insert(prefix.as_str()) {
                return Err(ConfigError::DuplicateExemptPrefix(prefix.clone()));
            }
        }
        for outer in &self.exempt_prefixes {
            if let Some(inner) = self
                .exempt_prefixes
                .iter()
                .find(|p| *p != outer && p.starts_with(outer.as_str()))
            {
                return Err(ConfigError::NestedExemptPrefix {
                    outer: outer.clone(),
                    inner: inner.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every routed path must be distinct and lie outside the static mounts.
    fn check_path_conflicts(&self) -> Result<(), ConfigError> {
        if self.logout_url == self.login_page || self.logout_url == self.login_processing_url {
            return Err(ConfigError::ConflictingPaths(self.logout_url.clone()));
        }
        let routed = [
            HELLO_PATH,
            self.login_page.as_str(),
            self.login_processing_url.as_str(),
            self.logout_url.as_str(),
        ];
        for path in routed.iter().skip(1) {
            if *path == HELLO_PATH {
                return Err(ConfigError::ConflictingPaths(path.to_string()));
            }
        }
        for prefix in &self.exempt_prefixes {
            let mount = prefix.trim_end_matches('/');
            if let Some(path) = routed.iter().find(|p| p.starts_with(prefix.as_str()) || **p == mount) {
                return Err(ConfigError::ConflictingPaths(path.to_string()));
            }
        }
        Ok(())
    }
}

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

fn env_or(var: &str, default: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

pub fn get_credential_record() -> CredentialRecord {
    // Passwords are compared verbatim, so only the username and role are trimmed.
    let password = env::var("GATE_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
    CredentialRecord::new(
        env_or("GATE_USERNAME", DEFAULT_USERNAME),
        password,
        env_or("GATE_ROLE", DEFAULT_ROLE),
    )
}

pub fn get_exempt_prefixes() -> Vec<String> {
    let raw = env::var("GATE_EXEMPT_PREFIXES").unwrap_or_default();
    if raw.trim().is_empty() {
        return DEFAULT_EXEMPT_PREFIXES.iter().map(|p| p.to_string()).collect();
    }
    let mut prefixes = Vec::new();
    for p in raw.split(',') {
        let t = p.trim();
        if !t.is_empty() {
            prefixes.push(normalize_prefix(t));
        }
    }
    prefixes
}

/// Accept `css`, `/css` and `/css/**` as shorthand for `/css/`.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches("**").trim_matches('/');
    format!("/{}/", trimmed)
}

pub fn get_flag(var: &str) -> bool {
    matches!(
        env::var(var).unwrap_or_default().trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn get_session_timeout_secs() -> Result<u64, ConfigError> {
    match env::var("GATE_SESSION_TIMEOUT_SECS") {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "GATE_SESSION_TIMEOUT_SECS",
                    value: raw.clone(),
                })
        }
        _ => Ok(DEFAULT_SESSION_TIMEOUT_SECS),
    }
}
