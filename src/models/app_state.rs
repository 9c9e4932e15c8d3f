use std::sync::Arc;

use crate::config::GateConfig;
use crate::services::{AuthGate, CredentialStore};

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub config: Arc<GateConfig>,
}

impl AppState {
    /// Gate backed by the credentials listed in `config`.
    pub fn new(config: GateConfig) -> Self {
        let gate = AuthGate::new(&config);
        Self {
            gate: Arc::new(gate),
            config: Arc::new(config),
        }
    }

    /// Gate backed by an explicitly supplied credential store.
    pub fn with_credentials(config: GateConfig, credentials: CredentialStore) -> Self {
        let gate = AuthGate::with_credentials(&config, credentials);
        Self {
            gate: Arc::new(gate),
            config: Arc::new(config),
        }
    }
}
