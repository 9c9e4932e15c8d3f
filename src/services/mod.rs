pub mod auth_gate;
pub mod credential_store;
pub mod session_store;

pub use auth_gate::{AuthGate, Authorization, CredentialInput, LoginOutcome};
pub use credential_store::CredentialStore;
pub use session_store::{random_token, SessionStore};
