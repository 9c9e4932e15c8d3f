pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod templates;
pub mod utils;

pub use config::{ConfigError, GateConfig};
pub use error::AppError;
pub use models::{AppState, CredentialRecord, Session};
pub use routes::build_router;
pub use services::{AuthGate, Authorization, CredentialInput, CredentialStore, LoginOutcome};
