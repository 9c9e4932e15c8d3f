pub mod app_state;
pub mod credential_record;
pub mod session;

pub use app_state::AppState;
pub use credential_record::CredentialRecord;
pub use session::Session;
