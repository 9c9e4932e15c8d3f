use crate::models::CredentialRecord;

/// Read-only, ordered set of credential records handed to the gate at
/// construction.
#[derive(Clone, Debug, Default)]
pub struct CredentialStore {
    records: Vec<CredentialRecord>,
}

impl CredentialStore {
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self { records }
    }

    /// The first record with this username, if its password matches exactly.
    pub fn verify(&self, username: &str, password: &str) -> Option<&CredentialRecord> {
        self.records
            .iter()
            .find(|r| r.username == username)
            .filter(|r| r.matches(username, password))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
