/// A stored username/password/role triple.
///
/// The password is kept and compared verbatim; there is no hashing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl CredentialRecord {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    /// Exact comparison on both fields.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}
