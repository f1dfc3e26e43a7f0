/// Credentials guarding the admin routes
#[derive(Clone)]
pub enum AuthConfig {
    None,
    Some {
        username: String,
        password_hash: String,
    },
}

impl AuthConfig {
    /// Both values are required, either one missing leaves the routes public
    pub fn from_parts(username: Option<String>, password_hash: Option<String>) -> Self {
        match (username, password_hash) {
            (Some(username), Some(password_hash))
                if !username.is_empty() && !password_hash.is_empty() =>
            {
                AuthConfig::Some {
                    username,
                    password_hash,
                }
            }
            _ => AuthConfig::None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, AuthConfig::Some { .. })
    }
}
