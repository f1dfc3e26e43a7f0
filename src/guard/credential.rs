use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, error, info, warn};

use crate::error::GuardResult;
use crate::helpers::{read_optional, remove_if_exists, write_private};
use crate::settings::Configuration;

pub const BCRYPT_COST: u32 = 11u32;

/// What a reconcile pass did to the credential file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialOutcome {
    /// Stored line already matches the configured credentials
    Unchanged,
    Written,
    Removed,
    /// Protection disabled and nothing to remove
    Absent,
    MissingCredentials,
    InvalidUsername,
    Failed,
}

impl fmt::Display for CredentialOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CredentialOutcome::Unchanged => "unchanged",
            CredentialOutcome::Written => "written",
            CredentialOutcome::Removed => "removed",
            CredentialOutcome::Absent => "absent",
            CredentialOutcome::MissingCredentials => "missing credentials",
            CredentialOutcome::InvalidUsername => "invalid username",
            CredentialOutcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Single-user `username:bcrypt_hash` file read by the web server
#[derive(Clone, Debug)]
pub struct CredentialFile {
    path: PathBuf,
    cost: u32,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cost: BCRYPT_COST,
        }
    }

    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bring the file in line with the configuration. Failures are logged
    /// and reported through the outcome, never returned.
    pub fn reconcile(&self, config: &Configuration) -> CredentialOutcome {
        let _span = debug_span!("credential file", path = ?self.path).entered();
        if !config.protection_enabled {
            return self.remove();
        }
        if config.username.is_empty() || config.password.is_empty() {
            warn!("username or password not set, credential file not written");
            return CredentialOutcome::MissingCredentials;
        }
        if config.username.contains([':', '\n', '\r']) {
            warn!(username = %config.username, "username cannot contain ':' or line breaks");
            return CredentialOutcome::InvalidUsername;
        }
        match self.write_if_changed(&config.username, &config.password) {
            Ok(true) => {
                info!(username = %config.username, "credential file updated");
                CredentialOutcome::Written
            }
            Ok(false) => CredentialOutcome::Unchanged,
            Err(err) => {
                error!(%err, "failed to write credential file");
                CredentialOutcome::Failed
            }
        }
    }

    /// Check a username and password against the stored line
    pub fn verify(&self, username: &str, password: &str) -> GuardResult<bool> {
        Ok(read_optional(&self.path)?
            .is_some_and(|content| stored_line_matches(&content, username, password)))
    }

    fn remove(&self) -> CredentialOutcome {
        match remove_if_exists(&self.path) {
            Ok(true) => {
                info!("credential file removed");
                CredentialOutcome::Removed
            }
            Ok(false) => CredentialOutcome::Absent,
            Err(err) => {
                error!(%err, "failed to remove credential file");
                CredentialOutcome::Failed
            }
        }
    }

    fn write_if_changed(&self, username: &str, password: &str) -> GuardResult<bool> {
        match read_optional(&self.path)? {
            Some(content) if stored_line_matches(&content, username, password) => {
                return Ok(false);
            }
            Some(_) => debug!("stored credentials differ, rewriting"),
            None => debug!("credential file missing, creating"),
        }
        // Apache's apr_password_validate expects the $2y$ prefix
        let hash = bcrypt::hash_with_result(password, self.cost)?
            .format_for_version(bcrypt::Version::TwoY);
        write_private(&self.path, &format!("{username}:{hash}\n"))?;
        Ok(true)
    }
}

// The username never contains ':', so the first one separates it from the hash.
fn stored_line_matches(content: &str, username: &str, password: &str) -> bool {
    let line = content.trim_end_matches(['\r', '\n']);
    let Some((stored_username, stored_hash)) = line.split_once(':') else {
        return false;
    };
    if stored_username != username {
        return false;
    }
    match bcrypt::verify(password, stored_hash) {
        Ok(matched) => matched,
        Err(err) => {
            debug!(%err, "stored hash is not readable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::{TempDir, tempdir};

    use super::*;

    fn setup() -> (TempDir, CredentialFile) {
        let dir = tempdir().unwrap();
        let file = CredentialFile::new(dir.path().join(".htpasswd")).with_cost(4);
        (dir, file)
    }

    fn enabled(username: &str, password: &str) -> Configuration {
        Configuration {
            username: username.to_string(),
            password: password.to_string(),
            protection_enabled: true,
            ..Configuration::default()
        }
    }

    #[test]
    fn stored_hash_verifies_only_the_password() {
        let (_dir, file) = setup();
        assert_eq!(
            CredentialOutcome::Written,
            file.reconcile(&enabled("admin", "secret"))
        );

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("admin:$2y$04$"), "{content}");
        assert_eq!(1, content.lines().count());
        assert!(file.verify("admin", "secret").unwrap());
        for other in ["", "Secret", "secret ", "secre", "secret2"] {
            assert!(!file.verify("admin", other).unwrap(), "{other:?} verified");
        }
        assert!(!file.verify("root", "secret").unwrap());
    }

    #[test]
    fn second_pass_does_not_write() {
        let (_dir, file) = setup();
        let config = enabled("admin", "secret");
        file.reconcile(&config);
        let first = fs::read_to_string(file.path()).unwrap();

        assert_eq!(CredentialOutcome::Unchanged, file.reconcile(&config));
        assert_eq!(first, fs::read_to_string(file.path()).unwrap());
    }

    #[test]
    fn changed_password_rewrites() {
        let (_dir, file) = setup();
        file.reconcile(&enabled("admin", "secret"));
        assert_eq!(
            CredentialOutcome::Written,
            file.reconcile(&enabled("admin", "other"))
        );
        assert!(file.verify("admin", "other").unwrap());
        assert!(!file.verify("admin", "secret").unwrap());
    }

    #[test]
    fn changed_username_rewrites() {
        let (_dir, file) = setup();
        file.reconcile(&enabled("admin", "secret"));
        assert_eq!(
            CredentialOutcome::Written,
            file.reconcile(&enabled("editor", "secret"))
        );
        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("editor:"));
    }

    #[test]
    fn unreadable_file_is_replaced() {
        let (_dir, file) = setup();
        fs::write(file.path(), "admin:not-a-hash\nextra:line\n").unwrap();
        assert_eq!(
            CredentialOutcome::Written,
            file.reconcile(&enabled("admin", "secret"))
        );
        assert!(file.verify("admin", "secret").unwrap());
    }

    #[test]
    fn disabled_protection_removes_file() {
        let (_dir, file) = setup();
        file.reconcile(&enabled("admin", "secret"));
        let disabled = Configuration {
            protection_enabled: false,
            ..enabled("admin", "secret")
        };
        assert_eq!(CredentialOutcome::Removed, file.reconcile(&disabled));
        assert!(!file.path().exists());
        assert_eq!(CredentialOutcome::Absent, file.reconcile(&disabled));
        assert!(!file.path().exists());
    }

    #[test]
    fn missing_credentials_write_nothing() {
        let (_dir, file) = setup();
        assert_eq!(
            CredentialOutcome::MissingCredentials,
            file.reconcile(&enabled("", "secret"))
        );
        assert_eq!(
            CredentialOutcome::MissingCredentials,
            file.reconcile(&enabled("admin", ""))
        );
        assert!(!file.path().exists());
    }

    #[test]
    fn username_with_colon_is_rejected() {
        let (_dir, file) = setup();
        assert_eq!(
            CredentialOutcome::InvalidUsername,
            file.reconcile(&enabled("ad:min", "secret"))
        );
        assert!(!file.path().exists());
    }

    #[test]
    fn unwritable_location_fails_quietly() {
        let (dir, _) = setup();
        let file = CredentialFile::new(dir.path().join("missing").join(".htpasswd")).with_cost(4);
        assert_eq!(
            CredentialOutcome::Failed,
            file.reconcile(&enabled("admin", "secret"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt as _;

        let (_dir, file) = setup();
        file.reconcile(&enabled("admin", "secret"));
        let mode = fs::metadata(file.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(0o600, mode);
    }
}
