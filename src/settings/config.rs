use std::fmt;

use serde::{Deserialize, Serialize};

/// Values edited on the settings page. Missing keys read as empty or off.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Configuration {
    pub username: String,
    pub password: String,
    pub protection_enabled: bool,
    pub log_protection_enabled: bool,
    pub env_protection_enabled: bool,
    pub logo_url: String,
    pub custom_login_logo_enabled: bool,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("protection_enabled", &self.protection_enabled)
            .field("log_protection_enabled", &self.log_protection_enabled)
            .field("env_protection_enabled", &self.env_protection_enabled)
            .field("logo_url", &self.logo_url)
            .field("custom_login_logo_enabled", &self.custom_login_logo_enabled)
            .finish()
    }
}

impl Configuration {
    /// Whether the debug log block belongs in the access document
    pub fn guards_log(&self) -> bool {
        self.protection_enabled && self.log_protection_enabled
    }

    /// Whether the env file block belongs in the access document
    pub fn guards_env(&self) -> bool {
        self.protection_enabled && self.env_protection_enabled
    }

    /// Warnings for toggle combinations that cannot take effect
    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if self.protection_enabled {
            return notices;
        }
        if self.log_protection_enabled {
            notices.push(Notice::LogWithoutProtection);
        }
        if self.env_protection_enabled {
            notices.push(Notice::EnvWithoutProtection);
        }
        notices
    }
}

/// Settings page warning, computed on render and never stored
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    LogWithoutProtection,
    EnvWithoutProtection,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guarded = match self {
            Notice::LogWithoutProtection => "log",
            Notice::EnvWithoutProtection => ".env",
        };
        write!(
            f,
            ".htpasswd protection is disabled but {guarded} protection is enabled. \
             Enable .htpasswd protection to apply it."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_protection_requires_master_toggle() {
        let config = Configuration {
            log_protection_enabled: true,
            env_protection_enabled: true,
            ..Configuration::default()
        };
        assert!(!config.guards_log());
        assert!(!config.guards_env());
        assert_eq!(
            vec![Notice::LogWithoutProtection, Notice::EnvWithoutProtection],
            config.notices()
        );
    }

    #[test]
    fn no_notice_when_protection_enabled() {
        let config = Configuration {
            protection_enabled: true,
            log_protection_enabled: true,
            ..Configuration::default()
        };
        assert!(config.guards_log());
        assert!(!config.guards_env());
        assert!(config.notices().is_empty());
    }

    #[test]
    fn missing_keys_read_as_defaults() {
        let config: Configuration = serde_json::from_str(r#"{"username":"admin"}"#).unwrap();
        assert_eq!("admin", config.username);
        assert!(config.password.is_empty());
        assert!(!config.protection_enabled);
    }

    #[test]
    fn debug_hides_password() {
        let config = Configuration {
            password: "hunter2".to_string(),
            ..Configuration::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
