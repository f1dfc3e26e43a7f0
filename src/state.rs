use std::sync::Arc;

use parking_lot::RwLock;

use crate::auth::AuthConfig;
use crate::guard::{ReconcileReport, Reconciler};
use crate::login::LogoProbe;
use crate::settings::SettingsStore;

/// Application state shared across all handlers
pub struct AppState {
    pub auth_config: AuthConfig,
    /// Public URL of the directory holding the debug log and `.env`
    pub content_url: Option<String>,
    pub last_report: RwLock<Option<ReconcileReport>>,
    pub probe: Arc<dyn LogoProbe>,
    pub reconciler: Reconciler,
    pub store: Arc<dyn SettingsStore>,
}

impl AppState {
    pub fn new(
        auth_config: AuthConfig,
        store: Arc<dyn SettingsStore>,
        reconciler: Reconciler,
        probe: Arc<dyn LogoProbe>,
    ) -> Self {
        Self {
            auth_config,
            content_url: None,
            last_report: RwLock::new(None),
            probe,
            reconciler,
            store,
        }
    }

    #[must_use]
    pub fn with_content_url(mut self, content_url: Option<String>) -> Self {
        self.content_url = content_url.filter(|url| !url.trim().is_empty());
        self
    }

    /// Public link to a guarded file, when the content URL is known
    pub fn content_link(&self, file_name: &str) -> Option<String> {
        self.content_url
            .as_deref()
            .map(|base| format!("{}/{file_name}", base.trim_end_matches('/')))
    }
}
