mod health;
mod login;
mod plugins;
mod settings;

use std::sync::Arc;

use askama::Template;
use axum::response::Html;
use http::StatusCode;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::settings::Configuration;
use crate::state::AppState;

pub use health::{Healthz, healthz_route};
pub use login::{DEFAULT_LOGO_PATH, default_logo_route, login_route};
pub use plugins::{PluginEntry, SETTINGS_LINK, add_settings_link, plugins_route};
pub use settings::{SettingsForm, show_settings_route, update_settings_route};

pub const VERSION: &str = env!("APP_VERSION");

fn render<T: Template>(template: &T, name: &str) -> (StatusCode, Html<String>) {
    match template.render() {
        Ok(html) => (StatusCode::OK, Html(html)),
        Err(err) => {
            error!(%err, name, "failed to render template");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(String::new()))
        }
    }
}

async fn load_settings(state: &Arc<AppState>) -> AppResult<Configuration> {
    let task_state = Arc::clone(state);
    tokio::task::spawn_blocking(move || task_state.store.load())
        .await
        .map_err(|err| AppError::InternalError(err.to_string()))?
        .map_err(AppError::from)
}
