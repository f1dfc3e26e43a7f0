use std::sync::Arc;

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::info;

use super::{DEFAULT_LOGO_PATH, VERSION, load_settings, render};
use crate::error::{AppError, AppResult};
use crate::guard::Resource;
use crate::settings::{Configuration, Notice};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "settings.html")]
struct SettingsTemplate<'a> {
    config: &'a Configuration,
    preview_logo: &'a str,
    notices: Vec<Notice>,
    updated: bool,
    log_link: Option<String>,
    env_link: Option<String>,
    version: &'static str,
}

#[derive(Deserialize)]
pub struct SettingsQuery {
    #[serde(default)]
    updated: bool,
}

/// Submitted form. Unchecked boxes are simply absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub username: String,
    pub password: String,
    pub protection_enabled: Option<String>,
    pub log_protection_enabled: Option<String>,
    pub env_protection_enabled: Option<String>,
    pub logo_url: String,
    pub custom_login_logo_enabled: Option<String>,
}

impl From<SettingsForm> for Configuration {
    fn from(form: SettingsForm) -> Self {
        Configuration {
            username: form.username,
            password: form.password,
            protection_enabled: form.protection_enabled.is_some(),
            log_protection_enabled: form.log_protection_enabled.is_some(),
            env_protection_enabled: form.env_protection_enabled.is_some(),
            logo_url: form.logo_url.trim().to_string(),
            custom_login_logo_enabled: form.custom_login_logo_enabled.is_some(),
        }
    }
}

pub async fn show_settings_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SettingsQuery>,
) -> AppResult<impl IntoResponse> {
    let config = load_settings(&state).await?;
    let template = SettingsTemplate {
        config: &config,
        preview_logo: if config.logo_url.is_empty() {
            DEFAULT_LOGO_PATH
        } else {
            config.logo_url.as_str()
        },
        notices: config.notices(),
        updated: query.updated,
        log_link: state.content_link(Resource::DebugLog.file_name()),
        env_link: state.content_link(Resource::EnvFile.file_name()),
        version: VERSION,
    };
    Ok(render(&template, "settings"))
}

pub async fn update_settings_route(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SettingsForm>,
) -> AppResult<Redirect> {
    let config = Configuration::from(form);
    let task_state = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || {
        task_state.store.save(&config)?;
        Ok::<_, crate::error::GuardError>(task_state.reconciler.run(&config))
    })
    .await
    .map_err(|err| AppError::InternalError(err.to_string()))??;
    info!(credential = %report.credential, "settings saved");
    *state.last_report.write() = Some(report);
    Ok(Redirect::to("/settings?updated=true"))
}
