use std::sync::Arc;

use askama::Template;
use axum::{extract::State, response::IntoResponse};
use http::header;
use tracing::error;

use super::{VERSION, load_settings, render};
use crate::login::{login_logo, logo_style};
use crate::settings::Configuration;
use crate::state::AppState;

/// Logo previewed on the settings page while no URL is configured
pub const DEFAULT_LOGO_PATH: &str = "/logo.svg";

const DEFAULT_LOGO: &str = include_str!("../../assets/logo.svg");

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    logo_style: Option<String>,
    version: &'static str,
}

pub async fn login_route(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // the default logo stays on any failure
    let config = load_settings(&state).await.unwrap_or_else(|err| {
        error!(?err, "failed to load settings for login page");
        Configuration::default()
    });
    let logo_style = login_logo(&config, state.probe.as_ref())
        .await
        .map(|url| logo_style(&url));
    let template = LoginTemplate {
        logo_style,
        version: VERSION,
    };
    render(&template, "login")
}

pub async fn default_logo_route() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], DEFAULT_LOGO)
}
