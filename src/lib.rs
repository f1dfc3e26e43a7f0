pub mod auth;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod helpers;
pub mod lifecycle;
pub mod login;
pub mod settings;
pub mod state;

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware, response::Redirect, routing::get};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, warn};

use crate::auth::{AuthConfig, auth_middleware_fn};
use crate::error::{GuardError, GuardResult};
use crate::guard::{BCRYPT_COST, ReconcileReport, Reconciler};
use crate::handlers::{
    DEFAULT_LOGO_PATH, VERSION, default_logo_route, healthz_route, login_route, plugins_route,
    show_settings_route, update_settings_route,
};
use crate::lifecycle::lifecycle_middleware_fn;
use crate::login::HttpLogoProbe;
use crate::settings::{JsonSettingsStore, SettingsStore as _};
use crate::state::AppState;

pub use handlers::{Healthz, PluginEntry};

#[derive(Parser, Debug)]
#[command(author, version=VERSION, about, long_about=None)]
pub struct Cli {
    /// Bind host & port
    #[arg(long, short = 'b', env = "BIND", default_value = "127.0.0.1:8080")]
    pub bind: Box<str>,

    /// Debug mode
    #[arg(long, short = 'd', env = "DEBUG")]
    pub debug: bool,

    /// Site root holding .htpasswd and .htaccess
    #[arg(long, env = "SITE_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Settings document
    #[arg(long, env = "SETTINGS_PATH", default_value = "./settings.json")]
    pub settings: PathBuf,

    /// Public URL of the directory holding debug.log and .env
    #[arg(long, env = "CONTENT_URL")]
    pub content_url: Option<String>,

    /// Seconds to wait for the login logo probe
    #[arg(long, env = "PROBE_TIMEOUT", default_value_t = 5)]
    pub probe_timeout: u64,

    /// Username for the settings page
    #[arg(long, env = "AUTH_USERNAME")]
    pub auth_username: Option<String>,

    /// Bcrypt hash of the settings page password, see `hash-password`
    #[arg(long, env = "AUTH_PASSWORD_HASH", hide_env_values = true)]
    pub auth_password_hash: Option<String>,

    /// Log format
    #[arg(long, env = "LOG_FORMAT", default_value = "full")]
    pub log_format: LogFormat,

    /// No color <https://no-color.org/>
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Full,
    Compact,
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash password
    #[command()]
    HashPassword {},
    /// Reconcile .htpasswd and .htaccess once and exit
    #[command()]
    Reconcile {},
}

fn reconciler(cli: &Cli) -> Reconciler {
    Reconciler::new(&cli.root).with_bcrypt_cost(BCRYPT_COST)
}

pub fn init_state(cli: &Cli) -> Arc<AppState> {
    let state = AppState::new(
        AuthConfig::from_parts(cli.auth_username.clone(), cli.auth_password_hash.clone()),
        Arc::new(JsonSettingsStore::new(&cli.settings)),
        reconciler(cli),
        Arc::new(HttpLogoProbe::new(Duration::from_secs(cli.probe_timeout))),
    )
    .with_content_url(cli.content_url.clone());
    Arc::new(state)
}

pub fn init_route(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/settings") }))
        .route(
            "/settings",
            get(show_settings_route).post(update_settings_route),
        )
        .route("/plugins", get(plugins_route))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware_fn,
        ))
        .route("/login", get(login_route))
        .route(DEFAULT_LOGO_PATH, get(default_logo_route))
        .route("/healthz", get(healthz_route))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    lifecycle_middleware_fn,
                )),
        )
        .with_state(state)
}

pub async fn run_server(addr: SocketAddr, cli: &Cli) -> anyhow::Result<()> {
    let state = init_state(cli);
    if !state.auth_config.is_enabled() {
        warn!("no authorization enabled, settings page is publicly accessible");
    }
    if lifecycle::reconcile_now(&state).await.is_none() {
        warn!("initial reconcile skipped");
    }
    let app = init_route(state);
    let version = VERSION;
    let listener = TcpListener::bind(&addr).await?;
    let local_addr: SocketAddr = listener.local_addr()?;
    info!(addr = %local_addr, %version, "server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("shutdown signal received");
}

/// Run a single pass with the stored settings
pub fn reconcile_once(cli: &Cli) -> GuardResult<ReconcileReport> {
    let config = JsonSettingsStore::new(&cli.settings).load()?;
    Ok(reconciler(cli).run(&config))
}

pub fn hash_password() -> GuardResult<()> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirmation = rpassword::prompt_password("Confirmation: ")?;
    if password != confirmation {
        return Err(GuardError::PasswordMismatched);
    }
    let hashed = bcrypt::hash(password, BCRYPT_COST)?;
    println!("{hashed}");
    Ok(())
}
