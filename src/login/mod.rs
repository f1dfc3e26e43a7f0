mod probe;

use http::Uri;
use tracing::debug;

use crate::settings::Configuration;

pub use probe::{HttpLogoProbe, LogoProbe};

/// Absolute http(s) URL that is safe to place inside a CSS `url("...")`
pub fn parse_logo_url(raw: &str) -> Option<Uri> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains(['"', '\\', '<', '>']) {
        return None;
    }
    let uri: Uri = raw.parse().ok()?;
    match uri.scheme_str() {
        Some("http" | "https") => {}
        _ => return None,
    }
    uri.host()?;
    Some(uri)
}

/// Logo to show on the login page, if enabled, well-formed and reachable
pub async fn login_logo(config: &Configuration, probe: &dyn LogoProbe) -> Option<Uri> {
    if !config.custom_login_logo_enabled {
        return None;
    }
    let Some(url) = parse_logo_url(&config.logo_url) else {
        if !config.logo_url.trim().is_empty() {
            debug!(logo_url = %config.logo_url, "ignoring malformed logo URL");
        }
        return None;
    };
    if probe.is_reachable(&url).await {
        Some(url)
    } else {
        debug!(%url, "logo not reachable, keeping default");
        None
    }
}

/// Style rule replacing the default login logo
pub fn logo_style(url: &Uri) -> String {
    format!(
        "body.login div#login h1 a {{\n    background-image: url(\"{url}\");\n    background-size: contain;\n    width: 100%;\n    height: 84px;\n}}\n"
    )
}
