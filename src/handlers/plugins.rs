use axum::{Json, response::IntoResponse};
use serde::{Deserialize, Serialize};

use super::VERSION;

pub const SETTINGS_LINK: &str = r#"<a href="/settings">Settings</a>"#;
const LOGIN_PREVIEW_LINK: &str = r#"<a href="/login">Login preview</a>"#;

/// Entry shown in the plugin listing
#[derive(Deserialize, Serialize)]
pub struct PluginEntry {
    pub name: String,
    pub version: String,
    pub links: Vec<String>,
}

/// Put the settings link in front of the other action links
pub fn add_settings_link(mut links: Vec<String>) -> Vec<String> {
    links.insert(0, SETTINGS_LINK.to_string());
    links
}

pub async fn plugins_route() -> impl IntoResponse {
    Json(PluginEntry {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: VERSION.to_string(),
        links: add_settings_link(vec![LOGIN_PREVIEW_LINK.to_string()]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_link_comes_first() {
        let links = add_settings_link(vec!["<a>Deactivate</a>".to_string()]);
        assert_eq!(vec![SETTINGS_LINK.to_string(), "<a>Deactivate</a>".to_string()], links);
        assert_eq!(vec![SETTINGS_LINK.to_string()], add_settings_link(Vec::new()));
    }
}
