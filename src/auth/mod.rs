mod config;
mod middleware;

pub use config::AuthConfig;
pub use middleware::{AuthState, auth_middleware_fn, authenticate};
