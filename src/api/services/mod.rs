pub mod admin;
pub mod health;
pub mod redirect;

pub use health::{AppStartTime, HealthService, health_routes};
pub use redirect::{RedirectService, redirect_routes};

/// Settings the handlers need at request time
#[derive(Clone, Debug)]
pub struct LinkSettings {
    /// Prefix for rendered short URLs, without trailing slash
    pub base_url: String,
}

impl LinkSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
