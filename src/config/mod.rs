use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme + host (+ optional port) the dispatcher resolves relative
    /// endpoints against, e.g. `https://api.example.com`.
    pub origin: String,
    /// Fixed path prefix prepended to resource endpoints that do not
    /// already carry it.
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long a toast stays visible before auto-dismissing.
    pub toast_window_ms: u64,
    /// Delay between a 401 and the scheduled redirect to the login view,
    /// long enough for the session-expired notification to be seen.
    pub redirect_delay_ms: u64,
    /// Path prefix identifying the admin section; 401 redirects only
    /// fire when the current path is under it.
    pub admin_prefix: String,
    /// Login view the 401 redirect targets.
    pub login_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("CURATOR_API_ORIGIN") {
            // Reject garbage early; a bad origin would otherwise surface as
            // a confusing network error on the first dispatch.
            match url::Url::parse(&v) {
                Ok(_) => self.api.origin = v.trim_end_matches('/').to_string(),
                Err(e) => tracing::warn!(origin = %v, error = %e, "Ignoring invalid CURATOR_API_ORIGIN"),
            }
        }
        if let Ok(v) = env::var("CURATOR_API_PREFIX") {
            self.api.prefix = v;
        }
        if let Ok(v) = env::var("CURATOR_TOAST_WINDOW_MS") {
            self.ui.toast_window_ms = v.parse().unwrap_or(self.ui.toast_window_ms);
        }
        if let Ok(v) = env::var("CURATOR_REDIRECT_DELAY_MS") {
            self.ui.redirect_delay_ms = v.parse().unwrap_or(self.ui.redirect_delay_ms);
        }
        if let Ok(v) = env::var("CURATOR_ADMIN_PREFIX") {
            self.ui.admin_prefix = v;
        }
        if let Ok(v) = env::var("CURATOR_LOGIN_PATH") {
            self.ui.login_path = v;
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                origin: "http://localhost:5000".to_string(),
                prefix: "/api".to_string(),
            },
            ui: UiConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                origin: "https://staging.api.invalid".to_string(),
                prefix: "/api".to_string(),
            },
            ui: UiConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                // Must be overridden via CURATOR_API_ORIGIN in real deployments
                origin: "https://api.invalid".to_string(),
                prefix: "/api".to_string(),
            },
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_window_ms: 3000,
            redirect_delay_ms: 1500,
            admin_prefix: "/admin".to_string(),
            login_path: "/login".to_string(),
        }
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
