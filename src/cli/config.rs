use std::path::PathBuf;
use std::sync::Arc;

use crate::dispatch::{Navigator, RequestDispatcher};
use crate::notify::NotificationBridge;
use crate::session::{FileTokenStore, SessionContext};

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CURATOR_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("curator")
    };
    Ok(config_dir)
}

pub fn token_path() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("token"))
}

/// The CLI always operates inside the admin section, so a 401 schedules
/// the login "redirect", which on this surface is a hint on stderr.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn current_path(&self) -> String {
        "/admin".to_string()
    }

    fn navigate(&self, path: &str) {
        tracing::info!(path, "Redirecting to login");
        eprintln!("Session expired - run `curator auth login <email>` to continue");
    }
}

/// Wire up the engine for CLI use: file-backed token store under the
/// config dir, notifications echoed to stderr as they arrive.
pub fn build_dispatcher() -> anyhow::Result<Arc<RequestDispatcher>> {
    let session = SessionContext::new(Arc::new(FileTokenStore::new(token_path()?)));
    let notifier = NotificationBridge::new();
    notifier.register_page_handler(|n| eprintln!("[{}] {}", n.severity, n.message));

    Ok(Arc::new(RequestDispatcher::from_config(
        session,
        notifier,
        Arc::new(CliNavigator),
    )))
}
