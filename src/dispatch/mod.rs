use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config;
use crate::error::{ApiError, Result};
use crate::notify::{NotificationBridge, Severity};
use crate::session::SessionContext;

/// Navigation seam for session-expiry redirects. The hosting surface (CLI,
/// web shell) supplies where the user currently is and how to move them.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// Navigator for surfaces with no notion of location; never redirects.
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn current_path(&self) -> String {
        "/".to_string()
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(path, "Navigation requested on a surface without routing");
    }
}

/// Single choke point for every HTTP call the engine makes.
///
/// Resolves resource-relative endpoints against the configured origin,
/// injects the bearer token, normalizes every failure into [`ApiError`]
/// and pushes it to the notification bridge before propagating. A 401
/// additionally clears the session token and, when the current path is
/// under the admin section, schedules a delayed redirect to the login
/// view. No retries, no timeouts, no de-duplication.
pub struct RequestDispatcher {
    http: reqwest::Client,
    origin: String,
    api_prefix: String,
    session: SessionContext,
    notifier: NotificationBridge,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    admin_prefix: String,
    login_path: String,
}

impl RequestDispatcher {
    pub fn new(
        origin: &str,
        session: SessionContext,
        notifier: NotificationBridge,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let cfg = config::config();
        Self {
            http: reqwest::Client::new(),
            origin: origin.trim_end_matches('/').to_string(),
            api_prefix: cfg.api.prefix.clone(),
            session,
            notifier,
            navigator,
            redirect_delay: Duration::from_millis(cfg.ui.redirect_delay_ms),
            admin_prefix: cfg.ui.admin_prefix.clone(),
            login_path: cfg.ui.login_path.clone(),
        }
    }

    /// Dispatcher bound to the configured API origin.
    pub fn from_config(
        session: SessionContext,
        notifier: NotificationBridge,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(&config::config().api.origin, session, notifier, navigator)
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn notifier(&self) -> &NotificationBridge {
        &self.notifier
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.send(Method::GET, endpoint, None, None).await
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.send(Method::POST, endpoint, Some(body), None).await
    }

    pub async fn put(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.send(Method::PUT, endpoint, Some(body), None).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.send(Method::DELETE, endpoint, None, None).await
    }

    /// Issue one JSON request. The explicit `token` overrides the session
    /// token when given; absence of any token is not an error, the call
    /// simply goes out unauthenticated.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value> {
        let url = self.resolve(endpoint);
        tracing::debug!(method = %method, url = %url, "Dispatching request");

        let mut request = self.http.request(method, &url);
        if let Some(token) = token.map(str::to_string).or_else(|| self.session.token()) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => return Err(self.fail(ApiError::Network(e.to_string()))),
        };

        self.read_response(response).await
    }

    /// Multipart upload variant for binary payloads (image fields and the
    /// like). The backend answers with an object carrying a `url` field.
    pub async fn upload(&self, endpoint: &str, file_name: &str, bytes: Vec<u8>) -> Result<Value> {
        let url = self.resolve(endpoint);
        tracing::debug!(url = %url, file_name, size = bytes.len(), "Dispatching upload");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.http.post(&url).multipart(form);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => return Err(self.fail(ApiError::Network(e.to_string()))),
        };

        self.read_response(response).await
    }

    async fn read_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::SessionExpired);
        }

        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = extract_error_message(&text)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(self.fail(ApiError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        // An empty or non-JSON success body is an empty success, not a failure
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    /// Surface a failure globally before propagating it to the caller.
    fn fail(&self, err: ApiError) -> ApiError {
        tracing::warn!(error = %err, "Request failed");
        self.notifier.notify(&err.to_string(), Severity::Error);
        err
    }

    /// Session-expiry side effects. The token is cleared immediately; the
    /// redirect is delayed so the notification can be seen, and fires only
    /// when the user is inside the admin section.
    fn handle_unauthorized(&self) {
        tracing::warn!("Received 401, expiring session");
        self.session.expire();
        self.notifier
            .notify("Session expired. Please log in again.", Severity::Error);

        let current = self.navigator.current_path();
        if is_under(&current, &self.admin_prefix) {
            let navigator = Arc::clone(&self.navigator);
            let login = self.login_path.clone();
            let delay = self.redirect_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                navigator.navigate(&login);
            });
        }
    }

    /// Resolve a resource-relative endpoint to a full URL. Absolute URLs
    /// pass through; the fixed API prefix is prepended unless the endpoint
    /// already carries it.
    fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        let path = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{}", endpoint)
        };
        if is_under(&path, &self.api_prefix) {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}{}{}", self.origin, self.api_prefix, path)
        }
    }
}

/// Path-segment-aware prefix check: `/api/blogs` is under `/api`, but
/// `/apikeys` is not.
fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.starts_with(&format!("{}/", prefix))
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")
        .or_else(|| parsed.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(origin: &str) -> RequestDispatcher {
        RequestDispatcher::new(
            origin,
            SessionContext::in_memory(),
            NotificationBridge::new(),
            Arc::new(NoopNavigator),
        )
    }

    #[test]
    fn resolve_prepends_api_prefix() {
        let d = dispatcher("http://localhost:5000");
        assert_eq!(d.resolve("/blogs"), "http://localhost:5000/api/blogs");
        assert_eq!(d.resolve("blogs"), "http://localhost:5000/api/blogs");
    }

    #[test]
    fn resolve_keeps_existing_prefix() {
        let d = dispatcher("http://localhost:5000/");
        assert_eq!(d.resolve("/api/blogs"), "http://localhost:5000/api/blogs");
        // A segment that merely starts with "api" still gets the prefix
        assert_eq!(d.resolve("/apikeys"), "http://localhost:5000/api/apikeys");
    }

    #[test]
    fn resolve_passes_absolute_urls_through() {
        let d = dispatcher("http://localhost:5000");
        assert_eq!(d.resolve("https://cdn.example.com/x"), "https://cdn.example.com/x");
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            extract_error_message(r#"{"error": "nope"}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(
            extract_error_message(r#"{"message": "bad input"}"#).as_deref(),
            Some("bad input")
        );
        assert!(extract_error_message("<html>gateway</html>").is_none());
        assert!(extract_error_message(r#"{"error": 500}"#).is_none());
    }
}
