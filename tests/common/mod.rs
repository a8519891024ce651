use std::collections::HashMap;
use std::future::IntoFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;

use curator_console_rust::dispatch::{Navigator, RequestDispatcher};
use curator_console_rust::notify::NotificationBridge;
use curator_console_rust::resource::catalog;
use curator_console_rust::session::{MemoryTokenStore, SessionContext};
use curator_console_rust::ResourceController;

/// One request as the stub API observed it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct CannedResponse {
    status: u16,
    body: String,
    delay_ms: u64,
}

#[derive(Default)]
struct StubState {
    requests: Mutex<Vec<Recorded>>,
    responses: Mutex<HashMap<(String, String), CannedResponse>>,
}

/// In-process stub API on an ephemeral port. Records every request and
/// answers from canned per-route responses; unconfigured routes get an
/// empty `{"data": []}` list.
pub struct StubApi {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .fallback(handle_any)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind stub api");
        let addr = listener.local_addr().expect("stub api local addr");
        tokio::spawn(axum::serve(listener, app).into_future());

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn respond_with(&self, method: &str, path: &str, status: u16, body: Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    pub fn respond_raw(&self, method: &str, path: &str, status: u16, body: &str) {
        self.state.responses.lock().unwrap().insert(
            (method.to_uppercase(), path.to_string()),
            CannedResponse {
                status,
                body: body.to_string(),
                delay_ms: 0,
            },
        );
    }

    /// Canned response that stalls before answering, for races between
    /// overlapping fetches.
    pub fn respond_with_delay(&self, method: &str, path: &str, status: u16, body: Value, delay_ms: u64) {
        self.state.responses.lock().unwrap().insert(
            (method.to_uppercase(), path.to_string()),
            CannedResponse {
                status,
                body: body.to_string(),
                delay_ms,
            },
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Methods of every request seen on `path`, in arrival order.
    pub fn methods_for(&self, path: &str) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.method.clone())
            .collect()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

async fn handle_any(State(state): State<Arc<StubState>>, req: Request) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).ok();

    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        body,
        authorization,
    });

    let canned = state
        .responses
        .lock()
        .unwrap()
        .get(&(method, path))
        .cloned();

    let canned = canned.unwrap_or(CannedResponse {
        status: 200,
        body: r#"{"data": []}"#.to_string(),
        delay_ms: 0,
    });

    if canned.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(canned.delay_ms)).await;
    }

    Response::builder()
        .status(StatusCode::from_u16(canned.status).expect("valid canned status"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(canned.body.into())
        .expect("canned response")
}

/// Navigator that records where it was sent instead of going anywhere.
pub struct RecordingNavigator {
    path: Mutex<String>,
    navigations: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: Mutex::new(path.to_string()),
            navigations: Mutex::new(Vec::new()),
        })
    }

    pub fn recorded(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    fn navigate(&self, path: &str) {
        self.navigations.lock().unwrap().push(path.to_string());
    }
}

pub fn session_with_token(token: &str) -> SessionContext {
    SessionContext::new(Arc::new(MemoryTokenStore::with_token(token)))
}

pub fn dispatcher(
    stub: &StubApi,
    session: SessionContext,
    navigator: Arc<dyn Navigator>,
) -> Arc<RequestDispatcher> {
    Arc::new(
        RequestDispatcher::new(&stub.base_url, session, NotificationBridge::new(), navigator)
            // Keep 401 redirects fast enough to observe in tests
            .with_redirect_delay(Duration::from_millis(10)),
    )
}

/// Controller over the built-in contacts schema, wired to the stub. The
/// dispatcher is returned too so tests can inspect notifications.
pub fn contacts_controller(stub: &StubApi) -> (ResourceController, Arc<RequestDispatcher>) {
    let navigator = RecordingNavigator::at("/admin/contacts");
    let d = dispatcher(stub, session_with_token("test-token"), navigator);
    (ResourceController::new(catalog::contacts(), d.clone()), d)
}
