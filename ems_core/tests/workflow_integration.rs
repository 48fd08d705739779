//! End-to-end workflows: the employee list driven through the real API
//! client, and sessions persisted to disk across restarts.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use ems_core::{
    ApiClient,
    auth::{FileStorage, MemoryStorage, SessionStore},
    employees::{DELETE_SUCCESS_MESSAGE, EmployeeList, ListEvent},
    routes::{Route, RouteDecision, guard},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::mpsc;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct Directory {
    employees: Arc<Mutex<Vec<(i64, String)>>>,
    searches: Arc<Mutex<Vec<String>>>,
    /// Access token accepted by the backend
    accepted: Arc<Mutex<String>>,
}

impl Directory {
    fn with_employees(names: &[&str]) -> Self {
        let dir = Self::default();
        *dir.employees.lock().unwrap() = names
            .iter()
            .enumerate()
            .map(|(i, n)| (i as i64 + 1, n.to_string()))
            .collect();
        *dir.accepted.lock().unwrap() = "access-1".to_string();
        dir
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.accepted.lock().unwrap());
        headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(expected.as_str())
    }

    fn render(&self, filter: Option<&str>) -> Value {
        let rows: Vec<Value> = self
            .employees
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, name)| {
                filter.is_none_or(|q| name.to_lowercase().contains(&q.to_lowercase()))
            })
            .map(|(id, name)| {
                json!({
                    "id": id,
                    "form_template": 1,
                    "data": [{"field_label": "Full Name", "field_value": name}]
                })
            })
            .collect();
        Value::Array(rows)
    }
}

async fn list(State(dir): State<Directory>, headers: HeaderMap) -> Response {
    if !dir.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(dir.render(None)).into_response()
}

async fn search(
    State(dir): State<Directory>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !dir.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let q = params.get("q").cloned().unwrap_or_default();
    dir.searches.lock().unwrap().push(q.clone());
    Json(dir.render(Some(&q))).into_response()
}

async fn remove(State(dir): State<Directory>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !dir.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    dir.employees.lock().unwrap().retain(|(eid, _)| *eid != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn login() -> Response {
    Json(json!({
        "access": "access-1",
        "refresh": "refresh-1",
        "user": {"id": 1, "username": "alice", "email": "alice@example.com"}
    }))
    .into_response()
}

async fn refresh(State(dir): State<Directory>) -> Response {
    *dir.accepted.lock().unwrap() = "access-2".to_string();
    Json(json!({"access": "access-2", "refresh": "refresh-2"})).into_response()
}

async fn spawn_backend(dir: Directory) -> String {
    let app = Router::new()
        .route("/employees/", get(list))
        .route("/employees/search/", get(search))
        .route("/employees/{id}/", delete(remove))
        .route("/auth/login/", post(login))
        .route("/refresh/", post(refresh))
        .with_state(dir);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<ListEvent>) -> ListEvent {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("Timed out waiting for list event")
        .expect("Event channel closed")
}

fn names(list: &EmployeeList<ApiClient>) -> Vec<String> {
    list.employees()
        .iter()
        .filter_map(|e| e.value("Full Name").map(String::from))
        .collect()
}

fn temp_session_dir() -> PathBuf {
    std::env::temp_dir().join(format!("ems_workflow_{}", uuid::Uuid::new_v4()))
}

async fn logged_in_client(base_url: &str) -> ApiClient {
    let session = Arc::new(SessionStore::open(Box::new(MemoryStorage::default())));
    let client = ApiClient::new(base_url, session).unwrap();
    client.login("alice", "secret").await.unwrap();
    client
}

// ============================================================================
// Employee list
// ============================================================================

#[tokio::test]
async fn test_typing_burst_issues_single_search() {
    let dir = Directory::with_employees(&["Jane Doe", "John Smith", "Johanna Berg"]);
    let client = logged_in_client(&spawn_backend(dir.clone()).await).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut list = EmployeeList::new(Arc::new(client), tx, Duration::from_millis(50));

    for query in ["j", "jo", "joh", "john"] {
        list.set_query(query);
    }
    assert!(list.is_loading());

    let event = next_event(&mut rx).await;
    assert!(list.apply(event).is_empty());

    assert!(!list.is_loading());
    assert_eq!(names(&list), vec!["John Smith".to_string()]);
    assert_eq!(*dir.searches.lock().unwrap(), vec!["john".to_string()]);
}

#[tokio::test]
async fn test_confirmed_delete_refetches() {
    let dir = Directory::with_employees(&["Jane Doe", "John Smith"]);
    let client = logged_in_client(&spawn_backend(dir.clone()).await).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut list = EmployeeList::new(Arc::new(client), tx, Duration::from_millis(50));

    list.refresh();
    let event = next_event(&mut rx).await;
    list.apply(event);
    assert_eq!(list.employees().len(), 2);

    list.request_delete(1);
    assert!(list.confirm_delete());

    let deleted = next_event(&mut rx).await;
    let notes = list.apply(deleted);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, DELETE_SUCCESS_MESSAGE);
    assert_eq!(names(&list), vec!["John Smith".to_string()]);

    let reloaded = next_event(&mut rx).await;
    assert!(matches!(reloaded, ListEvent::Loaded { .. }));
    list.apply(reloaded);
    assert_eq!(names(&list), vec!["John Smith".to_string()]);
}

#[tokio::test]
async fn test_cancelled_delete_keeps_employee() {
    let dir = Directory::with_employees(&["Jane Doe"]);
    let client = logged_in_client(&spawn_backend(dir.clone()).await).await;
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut list = EmployeeList::new(Arc::new(client), tx, Duration::from_millis(50));

    list.request_delete(1);
    list.cancel_delete();

    assert!(!list.confirm_delete());
    assert_eq!(dir.employees.lock().unwrap().len(), 1);
}

// ============================================================================
// Persisted sessions
// ============================================================================

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = Directory::with_employees(&["Jane Doe"]);
    let base_url = spawn_backend(dir).await;
    let session_dir = temp_session_dir();

    {
        let session = Arc::new(SessionStore::open(Box::new(FileStorage::new(&session_dir))));
        let client = ApiClient::new(base_url.as_str(), session).unwrap();
        client.login("alice", "secret").await.unwrap();
    }

    let restored = SessionStore::open(Box::new(FileStorage::new(&session_dir)));
    assert!(restored.is_authenticated());
    assert_eq!(restored.user().unwrap().username, "alice");
    assert_eq!(
        guard(Route::Employees, &restored.snapshot()),
        RouteDecision::Render(Route::Employees)
    );

    let _ = std::fs::remove_dir_all(session_dir);
}

#[tokio::test]
async fn test_refreshed_tokens_persisted() {
    let dir = Directory::with_employees(&["Jane Doe"]);
    let base_url = spawn_backend(dir.clone()).await;
    let session_dir = temp_session_dir();

    let session = Arc::new(SessionStore::open(Box::new(FileStorage::new(&session_dir))));
    let client = ApiClient::new(base_url.as_str(), session).unwrap();
    client.login("alice", "secret").await.unwrap();

    // Backend rotates keys; the next request needs a refresh
    *dir.accepted.lock().unwrap() = "rotated".to_string();
    let _ = client.list_employees().await;

    let raw = std::fs::read_to_string(session_dir.join("auth-storage.json")).unwrap();
    let persisted: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted["accessToken"], "access-2");
    assert_eq!(persisted["refreshToken"], "refresh-2");
    assert_eq!(persisted["isAuthenticated"], true);

    let _ = std::fs::remove_dir_all(session_dir);
}

#[tokio::test]
async fn test_logout_persisted() {
    let dir = Directory::with_employees(&[]);
    let base_url = spawn_backend(dir).await;
    let session_dir = temp_session_dir();

    let session = Arc::new(SessionStore::open(Box::new(FileStorage::new(&session_dir))));
    let client = ApiClient::new(base_url.as_str(), session).unwrap();
    client.login("alice", "secret").await.unwrap();
    // No logout route on this backend; local logout still happens
    client.logout().await;

    let restored = SessionStore::open(Box::new(FileStorage::new(&session_dir)));
    assert!(!restored.is_authenticated());
    assert_eq!(
        guard(Route::Employees, &restored.snapshot()),
        RouteDecision::Redirect(Route::Login)
    );

    let _ = std::fs::remove_dir_all(session_dir);
}
