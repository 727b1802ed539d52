#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use todo_desk::notify::Toaster;
use todo_desk::session::MemorySessionStore;
use todo_desk::TodoClient;
use tokio::net::TcpListener;

/// A request as the mock API saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub bearer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct StoredTodo {
    pub id: u64,
    pub document_id: String,
    pub title: String,
    pub description: String,
    pub owner: u64,
}

#[derive(Default)]
struct MockState {
    users: Vec<StoredUser>,
    todos: Vec<StoredTodo>,
    tokens: HashMap<String, u64>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
    create_attempts: usize,
    fail_creates_at: HashSet<usize>,
    fail_writes: bool,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_token(&mut self, user_id: u64) -> String {
        let token = format!("jwt-{}-{}", user_id, self.tokens.len() + 1);
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<u64, Response> {
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token).copied())
            .ok_or_else(|| {
                api_error(
                    StatusCode::UNAUTHORIZED,
                    "UnauthorizedError",
                    "Missing or invalid credentials",
                )
            })
    }
}

type Shared = Arc<Mutex<MockState>>;

/// In-process stand-in for the to-do REST API, served on a random port.
pub struct MockApi {
    pub base_url: String,
    state: Shared,
}

impl MockApi {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn seed_user(&self, username: &str, email: &str, password: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.users.push(StoredUser {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        id
    }

    pub fn seed_todos(&self, owner: u64, count: usize) {
        let mut state = self.state.lock().unwrap();
        for n in 1..=count {
            let id = state.next_id();
            state.todos.push(StoredTodo {
                id,
                document_id: format!("doc-{}", id),
                title: format!("Seeded todo {}", n),
                description: format!("Seeded description {}", n),
                owner,
            });
        }
    }

    pub fn todos(&self) -> Vec<StoredTodo> {
        self.state.lock().unwrap().todos.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    /// Makes the given create attempts (1-based) fail with a 500.
    pub fn fail_creates_at(&self, attempts: &[usize]) {
        self.state.lock().unwrap().fail_creates_at = attempts.iter().copied().collect();
    }

    /// Makes every create/update/delete fail with a 500.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn revoke_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/local", post(login))
        .route("/api/auth/local/register", post(register))
        .route("/api/users/me", get(me))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", put(update_todo).delete(delete_todo))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(query)| query)
        .unwrap_or_default();
    let bearer = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    state.lock().unwrap().requests.push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query,
        bearer,
    });
    next.run(request).await
}

fn api_error(status: StatusCode, name: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "data": null,
            "error": {"status": status.as_u16(), "name": name, "message": message}
        })),
    )
        .into_response()
}

fn user_json(user: &StoredUser) -> Value {
    json!({
        "id": user.id,
        "documentId": format!("user-{}", user.id),
        "username": user.username,
        "email": user.email,
        "confirmed": true,
        "blocked": false
    })
}

fn todo_json(todo: &StoredTodo) -> Value {
    let created_at = chrono::DateTime::from_timestamp(1_700_000_000 + todo.id as i64, 0).unwrap();
    json!({
        "id": todo.id,
        "documentId": todo.document_id,
        "title": todo.title,
        "description": todo.description,
        "createdAt": created_at.to_rfc3339(),
        "updatedAt": created_at.to_rfc3339()
    })
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let identifier = body["identifier"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let user = state
        .users
        .iter()
        .find(|user| {
            (user.email == identifier || user.username == identifier) && user.password == password
        })
        .cloned();

    match user {
        Some(user) => {
            let jwt = state.issue_token(user.id);
            Json(json!({"jwt": jwt, "user": user_json(&user)})).into_response()
        }
        None => api_error(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "Invalid identifier or password",
        ),
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    if state
        .users
        .iter()
        .any(|user| user.username == username || user.email == email)
    {
        return api_error(
            StatusCode::BAD_REQUEST,
            "ApplicationError",
            "Email or Username are already taken",
        );
    }

    let id = state.next_id();
    let user = StoredUser {
        id,
        username,
        email,
        password,
    };
    state.users.push(user.clone());
    let jwt = state.issue_token(id);
    Json(json!({"jwt": jwt, "user": user_json(&user)})).into_response()
}

async fn me(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    let user_id = match state.authorize(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(user) = state.users.iter().find(|user| user.id == user_id) else {
        return api_error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found");
    };

    let mut body = user_json(user);
    if params.get("populate").map(String::as_str) == Some("todos") {
        let todos: Vec<Value> = state
            .todos
            .iter()
            .filter(|todo| todo.owner == user_id)
            .map(todo_json)
            .collect();
        body["todos"] = Value::Array(todos);
    }
    Json(body).into_response()
}

async fn list_todos(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(response) = state.authorize(&headers) {
        return response;
    }

    let page: u64 = params
        .get("pagination[page]")
        .and_then(|value| value.parse().ok())
        .unwrap_or(1u64)
        .max(1);
    let page_size: u64 = params
        .get("pagination[pageSize]")
        .and_then(|value| value.parse().ok())
        .unwrap_or(25u64)
        .max(1);
    let descending = params
        .get("sort")
        .is_some_and(|sort| sort.eq_ignore_ascii_case("createdAt:DESC"));

    let mut todos: Vec<&StoredTodo> = state.todos.iter().collect();
    todos.sort_by_key(|todo| todo.id);
    if descending {
        todos.reverse();
    }

    let total = todos.len() as u64;
    let page_count = total.div_ceil(page_size);
    let data: Vec<Value> = todos
        .into_iter()
        .skip(((page - 1) * page_size) as usize)
        .take(page_size as usize)
        .map(todo_json)
        .collect();

    Json(json!({
        "data": data,
        "meta": {"pagination": {"page": page, "pageSize": page_size, "pageCount": page_count, "total": total}}
    }))
    .into_response()
}

async fn create_todo(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user_id = match state.authorize(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    state.create_attempts += 1;
    let attempt = state.create_attempts;
    if state.fail_writes || state.fail_creates_at.contains(&attempt) {
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            "Internal Server Error",
        );
    }

    let data = &body["data"];
    let (Some(title), Some(description)) = (data["title"].as_str(), data["description"].as_str())
    else {
        return api_error(StatusCode::BAD_REQUEST, "ValidationError", "title is required");
    };
    let owner = data["user"][0].as_u64().unwrap_or(user_id);

    let id = state.next_id();
    let todo = StoredTodo {
        id,
        document_id: format!("doc-{}", id),
        title: title.to_string(),
        description: description.to_string(),
        owner,
    };
    state.todos.push(todo.clone());
    (
        StatusCode::CREATED,
        Json(json!({"data": todo_json(&todo), "meta": {}})),
    )
        .into_response()
}

async fn update_todo(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = state.authorize(&headers) {
        return response;
    }
    if state.fail_writes {
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            "Internal Server Error",
        );
    }

    let Some(todo) = state
        .todos
        .iter_mut()
        .find(|todo| todo.document_id == id || todo.id.to_string() == id)
    else {
        return api_error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found");
    };
    if let Some(title) = body["data"]["title"].as_str() {
        todo.title = title.to_string();
    }
    if let Some(description) = body["data"]["description"].as_str() {
        todo.description = description.to_string();
    }
    let updated = todo.clone();
    Json(json!({"data": todo_json(&updated), "meta": {}})).into_response()
}

async fn delete_todo(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(response) = state.authorize(&headers) {
        return response;
    }
    if state.fail_writes {
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            "Internal Server Error",
        );
    }

    let before = state.todos.len();
    state
        .todos
        .retain(|todo| todo.document_id != id && todo.id.to_string() != id);
    if state.todos.len() == before {
        return api_error(StatusCode::NOT_FOUND, "NotFoundError", "Not Found");
    }
    StatusCode::NO_CONTENT.into_response()
}

/// A mock API plus a client wired to it through an in-memory session.
pub struct TestEnvironment {
    pub api: MockApi,
    pub sessions: Arc<MemorySessionStore>,
    pub client: TodoClient,
    pub notifier: Arc<Toaster>,
}

pub const USERNAME: &str = "alice";
pub const EMAIL: &str = "alice@example.com";
pub const PASSWORD: &str = "correct horse";

impl TestEnvironment {
    pub async fn new() -> Self {
        let api = MockApi::start().await;
        let sessions = Arc::new(MemorySessionStore::new());
        let client = TodoClient::new(api.base_url.clone(), sessions.clone()).unwrap();
        Self {
            api,
            sessions,
            client,
            notifier: Arc::new(Toaster::new()),
        }
    }

    /// Seeds the default user and logs in as them.
    pub async fn logged_in() -> (Self, u64) {
        let env = Self::new().await;
        let user_id = env.api.seed_user(USERNAME, EMAIL, PASSWORD);
        env.client
            .login(&todo_desk::client::LoginRequest {
                identifier: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("login against mock API failed");
        env.api.clear_requests();
        (env, user_id)
    }

    pub fn token(&self) -> String {
        self.client.session().expect("no session").jwt
    }
}

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("todo_desk=debug")
        .with_test_writer()
        .try_init();
}
