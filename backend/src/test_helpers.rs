//! In-process fake of the hosted backend for adapter tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use gate::ApplicationUser;
use serde_json::{Value, json};

use crate::auth::HostedAuth;
use crate::clock::Clock;
use crate::config::BackendConfig;
use crate::http::HostedClient;
use crate::pkce;
use crate::vault::{MemoryVault, TokenVault};

pub const ANON_KEY: &str = "anon-key";
pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const USER_ID: &str = "user-ada";

// =============================================================================
// CLOCK
// =============================================================================

#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn at(secs: u64) -> Self {
        let clock = Self::default();
        clock.now.store(secs, Ordering::SeqCst);
        clock
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// =============================================================================
// FAKE BACKEND
// =============================================================================

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub grant_type: Option<String>,
    pub apikey: Option<String>,
    pub bearer: Option<String>,
}

pub struct FakeState {
    /// email -> (password, user id)
    pub accounts: HashMap<String, (String, String)>,
    pub refresh_tokens: HashMap<String, String>,
    /// auth code -> (challenge, user id)
    pub oauth_codes: HashMap<String, (String, String)>,
    pub users: Vec<ApplicationUser>,
    pub expires_in: u64,
    pub auto_confirm: bool,
    pub logout_status: StatusCode,
    pub users_status: Option<StatusCode>,
    pub requests: Vec<Recorded>,
    issued: u64,
}

impl Default for FakeState {
    fn default() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(EMAIL.to_owned(), (PASSWORD.to_owned(), USER_ID.to_owned()));
        Self {
            accounts,
            refresh_tokens: HashMap::new(),
            oauth_codes: HashMap::new(),
            users: Vec::new(),
            expires_in: 3600,
            auto_confirm: true,
            logout_status: StatusCode::NO_CONTENT,
            users_status: None,
            requests: Vec::new(),
            issued: 0,
        }
    }
}

impl FakeState {
    fn issue(&mut self, user_id: &str) -> Value {
        self.issued += 1;
        let refresh = format!("refresh-{}", self.issued);
        self.refresh_tokens.insert(refresh.clone(), user_id.to_owned());
        let email = self.accounts.iter().find(|(_, (_, id))| id == user_id).map(|(email, _)| email.clone());
        json!({
            "access_token": format!("access-{}", self.issued),
            "refresh_token": refresh,
            "expires_in": self.expires_in,
            "token_type": "bearer",
            "user": { "id": user_id, "email": email },
        })
    }

    fn record(&mut self, method: &str, path: &str, grant_type: Option<String>, headers: &HeaderMap) {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
        self.requests.push(Recorded {
            method: method.to_owned(),
            path: path.to_owned(),
            grant_type,
            apikey: header("apikey"),
            bearer: header("authorization").and_then(|v| v.strip_prefix("Bearer ").map(str::to_owned)),
        });
    }
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeBackend {
    pub state: Shared,
    pub base_url: String,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));
        let app = Router::new()
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/signup", post(signup))
            .route("/auth/v1/logout", post(logout))
            .route("/rest/v1/users", get(select_users).post(insert_user).patch(update_user))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { state, base_url: format!("http://{addr}") }
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn client(&self) -> HostedClient {
        HostedClient::new(BackendConfig::new(&self.base_url, ANON_KEY)).unwrap()
    }

    pub fn auth(&self, vault: Arc<dyn TokenVault>, clock: ManualClock) -> HostedAuth {
        HostedAuth::new(self.client(), vault, Arc::new(clock))
    }

    pub fn fresh_auth(&self) -> (HostedAuth, Arc<MemoryVault>, ManualClock) {
        let vault = Arc::new(MemoryVault::new());
        let clock = ManualClock::at(1_000_000);
        (self.auth(vault.clone(), clock.clone()), vault, clock)
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.state().requests.iter().filter(|r| r.path == path).cloned().collect()
    }

    pub fn insert_row(&self, id: &str, display_name: &str) {
        self.state().users.push(row(id, display_name));
    }

    /// Register a pending OAuth consent for `verifier` and return its code.
    pub fn grant_oauth_code(&self, verifier: &str, user_id: &str) -> String {
        let code = format!("code-{user_id}");
        self.state().oauth_codes.insert(code.clone(), (pkce::challenge(verifier), user_id.to_owned()));
        code
    }
}

pub fn row(id: &str, display_name: &str) -> ApplicationUser {
    ApplicationUser {
        id: id.to_owned(),
        display_name: display_name.to_owned(),
        bio: None,
        avatar_url: None,
        created_at: Some("2026-01-01T00:00:00Z".to_owned()),
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

fn invalid_grant(description: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant", "error_description": description })))
        .into_response()
}

async fn token(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let grant_type = query.get("grant_type").cloned().unwrap_or_default();
    state.record("POST", "/auth/v1/token", Some(grant_type.clone()), &headers);
    let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or_default().to_owned();

    match grant_type.as_str() {
        "password" => {
            let email = field("email");
            match state.accounts.get(&email).cloned() {
                Some((password, id)) if password == field("password") => Json(state.issue(&id)).into_response(),
                _ => invalid_grant("Invalid login credentials"),
            }
        }
        "refresh_token" => match state.refresh_tokens.remove(&field("refresh_token")) {
            Some(id) => Json(state.issue(&id)).into_response(),
            None => invalid_grant("Invalid Refresh Token: Refresh Token Not Found"),
        },
        "pkce" => match state.oauth_codes.remove(&field("auth_code")) {
            Some((challenge, id)) if challenge == pkce::challenge(&field("code_verifier")) => {
                Json(state.issue(&id)).into_response()
            }
            _ => invalid_grant("code challenge does not match previously saved code verifier"),
        },
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn signup(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    state.record("POST", "/auth/v1/signup", None, &headers);
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default().to_owned();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default().to_owned();
    if state.accounts.contains_key(&email) {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "code": 422, "msg": "User already registered" })))
            .into_response();
    }

    let id = format!("user-{}", state.accounts.len() + 1);
    state.accounts.insert(email.clone(), (password, id.clone()));
    if state.auto_confirm {
        Json(state.issue(&id)).into_response()
    } else {
        Json(json!({ "id": id, "email": email, "confirmation_sent_at": "2026-01-01T00:00:00Z" })).into_response()
    }
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    state.record("POST", "/auth/v1/logout", None, &headers);
    state.logout_status.into_response()
}

fn eq_filter(query: &HashMap<String, String>) -> Option<String> {
    query.get("id").and_then(|v| v.strip_prefix("eq.")).map(str::to_owned)
}

async fn select_users(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    state.record("GET", "/rest/v1/users", None, &headers);
    if let Some(status) = state.users_status {
        return (status, Json(json!({ "message": "relation unavailable" }))).into_response();
    }
    let id = eq_filter(&query);
    let rows: Vec<ApplicationUser> = state.users.iter().filter(|u| Some(&u.id) == id.as_ref()).cloned().collect();
    Json(rows).into_response()
}

async fn insert_user(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    state.record("POST", "/rest/v1/users", None, &headers);
    let id = body.get("id").and_then(Value::as_str).unwrap_or_default();
    if state.users.iter().any(|u| u.id == id) {
        return (StatusCode::CONFLICT, Json(json!({ "message": "duplicate key value" }))).into_response();
    }
    let mut created = row(id, body.get("display_name").and_then(Value::as_str).unwrap_or_default());
    created.bio = body.get("bio").and_then(Value::as_str).map(str::to_owned);
    state.users.push(created.clone());
    (StatusCode::CREATED, Json(vec![created])).into_response()
}

async fn update_user(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.record("PATCH", "/rest/v1/users", None, &headers);
    let id = eq_filter(&query);
    let mut updated = Vec::new();
    for user in state.users.iter_mut().filter(|u| Some(&u.id) == id.as_ref()) {
        if let Some(name) = body.get("display_name").and_then(Value::as_str) {
            name.clone_into(&mut user.display_name);
        }
        if let Some(bio) = body.get("bio").and_then(Value::as_str) {
            user.bio = Some(bio.to_owned());
        }
        if let Some(url) = body.get("avatar_url").and_then(Value::as_str) {
            user.avatar_url = Some(url.to_owned());
        }
        updated.push(user.clone());
    }
    Json(updated).into_response()
}
