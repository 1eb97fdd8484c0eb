//! A conforming link-in-bio backend served in-process for the runner's tests.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

const SESSION_COOKIE: &str = "sb-access-token";

#[derive(Clone, Debug)]
pub struct MockOptions {
    /// Sign-in of a fresh account answers 400 "Email not confirmed".
    pub require_confirmation: bool,
    /// Sign-out invalidates the access token, not just the cookie.
    pub revoke_on_signout: bool,
    pub cors: bool,
    /// Clicks on unknown link ids answer `{"success": true}`.
    pub accept_unknown_clicks: bool,
    /// Accounts that exist before the run starts.
    pub seeded_usernames: Vec<String>,
}

impl MockOptions {
    pub fn standard() -> Self {
        MockOptions {
            require_confirmation: true,
            revoke_on_signout: false,
            cors: true,
            accept_unknown_clicks: true,
            seeded_usernames: vec!["admin".to_string()],
        }
    }
}

#[derive(Clone, Debug)]
struct MockUser {
    id: String,
    email: String,
    password: String,
    username: String,
    display_name: String,
    bio: Option<String>,
    avatar_url: Option<String>,
    theme_color: Option<String>,
    background_color: Option<String>,
}

impl MockUser {
    fn new(email: &str, password: &str, username: &str, display_name: &str) -> Self {
        MockUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: password.to_string(),
            username: username.to_string(),
            display_name: display_name.to_string(),
            bio: None,
            avatar_url: None,
            theme_color: None,
            background_color: None,
        }
    }

    fn profile(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "display_name": self.display_name,
            "bio": self.bio,
            "avatar_url": self.avatar_url,
            "theme_color": self.theme_color,
            "background_color": self.background_color,
        })
    }
}

#[derive(Clone, Debug)]
struct MockLink {
    id: String,
    user_id: String,
    title: String,
    url: String,
    description: Option<String>,
    clicks: u64,
}

impl MockLink {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "user_id": self.user_id,
            "title": self.title,
            "url": self.url,
            "description": self.description,
            "clicks": self.clicks,
        })
    }
}

#[derive(Debug, Default)]
struct MockDb {
    users: Vec<MockUser>,
    /// access token -> user id
    sessions: HashMap<String, String>,
    links: Vec<MockLink>,
}

impl MockDb {
    fn user_for(&self, headers: &HeaderMap) -> Option<MockUser> {
        let token = bearer_token(headers).or_else(|| cookie_token(headers))?;
        let user_id = self.sessions.get(&token)?;
        self.users.iter().find(|user| &user.id == user_id).cloned()
    }

    fn open_session(&mut self, user_id: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user_id.to_string());
        token
    }
}

#[derive(Clone)]
struct MockState {
    db: Arc<Mutex<MockDb>>,
    options: Arc<MockOptions>,
}

pub struct RunningMock {
    pub base_url: String,
    db: Arc<Mutex<MockDb>>,
}

impl RunningMock {
    pub fn api_base(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub fn link_count(&self) -> usize {
        self.db.lock().unwrap().links.len()
    }

    pub fn user_count(&self) -> usize {
        self.db.lock().unwrap().users.len()
    }

    pub fn has_username(&self, username: &str) -> bool {
        self.db
            .lock()
            .unwrap()
            .users
            .iter()
            .any(|user| user.username == username)
    }
}

pub async fn start(options: MockOptions) -> RunningMock {
    let mut db = MockDb::default();
    for username in &options.seeded_usernames {
        let email = format!("{}@seed.local", username);
        let password = Uuid::new_v4().to_string();
        db.users.push(MockUser::new(&email, &password, username, username));
    }
    let db = Arc::new(Mutex::new(db));
    let state = MockState {
        db: db.clone(),
        options: Arc::new(options.clone()),
    };

    let api = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
        .route("/profile", get(get_profile).post(update_profile))
        .route("/links", get(list_links).post(create_link))
        .route("/links/:id", put(update_link).delete(delete_link))
        .route("/public/profile/:username", get(public_profile))
        .route("/track-click", post(track_click));
    let mut app = Router::new().nest("/api", api);
    if options.cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }
    let app = app.with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    RunningMock {
        base_url: format!("http://{}", addr),
        db,
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    reply(status, json!({"error": message}))
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "Unauthorized")
}

fn with_session(token: &str, body: Value) -> Response {
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token);
    (StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(body)).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::to_string)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
}

fn text<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

async fn signup(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    let (Some(email), Some(password), Some(username)) = (
        text(&body, "email"),
        text(&body, "password"),
        text(&body, "username"),
    ) else {
        return error(StatusCode::BAD_REQUEST, "Missing required fields");
    };
    if !email.contains('@') {
        return error(StatusCode::BAD_REQUEST, "Invalid email address");
    }
    let mut db = state.db.lock().unwrap();
    if db.users.iter().any(|user| user.username == username) {
        return error(StatusCode::BAD_REQUEST, "Username already taken");
    }
    if db.users.iter().any(|user| user.email == email) {
        return error(StatusCode::BAD_REQUEST, "User already registered");
    }
    let display_name = text(&body, "displayName").unwrap_or(username);
    let user = MockUser::new(email, password, username, display_name);
    let token = db.open_session(&user.id);
    let response = json!({
        "user": {"id": user.id, "email": user.email},
        "session": {"access_token": token},
    });
    db.users.push(user);
    with_session(&token, response)
}

async fn signin(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    let mut db = state.db.lock().unwrap();
    let user = db
        .users
        .iter()
        .find(|user| {
            Some(user.email.as_str()) == text(&body, "email")
                && Some(user.password.as_str()) == text(&body, "password")
        })
        .cloned();
    let Some(user) = user else {
        return error(StatusCode::BAD_REQUEST, "Invalid login credentials");
    };
    if state.options.require_confirmation {
        return error(StatusCode::BAD_REQUEST, "Email not confirmed");
    }
    let token = db.open_session(&user.id);
    with_session(
        &token,
        json!({
            "user": {"id": user.id, "email": user.email},
            "session": {"access_token": token},
        }),
    )
}

async fn signout(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if state.options.revoke_on_signout {
        let mut db = state.db.lock().unwrap();
        for token in [bearer_token(&headers), cookie_token(&headers)].into_iter().flatten() {
            db.sessions.remove(&token);
        }
    }
    let expired = format!("{}=; Path=/; Max-Age=0", SESSION_COOKIE);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, expired)],
        Json(json!({"success": true})),
    )
        .into_response()
}

async fn get_profile(State(state): State<MockState>, headers: HeaderMap) -> Response {
    match state.db.lock().unwrap().user_for(&headers) {
        Some(user) => reply(StatusCode::OK, user.profile()),
        None => unauthorized(),
    }
}

async fn update_profile(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    let Some(current) = db.user_for(&headers) else {
        return unauthorized();
    };
    if let Some(username) = text(&body, "username") {
        if db
            .users
            .iter()
            .any(|user| user.username == username && user.id != current.id)
        {
            return error(StatusCode::BAD_REQUEST, "Username already taken");
        }
    }
    let Some(user) = db.users.iter_mut().find(|user| user.id == current.id) else {
        return unauthorized();
    };
    if let Some(username) = text(&body, "username") {
        user.username = username.to_string();
    }
    if let Some(display_name) = text(&body, "displayName") {
        user.display_name = display_name.to_string();
    }
    let optional = [
        ("bio", &mut user.bio),
        ("avatarUrl", &mut user.avatar_url),
        ("themeColor", &mut user.theme_color),
        ("backgroundColor", &mut user.background_color),
    ];
    for (key, field) in optional {
        if let Some(value) = text(&body, key) {
            *field = Some(value.to_string());
        }
    }
    reply(StatusCode::OK, user.profile())
}

async fn list_links(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let db = state.db.lock().unwrap();
    let Some(user) = db.user_for(&headers) else {
        return unauthorized();
    };
    let links: Vec<Value> = db
        .links
        .iter()
        .filter(|link| link.user_id == user.id)
        .map(MockLink::to_json)
        .collect();
    reply(StatusCode::OK, Value::Array(links))
}

async fn create_link(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    let Some(user) = db.user_for(&headers) else {
        return unauthorized();
    };
    let (Some(title), Some(url)) = (text(&body, "title"), text(&body, "url")) else {
        return error(StatusCode::BAD_REQUEST, "Title and URL are required");
    };
    let link = MockLink {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        title: title.to_string(),
        url: url.to_string(),
        description: text(&body, "description").map(str::to_string),
        clicks: 0,
    };
    let response = link.to_json();
    db.links.push(link);
    reply(StatusCode::OK, response)
}

async fn update_link(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    let Some(user) = db.user_for(&headers) else {
        return unauthorized();
    };
    let Some(link) = db
        .links
        .iter_mut()
        .find(|link| link.id == id && link.user_id == user.id)
    else {
        return error(StatusCode::NOT_FOUND, "Link not found");
    };
    if let Some(title) = text(&body, "title") {
        link.title = title.to_string();
    }
    if let Some(url) = text(&body, "url") {
        link.url = url.to_string();
    }
    if let Some(description) = text(&body, "description") {
        link.description = Some(description.to_string());
    }
    reply(StatusCode::OK, link.to_json())
}

async fn delete_link(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut db = state.db.lock().unwrap();
    let Some(user) = db.user_for(&headers) else {
        return unauthorized();
    };
    let before = db.links.len();
    db.links.retain(|link| !(link.id == id && link.user_id == user.id));
    if db.links.len() == before {
        return error(StatusCode::NOT_FOUND, "Link not found");
    }
    reply(StatusCode::OK, json!({"success": true}))
}

async fn public_profile(State(state): State<MockState>, Path(username): Path<String>) -> Response {
    let db = state.db.lock().unwrap();
    let Some(user) = db.users.iter().find(|user| user.username == username) else {
        return error(StatusCode::NOT_FOUND, "Profile not found");
    };
    let links: Vec<Value> = db
        .links
        .iter()
        .filter(|link| link.user_id == user.id)
        .map(MockLink::to_json)
        .collect();
    reply(StatusCode::OK, json!({"profile": user.profile(), "links": links}))
}

/// Unknown link ids are accepted silently unless `accept_unknown_clicks` is off.
async fn track_click(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    let Some(link_id) = text(&body, "linkId") else {
        return error(StatusCode::BAD_REQUEST, "Link ID is required");
    };
    let mut db = state.db.lock().unwrap();
    match db.links.iter_mut().find(|link| link.id == link_id) {
        Some(link) => link.clicks += 1,
        None if !state.options.accept_unknown_clicks => {
            return reply(StatusCode::OK, json!({"success": false, "error": "Unknown link"}));
        }
        None => {}
    }
    reply(StatusCode::OK, json!({"success": true}))
}
