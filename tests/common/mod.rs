// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the storefront backend.
//!
//! Access tokens are real HS256 JWTs so the client can read their expiry.
//! The mock only accepts access tokens it issued and has not revoked.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use storefront_client::auth::{Credential, MemoryStorage};
use storefront_client::config::Config;
use storefront_client::Storefront;

pub const SIGNING_KEY: &[u8] = b"mock-backend-signing-key";
pub const PASSWORD: &str = "correct horse";

static TOKEN_SEQ: AtomicU64 = AtomicU64::new(1);

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Mint an access token for `username` expiring `ttl_secs` from now.
#[allow(dead_code)]
pub fn make_token(username: &str, role: &str, ttl_secs: i64) -> String {
    let now = now_secs();
    let claims = json!({
        "token_type": "access",
        "user_id": 42,
        "username": username,
        "first_name": "Test",
        "last_name": "User",
        "role": role,
        "iat": now,
        "exp": now + ttl_secs,
        "jti": TOKEN_SEQ.fetch_add(1, Ordering::SeqCst).to_string(),
    });

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap()
}

/// Observable and tweakable backend state.
pub struct MockState {
    pub refresh_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub always_unauthorized_hits: AtomicUsize,
    pub categories_created: AtomicUsize,
    /// Delay before the refresh endpoint answers
    pub refresh_delay: Mutex<Duration>,
    /// When set, the refresh endpoint answers with this status
    pub refresh_reject: Mutex<Option<StatusCode>>,
    /// Status returned by the logout endpoint
    pub logout_status: Mutex<StatusCode>,
    /// Lifetime of tokens issued at login
    pub login_ttl_secs: AtomicI64,
    /// Lifetime of tokens issued by refresh
    pub refresh_ttl_secs: AtomicI64,
    pub rotate_refresh: AtomicBool,
    pub role: Mutex<String>,
    valid_access: Mutex<HashSet<String>>,
    valid_refresh: Mutex<HashSet<String>>,
    /// Bearer tokens presented to protected routes, in arrival order
    pub seen_bearers: Mutex<Vec<String>>,
    /// Access tokens issued by the refresh endpoint
    pub refreshed_tokens: Mutex<Vec<String>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            always_unauthorized_hits: AtomicUsize::new(0),
            categories_created: AtomicUsize::new(0),
            refresh_delay: Mutex::new(Duration::ZERO),
            refresh_reject: Mutex::new(None),
            logout_status: Mutex::new(StatusCode::OK),
            login_ttl_secs: AtomicI64::new(3600),
            refresh_ttl_secs: AtomicI64::new(3600),
            rotate_refresh: AtomicBool::new(false),
            role: Mutex::new("user".to_string()),
            valid_access: Mutex::new(HashSet::new()),
            valid_refresh: Mutex::new(HashSet::new()),
            seen_bearers: Mutex::new(Vec::new()),
            refreshed_tokens: Mutex::new(Vec::new()),
        }
    }
}

#[allow(dead_code)]
impl MockState {
    /// Issue an access token the backend accepts.
    pub fn issue_access(&self, username: &str, ttl_secs: i64) -> String {
        let role = self.role.lock().unwrap().clone();
        let token = make_token(username, &role, ttl_secs);
        self.valid_access.lock().unwrap().insert(token.clone());
        token
    }

    pub fn issue_refresh(&self) -> String {
        let token = format!("refresh-{}", TOKEN_SEQ.fetch_add(1, Ordering::SeqCst));
        self.valid_refresh.lock().unwrap().insert(token.clone());
        token
    }

    /// Make every issued access token unacceptable, as if they expired.
    pub fn expire_access_tokens(&self) {
        self.valid_access.lock().unwrap().clear();
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn bearer_count(&self, token: &str) -> usize {
        self.seen_bearers
            .lock()
            .unwrap()
            .iter()
            .filter(|seen| seen.as_str() == token)
            .count()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(token) = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
        else {
            return false;
        };

        self.seen_bearers.lock().unwrap().push(token.to_string());
        self.valid_access.lock().unwrap().contains(token)
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub state: Arc<MockState>,
    pub base_url: String,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

#[allow(dead_code)]
impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url,
            server,
        }
    }

    pub fn config(&self) -> Config {
        Config::with_base_url(self.base_url.clone())
    }

    /// A client with in-memory credential storage.
    pub fn client(&self) -> Storefront {
        self.client_with(self.config())
    }

    pub fn client_with(&self, config: Config) -> Storefront {
        Storefront::new(config, Arc::new(MemoryStorage::new())).unwrap()
    }

    /// Store a credential whose access token the backend no longer accepts,
    /// paired with a valid refresh token. Returns the stale access token.
    pub fn seed_stale_session(&self, client: &Storefront) -> String {
        let stale = make_token("alice", "user", 3600);
        let refresh = self.state.issue_refresh();
        let credential = Credential::from_tokens(stale.clone(), refresh).unwrap();
        client.session.store().set(&credential).unwrap();
        stale
    }

    /// Store a credential the backend accepts. Returns the access token.
    pub fn seed_valid_session(&self, client: &Storefront) -> String {
        let access = self.state.issue_access("alice", 3600);
        let refresh = self.state.issue_refresh();
        let credential = Credential::from_tokens(access.clone(), refresh).unwrap();
        client.session.store().set(&credential).unwrap();
        access
    }
}

/// Base URL of a port nothing listens on.
#[allow(dead_code)]
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/user/login/", post(login))
        .route("/api/user/signup/", post(signup))
        .route("/api/user/logout/", post(logout))
        .route("/api/token/refresh/", post(refresh))
        .route("/api/cart/", get(cart))
        .route(
            "/api/cart/items/{id}/",
            patch(update_cart_item).delete(remove_cart_item),
        )
        .route("/api/cart/checkout/", post(checkout_cart))
        .route("/api/inventory/products/", get(products))
        .route(
            "/api/inventory/categories/",
            get(categories).post(create_category),
        )
        .route("/api/orders/mine/", get(my_orders))
        .route("/api/orders/{id}/status/", patch(update_order_status))
        .route("/api/always-unauthorized/", get(always_unauthorized))
        .with_state(state)
}

fn token_not_valid() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "detail": "Given token not valid for any token type",
            "code": "token_not_valid",
        })),
    )
        .into_response()
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    if body["password"].as_str() != Some(PASSWORD) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid credentials" })),
        )
            .into_response();
    }
    if username == "tokenless" {
        return Json(json!({ "message": "Login successful" })).into_response();
    }

    let ttl = state.login_ttl_secs.load(Ordering::SeqCst);
    let access = state.issue_access(username, ttl);
    let refresh = state.issue_refresh();
    Json(json!({
        "access": access,
        "refresh": refresh,
        "message": "Login successful",
    }))
    .into_response()
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["password"] != body["password2"] {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "password": ["Password fields didn't match."] })),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": {
                "username": body["username"],
                "email": body["email"],
                "first_name": body["first_name"],
                "last_name": body["last_name"],
            },
        })),
    )
        .into_response()
}

async fn logout(State(state): State<Arc<MockState>>) -> Response {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    let status = *state.logout_status.lock().unwrap();
    (status, Json(json!({ "detail": "Logged out" }))).into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *state.refresh_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let reject = *state.refresh_reject.lock().unwrap();
    if let Some(status) = reject {
        return (
            status,
            Json(json!({ "detail": "Token is invalid or expired", "code": "token_not_valid" })),
        )
            .into_response();
    }

    let presented = body["refresh"].as_str().unwrap_or_default().to_string();
    let known = state.valid_refresh.lock().unwrap().contains(&presented);
    if !known {
        return token_not_valid();
    }

    let ttl = state.refresh_ttl_secs.load(Ordering::SeqCst);
    let access = state.issue_access("alice", ttl);
    state.refreshed_tokens.lock().unwrap().push(access.clone());

    if state.rotate_refresh.load(Ordering::SeqCst) {
        state.valid_refresh.lock().unwrap().remove(&presented);
        let rotated = state.issue_refresh();
        return Json(json!({ "access": access, "refresh": rotated })).into_response();
    }
    Json(json!({ "access": access })).into_response()
}

fn product_json(id: u64, name: &str, is_live: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "gender": "unisex",
        "color": "navy",
        "price": "49.99",
        "image_url": [format!("https://cdn.example.com/{id}.jpg")],
        "total_stock_by_sizes": { "S": 2, "M": 5 },
        "description": "",
        "is_live": is_live,
        "sizes": ["S", "M"],
        "category": 1,
        "subcategory": 2,
        "category_name": "Tops",
        "subcategory_name": "Shirts",
    })
}

fn cart_item_json(id: u64, quantity: u64) -> Value {
    json!({
        "id": id,
        "product": 10,
        "product_detail": product_json(10, "Linen Shirt", true),
        "size": "M",
        "quantity": quantity,
        "price_at_add": "49.99",
    })
}

fn order_json(id: u64, status: &str, return_reason: Option<&str>) -> Value {
    json!({
        "id": id,
        "user": 42,
        "status": status,
        "first_name": "Test",
        "last_name": "User",
        "email": "alice@example.com",
        "phone": null,
        "first_address": "1 Main St",
        "second_address": null,
        "is_office_address": false,
        "return_reason": return_reason,
        "ip_address": "127.0.0.1",
        "items": [{
            "id": 1,
            "product": 10,
            "size": "M",
            "quantity": 1,
            "price_at_purchase": "49.99",
        }],
    })
}

async fn cart(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return token_not_valid();
    }
    Json(json!({
        "id": 1,
        "user": 42,
        "items": [cart_item_json(1, 2), cart_item_json(2, 1)],
    }))
    .into_response()
}

async fn update_cart_item(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return token_not_valid();
    }
    let quantity = body["quantity"].as_u64().unwrap_or_default();
    if quantity < 1 {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(cart_item_json(id, quantity)).into_response()
}

async fn remove_cart_item(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return token_not_valid();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn checkout_cart(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return token_not_valid();
    }
    Json(json!({ "detail": "Checkout complete" })).into_response()
}

async fn products() -> Json<Value> {
    Json(json!([
        product_json(10, "Linen Shirt", true),
        product_json(11, "Wool Coat", false),
    ]))
}

async fn categories() -> Json<Value> {
    Json(json!([{ "id": 1, "name": "Tops" }]))
}

async fn create_category(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return token_not_valid();
    }
    state.categories_created.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CREATED,
        Json(json!({ "id": 2, "name": body["name"] })),
    )
        .into_response()
}

async fn my_orders(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return token_not_valid();
    }
    Json(json!([order_json(5, "pending", None)])).into_response()
}

async fn update_order_status(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return token_not_valid();
    }
    let status = body["status"].as_str().unwrap_or("pending");
    Json(order_json(id, status, body["return_reason"].as_str())).into_response()
}

async fn always_unauthorized(State(state): State<Arc<MockState>>) -> Response {
    state.always_unauthorized_hits.fetch_add(1, Ordering::SeqCst);
    token_not_valid()
}
