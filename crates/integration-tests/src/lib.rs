//! Integration tests for Shop Smoke.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-smoke-integration-tests
//! ```
//!
//! The checks run against [`StubShop`], an in-process axum server bound to
//! an ephemeral `127.0.0.1` port that answers the shop API endpoints with
//! the seed dataset. [`ShopFixture`] bends individual endpoints so each
//! failure path can be reached without a real backend.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use shop_smoke_core::credential::{DEFAULT_EMAIL, DEFAULT_PASSWORD};
use shop_smoke_core::{CART_UPDATED_MESSAGE, Credentials, Email};
use shop_smoke_cli::probe::ApiProbe;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Token the stub issues on a successful login.
pub const STUB_TOKEN: &str = "stub-access-token";

/// How `POST /api/cart/items` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMode {
    /// `{"message": "Cart updated successfully"}`
    Message,
    /// `{"success": true, "message": "Added"}`
    SuccessFlag,
    /// Acknowledges the request without adding anything.
    SilentlyIgnored,
    /// `{"message": "Product out of stock"}` with status 400
    Rejected,
}

/// How `GET /api/orders` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdersMode {
    /// `{"orders": [...]}`
    List,
    /// `{"message": "ok"}` without an `orders` key
    MissingKey,
    /// An HTML error page
    Html,
}

/// How `POST /api/auth/login` answers a valid login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// Token plus the full user object.
    Full,
    /// Token plus a user object with only `id` and `email`.
    TokenOnly,
}

/// How `GET /api/categories` and `GET /api/brands` answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMode {
    /// Both answer with their lists.
    Complete,
    /// Categories answers with an HTML error page.
    BrokenCategories,
    /// Brands answers with an HTML error page.
    BrokenBrands,
}

/// How `POST /api/checkout/validate-address` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// `{"valid": true, "message": "Address is valid"}`
    Valid,
    /// `{"valid": false, "message": "Invalid ZIP"}` with status 422
    Invalid,
}

/// Knobs for the stub's behaviour. `Default` is the seed dataset.
#[derive(Debug, Clone)]
pub struct ShopFixture {
    pub products: usize,
    pub shipping_methods: usize,
    /// Whether the profile endpoint rejects requests without a token.
    pub enforce_auth: bool,
    pub login: LoginMode,
    pub catalog: CatalogMode,
    /// Line items already in the cart when the stub starts.
    pub seeded_cart_items: usize,
    pub cart: CartMode,
    pub address: AddressMode,
    pub orders: OrdersMode,
}

impl Default for ShopFixture {
    fn default() -> Self {
        Self {
            products: 12,
            shipping_methods: 4,
            enforce_auth: true,
            login: LoginMode::Full,
            catalog: CatalogMode::Complete,
            seeded_cart_items: 0,
            cart: CartMode::Message,
            address: AddressMode::Valid,
            orders: OrdersMode::List,
        }
    }
}

#[derive(Debug)]
struct ShopState {
    fixture: ShopFixture,
    cart: Vec<Value>,
    requests: Vec<String>,
}

type SharedState = Arc<Mutex<ShopState>>;

fn lock(state: &SharedState) -> std::sync::MutexGuard<'_, ShopState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running stub shop. The server stops when this is dropped.
pub struct StubShop {
    base_url: Url,
    state: SharedState,
    server: JoinHandle<()>,
}

impl StubShop {
    /// Start a stub with the seed dataset.
    pub async fn start() -> Self {
        Self::with_fixture(ShopFixture::default()).await
    }

    /// Start a stub with custom behaviour.
    pub async fn with_fixture(fixture: ShopFixture) -> Self {
        let cart = (0..fixture.seeded_cart_items)
            .map(|i| json!({"productId": i + 2, "quantity": 1}))
            .collect();
        let state: SharedState = Arc::new(Mutex::new(ShopState {
            fixture,
            cart,
            requests: Vec::new(),
        }));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub listener");
        let addr = listener.local_addr().expect("Stub listener has no address");
        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub server failed");
        });

        let base_url = Url::parse(&format!("http://{addr}/")).expect("Invalid stub URL");
        Self {
            base_url,
            state,
            server,
        }
    }

    /// Base URL of the stub, ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// A probe pointed at the stub.
    #[must_use]
    pub fn probe(&self) -> ApiProbe {
        ApiProbe::new(self.base_url()).expect("Failed to build probe")
    }

    /// Number of line items currently in the stub cart.
    #[must_use]
    pub fn cart_len(&self) -> usize {
        lock(&self.state).cart.len()
    }

    /// `METHOD /path` of every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }
}

impl Drop for StubShop {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// The seeded customer account.
#[must_use]
pub fn customer() -> Credentials {
    credentials(DEFAULT_EMAIL, DEFAULT_PASSWORD)
}

/// Arbitrary credentials.
#[must_use]
pub fn credentials(email: &str, password: &str) -> Credentials {
    Credentials::new(
        Email::parse(email).expect("Invalid test email"),
        SecretString::from(password.to_owned()),
    )
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/user/profile", get(profile))
        .route("/api/products", get(products))
        .route("/api/categories", get(categories))
        .route("/api/brands", get(brands))
        .route("/api/cart", get(cart))
        .route("/api/cart/items", post(add_cart_item))
        .route("/api/checkout/shipping-methods", get(shipping_methods))
        .route("/api/checkout/validate-address", post(validate_address))
        .route("/api/orders", get(orders))
        .with_state(state)
}

fn record(state: &SharedState, request: &str) {
    lock(state).requests.push(request.to_owned());
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == STUB_TOKEN)
}

fn error_page(status: StatusCode) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>Internal Server Error</body></html>",
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Access token required"})),
    )
        .into_response()
}

async fn login(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    record(&state, "POST /api/auth/login");
    let valid = body.get("email").and_then(Value::as_str) == Some(DEFAULT_EMAIL)
        && body.get("password").and_then(Value::as_str) == Some(DEFAULT_PASSWORD);

    if !valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
            .into_response();
    }

    if lock(&state).fixture.login == LoginMode::TokenOnly {
        return Json(json!({
            "accessToken": STUB_TOKEN,
            "user": {"id": 2, "email": DEFAULT_EMAIL}
        }))
        .into_response();
    }

    Json(json!({
        "message": "Login successful",
        "accessToken": STUB_TOKEN,
        "refreshToken": "stub-refresh-token",
        "user": {
            "id": 2,
            "name": "Jane Customer",
            "email": DEFAULT_EMAIL,
            "role": "customer"
        }
    }))
    .into_response()
}

async fn profile(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    record(&state, "GET /api/user/profile");
    if authorized(&headers) {
        return Json(json!({
            "user": {"id": 2, "name": "Jane Customer", "email": DEFAULT_EMAIL, "role": "customer"}
        }))
        .into_response();
    }
    if lock(&state).fixture.enforce_auth {
        return unauthorized();
    }
    Json(json!({"message": "Welcome, guest"})).into_response()
}

async fn products(State(state): State<SharedState>) -> Json<Value> {
    record(&state, "GET /api/products");
    let count = lock(&state).fixture.products;
    let products: Vec<Value> = (1..=count)
        .map(|id| json!({"id": id, "name": format!("Product {id}"), "price": "19.99"}))
        .collect();
    Json(json!({"products": products, "total": count}))
}

async fn categories(State(state): State<SharedState>) -> Response {
    record(&state, "GET /api/categories");
    if lock(&state).fixture.catalog == CatalogMode::BrokenCategories {
        return error_page(StatusCode::SERVICE_UNAVAILABLE);
    }
    Json(json!({"categories": [
        {"id": 1, "name": "Electronics"},
        {"id": 2, "name": "Clothing"},
        {"id": 3, "name": "Home & Garden"}
    ]}))
    .into_response()
}

async fn brands(State(state): State<SharedState>) -> Response {
    record(&state, "GET /api/brands");
    if lock(&state).fixture.catalog == CatalogMode::BrokenBrands {
        return error_page(StatusCode::BAD_GATEWAY);
    }
    Json(json!({"brands": [{"id": 1, "name": "TechPro"}, {"id": 2, "name": "StyleCo"}]}))
        .into_response()
}

async fn cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    record(&state, "GET /api/cart");
    if !authorized(&headers) {
        return unauthorized();
    }
    let items = lock(&state).cart.clone();
    let total = format!("{}.98", items.len() * 1999);
    Json(json!({"items": items, "total": total})).into_response()
}

async fn add_cart_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "POST /api/cart/items");
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut shop = lock(&state);
    let item = json!({
        "productId": body.get("productId").cloned().unwrap_or(Value::Null),
        "quantity": body.get("quantity").cloned().unwrap_or(Value::Null)
    });
    match shop.fixture.cart {
        CartMode::Message => {
            shop.cart.push(item);
            Json(json!({"message": CART_UPDATED_MESSAGE})).into_response()
        }
        CartMode::SuccessFlag => {
            shop.cart.push(item);
            Json(json!({"success": true, "message": "Added"})).into_response()
        }
        CartMode::SilentlyIgnored => Json(json!({"message": CART_UPDATED_MESSAGE})).into_response(),
        CartMode::Rejected => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Product out of stock"})),
        )
            .into_response(),
    }
}

async fn shipping_methods(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    record(&state, "GET /api/checkout/shipping-methods");
    if !authorized(&headers) {
        return unauthorized();
    }
    let count = lock(&state).fixture.shipping_methods;
    let methods: Vec<Value> = (1..=count)
        .map(|id| json!({"id": id, "name": format!("Method {id}"), "price": 5.99}))
        .collect();
    Json(json!({"shippingMethods": methods})).into_response()
}

async fn validate_address(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    record(&state, "POST /api/checkout/validate-address");
    if !authorized(&headers) {
        return unauthorized();
    }
    match lock(&state).fixture.address {
        AddressMode::Valid => {
            Json(json!({"valid": true, "message": "Address is valid"})).into_response()
        }
        AddressMode::Invalid => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"valid": false, "message": "Invalid ZIP"})),
        )
            .into_response(),
    }
}

async fn orders(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    record(&state, "GET /api/orders");
    if !authorized(&headers) {
        return unauthorized();
    }
    match lock(&state).fixture.orders {
        OrdersMode::List => {
            Json(json!({"orders": [{"id": 1001, "status": "delivered"}]})).into_response()
        }
        OrdersMode::MissingKey => Json(json!({"message": "ok"})).into_response(),
        OrdersMode::Html => error_page(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
