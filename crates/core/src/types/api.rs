//! Typed envelopes for the shop API's JSON bodies.
//!
//! The API has no shared schema. Each envelope declares only the keys a
//! check reads; everything else in a body is ignored. List fields default to
//! empty when the key is missing, except where a check requires the key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::ProductId;

// =============================================================================
// Authentication
// =============================================================================

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub message: Option<String>,
    pub user: Option<UserSummary>,
}

/// Token-only view of the login body.
///
/// Used where only the bearer credential matters; the `user` object is not
/// read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub message: Option<String>,
}

/// User object nested in a successful login.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Error body returned by a rejected request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorEnvelope {
    /// The error text, preferring `error` over `message`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// Body of `GET /api/user/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: Option<ProfileUser>,
    pub message: Option<String>,
}

/// User object returned by the profile endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUser {
    pub email: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Body of `GET /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<ProductSummary>,
}

/// A product as listed in the catalog.
///
/// Price is kept as raw JSON since the API sends it as a number or a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSummary {
    pub name: Option<String>,
    pub price: Option<Value>,
}

/// Body of `GET /api/categories`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Vec<Value>,
}

/// Body of `GET /api/brands`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandsResponse {
    #[serde(default)]
    pub brands: Vec<Value>,
}

// =============================================================================
// Cart
// =============================================================================

/// Message the API returns when a cart mutation succeeds.
pub const CART_UPDATED_MESSAGE: &str = "Cart updated successfully";

/// Body of `GET /api/cart`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Vec<Value>,
    pub total: Option<Value>,
}

/// Body of `POST /api/cart/items`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartMutationResponse {
    pub message: Option<String>,
    pub success: Option<Value>,
}

impl CartMutationResponse {
    /// Whether the mutation reported success, either through the exact
    /// success message or a truthy `success` flag.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.message.as_deref() == Some(CART_UPDATED_MESSAGE)
            || self.success.as_ref().is_some_and(is_truthy)
    }
}

/// Request body for `POST /api/cart/items`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartItemRequest {
    /// The item the workflow check adds: two units of product 1.
    #[must_use]
    pub const fn sample() -> Self {
        Self {
            product_id: ProductId::new(1),
            quantity: 2,
        }
    }
}

// =============================================================================
// Checkout & orders
// =============================================================================

/// Body of `GET /api/checkout/shipping-methods`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethodsResponse {
    #[serde(default)]
    pub shipping_methods: Vec<Value>,
}

/// Request body for `POST /api/checkout/validate-address`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl AddressPayload {
    /// The address the checkout check submits for validation.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            street: "123 Main St".to_owned(),
            city: "San Francisco".to_owned(),
            state: "CA".to_owned(),
            postal_code: "94105".to_owned(),
            country: "US".to_owned(),
        }
    }
}

/// Body of `GET /api/orders`. The `orders` key is required.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<Value>,
}

/// JSON truthiness: `false`, `null`, `0`, `""`, `[]` and `{}` are false.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
