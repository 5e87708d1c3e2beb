//! End-to-end shopping workflow check.
//!
//! Logs in once, then walks the catalog, cart, checkout and order history
//! endpoints with the issued token. Thresholds assume the standard seed
//! dataset.

use shop_smoke_core::{
    AddressPayload, BearerToken, BrandsResponse, CartItemRequest, CartMutationResponse,
    CartResponse, CategoriesResponse, Credentials, OrdersResponse, ProductsResponse,
    ShippingMethodsResponse,
};
use tracing::debug;

use super::auth::login_token;
use super::{CheckError, StageFailure, conclude, decode, display_value, endpoints};
use crate::probe::{ApiProbe, ProbeRequest};
use crate::report::Reporter;

/// Name used in the closing diagnostic.
pub const NAME: &str = "E-commerce workflow test";

/// Minimum catalog size of the seed dataset.
pub const MIN_PRODUCTS: usize = 12;

/// Minimum number of shipping options of the seed dataset.
pub const MIN_SHIPPING_METHODS: usize = 4;

/// Run the workflow check.
///
/// # Errors
///
/// Returns the first failing stage. Diagnostics for every stage, including
/// the failing one, have already been written to `out`.
pub async fn run<R: Reporter>(
    probe: &ApiProbe,
    credentials: &Credentials,
    out: &mut R,
) -> Result<(), StageFailure> {
    out.banner("E-commerce Workflow Test");
    let result = stages(probe, credentials, out).await;
    let passed = result.is_ok();
    let result = conclude(out, NAME, result);

    if passed {
        out.section("Summary:");
        out.line("- Product catalog: ✓ 12+ products, categories, brands".to_owned());
        out.line("- Cart operations: ✓ Items can be added and cart updates".to_owned());
        out.line("- Checkout flow: ✓ Shipping methods and address validation answering".to_owned());
        out.line("- Order history: ✓ Accessible with authentication".to_owned());
        out.line("- Authentication: ✓ Bearer tokens accepted by protected endpoints".to_owned());
    }
    result
}

async fn stages<R: Reporter>(
    probe: &ApiProbe,
    credentials: &Credentials,
    out: &mut R,
) -> Result<(), StageFailure> {
    out.section("Authenticating...");
    let token = &login_token(probe, credentials)
        .await
        .map_err(StageFailure::at("authentication"))?;
    out.pass("Authentication successful");

    check_catalog(probe, out)
        .await
        .map_err(StageFailure::at("product catalog"))?;
    check_cart(probe, token, out)
        .await
        .map_err(StageFailure::at("cart operations"))?;
    check_checkout(probe, token, out)
        .await
        .map_err(StageFailure::at("checkout flow"))?;
    check_order_history(probe, token, out)
        .await
        .map_err(StageFailure::at("order history"))
}

async fn check_catalog<R: Reporter>(probe: &ApiProbe, out: &mut R) -> Result<(), CheckError> {
    out.section("Testing product catalog...");

    let body = probe.call(ProbeRequest::get(endpoints::PRODUCTS)).await?;
    let catalog: ProductsResponse = decode(endpoints::PRODUCTS, &body)?;
    let count = catalog.products.len();
    if count < MIN_PRODUCTS {
        return Err(CheckError::Rejected(format!(
            "Products API returned {count} products, expected at least {MIN_PRODUCTS}"
        )));
    }
    out.pass(&format!("Products API: {count} products returned"));
    if let Some(sample) = catalog.products.first() {
        out.detail(&format!(
            "Sample product: {} - ${}",
            sample.name.as_deref().unwrap_or("n/a"),
            display_value(sample.price.as_ref())
        ));
    }

    // Categories and brands are informational: any count is accepted.
    let body = probe.call(ProbeRequest::get(endpoints::CATEGORIES)).await?;
    let categories: CategoriesResponse = decode(endpoints::CATEGORIES, &body)?;
    out.pass(&format!(
        "Categories API: {} categories returned",
        categories.categories.len()
    ));

    let body = probe.call(ProbeRequest::get(endpoints::BRANDS)).await?;
    let brands: BrandsResponse = decode(endpoints::BRANDS, &body)?;
    out.pass(&format!("Brands API: {} brands returned", brands.brands.len()));

    Ok(())
}

async fn fetch_cart(probe: &ApiProbe, token: &BearerToken) -> Result<CartResponse, CheckError> {
    let body = probe
        .call(ProbeRequest::get(endpoints::CART).bearer(token))
        .await?;
    decode(endpoints::CART, &body)
}

async fn check_cart<R: Reporter>(
    probe: &ApiProbe,
    token: &BearerToken,
    out: &mut R,
) -> Result<(), CheckError> {
    out.section("Testing cart operations...");

    let before = fetch_cart(probe, token).await?.items.len();
    out.pass(&format!("Cart retrieved: {before} items"));

    let item = CartItemRequest::sample();
    debug!(product_id = %item.product_id, quantity = item.quantity, "Adding item to cart");
    let request = ProbeRequest::post(endpoints::CART_ITEMS, &item)?.bearer(token);
    let body = probe.call(request).await?;
    let mutation: CartMutationResponse = decode(endpoints::CART_ITEMS, &body)?;
    if !mutation.succeeded() {
        return Err(CheckError::Rejected(format!(
            "Failed to add item: {}",
            mutation.message.as_deref().unwrap_or("Unknown error")
        )));
    }
    out.pass("Item added to cart successfully");

    let cart = fetch_cart(probe, token).await?;
    let after = cart.items.len();
    if after == 0 {
        return Err(CheckError::Rejected(format!(
            "Cart is still empty after adding product {}",
            item.product_id
        )));
    }
    out.pass(&format!(
        "Cart updated: {after} items, total: ${}",
        display_value(cart.total.as_ref())
    ));
    debug!(before, after, "Cart item count");

    Ok(())
}

async fn check_checkout<R: Reporter>(
    probe: &ApiProbe,
    token: &BearerToken,
    out: &mut R,
) -> Result<(), CheckError> {
    out.section("Testing checkout flow...");

    let body = probe
        .call(ProbeRequest::get(endpoints::SHIPPING_METHODS).bearer(token))
        .await?;
    let shipping: ShippingMethodsResponse = decode(endpoints::SHIPPING_METHODS, &body)?;
    let count = shipping.shipping_methods.len();
    if count < MIN_SHIPPING_METHODS {
        return Err(CheckError::Rejected(format!(
            "Shipping methods API returned {count} options, expected at least {MIN_SHIPPING_METHODS}"
        )));
    }
    out.pass(&format!("Shipping methods: {count} options available"));

    // Only checks that the endpoint answers with JSON; the verdict is not
    // inspected.
    let request =
        ProbeRequest::post(endpoints::VALIDATE_ADDRESS, &AddressPayload::sample())?.bearer(token);
    let body = probe.call(request).await?;
    let verdict: serde_json::Value = decode(endpoints::VALIDATE_ADDRESS, &body)?;
    out.pass(&format!(
        "Address validation API working: {}",
        display_value(verdict.get("message"))
    ));

    Ok(())
}

async fn check_order_history<R: Reporter>(
    probe: &ApiProbe,
    token: &BearerToken,
    out: &mut R,
) -> Result<(), CheckError> {
    out.section("Testing order history...");

    let body = probe
        .call(ProbeRequest::get(endpoints::ORDERS).bearer(token))
        .await?;
    let history: OrdersResponse = decode(endpoints::ORDERS, &body)?;
    out.pass(&format!("Orders API: {} orders in history", history.orders.len()));

    Ok(())
}
