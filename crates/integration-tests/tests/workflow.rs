//! Integration tests for the e-commerce workflow check.

use shop_smoke_cli::checks::{CheckError, StageFailure, workflow};
use shop_smoke_cli::report::MemoryReporter;
use shop_smoke_integration_tests::{
    AddressMode, CartMode, CatalogMode, LoginMode, OrdersMode, ShopFixture, StubShop,
    credentials, customer,
};

async fn run_against(
    fixture: ShopFixture,
) -> (StubShop, MemoryReporter, Result<(), StageFailure>) {
    let shop = StubShop::with_fixture(fixture).await;
    let mut out = MemoryReporter::new();
    let result = workflow::run(&shop.probe(), &customer(), &mut out).await;
    (shop, out, result)
}

#[tokio::test]
async fn test_workflow_passes_against_seeded_shop() {
    let (shop, out, result) = run_against(ShopFixture::default()).await;

    result.expect("workflow should pass");
    assert!(out.contains("✓ Authentication successful"));
    assert!(out.contains("✓ Products API: 12 products returned"));
    assert!(out.contains("  Sample product: Product 1 - $19.99"));
    assert!(out.contains("✓ Categories API: 3 categories returned"));
    assert!(out.contains("✓ Brands API: 2 brands returned"));
    assert!(out.contains("✓ Cart retrieved: 0 items"));
    assert!(out.contains("✓ Cart updated: 1 items, total: $1999.98"));
    assert!(out.contains("✓ Shipping methods: 4 options available"));
    assert!(out.contains("✓ Address validation API working: Address is valid"));
    assert!(out.contains("✓ Orders API: 1 orders in history"));
    assert!(out.contains("✓ E-commerce workflow test PASSED"));
    assert!(out.contains("Summary:"));
    assert_eq!(shop.cart_len(), 1);
}

#[tokio::test]
async fn test_adding_item_grows_cart() {
    let shop = StubShop::start().await;
    assert_eq!(shop.cart_len(), 0);

    let mut out = MemoryReporter::new();
    workflow::run(&shop.probe(), &customer(), &mut out)
        .await
        .expect("workflow should pass");

    assert!(shop.cart_len() > 0);
}

#[tokio::test]
async fn test_adding_item_to_seeded_cart() {
    let (shop, out, result) = run_against(ShopFixture {
        seeded_cart_items: 2,
        ..ShopFixture::default()
    })
    .await;

    result.expect("workflow should pass");
    assert!(out.contains("✓ Cart retrieved: 2 items"));
    assert!(out.contains("✓ Cart updated: 3 items, total: $5997.98"));
    assert_eq!(shop.cart_len(), 3);
}

#[tokio::test]
async fn test_unchanged_non_empty_cart_still_passes() {
    // The cart assertion is "non-empty after the add", not "grew".
    let (shop, out, result) = run_against(ShopFixture {
        seeded_cart_items: 1,
        cart: CartMode::SilentlyIgnored,
        ..ShopFixture::default()
    })
    .await;

    result.expect("non-empty cart should pass");
    assert!(out.contains("✓ Cart retrieved: 1 items"));
    assert!(out.contains("✓ Cart updated: 1 items, total: $1999.98"));
    assert_eq!(shop.cart_len(), 1);
}

#[tokio::test]
async fn test_token_only_login_is_enough() {
    let (shop, out, result) = run_against(ShopFixture {
        login: LoginMode::TokenOnly,
        ..ShopFixture::default()
    })
    .await;

    result.expect("a bare token should be enough for the workflow");
    assert!(out.contains("✓ Authentication successful"));
    assert!(shop.requests().iter().any(|r| r == "GET /api/products"));
}

#[tokio::test]
async fn test_broken_categories_fails_catalog_stage() {
    let (shop, _out, result) = run_against(ShopFixture {
        catalog: CatalogMode::BrokenCategories,
        ..ShopFixture::default()
    })
    .await;

    let failure = result.expect_err("HTML categories must fail");
    assert_eq!(failure.stage, "product catalog");
    assert!(matches!(failure.source, CheckError::MalformedJson { .. }));
    assert!(!shop.requests().iter().any(|r| r == "GET /api/brands"));
}

#[tokio::test]
async fn test_broken_brands_fails_catalog_stage() {
    let (shop, out, result) = run_against(ShopFixture {
        catalog: CatalogMode::BrokenBrands,
        ..ShopFixture::default()
    })
    .await;

    let failure = result.expect_err("HTML brands must fail");
    assert_eq!(failure.stage, "product catalog");
    assert!(matches!(failure.source, CheckError::MalformedJson { .. }));
    assert!(out.contains("✓ Categories API: 3 categories returned"));
    assert!(!shop.requests().iter().any(|r| r.contains("/api/cart")));
}

#[tokio::test]
async fn test_negative_address_verdict_still_passes() {
    let (_shop, out, result) = run_against(ShopFixture {
        address: AddressMode::Invalid,
        ..ShopFixture::default()
    })
    .await;

    result.expect("any JSON verdict should pass");
    assert!(out.contains("✓ Address validation API working: Invalid ZIP"));
    assert!(out.contains("✓ E-commerce workflow test PASSED"));
}

#[tokio::test]
async fn test_success_flag_is_accepted() {
    let (_shop, _out, result) = run_against(ShopFixture {
        cart: CartMode::SuccessFlag,
        ..ShopFixture::default()
    })
    .await;

    result.expect("success flag should count as success");
}

#[tokio::test]
async fn test_small_catalog_fails_catalog_stage() {
    let (shop, out, result) = run_against(ShopFixture {
        products: 11,
        ..ShopFixture::default()
    })
    .await;

    let failure = result.expect_err("11 products must fail");
    assert_eq!(failure.stage, "product catalog");
    assert!(out.contains("expected at least 12"));
    assert!(!shop.requests().iter().any(|r| r.contains("/api/cart")));
}

#[tokio::test]
async fn test_rejected_cart_item_fails_cart_stage() {
    let (_shop, out, result) = run_against(ShopFixture {
        cart: CartMode::Rejected,
        ..ShopFixture::default()
    })
    .await;

    let failure = result.expect_err("rejected item must fail");
    assert_eq!(failure.stage, "cart operations");
    assert!(out.contains("✗ Failed to add item: Product out of stock"));
}

#[tokio::test]
async fn test_empty_cart_after_add_fails_cart_stage() {
    let (_shop, out, result) = run_against(ShopFixture {
        cart: CartMode::SilentlyIgnored,
        ..ShopFixture::default()
    })
    .await;

    let failure = result.expect_err("empty cart must fail");
    assert_eq!(failure.stage, "cart operations");
    assert!(out.contains("Cart is still empty after adding product 1"));
}

#[tokio::test]
async fn test_few_shipping_methods_fails_checkout_stage() {
    let (_shop, out, result) = run_against(ShopFixture {
        shipping_methods: 3,
        ..ShopFixture::default()
    })
    .await;

    let failure = result.expect_err("3 shipping methods must fail");
    assert_eq!(failure.stage, "checkout flow");
    assert!(out.contains("✗ E-commerce workflow test failed at checkout flow"));
}

#[tokio::test]
async fn test_html_orders_page_is_malformed_json() {
    let (_shop, _out, result) = run_against(ShopFixture {
        orders: OrdersMode::Html,
        ..ShopFixture::default()
    })
    .await;

    let failure = result.expect_err("HTML must fail");
    assert_eq!(failure.stage, "order history");
    assert!(matches!(failure.source, CheckError::MalformedJson { .. }));
}

#[tokio::test]
async fn test_orders_without_list_fails() {
    let (_shop, _out, result) = run_against(ShopFixture {
        orders: OrdersMode::MissingKey,
        ..ShopFixture::default()
    })
    .await;

    let failure = result.expect_err("missing orders key must fail");
    assert_eq!(failure.stage, "order history");
    assert!(matches!(failure.source, CheckError::UnexpectedShape { .. }));
}

#[tokio::test]
async fn test_failed_login_stops_before_catalog() {
    let shop = StubShop::start().await;
    let mut out = MemoryReporter::new();

    let bad = credentials("customer@example.com", "nope");

    let failure = workflow::run(&shop.probe(), &bad, &mut out)
        .await
        .expect_err("bad login must fail");

    assert_eq!(failure.stage, "authentication");
    assert_eq!(shop.requests(), ["POST /api/auth/login"]);
    assert!(!out.contains("Summary:"));
}
