//! Shared fixtures for store and service tests.

use std::sync::Arc;

use jiff::Timestamp;
use tempfile::TempDir;
use testresult::TestResult;
use wrapshop::{
    cart::{Cart, CartLine},
    checkout::{CustomerDetails, DeliveryMethod},
    orders::{Order, OrderStatus},
};

use crate::{
    api::{ApiClient, LoginResponse, MockApiClient},
    cart::CartStore,
    checkout::CheckoutService,
    orders::OrdersService,
    session::{Role, SessionStore, TokenStore, User},
};

/// A cart line with the given identity, price, and quantity.
pub fn line(product_id: &str, option_index: u32, unit_price: f64, quantity: u32) -> CartLine {
    CartLine {
        product_id: product_id.to_string(),
        product_name: format!("Product {product_id}"),
        option_name: format!("Option {option_index}"),
        option_index,
        unit_price,
        quantity,
        image_url: String::new(),
        note: None,
        attached_image: None,
    }
}

/// A regular shopper account.
pub fn customer() -> User {
    User {
        id: "u1".to_string(),
        username: "dana".to_string(),
        role: Role::Customer,
    }
}

/// An administrator account.
pub fn admin() -> User {
    User {
        id: "u2".to_string(),
        username: "noor".to_string(),
        role: Role::Admin,
    }
}

/// A freshly created order in `pending` status.
pub fn pending_order(id: &str) -> Order {
    Order {
        id: id.to_string(),
        date: Timestamp::now(),
        items: vec![line("p1", 0, 100.0, 2)],
        subtotal: 200.0,
        total: 234.0,
        delivery_method: Some(DeliveryMethod::Pickup),
        shipping_fee: Some(0.0),
        status: OrderStatus::Pending,
        customer_details: None,
    }
}

/// Checkout details that pass every field rule.
pub fn valid_details(delivery_method: DeliveryMethod) -> CustomerDetails {
    CustomerDetails {
        full_name: "Dana Levi".to_string(),
        phone: "0501234567".to_string(),
        email: Some("dana@example.com".to_string()),
        city: "Haifa".to_string(),
        street: "Herzl".to_string(),
        house_number: "12".to_string(),
        postal_code: Some("3303312".to_string()),
        notes: None,
        delivery_method,
        shipping_fee: delivery_method.fee(),
        accepted_terms: true,
        items_meta: Vec::new(),
    }
}

/// The wired-together stores a test exercises, with their token directory
/// kept alive for the test's duration.
pub struct TestStores {
    pub api: Arc<dyn ApiClient>,
    pub session: Arc<SessionStore>,
    pub cart: Arc<CartStore>,
    _dir: TempDir,
}

impl TestStores {
    pub fn checkout_service(&self) -> CheckoutService {
        CheckoutService::new(
            Arc::clone(&self.api),
            Arc::clone(&self.session),
            Arc::clone(&self.cart),
        )
    }

    pub fn orders_service(&self) -> OrdersService {
        OrdersService::new(Arc::clone(&self.api), Arc::clone(&self.session))
    }
}

/// Wires stores over `api` without logging in.
pub async fn logged_out_stores(api: MockApiClient) -> TestResult<TestStores> {
    let dir = tempfile::tempdir()?;
    let tokens = Arc::new(TokenStore::open(dir.path().join("token"))?);

    let api: Arc<dyn ApiClient> = Arc::new(api);
    let session = Arc::new(SessionStore::new(Arc::clone(&api), tokens));
    let cart = Arc::new(CartStore::new(Arc::clone(&api), Arc::clone(&session)));

    Ok(TestStores {
        api,
        session,
        cart,
        _dir: dir,
    })
}

/// Wires stores over `api` and establishes a customer session.
pub async fn logged_in_stores(mut api: MockApiClient) -> TestResult<TestStores> {
    api.expect_login().returning(|_, _| {
        Ok(LoginResponse {
            token: "tok-test".to_string(),
            user: customer(),
        })
    });

    let stores = logged_out_stores(api).await?;

    assert!(
        stores.session.login("dana", "secret").await,
        "fixture login should succeed"
    );

    Ok(stores)
}

/// Wires logged-in stores whose cart has been loaded with `initial`.
pub async fn logged_in_with_cart(mut api: MockApiClient, initial: Cart) -> TestResult<TestStores> {
    api.expect_fetch_cart()
        .times(1)
        .returning(move || Ok(initial.clone()));

    let stores = logged_in_stores(api).await?;
    stores.cart.load().await?;

    Ok(stores)
}
