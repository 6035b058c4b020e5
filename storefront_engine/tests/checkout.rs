use serde_json::{json, Value};
use shop_common::Money;
use storefront_engine::{
    api::ORDERS_PATH,
    cart::CART_KEY,
    errors::{ApiError, ValidationError},
    orders::{build_payload, my_orders},
    session::{Role, SessionUser},
    store_types::{CartItem, OrderId, ProductId, UserId},
    test_utils::json_response,
    traits::{HttpMethod, KeyValueStore},
    CartStore,
    OrderSubmissionService,
};

mod support;

use support::{sign_in, storefront};

fn shopper() -> SessionUser {
    SessionUser {
        id: Some(UserId(12)),
        email: Some("lea@example.com".into()),
        first_name: Some("Léa".into()),
        last_name: None,
        role: Role::Customer,
    }
}

#[tokio::test]
async fn cart_to_order() {
    let shop = storefront();
    sign_in(&shop, shopper());
    shop.transport.respond(
        HttpMethod::Post,
        ORDERS_PATH,
        json_response(201, json!({"id": 88, "status": "PENDING", "totalPrice": 110})),
    );

    let items = shop.cart.add_item(shop.cart.load(), CartItem::new(ProductId(1), "Ambre", Money::from(50)));
    let items = shop.cart.add_item(items, CartItem::new(ProductId(2), "Iris", Money::from(10)));
    let items = shop.cart.update_quantity(items, ProductId(1), 1);
    assert_eq!(CartStore::<storefront_engine::test_utils::MemoryStore>::total(&items), Money::from(110));

    let payload = build_payload(shop.session.user().and_then(|u| u.id), &items).unwrap();
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        json["items"],
        json!([
            {"perfumeId": 1, "quantity": 2, "unitPrice": 50.0},
            {"perfumeId": 2, "quantity": 1, "unitPrice": 10.0}
        ])
    );

    let service = OrderSubmissionService::new(shop.api.clone(), shop.cart.clone());
    let order = service.submit(&payload).await.unwrap().unwrap();
    assert_eq!(order.id, OrderId(88));
    assert!(shop.store.get_item(CART_KEY).is_none());
    assert!(shop.cart.load().is_empty());

    let sent = &shop.transport.requests()[0];
    assert_eq!(sent.header("Authorization"), Some("Bearer integration-token"));
    let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["userId"], json!(12));
    assert_eq!(body["status"], json!("PENDING"));
}

#[tokio::test]
async fn empty_carts_never_reach_the_backend() {
    let shop = storefront();
    sign_in(&shop, shopper());
    let service = OrderSubmissionService::new(shop.api.clone(), shop.cart.clone());
    let err = service.place_order(Some(UserId(12)), &shop.cart.load()).await.unwrap_err();
    assert_eq!(err, ApiError::Validation(ValidationError::EmptyCart));
    assert_eq!(shop.transport.request_count(), 0);
}

#[tokio::test]
async fn clearing_twice_is_harmless() {
    let shop = storefront();
    shop.cart.clear();
    shop.cart.clear();
    assert!(shop.cart.load().is_empty());
    let items = shop.cart.add_item(Vec::new(), CartItem::new(ProductId(5), "Vétiver", Money::from(30)));
    let items = shop.cart.update_quantity(items, ProductId(5), -3);
    assert_eq!(items[0].quantity, 1);
}

#[tokio::test]
async fn order_history_is_filtered_to_the_shopper() {
    let shop = storefront();
    shop.transport.respond(
        HttpMethod::Get,
        ORDERS_PATH,
        json_response(200, json!([
            {"id": 1, "userId": 12, "orderDate": "2024-01-02T10:00:00"},
            {"id": 2, "user": {"id": 40, "email": "someone@example.com"}},
            {"id": 3, "userEmail": "LEA@example.com", "orderDate": "2024-02-02T10:00:00"}
        ])),
    );
    let err = my_orders(&shop.api, &shopper()).await.unwrap_err();
    assert_eq!(err, ApiError::Validation(ValidationError::NotAuthenticated));
    assert_eq!(shop.transport.request_count(), 0);

    sign_in(&shop, shopper());
    let orders = my_orders(&shop.api, &shopper()).await.unwrap();
    assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![OrderId(3), OrderId(1)]);
}
