//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module contains integration tests for the API.
// It drives the router directly and verifies the responses.
//--------------------------------------------------------------------------------------------------

use std::net::SocketAddr;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{from_slice, json, Value};
use tower::ServiceExt;

use trade_engine::Api;

/// Sets up a test router backed by an empty book.
fn setup_test_router() -> Router {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let api = Api::new(addr, "TEST/PAIR");
    api.routes()
}

/// Helper to parse JSON responses
async fn parse_json_response(response: Response) -> Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024) // 1MB limit
        .await
        .unwrap();
    from_slice(&body_bytes).unwrap()
}

/// Helper to POST an order payload
async fn post_order(app: &Router, payload: Value) -> Response {
    app.clone()
        .oneshot(
            Request::post("/api/orders")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_router();

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_resting_order() {
    let app = setup_test_router();

    let response = post_order(
        &app,
        json!({
            "side": "bid",
            "type": "limit",
            "quantity": "1.5",
            "price": "100.50",
            "trade_id": "client-1"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_json_response(response).await;

    assert!(body["trades"].as_array().unwrap().is_empty());
    let order = &body["order"];
    assert_eq!(order["side"], "bid");
    assert_eq!(order["quantity"], "1.5");
    assert_eq!(order["price"], "100.50");
    assert_eq!(order["trade_id"], "client-1");
    assert_eq!(order["order_id"], 1);
    assert_eq!(order["timestamp"], 1);
    assert_eq!(order["wage"], Value::Null);
}

#[tokio::test]
async fn test_crossing_order_reports_trades() {
    let app = setup_test_router();

    post_order(
        &app,
        json!({"side": "bid", "type": "limit", "quantity": "5", "price": "100"}),
    )
    .await;

    let response = post_order(
        &app,
        json!({"side": "ask", "type": "limit", "quantity": "2", "price": "100"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_json_response(response).await;

    let trades = body["trades"].as_array().unwrap();
    assert_eq!(trades.len(), 1);
    let trade = &trades[0];
    assert_eq!(trade["price"], "100");
    assert_eq!(trade["quantity"], "2");
    assert_eq!(trade["timestamp"], 2);
    assert_eq!(trade["time"], 2);
    assert_eq!(trade["party1"]["side"], "bid");
    assert_eq!(trade["party1"]["order_id"], 1);
    assert_eq!(trade["party1"]["new_book_quantity"], "3");
    assert_eq!(trade["party2"]["side"], "ask");
    assert_eq!(trade["party2"]["order_id"], 2);
    assert_eq!(trade["party2"]["new_book_quantity"], Value::Null);

    // Taker fully filled, nothing rests
    assert_eq!(body["order"], Value::Null);
}

#[tokio::test]
async fn test_market_order_sweeps_book() {
    let app = setup_test_router();

    for (quantity, price) in [("1", "10"), ("2", "11")] {
        post_order(
            &app,
            json!({"side": "ask", "type": "limit", "quantity": quantity, "price": price}),
        )
        .await;
    }

    let response = post_order(&app, json!({"side": "bid", "type": "market", "quantity": "3"})).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_json_response(response).await;

    let trades = body["trades"].as_array().unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0]["price"], "10");
    assert_eq!(trades[1]["price"], "11");
    assert_eq!(body["order"], Value::Null);
}

#[tokio::test]
async fn test_list_orders_priority_order() {
    let app = setup_test_router();

    for price in ["99", "101", "100"] {
        post_order(
            &app,
            json!({"side": "bid", "type": "limit", "quantity": "1", "price": price}),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(Request::get("/api/orders/bid").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    let prices: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["price"].as_str().unwrap())
        .collect();
    assert_eq!(prices, vec!["101", "100", "99"]);
}

#[tokio::test]
async fn test_get_order() {
    let app = setup_test_router();

    let create_response = post_order(
        &app,
        json!({"side": "ask", "type": "limit", "quantity": "2", "price": "105"}),
    )
    .await;
    let body = parse_json_response(create_response).await;
    let order_id = body["order"]["order_id"].as_u64().unwrap();

    let url = format!("/api/orders/ask/{}", order_id);
    let response = app
        .clone()
        .oneshot(Request::get(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["order_id"], order_id);
    assert_eq!(body["price"], "105");

    // Unknown id on the other side is a miss
    let response = app
        .clone()
        .oneshot(
            Request::get(&format!("/api/orders/bid/{}", order_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_modify_order() {
    let app = setup_test_router();

    let create_response = post_order(
        &app,
        json!({"side": "bid", "type": "limit", "quantity": "5", "price": "100"}),
    )
    .await;
    let body = parse_json_response(create_response).await;
    let order_id = body["order"]["order_id"].as_u64().unwrap();

    let url = format!("/api/orders/bid/{}", order_id);
    let response = app
        .clone()
        .oneshot(
            Request::patch(&url)
                .header("Content-Type", "application/json")
                .body(Body::from(json!({"price": "99"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["order_id"], order_id);
    assert_eq!(body["price"], "99");
    assert_eq!(body["quantity"], "5");
    // Repricing re-stamps with the post-modify clock
    assert_eq!(body["timestamp"], 2);
}

#[tokio::test]
async fn test_cancel_order() {
    let app = setup_test_router();

    let create_response = post_order(
        &app,
        json!({"side": "bid", "type": "limit", "quantity": "1", "price": "100"}),
    )
    .await;
    let body = parse_json_response(create_response).await;
    let order_id = body["order"]["order_id"].as_u64().unwrap();

    let url = format!("/api/orders/bid/{}", order_id);
    let cancel_response = app
        .clone()
        .oneshot(Request::delete(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(cancel_response.status(), StatusCode::NO_CONTENT);

    // The order is gone
    let get_response = app
        .clone()
        .oneshot(Request::get(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);

    // Cancelling again is a miss
    let cancel_again = app
        .clone()
        .oneshot(Request::delete(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(cancel_again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_summary() {
    let app = setup_test_router();

    post_order(
        &app,
        json!({"side": "bid", "type": "limit", "quantity": "5", "price": "100"}),
    )
    .await;
    post_order(
        &app,
        json!({"side": "ask", "type": "limit", "quantity": "3", "price": "101"}),
    )
    .await;

    let response = app
        .clone()
        .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["best_bid"], "100");
    assert_eq!(body["best_ask"], "101");
    assert_eq!(body["bid_volume"], "5");
    assert_eq!(body["ask_volume"], "3");
    assert_eq!(body["num_bids"], 1);
    assert_eq!(body["num_asks"], 1);
    assert_eq!(body["time"], 2);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_summary_empty_book() {
    let app = setup_test_router();

    let response = app
        .clone()
        .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body = parse_json_response(response).await;
    assert_eq!(body["best_bid"], Value::Null);
    assert_eq!(body["best_ask"], Value::Null);
    assert_eq!(body["bid_volume"], "0");
    assert_eq!(body["ask_volume"], "0");
    assert_eq!(body["time"], 0);
}

#[tokio::test]
async fn test_trades_read_back() {
    let app = setup_test_router();

    post_order(
        &app,
        json!({"side": "ask", "type": "limit", "quantity": "1", "price": "10"}),
    )
    .await;
    post_order(
        &app,
        json!({"side": "ask", "type": "limit", "quantity": "1", "price": "11"}),
    )
    .await;
    post_order(&app, json!({"side": "bid", "type": "market", "quantity": "2"})).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/trades?limit=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    let trades = body.as_array().unwrap();
    // Only the most recent of the two trades
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["price"], "11");

    // Default limit returns both, oldest first
    let response = app
        .clone()
        .oneshot(Request::get("/api/trades").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = parse_json_response(response).await;
    let trades = body.as_array().unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0]["price"], "10");
    assert_eq!(trades[1]["price"], "11");
}

#[tokio::test]
async fn test_rejects_bad_submissions() {
    let app = setup_test_router();

    // Non-positive quantity
    let response = post_order(
        &app,
        json!({"side": "bid", "type": "limit", "quantity": "0", "price": "100"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_json_response(response).await;
    assert_eq!(body["error"]["code"], 400);

    // Limit without a price
    let response = post_order(&app, json!({"side": "bid", "type": "limit", "quantity": "1"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Market with a price
    let response = post_order(
        &app,
        json!({"side": "ask", "type": "market", "quantity": "1", "price": "100"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown side is rejected before reaching the book
    let response = post_order(
        &app,
        json!({"side": "buy", "type": "limit", "quantity": "1", "price": "100"}),
    )
    .await;
    assert!(response.status().is_client_error());

    // The failed submissions left the book untouched
    let response = app
        .clone()
        .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = parse_json_response(response).await;
    assert_eq!(body["num_bids"], 0);
    assert_eq!(body["num_asks"], 0);
    assert_eq!(body["time"], 0);
}

#[tokio::test]
async fn test_wage_passthrough() {
    let app = setup_test_router();

    post_order(
        &app,
        json!({
            "side": "ask",
            "type": "limit",
            "quantity": "1",
            "price": "100",
            "wage": "maker-tag"
        }),
    )
    .await;

    let response = post_order(
        &app,
        json!({
            "side": "bid",
            "type": "limit",
            "quantity": "1",
            "price": "100",
            "wage": "taker-tag"
        }),
    )
    .await;

    let body = parse_json_response(response).await;
    let trade = &body["trades"][0];
    assert_eq!(trade["party1"]["wage"], "maker-tag");
    assert_eq!(trade["party2"]["wage"], "taker-tag");
}
