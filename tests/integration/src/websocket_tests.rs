//! Event-channel tests over real WebSocket connections.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use courier_core::Identity;
use courier_lifecycle::CreateOrderRequest;
use courier_store::{LocationStore, OrderStore};

use crate::test_utils::{current_timestamp_ms, start_ws_server, TestStack};

type WsClient = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Connect and consume the ack greeting.
async fn connect(url: &str) -> WsClient {
    let (mut client, _) = connect_async(url).await.unwrap();

    let ack = timeout(Duration::from_secs(2), client.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let ack: Value = serde_json::from_str(ack.to_text().unwrap()).unwrap();
    assert_eq!(ack["type"], "ack");

    client
}

async fn send_json(client: &mut WsClient, value: Value) {
    client
        .send(Message::Text(value.to_string()))
        .await
        .unwrap();
}

async fn next_json(client: &mut WsClient) -> Value {
    let msg = timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for frame")
        .unwrap()
        .unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn test_join_and_location_round_trip() {
    let stack = TestStack::new();
    stack
        .store
        .register_driver("driver-1", current_timestamp_ms())
        .unwrap();
    let order = stack
        .engine
        .create_order(
            &Identity::customer("customer-1"),
            &CreateOrderRequest {
                pickup_lat: 45.52,
                pickup_lng: -122.68,
                dropoff_lat: 45.53,
                dropoff_lng: -122.66,
            },
        )
        .unwrap();

    let url = start_ws_server(&stack).await;

    let mut customer = connect(&url).await;
    send_json(&mut customer, json!({ "type": "join", "orderId": order.id })).await;

    // A second customer connection that never joins this order
    let mut bystander = connect(&url).await;
    send_json(&mut bystander, json!({ "type": "join", "orderId": "other-order" })).await;

    // Let the joins land before publishing
    sleep(Duration::from_millis(100)).await;

    let mut driver = connect(&url).await;
    send_json(
        &mut driver,
        json!({ "type": "location_update", "orderId": order.id, "lat": 10.0, "lng": 20.0 }),
    )
    .await;

    let received = next_json(&mut customer).await;
    assert_eq!(received["type"], "location_update");
    assert_eq!(received["orderId"], order.id.as_str());
    assert_eq!(received["lat"], 10.0);
    assert_eq!(received["lng"], 20.0);
    assert!(received["timestamp"].as_str().is_some());

    // The bystander got nothing
    sleep(Duration::from_millis(100)).await;
    let nothing = timeout(Duration::from_millis(100), bystander.next()).await;
    assert!(nothing.is_err());

    // Sample landed on the trail
    let trail = stack.store.list_by_order(&order.id).unwrap();
    assert_eq!(trail.len(), 1);
}

#[tokio::test]
async fn test_malformed_frames_are_dropped_and_connection_survives() {
    let stack = TestStack::new();
    let url = start_ws_server(&stack).await;

    let mut customer = connect(&url).await;
    send_json(&mut customer, json!({ "type": "join", "orderId": "order-1" })).await;
    sleep(Duration::from_millis(100)).await;

    let mut driver = connect(&url).await;

    // Garbage, unknown type, and a non-numeric coordinate: all ignored
    driver
        .send(Message::Text("not json at all".to_string()))
        .await
        .unwrap();
    send_json(&mut driver, json!({ "type": "leave", "orderId": "order-1" })).await;
    send_json(
        &mut driver,
        json!({ "type": "location_update", "orderId": "order-1", "lat": "x", "lng": 1.0 }),
    )
    .await;

    // The connection is still usable afterwards
    send_json(
        &mut driver,
        json!({ "type": "location_update", "orderId": "order-1", "lat": 1.0, "lng": 2.0 }),
    )
    .await;

    let received = next_json(&mut customer).await;
    assert_eq!(received["lat"], 1.0);

    assert_eq!(stack.store.list_by_order("order-1").unwrap().len(), 1);
}

#[tokio::test]
async fn test_disconnect_cleans_up_subscriber_groups() {
    let stack = TestStack::new();
    let url = start_ws_server(&stack).await;

    let mut customer = connect(&url).await;
    send_json(&mut customer, json!({ "type": "join", "orderId": "order-1" })).await;
    sleep(Duration::from_millis(100)).await;
    assert_eq!(stack.sessions.subscriber_count("order-1").await, 1);

    customer.close(None).await.unwrap();
    sleep(Duration::from_millis(200)).await;

    assert_eq!(stack.sessions.subscriber_count("order-1").await, 0);
    assert_eq!(stack.sessions.session_count().await, 0);
}
