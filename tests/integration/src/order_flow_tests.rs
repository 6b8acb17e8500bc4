//! End-to-end order lifecycle scenarios against a real store.

use courier_core::{Identity, OrderStatus};
use courier_lifecycle::{CreateOrderRequest, LifecycleError};
use courier_relay::{ServerMessage, SessionId};
use courier_store::{LocationStore, OrderStore};
use tokio::sync::mpsc;

use crate::test_utils::{current_timestamp_ms, TestStack};

fn coords() -> CreateOrderRequest {
    CreateOrderRequest {
        pickup_lat: 45.52,
        pickup_lng: -122.68,
        dropoff_lat: 45.53,
        dropoff_lng: -122.66,
    }
}

#[tokio::test]
async fn test_full_delivery_scenario() {
    let stack = TestStack::new();
    let customer = Identity::customer("customer-1");
    let driver = Identity::driver("driver-1");

    // No drivers registered yet: order is created unassigned
    let first = stack.engine.create_order(&customer, &coords()).unwrap();
    assert_eq!(first.status, OrderStatus::Created);
    assert!(first.driver_id.is_none());

    // Register a driver; the next order is assigned to it
    stack
        .store
        .register_driver("driver-1", current_timestamp_ms())
        .unwrap();
    let second = stack.engine.create_order(&customer, &coords()).unwrap();
    assert_eq!(second.status, OrderStatus::Assigned);
    assert_eq!(second.driver_id.as_deref(), Some("driver-1"));

    // Driver starts the assigned order
    let started = stack.engine.start_order(&driver, &second.id).unwrap();
    assert_eq!(started.status, OrderStatus::InProgress);

    // The customer's session joins the order's event group
    let session = SessionId::new();
    let (tx, mut rx) = mpsc::channel(8);
    stack.sessions.register(session, tx).await;
    stack.sessions.join(session, &second.id).await;

    // Driver emits a position; the customer session receives it
    stack.relay.record_and_broadcast(&second.id, 10.0, 20.0).await;
    match rx.try_recv().unwrap() {
        ServerMessage::LocationUpdate {
            order_id,
            lat,
            lng,
            timestamp,
        } => {
            assert_eq!(order_id, second.id);
            assert_eq!(lat, 10.0);
            assert_eq!(lng, 20.0);
            assert!(!timestamp.is_empty());
        }
        other => panic!("unexpected message: {other:?}"),
    }

    // The sample is also on the audit trail
    let trail = stack.store.list_by_order(&second.id).unwrap();
    assert_eq!(trail.len(), 1);

    // Complete; further transitions are rejected with the state error
    let completed = stack.engine.complete_order(&driver, &second.id).unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    let rejected = stack.engine.start_order(&driver, &second.id).unwrap_err();
    assert!(matches!(rejected, LifecycleError::InvalidState { .. }));
    assert_eq!(
        stack.engine.get_order(&driver, &second.id).unwrap().status,
        OrderStatus::Completed
    );
}

#[tokio::test]
async fn test_unrelated_principals_cannot_observe_an_order() {
    let stack = TestStack::new();
    stack
        .store
        .register_driver("driver-1", current_timestamp_ms())
        .unwrap();

    let order = stack
        .engine
        .create_order(&Identity::customer("customer-1"), &coords())
        .unwrap();

    // A stranger and a missing id are indistinguishable
    let stranger = stack
        .engine
        .get_order(&Identity::customer("stranger"), &order.id)
        .unwrap_err();
    let missing = stack
        .engine
        .get_order(&Identity::customer("customer-1"), "missing")
        .unwrap_err();
    assert!(matches!(stranger, LifecycleError::NotFound));
    assert!(matches!(missing, LifecycleError::NotFound));

    // An unassigned driver is rejected outright on transitions
    let other_driver = stack
        .engine
        .start_order(&Identity::driver("driver-2"), &order.id)
        .unwrap_err();
    assert!(matches!(other_driver, LifecycleError::Forbidden(_)));
}

#[tokio::test]
async fn test_driver_order_list_reflects_assignments() {
    let stack = TestStack::new();
    stack
        .store
        .register_driver("driver-1", current_timestamp_ms())
        .unwrap();

    let a = stack
        .engine
        .create_order(&Identity::customer("customer-1"), &coords())
        .unwrap();
    let b = stack
        .engine
        .create_order(&Identity::customer("customer-2"), &coords())
        .unwrap();

    let orders = stack
        .engine
        .list_driver_orders(&Identity::driver("driver-1"))
        .unwrap();
    let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.id.as_str()));
    assert!(ids.contains(&b.id.as_str()));
}
