use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, NaiveDate};
use larder::inventory::{
    inventory_router, ChangeListener, InventoryEvent, InventoryService, ItemDraft,
    MemoryRepository, StockTransaction, TransactionKind,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn service() -> Arc<InventoryService<MemoryRepository>> {
    Arc::new(InventoryService::new(Arc::new(MemoryRepository::default())))
}

fn draft(name: &str, current: f64, min: f64, max: f64) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        category: Some("Vegetables".to_string()),
        unit: "lbs".to_string(),
        current_quantity: current,
        min_quantity: min,
        max_quantity: max,
        cost_per_unit: 1.5,
        supplier: None,
        storage_location: Some("Walk-in".to_string()),
        notes: None,
        expiration_date: None,
    }
}

fn eval_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

#[derive(Default)]
struct RecordingListener {
    events: Mutex<Vec<InventoryEvent>>,
}

impl RecordingListener {
    fn events(&self) -> Vec<InventoryEvent> {
        self.events.lock().expect("listener mutex poisoned").clone()
    }
}

impl ChangeListener for RecordingListener {
    fn on_change(&self, event: &InventoryEvent) {
        self.events
            .lock()
            .expect("listener mutex poisoned")
            .push(event.clone());
    }
}

#[test]
fn snapshot_derives_statuses_for_every_item() {
    let service = service();

    service.add_item(draft("Chicken", 0.0, 2.0, 20.0)).expect("adds");
    service.add_item(draft("Rice", 30.0, 5.0, 25.0)).expect("adds");
    let mut milk = draft("Milk", 6.0, 2.0, 12.0);
    milk.expiration_date = Some(eval_date() + Duration::days(3));
    service.add_item(milk).expect("adds");
    service.add_item(draft("Salt", 4.0, 1.0, 10.0)).expect("adds");

    let snapshot = service.snapshot(eval_date()).expect("snapshot builds");
    let statuses: Vec<&str> = snapshot.iter().map(|view| view.status).collect();

    assert_eq!(statuses, vec!["low_stock", "overstock", "expiring_soon", "normal"]);
    let milk_view = &snapshot[2];
    assert_eq!(milk_view.status_label, "Expiring in 3 days");
    assert_eq!(milk_view.days_until_expiration, Some(3));
}

#[test]
fn transactions_adjust_stock_and_fan_out_events() {
    let service = service();
    let listener = Arc::new(RecordingListener::default());
    service.subscribe(listener.clone());

    let item = service.add_item(draft("Onions", 10.0, 2.0, 40.0)).expect("adds");

    let after_usage = service
        .record_transaction(
            item.id,
            StockTransaction {
                kind: TransactionKind::Usage,
                quantity: 4.0,
                cost: None,
                notes: Some("dinner service".to_string()),
                date: Some(eval_date()),
            },
        )
        .expect("usage recorded");
    assert!((after_usage.current_quantity - 6.0).abs() < f64::EPSILON);

    let after_purchase = service
        .record_transaction(
            item.id,
            StockTransaction {
                kind: TransactionKind::Purchase,
                quantity: 10.0,
                cost: Some(12.0),
                notes: None,
                date: None,
            },
        )
        .expect("purchase recorded");
    assert!((after_purchase.current_quantity - 16.0).abs() < f64::EPSILON);

    let events = listener.events();
    assert_eq!(
        events,
        vec![
            InventoryEvent::ItemAdded { id: item.id },
            InventoryEvent::TransactionRecorded {
                id: item.id,
                kind: TransactionKind::Usage
            },
            InventoryEvent::TransactionRecorded {
                id: item.id,
                kind: TransactionKind::Purchase
            },
        ]
    );
}

#[test]
fn consuming_more_than_on_hand_is_rejected() {
    let service = service();
    let item = service.add_item(draft("Butter", 2.0, 0.5, 10.0)).expect("adds");

    let err = service
        .record_transaction(
            item.id,
            StockTransaction {
                kind: TransactionKind::Donation,
                quantity: 5.0,
                cost: None,
                notes: None,
                date: None,
            },
        )
        .expect_err("over-donation rejected");
    assert!(err.to_string().contains("only 2 on hand"));

    // The failed transaction must not have touched stored state.
    let unchanged = service.get_item(item.id).expect("item still there");
    assert!((unchanged.current_quantity - 2.0).abs() < f64::EPSILON);
}

#[test]
fn update_enforces_the_edit_form_rules() {
    let service = service();
    let listener = Arc::new(RecordingListener::default());
    service.subscribe(listener.clone());

    let item = service.add_item(draft("Basil", 3.0, 1.0, 6.0)).expect("adds");

    let mut bad_bounds = draft("Basil", 3.0, 8.0, 6.0);
    bad_bounds.expiration_date = None;
    let err = service
        .update_item(item.id, bad_bounds)
        .expect_err("min above max rejected");
    assert!(err.to_string().contains("min quantity"));

    let err = service
        .update_item(item.id, draft("   ", 3.0, 1.0, 6.0))
        .expect_err("blank name rejected");
    assert!(err.to_string().contains("name is required"));

    let updated = service
        .update_item(item.id, draft("Basil", 4.0, 1.0, 6.0))
        .expect("valid update applies");
    assert!((updated.current_quantity - 4.0).abs() < f64::EPSILON);

    // Only the successful mutation notified listeners.
    let update_events: Vec<_> = listener
        .events()
        .into_iter()
        .filter(|event| matches!(event, InventoryEvent::ItemUpdated { .. }))
        .collect();
    assert_eq!(update_events, vec![InventoryEvent::ItemUpdated { id: item.id }]);
}

async fn send_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(payload) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request builds"),
    };

    let response = app.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json payload")
    };
    (status, body)
}

#[tokio::test]
async fn rest_surface_covers_the_item_lifecycle() {
    let service = service();
    let app = inventory_router(service.clone());

    let (status, created) = send_json(
        app.clone(),
        "POST",
        "/api/v1/inventory",
        Some(json!({
            "name": "Mozzarella",
            "category": "Dairy",
            "unit": "lbs",
            "current_quantity": 5.0,
            "min_quantity": 1.0,
            "max_quantity": 12.0,
            "cost_per_unit": 4.0,
            "expiration_date": "2025-06-17"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_u64().expect("id assigned");

    let (status, listed) = send_json(
        app.clone(),
        "GET",
        "/api/v1/inventory?today=2025-06-15",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let row = listed
        .as_array()
        .expect("array body")
        .iter()
        .find(|row| row["id"].as_u64() == Some(id))
        .expect("created item listed");
    assert_eq!(row["status"], "expiring_soon");
    assert_eq!(row["days_until_expiration"], 2);
    assert_eq!(row["total_value"], 20.0);

    let (status, updated) = send_json(
        app.clone(),
        "POST",
        &format!("/api/v1/inventory/{id}/transactions"),
        Some(json!({
            "transaction_type": "waste",
            "quantity": 2.0,
            "notes": "spoiled in transit"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["current_quantity"], 3.0);

    let (status, _) = send_json(
        app.clone(),
        "DELETE",
        &format!("/api/v1/inventory/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_json(
        app,
        "DELETE",
        &format!("/api/v1/inventory/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "item not found");
}

#[tokio::test]
async fn validation_failures_map_to_unprocessable_entity() {
    let service = service();
    let app = inventory_router(service);

    let (status, body) = send_json(
        app.clone(),
        "POST",
        "/api/v1/inventory",
        Some(json!({
            "name": "Cream",
            "min_quantity": 9.0,
            "max_quantity": 3.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("min quantity"));

    let (status, _) = send_json(
        app,
        "PUT",
        "/api/v1/inventory/9999",
        Some(json!({
            "name": "Cream",
            "min_quantity": 1.0,
            "max_quantity": 3.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
