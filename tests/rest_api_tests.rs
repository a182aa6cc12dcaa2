// REST APIの統合テスト
// インメモリのモックリポジトリをAPIルーターに配線し、HTTP境界の振る舞いを検証する

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use rental_reservation_management::adapter::driver::rest_api::{create_router, AppStateInner};
use rental_reservation_management::application::service::{
    AvailabilityQueryService, ReservationApplicationService,
};
use rental_reservation_management::domain::model::{
    OrderId, ProductId, ProductStock, RentalPeriod, Reservation, ReservationId,
};
use rental_reservation_management::domain::port::{
    Logger, ProductRepository, RepositoryError, ReservationRepository, ReserveOutcome,
};
use rental_reservation_management::domain::service::{
    AvailabilityService, ReservationLifecycleService,
};

/// インメモリの共有ストア
/// reserve での容量確認と挿入を同一ロック内で行う（MySQL実装の行ロックに相当）
#[derive(Default)]
struct InMemoryStore {
    stocks: HashMap<ProductId, ProductStock>,
    reservations: Vec<Reservation>,
}

#[derive(Clone, Default)]
struct InMemoryProductRepository {
    store: Arc<Mutex<InMemoryStore>>,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn save(&self, stock: &ProductStock) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        store.stocks.insert(stock.product_id(), *stock);
        Ok(())
    }

    async fn find_by_id(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductStock>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.stocks.get(&product_id).copied())
    }
}

#[derive(Clone, Default)]
struct InMemoryReservationRepository {
    store: Arc<Mutex<InMemoryStore>>,
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn reserve(&self, reservation: &Reservation) -> Result<ReserveOutcome, RepositoryError> {
        let mut store = self.store.lock().await;

        let total_quantity = match store.stocks.get(&reservation.product_id()) {
            Some(stock) => stock.quantity(),
            None => return Ok(ReserveOutcome::ProductNotFound),
        };

        let period = reservation.period();
        let reserved_quantity: u32 = store
            .reservations
            .iter()
            .filter(|r| r.product_id() == reservation.product_id() && r.conflicts_with(&period))
            .map(Reservation::quantity)
            .sum();

        if total_quantity.saturating_sub(reserved_quantity) < reservation.quantity() {
            return Ok(ReserveOutcome::InsufficientCapacity {
                total_quantity,
                reserved_quantity,
            });
        }

        store.reservations.push(reservation.clone());
        Ok(ReserveOutcome::Created)
    }

    async fn find_active_overlapping(
        &self,
        product_id: ProductId,
        period: &RentalPeriod,
        exclude_order_id: Option<OrderId>,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let store = self.store.lock().await;
        let mut found: Vec<Reservation> = store
            .reservations
            .iter()
            .filter(|r| r.product_id() == product_id && r.conflicts_with(period))
            .filter(|r| match (exclude_order_id, r.order_id()) {
                (Some(excluded), Some(order_id)) => order_id != excluded,
                _ => true,
            })
            .cloned()
            .collect();
        found.sort_by_key(|r| r.period().start_date());
        Ok(found)
    }

    async fn find_by_order_id(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let store = self.store.lock().await;
        let mut found: Vec<Reservation> = store
            .reservations
            .iter()
            .filter(|r| r.order_id() == Some(order_id))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.period().start_date());
        Ok(found)
    }

    async fn deactivate_by_order_id(&self, order_id: OrderId) -> Result<u64, RepositoryError> {
        let mut store = self.store.lock().await;
        let mut deactivated = 0u64;
        for reservation in store
            .reservations
            .iter_mut()
            .filter(|r| r.order_id() == Some(order_id) && r.is_active())
        {
            reservation.deactivate();
            deactivated += 1;
        }
        Ok(deactivated)
    }

    fn next_identity(&self) -> ReservationId {
        ReservationId::new()
    }
}

/// ログを捨てるテスト用ロガー
struct NullLogger;

impl Logger for NullLogger {
    fn debug(&self, _: &str, _: &str, _: Option<Uuid>, _: Option<HashMap<String, String>>) {}
    fn info(&self, _: &str, _: &str, _: Option<Uuid>, _: Option<HashMap<String, String>>) {}
    fn warn(&self, _: &str, _: &str, _: Option<Uuid>, _: Option<HashMap<String, String>>) {}
    fn error(&self, _: &str, _: &str, _: Option<Uuid>, _: Option<HashMap<String, String>>) {}
}

/// インメモリリポジトリを配線したテストサーバーを作成
fn setup_server() -> TestServer {
    let store = Arc::new(Mutex::new(InMemoryStore::default()));
    let product_repository = Arc::new(InMemoryProductRepository {
        store: store.clone(),
    });
    let reservation_repository = Arc::new(InMemoryReservationRepository { store });
    let logger = Arc::new(NullLogger);

    let availability_service = AvailabilityService::new(
        product_repository.clone(),
        reservation_repository.clone(),
    );
    let lifecycle_service = ReservationLifecycleService::new(reservation_repository.clone());

    let state = AppStateInner {
        availability_service: Arc::new(AvailabilityQueryService::new(
            availability_service,
            logger.clone(),
        )),
        reservation_service: Arc::new(ReservationApplicationService::new(
            lifecycle_service,
            reservation_repository,
            logger,
        )),
        product_repository,
    };

    let app = create_router().with_state(state);
    TestServer::new(app).unwrap()
}

/// 商品在庫をAPI経由で登録
async fn register_product(server: &TestServer, quantity: u32) -> Uuid {
    let product_id = Uuid::new_v4();
    let response = server
        .post("/products")
        .json(&serde_json::json!({
            "product_id": product_id,
            "quantity": quantity,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    product_id
}

fn reservation_body(
    product_id: Uuid,
    order_id: Option<Uuid>,
    quantity: u32,
    start_date: &str,
    end_date: &str,
) -> serde_json::Value {
    serde_json::json!({
        "product_id": product_id,
        "variant_id": null,
        "order_id": order_id,
        "quotation_id": null,
        "quantity": quantity,
        "start_date": start_date,
        "end_date": end_date,
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = setup_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "rental-reservation-management");
}

#[tokio::test]
async fn test_product_stock_roundtrip() {
    let server = setup_server();
    let product_id = register_product(&server, 10).await;

    let response = server
        .get(&format!("/products/{}/stock", product_id))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["product_id"], product_id.to_string());
    assert_eq!(body["quantity"], 10);
}

#[tokio::test]
async fn test_get_unknown_product_stock_returns_not_found() {
    let server = setup_server();

    let response = server
        .get(&format!("/products/{}/stock", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND");
}

#[tokio::test]
async fn test_availability_reflects_overlapping_reservation() {
    let server = setup_server();
    let product_id = register_product(&server, 3).await;

    let response = server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(Uuid::new_v4()),
            2,
            "2024-03-01",
            "2024-03-03",
        ))
        .await;
    response.assert_status(StatusCode::CREATED);

    // 3/2〜3/4 は既存予約と重なるため空きは1個
    let response = server
        .get(&format!("/products/{}/availability", product_id))
        .add_query_param("start_date", "2024-03-02")
        .add_query_param("end_date", "2024-03-04")
        .add_query_param("quantity", 2)
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["available"], false);
    assert_eq!(body["total_quantity"], 3);
    assert_eq!(body["reserved_quantity"], 2);
    assert_eq!(body["available_quantity"], 1);
}

#[tokio::test]
async fn test_availability_for_unknown_product_degrades_to_unavailable() {
    let server = setup_server();

    // 商品未登録でもHTTPエラーにせず「空きなし」を返す
    let response = server
        .get(&format!("/products/{}/availability", Uuid::new_v4()))
        .add_query_param("start_date", "2024-03-01")
        .add_query_param("end_date", "2024-03-03")
        .add_query_param("quantity", 1)
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["available"], false);
    assert_eq!(body["available_quantity"], 0);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_availability_rejects_inverted_period() {
    let server = setup_server();
    let product_id = register_product(&server, 3).await;

    let response = server
        .get(&format!("/products/{}/availability", product_id))
        .add_query_param("start_date", "2024-03-05")
        .add_query_param("end_date", "2024-03-01")
        .add_query_param("quantity", 1)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_PERIOD");
}

#[tokio::test]
async fn test_availability_rejects_missing_query_params() {
    let server = setup_server();
    let product_id = register_product(&server, 3).await;

    let response = server
        .get(&format!("/products/{}/availability", product_id))
        .add_query_param("start_date", "2024-03-01")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_PARAMETER");
}

#[tokio::test]
async fn test_create_reservation_returns_created_reservation() {
    let server = setup_server();
    let product_id = register_product(&server, 5).await;
    let order_id = Uuid::new_v4();

    let response = server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(order_id),
            2,
            "2024-03-01",
            "2024-03-03",
        ))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["product_id"], product_id.to_string());
    assert_eq!(body["order_id"], order_id.to_string());
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["start_date"], "2024-03-01");
    assert_eq!(body["end_date"], "2024-03-03");
    assert_eq!(body["is_active"], true);
    assert!(body["reservation_id"].is_string());
}

#[tokio::test]
async fn test_create_reservation_insufficient_capacity_conflicts() {
    let server = setup_server();
    let product_id = register_product(&server, 3).await;

    let response = server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(Uuid::new_v4()),
            2,
            "2024-03-01",
            "2024-03-03",
        ))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(Uuid::new_v4()),
            2,
            "2024-03-01",
            "2024-03-03",
        ))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INSUFFICIENT_CAPACITY");
}

#[tokio::test]
async fn test_create_reservation_unknown_product_not_found() {
    let server = setup_server();

    let response = server
        .post("/reservations")
        .json(&reservation_body(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            1,
            "2024-03-01",
            "2024-03-03",
        ))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND");
}

#[tokio::test]
async fn test_create_reservation_zero_quantity_rejected() {
    let server = setup_server();
    let product_id = register_product(&server, 3).await;

    let response = server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(Uuid::new_v4()),
            0,
            "2024-03-01",
            "2024-03-03",
        ))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_QUANTITY");
}

#[tokio::test]
async fn test_create_reservation_inverted_period_rejected() {
    let server = setup_server();
    let product_id = register_product(&server, 3).await;

    let response = server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(Uuid::new_v4()),
            1,
            "2024-03-05",
            "2024-03-01",
        ))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_PERIOD");
}

#[tokio::test]
async fn test_cancel_reservations_releases_and_is_idempotent() {
    let server = setup_server();
    let product_id = register_product(&server, 2).await;
    let order_id = Uuid::new_v4();

    let response = server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(order_id),
            2,
            "2024-03-01",
            "2024-03-05",
        ))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post(&format!("/orders/{}/cancel-reservations", order_id))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["order_id"], order_id.to_string());
    assert_eq!(body["released_count"], 1);

    // 2回目の解放は0件（べき等）
    let response = server
        .post(&format!("/orders/{}/cancel-reservations", order_id))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["released_count"], 0);

    // 解放後は全量の予約が再び通る
    let response = server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(Uuid::new_v4()),
            2,
            "2024-03-01",
            "2024-03-05",
        ))
        .await;
    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_reservations_by_order_includes_deactivated() {
    let server = setup_server();
    let product_id = register_product(&server, 2).await;
    let order_id = Uuid::new_v4();

    server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(order_id),
            1,
            "2024-03-01",
            "2024-03-03",
        ))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post(&format!("/orders/{}/cancel-reservations", order_id))
        .await
        .assert_status_ok();

    let response = server
        .get("/reservations")
        .add_query_param("order_id", order_id)
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let reservations = body.as_array().unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0]["is_active"], false);
}

#[tokio::test]
async fn test_available_dates_calendar() {
    let server = setup_server();
    let product_id = register_product(&server, 5).await;

    server
        .post("/reservations")
        .json(&reservation_body(
            product_id,
            Some(Uuid::new_v4()),
            2,
            "2024-01-10",
            "2024-01-12",
        ))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get(&format!("/products/{}/available-dates", product_id))
        .add_query_param("year", 2024)
        .add_query_param("month", 1)
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 31);
    assert_eq!(days[0]["date"], "2024-01-01");
    assert_eq!(days[0]["available_quantity"], 5);
    assert_eq!(days[9]["date"], "2024-01-10");
    assert_eq!(days[9]["available_quantity"], 3);
    assert_eq!(days[11]["available_quantity"], 3);
    assert_eq!(days[12]["available_quantity"], 5);
    assert_eq!(days[30]["date"], "2024-01-31");
}

#[tokio::test]
async fn test_available_dates_invalid_month_rejected() {
    let server = setup_server();
    let product_id = register_product(&server, 5).await;

    let response = server
        .get(&format!("/products/{}/available-dates", product_id))
        .add_query_param("year", 2024)
        .add_query_param("month", 13)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_VALUE");
}
