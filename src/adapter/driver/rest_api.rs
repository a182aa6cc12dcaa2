use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use uuid::Uuid;

use crate::adapter::driver::request_dto::{
    AvailabilityQueryParams, AvailableDatesQueryParams, CreateProductStockRequest,
    CreateReservationRequest, ReservationsQueryParams,
};
use crate::adapter::driver::response_dto::{
    AvailabilityResponse, CancelReservationsResponse, DayAvailabilityResponse,
    ProductStockResponse, ReservationResponse,
};
use crate::application::service::{AvailabilityQueryService, ReservationApplicationService};
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    NewReservation, OrderId, ProductId, ProductStock, QuotationId, RentalPeriod, VariantId,
};
use crate::domain::port::ProductRepository;

/// APIエラーレスポンス
#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

// アプリケーションサービスを含む状態
pub type AppState = AppStateInner;

#[derive(Clone)]
pub struct AppStateInner {
    pub availability_service: Arc<AvailabilityQueryService>,
    pub reservation_service: Arc<ReservationApplicationService>,
    pub product_repository: Arc<dyn ProductRepository>,
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/products", post(create_product_stock))
        .route("/products/:product_id/stock", get(get_product_stock))
        .route("/products/:product_id/availability", get(check_availability))
        .route(
            "/products/:product_id/available-dates",
            get(get_available_dates),
        )
        .route(
            "/reservations",
            post(create_reservation).get(get_reservations_by_order),
        )
        .route(
            "/orders/:order_id/cancel-reservations",
            post(cancel_order_reservations),
        )
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "rental-reservation-management",
        "version": "0.1.0"
    }))
}

// 商品在庫登録エンドポイント（バックオフィス・テスト用）
async fn create_product_stock(
    State(state): State<AppState>,
    Json(request): Json<CreateProductStockRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let stock = ProductStock::new(ProductId::from_uuid(request.product_id), request.quantity);

    // 商品リポジトリに直接保存（本来はアプリケーションサービス経由が望ましい）
    match state.product_repository.save(&stock).await {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        )),
    }
}

// 商品在庫取得エンドポイント
async fn get_product_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductStockResponse>, (StatusCode, Json<ApiError>)> {
    let product_id = ProductId::from_uuid(product_id);

    match state.product_repository.find_by_id(product_id).await {
        Ok(Some(stock)) => Ok(Json(ProductStockResponse::from_stock(&stock))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された商品が見つかりません".to_string(),
                code: "PRODUCT_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        )),
    }
}

// 空き状況確認エンドポイント
async fn check_availability(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    query: Result<Query<AvailabilityQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let period = match RentalPeriod::new(params.start_date, params.end_date) {
        Ok(period) => period,
        Err(err) => return Err(map_domain_error(err)),
    };

    let availability = state
        .availability_service
        .check_availability(
            ProductId::from_uuid(product_id),
            &period,
            params.quantity,
            params.exclude_order_id.map(OrderId::from_uuid),
        )
        .await;

    Ok(Json(AvailabilityResponse::from_availability(&availability)))
}

// カレンダー表示用の空き日付取得エンドポイント
async fn get_available_dates(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    query: Result<Query<AvailableDatesQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<DayAvailabilityResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    match state
        .availability_service
        .get_available_dates(ProductId::from_uuid(product_id), params.year, params.month)
        .await
    {
        Ok(days) => {
            let response: Vec<DayAvailabilityResponse> =
                days.iter().map(DayAvailabilityResponse::from_day).collect();
            Ok(Json(response))
        }
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約作成エンドポイント
// 注文ワークフローが決済の検証後に呼び出す
async fn create_reservation(
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), (StatusCode, Json<ApiError>)> {
    let period = match RentalPeriod::new(request.start_date, request.end_date) {
        Ok(period) => period,
        Err(err) => return Err(map_domain_error(err)),
    };

    let command = NewReservation {
        product_id: ProductId::from_uuid(request.product_id),
        variant_id: request.variant_id.map(VariantId::from_uuid),
        order_id: request.order_id.map(OrderId::from_uuid),
        quotation_id: request.quotation_id.map(QuotationId::from_uuid),
        quantity: request.quantity,
        period,
    };

    match state.reservation_service.create_reservation(command).await {
        Ok(reservation) => Ok((
            StatusCode::CREATED,
            Json(ReservationResponse::from_reservation(&reservation)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文別予約一覧取得エンドポイント（監査用）
async fn get_reservations_by_order(
    State(state): State<AppState>,
    query: Result<Query<ReservationsQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<ReservationResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    match state
        .reservation_service
        .get_reservations_by_order_id(OrderId::from_uuid(params.order_id))
        .await
    {
        Ok(reservations) => {
            let response: Vec<ReservationResponse> = reservations
                .iter()
                .map(ReservationResponse::from_reservation)
                .collect();
            Ok(Json(response))
        }
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文キャンセル時の予約解放エンドポイント
async fn cancel_order_reservations(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<CancelReservationsResponse>, (StatusCode, Json<ApiError>)> {
    let order_id = OrderId::from_uuid(order_id);

    match state
        .reservation_service
        .cancel_order_reservations(order_id)
        .await
    {
        Ok(released_count) => Ok(Json(CancelReservationsResponse {
            order_id: order_id.to_string(),
            released_count,
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", repo_err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    match domain_err {
        DomainError::InvalidQuantity => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効な数量です".to_string(),
                code: "INVALID_QUANTITY".to_string(),
            }),
        ),
        DomainError::InvalidPeriod(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_PERIOD".to_string(),
            }),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_VALUE".to_string(),
            }),
        ),
        DomainError::ProductNotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "PRODUCT_NOT_FOUND".to_string(),
            }),
        ),
        DomainError::InsufficientCapacity {
            requested_quantity,
            available_quantity,
        } => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: format!(
                    "要求数量 {} に対して空きは {} です",
                    requested_quantity, available_quantity
                ),
                code: "INSUFFICIENT_CAPACITY".to_string(),
            }),
        ),
        DomainError::RepositoryError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
    }
}
