use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 商品在庫登録用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CreateProductStockRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// 予約作成用のリクエストDTO
/// 注文・決済ワークフローが決済の検証後に送信する
#[derive(Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub quotation_id: Option<Uuid>,
    pub quantity: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// 空き状況確認用のクエリパラメータ
#[derive(Deserialize)]
pub struct AvailabilityQueryParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quantity: u32,
    pub exclude_order_id: Option<Uuid>,
}

/// カレンダー表示用のクエリパラメータ
#[derive(Deserialize)]
pub struct AvailableDatesQueryParams {
    pub year: i32,
    pub month: u32,
}

/// 予約一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct ReservationsQueryParams {
    pub order_id: Uuid,
}
