use crate::domain::model::{Availability, DayAvailability, ProductStock, Reservation};
use serde::Serialize;

/// 空き状況確認用のレスポンスDTO
#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    pub available_quantity: u32,
    pub total_quantity: u32,
    pub reserved_quantity: u32,
    pub message: Option<String>,
}

impl AvailabilityResponse {
    /// ドメインオブジェクトからAvailabilityResponseを作成
    pub fn from_availability(availability: &Availability) -> Self {
        Self {
            available: availability.is_available(),
            available_quantity: availability.available_quantity(),
            total_quantity: availability.total_quantity(),
            reserved_quantity: availability.reserved_quantity(),
            message: availability.message().map(|m| m.to_string()),
        }
    }
}

/// カレンダー表示用の1日分のレスポンスDTO
#[derive(Serialize)]
pub struct DayAvailabilityResponse {
    pub date: String,
    pub available_quantity: u32,
}

impl DayAvailabilityResponse {
    /// ドメインオブジェクトからDayAvailabilityResponseを作成
    pub fn from_day(day: &DayAvailability) -> Self {
        Self {
            date: day.date().format("%Y-%m-%d").to_string(),
            available_quantity: day.available_quantity(),
        }
    }
}

/// 予約用のレスポンスDTO
#[derive(Serialize)]
pub struct ReservationResponse {
    pub reservation_id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub order_id: Option<String>,
    pub quotation_id: Option<String>,
    pub quantity: u32,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
}

impl ReservationResponse {
    /// ドメインオブジェクトからReservationResponseを作成
    pub fn from_reservation(reservation: &Reservation) -> Self {
        Self {
            reservation_id: reservation.id().to_string(),
            product_id: reservation.product_id().to_string(),
            variant_id: reservation.variant_id().map(|v| v.to_string()),
            order_id: reservation.order_id().map(|o| o.to_string()),
            quotation_id: reservation.quotation_id().map(|q| q.to_string()),
            quantity: reservation.quantity(),
            start_date: reservation.period().start_date().format("%Y-%m-%d").to_string(),
            end_date: reservation.period().end_date().format("%Y-%m-%d").to_string(),
            is_active: reservation.is_active(),
        }
    }
}

/// 商品在庫用のレスポンスDTO
#[derive(Serialize)]
pub struct ProductStockResponse {
    pub product_id: String,
    pub quantity: u32,
}

impl ProductStockResponse {
    /// ドメインオブジェクトからProductStockResponseを作成
    pub fn from_stock(stock: &ProductStock) -> Self {
        Self {
            product_id: stock.product_id().to_string(),
            quantity: stock.quantity(),
        }
    }
}

/// 予約解放用のレスポンスDTO
#[derive(Serialize)]
pub struct CancelReservationsResponse {
    pub order_id: String,
    pub released_count: u64,
}
