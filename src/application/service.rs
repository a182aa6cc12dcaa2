use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    Availability, DayAvailability, NewReservation, OrderId, ProductId, RentalPeriod, Reservation,
};
use crate::domain::port::{Logger, ReservationRepository};
use crate::domain::service::{AvailabilityService, ReservationLifecycleService};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 空き状況クエリサービス
/// 読み取り専用の空き状況操作を提供する
pub struct AvailabilityQueryService {
    availability_service: AvailabilityService,
    logger: Arc<dyn Logger>,
}

impl AvailabilityQueryService {
    /// 新しい空き状況クエリサービスを作成
    ///
    /// # Arguments
    /// * `availability_service` - 空き状況計算サービス
    /// * `logger` - ロガー
    pub fn new(availability_service: AvailabilityService, logger: Arc<dyn Logger>) -> Self {
        Self {
            availability_service,
            logger,
        }
    }

    /// 指定された期間に要求数量の空きがあるかを確認する
    /// 失敗は「空きなし」の保守的な結果へ退避するため、このメソッドは失敗しない
    ///
    /// # Arguments
    /// * `product_id` - 商品ID
    /// * `period` - 要求された貸出期間
    /// * `requested_quantity` - 要求数量
    /// * `exclude_order_id` - 除外する注文ID（注文変更時の再確認用）
    ///
    /// # Returns
    /// * 空き状況の判定結果
    pub async fn check_availability(
        &self,
        product_id: ProductId,
        period: &RentalPeriod,
        requested_quantity: u32,
        exclude_order_id: Option<OrderId>,
    ) -> Availability {
        let correlation_id = Uuid::new_v4();
        let availability = self
            .availability_service
            .check_availability(product_id, period, requested_quantity, exclude_order_id)
            .await;

        // 退避した結果（確認不能）は運用上の異常なので警告として残す
        if let Some(message) = availability.message() {
            if availability.total_quantity() == 0 && availability.reserved_quantity() == 0 {
                self.logger.warn(
                    "AvailabilityQueryService",
                    message,
                    Some(correlation_id),
                    Some(HashMap::from([(
                        "product_id".to_string(),
                        product_id.to_string(),
                    )])),
                );
            }
        }

        availability
    }

    /// 指定された年月の各日の空き数量を取得する（カレンダー表示用）
    ///
    /// # Arguments
    /// * `product_id` - 商品ID
    /// * `year` - 年
    /// * `month` - 月（1〜12）
    ///
    /// # Returns
    /// * `Ok(Vec<DayAvailability>)` - 月の全日の空き数量（昇順）
    /// * `Err(ApplicationError)` - 年月が無効
    pub async fn get_available_dates(
        &self,
        product_id: ProductId,
        year: i32,
        month: u32,
    ) -> Result<Vec<DayAvailability>, ApplicationError> {
        self.availability_service
            .get_available_dates(product_id, year, month)
            .await
            .map_err(ApplicationError::from)
    }
}

/// 予約アプリケーションサービス
/// 注文・決済ワークフローから呼ばれる予約の作成・解放・照会を提供する
pub struct ReservationApplicationService {
    lifecycle_service: ReservationLifecycleService,
    reservation_repository: Arc<dyn ReservationRepository>,
    logger: Arc<dyn Logger>,
}

impl ReservationApplicationService {
    /// 新しい予約アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `lifecycle_service` - 予約ライフサイクルサービス
    /// * `reservation_repository` - 予約リポジトリ（照会用）
    /// * `logger` - ロガー
    pub fn new(
        lifecycle_service: ReservationLifecycleService,
        reservation_repository: Arc<dyn ReservationRepository>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            lifecycle_service,
            reservation_repository,
            logger,
        }
    }

    /// 予約を作成する
    /// 呼び出し側（注文ワークフロー）は決済の検証後にこの操作を呼ぶ
    ///
    /// # Arguments
    /// * `command` - 予約作成コマンド
    ///
    /// # Returns
    /// * `Ok(Reservation)` - 記録された予約
    /// * `Err(ApplicationError)` - 作成失敗
    pub async fn create_reservation(
        &self,
        command: NewReservation,
    ) -> Result<Reservation, ApplicationError> {
        let correlation_id = Uuid::new_v4();
        let product_id = command.product_id;

        match self.lifecycle_service.create_reservation(command).await {
            Ok(reservation) => {
                self.logger.info(
                    "ReservationApplicationService",
                    &format!(
                        "予約を記録しました: {} ({}個, {})",
                        reservation.id(),
                        reservation.quantity(),
                        reservation.period()
                    ),
                    Some(correlation_id),
                    Some(HashMap::from([(
                        "product_id".to_string(),
                        product_id.to_string(),
                    )])),
                );
                Ok(reservation)
            }
            Err(DomainError::InsufficientCapacity {
                requested_quantity,
                available_quantity,
            }) => {
                self.logger.warn(
                    "ReservationApplicationService",
                    &format!(
                        "空き不足のため予約できませんでした: 要求 {} / 空き {}",
                        requested_quantity, available_quantity
                    ),
                    Some(correlation_id),
                    Some(HashMap::from([(
                        "product_id".to_string(),
                        product_id.to_string(),
                    )])),
                );
                Err(ApplicationError::DomainError(
                    DomainError::InsufficientCapacity {
                        requested_quantity,
                        available_quantity,
                    },
                ))
            }
            Err(err) => {
                self.logger.error(
                    "ReservationApplicationService",
                    &format!("予約の作成に失敗しました: {}", err),
                    Some(correlation_id),
                    None,
                );
                Err(ApplicationError::from(err))
            }
        }
    }

    /// 注文に紐づくすべての予約を無効化する（注文キャンセル・返金時）
    ///
    /// # Arguments
    /// * `order_id` - 注文ID
    ///
    /// # Returns
    /// * `Ok(u64)` - 無効化した予約の件数（べき等: 2回目は0）
    /// * `Err(ApplicationError)` - 更新失敗
    pub async fn cancel_order_reservations(
        &self,
        order_id: OrderId,
    ) -> Result<u64, ApplicationError> {
        let correlation_id = Uuid::new_v4();
        let released = self
            .lifecycle_service
            .cancel_order_reservations(order_id)
            .await?;

        self.logger.info(
            "ReservationApplicationService",
            &format!("注文 {} の予約 {} 件を解放しました", order_id, released),
            Some(correlation_id),
            None,
        );

        Ok(released)
    }

    /// 注文に紐づく予約を取得する（無効化済みも含む、監査用）
    /// 貸出開始日の昇順で並べて返す
    ///
    /// # Arguments
    /// * `order_id` - 注文ID
    ///
    /// # Returns
    /// * `Ok(Vec<Reservation>)` - 注文に紐づく予約のリスト
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_reservations_by_order_id(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Reservation>, ApplicationError> {
        self.reservation_repository
            .find_by_order_id(order_id)
            .await
            .map_err(ApplicationError::from)
    }
}
