// ドメインサービス
// 空き状況の計算と予約ライフサイクルを実装する

use crate::domain::error::DomainError;
use crate::domain::model::{
    Availability, DayAvailability, NewReservation, OrderId, ProductId, RentalPeriod, Reservation,
};
use crate::domain::port::{ProductRepository, ReservationRepository, ReserveOutcome};
use chrono::NaiveDate;
use std::sync::Arc;

/// 空き状況計算サービス
/// 商品と期間に対する空き数量を、総在庫数から重なる有効予約の合計を引いて算出する
/// 読み取り専用で副作用を持たず、並行・反復して呼び出しても安全
pub struct AvailabilityService {
    product_repository: Arc<dyn ProductRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
}

impl AvailabilityService {
    /// 新しい空き状況計算サービスを作成
    ///
    /// # Arguments
    /// * `product_repository` - 商品リポジトリ
    /// * `reservation_repository` - 予約リポジトリ
    pub fn new(
        product_repository: Arc<dyn ProductRepository>,
        reservation_repository: Arc<dyn ReservationRepository>,
    ) -> Self {
        Self {
            product_repository,
            reservation_repository,
        }
    }

    /// 指定された期間に要求数量の空きがあるかを確認する
    ///
    /// 空き確認は購入フローの入口であり、ここで落ちると注文全体が壊れるため、
    /// ストレージ障害や商品未登録は失敗として伝播せず
    /// 「空きなし」の保守的な結果に退避させる
    ///
    /// # Arguments
    /// * `product_id` - 商品ID
    /// * `period` - 要求された貸出期間
    /// * `requested_quantity` - 要求数量（1以上）
    /// * `exclude_order_id` - 除外する注文ID（注文変更時の再確認で自己衝突を防ぐ）
    ///
    /// # Returns
    /// * 空き状況の判定結果（このメソッドは失敗しない）
    pub async fn check_availability(
        &self,
        product_id: ProductId,
        period: &RentalPeriod,
        requested_quantity: u32,
        exclude_order_id: Option<OrderId>,
    ) -> Availability {
        if requested_quantity == 0 {
            return Availability::unavailable("要求数量は1以上である必要があります");
        }

        match self
            .compute_availability(product_id, period, requested_quantity, exclude_order_id)
            .await
        {
            Ok(availability) => availability,
            Err(e) => {
                Availability::unavailable(format!("空き状況を確認できませんでした: {}", e))
            }
        }
    }

    /// 空き状況の計算本体
    /// 失敗は呼び出し側で保守的な結果へ変換される
    async fn compute_availability(
        &self,
        product_id: ProductId,
        period: &RentalPeriod,
        requested_quantity: u32,
        exclude_order_id: Option<OrderId>,
    ) -> Result<Availability, DomainError> {
        let stock = self
            .product_repository
            .find_by_id(product_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("商品在庫の取得に失敗: {}", e)))?;

        let stock = match stock {
            Some(stock) => stock,
            None => {
                return Ok(Availability::unavailable(format!(
                    "商品が見つかりません: {}",
                    product_id
                )))
            }
        };

        let overlapping = self
            .reservation_repository
            .find_active_overlapping(product_id, period, exclude_order_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("予約の取得に失敗: {}", e)))?;

        let reserved_quantity: u32 = overlapping.iter().map(Reservation::quantity).sum();

        Ok(Availability::evaluate(
            stock.quantity(),
            reserved_quantity,
            requested_quantity,
        ))
    }

    /// 指定された年月の各日について空き数量を算出する
    /// 商品詳細ページのカレンダー表示用
    ///
    /// 月と重なる予約を一度だけ読み込み、日ごとに期間に含まれる予約の数量を
    /// 合計して総在庫数から引く。結果は日付の昇順で月の全日をカバーする
    ///
    /// # Arguments
    /// * `product_id` - 商品ID
    /// * `year` - 年
    /// * `month` - 月（1〜12）
    ///
    /// # Returns
    /// * `Ok(Vec<DayAvailability>)` - 各日の空き数量（昇順・0以上）
    /// * `Err(DomainError)` - 年月が無効
    pub async fn get_available_dates(
        &self,
        product_id: ProductId,
        year: i32,
        month: u32,
    ) -> Result<Vec<DayAvailability>, DomainError> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            DomainError::InvalidValue(format!("無効な年月です: {}-{}", year, month))
        })?;
        let last_day = Self::last_day_of_month(year, month)?;

        // 期間の不変条件 (start <= end) は月初・月末から自明に成り立つ
        let month_period = RentalPeriod::new(first_day, last_day)?;

        let days = first_day
            .iter_days()
            .take_while(|day| *day <= last_day)
            .collect::<Vec<_>>();

        match self.load_month_snapshot(product_id, &month_period).await {
            Ok((total_quantity, reservations)) => Ok(days
                .into_iter()
                .map(|day| {
                    let reserved: u32 = reservations
                        .iter()
                        .filter(|r| r.period().contains(day))
                        .map(|r| r.quantity())
                        .sum();
                    DayAvailability::new(day, total_quantity.saturating_sub(reserved))
                })
                .collect()),
            // 確認できない日は空きなしとして扱う（保守的な退避）
            Err(_) => Ok(days
                .into_iter()
                .map(|day| DayAvailability::new(day, 0))
                .collect()),
        }
    }

    /// 月の空き計算に必要な総在庫数と重なる有効予約を読み込む
    async fn load_month_snapshot(
        &self,
        product_id: ProductId,
        month_period: &RentalPeriod,
    ) -> Result<(u32, Vec<Reservation>), DomainError> {
        let stock = self
            .product_repository
            .find_by_id(product_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("商品在庫の取得に失敗: {}", e)))?
            .ok_or_else(|| {
                DomainError::ProductNotFound(format!("商品が見つかりません: {}", product_id))
            })?;

        let reservations = self
            .reservation_repository
            .find_active_overlapping(product_id, month_period, None)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("予約の取得に失敗: {}", e)))?;

        Ok((stock.quantity(), reservations))
    }

    /// 指定された年月の末日を取得
    fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate, DomainError> {
        let first_of_next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        first_of_next
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| DomainError::InvalidValue(format!("無効な年月です: {}-{}", year, month)))
    }
}

/// 予約ライフサイクルサービス
/// 注文確定時の予約記録と、注文キャンセル・返金時の予約解放を担当する
/// 予約ストアへの書き込みはこのサービスのみが行う
pub struct ReservationLifecycleService {
    reservation_repository: Arc<dyn ReservationRepository>,
}

impl ReservationLifecycleService {
    /// 新しい予約ライフサイクルサービスを作成
    ///
    /// # Arguments
    /// * `reservation_repository` - 予約リポジトリ
    pub fn new(reservation_repository: Arc<dyn ReservationRepository>) -> Self {
        Self {
            reservation_repository,
        }
    }

    /// 予約を作成する
    ///
    /// 容量の確認と挿入はリポジトリ側で1つのアトミックな操作として実行される。
    /// 事前の空き確認と書き込みを別ステップにすると、同一商品・重複期間への
    /// 並行リクエストが双方成功して在庫を超過しうるため、ここでは
    /// 確認済みかどうかによらず必ずガード付きの書き込みを行う
    ///
    /// # Arguments
    /// * `command` - 予約作成コマンド
    ///
    /// # Returns
    /// * `Ok(Reservation)` - 記録された予約
    /// * `Err(DomainError)` - 数量・期間が無効、空き不足、商品なし、書き込み失敗
    pub async fn create_reservation(
        &self,
        command: NewReservation,
    ) -> Result<Reservation, DomainError> {
        let requested_quantity = command.quantity;
        let reservation =
            Reservation::new(self.reservation_repository.next_identity(), command)?;

        let outcome = self
            .reservation_repository
            .reserve(&reservation)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("予約の記録に失敗: {}", e)))?;

        match outcome {
            ReserveOutcome::Created => Ok(reservation),
            ReserveOutcome::InsufficientCapacity {
                total_quantity,
                reserved_quantity,
            } => Err(DomainError::InsufficientCapacity {
                requested_quantity,
                available_quantity: total_quantity.saturating_sub(reserved_quantity),
            }),
            ReserveOutcome::ProductNotFound => Err(DomainError::ProductNotFound(format!(
                "商品が見つかりません: {}",
                reservation.product_id()
            ))),
        }
    }

    /// 注文に紐づくすべての予約を無効化する（注文キャンセル・返金時）
    /// 容量はプールへ返されるが、予約は履歴として残る
    /// べき等であり、2回目以降の呼び出しは0件の更新になる
    ///
    /// # Arguments
    /// * `order_id` - 注文ID
    ///
    /// # Returns
    /// * `Ok(u64)` - 無効化した予約の件数
    /// * `Err(DomainError)` - 更新失敗
    pub async fn cancel_order_reservations(&self, order_id: OrderId) -> Result<u64, DomainError> {
        self.reservation_repository
            .deactivate_by_order_id(order_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("予約の無効化に失敗: {}", e)))
    }
}
