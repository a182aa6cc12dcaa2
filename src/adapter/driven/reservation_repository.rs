use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    OrderId, ProductId, QuotationId, RentalPeriod, Reservation, ReservationId, VariantId,
};
use crate::domain::port::{RepositoryError, ReservationRepository, ReserveOutcome};
use async_trait::async_trait;
use chrono::NaiveDate;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQL予約リポジトリ
/// MySQLデータベースを使用して予約を永続化する
#[derive(Clone)]
pub struct MySqlReservationRepository {
    pool: Pool<MySql>,
}

impl MySqlReservationRepository {
    /// 新しいMySQL予約リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行から予約集約を再構築する
    fn build_reservation_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Reservation, RepositoryError> {
        let id = ReservationId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
        })?;

        let product_id = ProductId::from_string(row.get("product_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
        })?;

        let variant_id = match row.get::<Option<String>, _>("variant_id") {
            Some(s) => Some(VariantId::from_string(&s).map_err(|e| {
                RepositoryError::FetchFailed(format!(
                    "バリエーションIDの解析に失敗しました: {}",
                    e
                ))
            })?),
            None => None,
        };

        let order_id = match row.get::<Option<String>, _>("order_id") {
            Some(s) => Some(OrderId::from_string(&s).map_err(|e| {
                RepositoryError::FetchFailed(format!("注文IDの解析に失敗しました: {}", e))
            })?),
            None => None,
        };

        let quotation_id = match row.get::<Option<String>, _>("quotation_id") {
            Some(s) => Some(QuotationId::from_string(&s).map_err(|e| {
                RepositoryError::FetchFailed(format!("見積IDの解析に失敗しました: {}", e))
            })?),
            None => None,
        };

        let period = RentalPeriod::new(
            row.get::<NaiveDate, _>("start_date"),
            row.get::<NaiveDate, _>("end_date"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("貸出期間の構築に失敗しました: {}", e))
        })?;

        Reservation::reconstruct(
            id,
            product_id,
            variant_id,
            order_id,
            quotation_id,
            row.get::<u32, _>("quantity"),
            period,
            row.get::<bool, _>("is_active"),
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("予約集約の再構築に失敗しました: {}", e)))
    }
}

#[async_trait]
impl ReservationRepository for MySqlReservationRepository {
    async fn reserve(&self, reservation: &Reservation) -> Result<ReserveOutcome, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!(
                    "トランザクション開始に失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        // 商品行をロックして書き込みを商品単位で直列化する
        // 容量の再計算と挿入が同一トランザクション内で行われるため、
        // 並行する予約どうしが同じ空きを二重に消費することはない
        let product_row = sqlx::query("SELECT quantity FROM products WHERE id = ? FOR UPDATE")
            .bind(reservation.product_id().to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("商品在庫のロックに失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        let total_quantity: u32 = match product_row {
            Some(row) => row.get("quantity"),
            None => return Ok(ReserveOutcome::ProductNotFound),
        };

        // ロック保持中に重なる有効予約の数量を再集計
        let reserved_row = sqlx::query(
            r#"
            SELECT CAST(COALESCE(SUM(quantity), 0) AS UNSIGNED) AS reserved_quantity
            FROM reservations
            WHERE product_id = ?
              AND is_active = TRUE
              AND start_date <= ?
              AND end_date >= ?
            "#,
        )
        .bind(reservation.product_id().to_string())
        .bind(reservation.period().end_date())
        .bind(reservation.period().start_date())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("予約済み数量の集計に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        let reserved_quantity = reserved_row.get::<u64, _>("reserved_quantity") as u32;

        if total_quantity.saturating_sub(reserved_quantity) < reservation.quantity() {
            // ロールバックはDropに任せず明示的に行う
            tx.rollback().await.ok();
            return Ok(ReserveOutcome::InsufficientCapacity {
                total_quantity,
                reserved_quantity,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, product_id, variant_id, order_id, quotation_id,
                 quantity, start_date, end_date, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reservation.id().to_string())
        .bind(reservation.product_id().to_string())
        .bind(reservation.variant_id().map(|v| v.to_string()))
        .bind(reservation.order_id().map(|o| o.to_string()))
        .bind(reservation.quotation_id().map(|q| q.to_string()))
        .bind(reservation.quantity())
        .bind(reservation.period().start_date())
        .bind(reservation.period().end_date())
        .bind(reservation.is_active())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("予約の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Ok(ReserveOutcome::Created)
    }

    async fn find_active_overlapping(
        &self,
        product_id: ProductId,
        period: &RentalPeriod,
        exclude_order_id: Option<OrderId>,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        // 区間交差条件: existing.start <= requested.end AND existing.end >= requested.start
        let rows = match exclude_order_id {
            Some(order_id) => {
                sqlx::query(
                    r#"
                    SELECT id, product_id, variant_id, order_id, quotation_id,
                           quantity, start_date, end_date, is_active
                    FROM reservations
                    WHERE product_id = ?
                      AND is_active = TRUE
                      AND start_date <= ?
                      AND end_date >= ?
                      AND (order_id IS NULL OR order_id <> ?)
                    ORDER BY start_date ASC
                    "#,
                )
                .bind(product_id.to_string())
                .bind(period.end_date())
                .bind(period.start_date())
                .bind(order_id.to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, product_id, variant_id, order_id, quotation_id,
                           quantity, start_date, end_date, is_active
                    FROM reservations
                    WHERE product_id = ?
                      AND is_active = TRUE
                      AND start_date <= ?
                      AND end_date >= ?
                    ORDER BY start_date ASC
                    "#,
                )
                .bind(product_id.to_string())
                .bind(period.end_date())
                .bind(period.start_date())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DatabaseError::QueryError(format!("予約の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let mut reservations = Vec::new();
        for row in &rows {
            reservations.push(Self::build_reservation_from_row(row)?);
        }

        Ok(reservations)
    }

    async fn find_by_order_id(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        // 監査用途のため無効化済みの予約も含めて返す
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, variant_id, order_id, quotation_id,
                   quantity, start_date, end_date, is_active
            FROM reservations
            WHERE order_id = ?
            ORDER BY start_date ASC
            "#,
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("注文別予約一覧の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        let mut reservations = Vec::new();
        for row in &rows {
            reservations.push(Self::build_reservation_from_row(row)?);
        }

        Ok(reservations)
    }

    async fn deactivate_by_order_id(&self, order_id: OrderId) -> Result<u64, RepositoryError> {
        // 物理削除はせず is_active のみ更新する
        // 既に無効化済みの行は変更されないため、2回目の呼び出しは0件になる
        let result = sqlx::query("UPDATE reservations SET is_active = FALSE WHERE order_id = ?")
            .bind(order_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("予約の無効化に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        Ok(result.rows_affected())
    }

    fn next_identity(&self) -> ReservationId {
        ReservationId::new()
    }
}
