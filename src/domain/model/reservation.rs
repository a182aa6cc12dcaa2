use crate::domain::error::DomainError;
use crate::domain::model::{
    OrderId, ProductId, QuotationId, RentalPeriod, ReservationId, VariantId,
};

/// 予約集約
/// 商品N個を貸出期間にわたって確保したことを表す
/// 注文キャンセル時は物理削除せず is_active を false にして容量をプールへ返す
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    id: ReservationId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    order_id: Option<OrderId>,
    quotation_id: Option<QuotationId>,
    quantity: u32,
    period: RentalPeriod,
    is_active: bool,
}

/// 予約作成コマンド
/// 注文・決済ワークフローから渡される入力をまとめたもの
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub order_id: Option<OrderId>,
    pub quotation_id: Option<QuotationId>,
    pub quantity: u32,
    pub period: RentalPeriod,
}

impl Reservation {
    /// 新しい予約を作成（作成直後は有効）
    /// 数量は1以上である必要がある
    ///
    /// # Arguments
    /// * `id` - 予約ID
    /// * `command` - 予約作成コマンド
    pub fn new(id: ReservationId, command: NewReservation) -> Result<Self, DomainError> {
        if command.quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            id,
            product_id: command.product_id,
            variant_id: command.variant_id,
            order_id: command.order_id,
            quotation_id: command.quotation_id,
            quantity: command.quantity,
            period: command.period,
            is_active: true,
        })
    }

    /// 永続化された状態から予約集約を再構築
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: ReservationId,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        order_id: Option<OrderId>,
        quotation_id: Option<QuotationId>,
        quantity: u32,
        period: RentalPeriod,
        is_active: bool,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            id,
            product_id,
            variant_id,
            order_id,
            quotation_id,
            quantity,
            period,
            is_active,
        })
    }

    /// 予約IDを取得
    pub fn id(&self) -> ReservationId {
        self.id
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// バリエーションIDを取得
    pub fn variant_id(&self) -> Option<VariantId> {
        self.variant_id
    }

    /// 注文IDを取得
    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// 見積IDを取得
    pub fn quotation_id(&self) -> Option<QuotationId> {
        self.quotation_id
    }

    /// 確保数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 貸出期間を取得
    pub fn period(&self) -> RentalPeriod {
        self.period
    }

    /// 有効な予約かどうか
    /// 有効な予約のみが空き計算の対象になる
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// 予約を無効化する（注文キャンセル・返金時）
    /// 履歴として残すため削除はしない。二重に呼んでも状態は変わらない
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// 指定された期間と在庫を取り合うかどうか
    /// 無効化された予約は空き計算から除外される
    pub fn conflicts_with(&self, period: &RentalPeriod) -> bool {
        self.is_active && self.period.overlaps(period)
    }
}
