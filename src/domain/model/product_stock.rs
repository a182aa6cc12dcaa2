use crate::domain::model::ProductId;

/// 商品在庫
/// 商品はこのコアの外部エンティティであり、ここでは総在庫数のみを参照する
/// 在庫は全期間で共有される単一プールで、個体識別は行わない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductStock {
    product_id: ProductId,
    quantity: u32,
}

impl ProductStock {
    /// 新しい商品在庫を作成
    ///
    /// # Arguments
    /// * `product_id` - 商品ID
    /// * `quantity` - 総在庫数
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// 総在庫数を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}
