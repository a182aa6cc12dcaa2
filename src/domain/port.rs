// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{
    OrderId, ProductId, ProductStock, RentalPeriod, Reservation, ReservationId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 予約書き込みの結果
/// 容量チェックと挿入を1つの操作として実行した結末を表す
#[derive(Debug, Clone, PartialEq)]
pub enum ReserveOutcome {
    /// 予約を記録した
    Created,
    /// 要求された期間に十分な空きがなかった
    InsufficientCapacity {
        total_quantity: u32,
        reserved_quantity: u32,
    },
    /// 参照された商品が存在しなかった
    ProductNotFound,
}

/// 商品リポジトリトレイト
/// 外部エンティティである商品の総在庫数への読み取りアクセスを抽象化する
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 商品在庫を保存する
    ///
    /// # Arguments
    /// * `stock` - 保存する商品在庫
    ///
    /// # Returns
    /// * `Ok(())` - 保存成功
    /// * `Err(RepositoryError)` - 保存失敗
    async fn save(&self, stock: &ProductStock) -> Result<(), RepositoryError>;

    /// 商品IDで商品在庫を検索する
    ///
    /// # Arguments
    /// * `product_id` - 検索する商品ID
    ///
    /// # Returns
    /// * `Ok(Some(ProductStock))` - 商品在庫が見つかった
    /// * `Ok(None)` - 商品が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, product_id: ProductId)
        -> Result<Option<ProductStock>, RepositoryError>;
}

/// 予約リポジトリトレイト
/// 予約集約の永続化を抽象化する
/// 書き込みは予約ライフサイクルサービスのみが行い、空き計算サービスは読み取りのみ
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// 容量を確認したうえで予約を記録する
    /// 確認と挿入は1つのアトミックな操作として実行される
    /// （同一商品・重複期間への並行予約で在庫を超過させないため）
    ///
    /// # Arguments
    /// * `reservation` - 記録する予約
    ///
    /// # Returns
    /// * `Ok(ReserveOutcome)` - 書き込みの結末（成功・空き不足・商品なし）
    /// * `Err(RepositoryError)` - 書き込み失敗
    async fn reserve(&self, reservation: &Reservation) -> Result<ReserveOutcome, RepositoryError>;

    /// 指定された期間と重なる有効予約を取得する
    ///
    /// # Arguments
    /// * `product_id` - 商品ID
    /// * `period` - 要求された貸出期間
    /// * `exclude_order_id` - 除外する注文ID（注文変更時の自己衝突を防ぐ）
    ///
    /// # Returns
    /// * `Ok(Vec<Reservation>)` - 期間と重なる有効予約のリスト
    /// * `Err(RepositoryError)` - 取得失敗
    async fn find_active_overlapping(
        &self,
        product_id: ProductId,
        period: &RentalPeriod,
        exclude_order_id: Option<OrderId>,
    ) -> Result<Vec<Reservation>, RepositoryError>;

    /// 注文IDに紐づくすべての予約を取得する（無効化済みも含む）
    /// 貸出開始日の昇順で並べて返す
    ///
    /// # Arguments
    /// * `order_id` - 注文ID
    ///
    /// # Returns
    /// * `Ok(Vec<Reservation>)` - 注文に紐づく予約のリスト
    /// * `Err(RepositoryError)` - 取得失敗
    async fn find_by_order_id(&self, order_id: OrderId)
        -> Result<Vec<Reservation>, RepositoryError>;

    /// 注文IDに紐づくすべての予約を無効化する
    /// 削除はせず is_active を false にする（監査のため履歴を保持）
    /// べき等であり、2回目以降の呼び出しは0件の更新になる
    ///
    /// # Arguments
    /// * `order_id` - 注文ID
    ///
    /// # Returns
    /// * `Ok(u64)` - 無効化した予約の件数
    /// * `Err(RepositoryError)` - 更新失敗
    async fn deactivate_by_order_id(&self, order_id: OrderId) -> Result<u64, RepositoryError>;

    /// 新しい一意の予約IDを生成する
    ///
    /// # Returns
    /// * 新しい予約ID
    fn next_identity(&self) -> ReservationId;
}
