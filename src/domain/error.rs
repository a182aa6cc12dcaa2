/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 無効な数量（例: 0以下の数量）
    InvalidQuantity,
    /// 無効な貸出期間（例: 開始日が返却日より後）
    InvalidPeriod(String),
    /// 無効な値（例: 存在しない年月）
    InvalidValue(String),
    /// 参照された商品が存在しない
    ProductNotFound(String),
    /// 要求された期間に十分な空きがない
    InsufficientCapacity {
        requested_quantity: u32,
        available_quantity: u32,
    },
    /// 永続化の失敗
    RepositoryError(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidQuantity => write!(f, "Invalid quantity"),
            DomainError::InvalidPeriod(msg) => write!(f, "Invalid rental period: {}", msg),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::ProductNotFound(msg) => write!(f, "Product not found: {}", msg),
            DomainError::InsufficientCapacity {
                requested_quantity,
                available_quantity,
            } => write!(
                f,
                "Insufficient capacity: requested {}, available {}",
                requested_quantity, available_quantity
            ),
            DomainError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
