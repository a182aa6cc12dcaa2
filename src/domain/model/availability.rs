use chrono::NaiveDate;

/// 空き状況の判定結果
/// 問い合わせのたびに再計算される導出値であり、永続化もキャッシュもしない
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    available: bool,
    available_quantity: u32,
    total_quantity: u32,
    reserved_quantity: u32,
    message: Option<String>,
}

impl Availability {
    /// 総在庫数・予約済み数量・要求数量から空き状況を判定
    ///
    /// # Arguments
    /// * `total_quantity` - 商品の総在庫数
    /// * `reserved_quantity` - 期間に重なる有効予約の数量合計
    /// * `requested_quantity` - 要求数量
    pub fn evaluate(total_quantity: u32, reserved_quantity: u32, requested_quantity: u32) -> Self {
        let available_quantity = total_quantity.saturating_sub(reserved_quantity);
        let available = available_quantity >= requested_quantity;
        let message = if available {
            None
        } else {
            Some(format!(
                "要求数量 {} に対して空きは {} です",
                requested_quantity, available_quantity
            ))
        };
        Self {
            available,
            available_quantity,
            total_quantity,
            reserved_quantity,
            message,
        }
    }

    /// 空きなしの保守的な結果を作成
    /// 商品が見つからない場合やストレージ障害時に使用する
    /// 空き確認は購入フローの前提となるため、確認できない場合は利用不可として扱う
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            available_quantity: 0,
            total_quantity: 0,
            reserved_quantity: 0,
            message: Some(message.into()),
        }
    }

    /// 要求数量を満たす空きがあるかどうか
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// 空き数量を取得（0以上）
    pub fn available_quantity(&self) -> u32 {
        self.available_quantity
    }

    /// 総在庫数を取得
    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// 予約済み数量を取得
    pub fn reserved_quantity(&self) -> u32 {
        self.reserved_quantity
    }

    /// 診断メッセージを取得
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// カレンダー表示用の1日分の空き状況
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayAvailability {
    date: NaiveDate,
    available_quantity: u32,
}

impl DayAvailability {
    /// 新しい1日分の空き状況を作成
    pub fn new(date: NaiveDate, available_quantity: u32) -> Self {
        Self {
            date,
            available_quantity,
        }
    }

    /// 日付を取得
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// その日の空き数量を取得（0以上）
    pub fn available_quantity(&self) -> u32 {
        self.available_quantity
    }
}
