use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{ProductId, ProductStock};
use crate::domain::port::{ProductRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQL商品リポジトリ
/// MySQLデータベースを使用して商品の総在庫数を永続化する
#[derive(Clone)]
pub struct MySqlProductRepository {
    pool: Pool<MySql>,
}

impl MySqlProductRepository {
    /// 新しいMySQL商品リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn save(&self, stock: &ProductStock) -> Result<(), RepositoryError> {
        // 商品在庫をproductsテーブルにUPSERT
        sqlx::query(
            r#"
            INSERT INTO products (id, quantity)
            VALUES (?, ?)
            ON DUPLICATE KEY UPDATE
                quantity = VALUES(quantity)
            "#,
        )
        .bind(stock.product_id().to_string())
        .bind(stock.quantity())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("商品在庫の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductStock>, RepositoryError> {
        // productsテーブルから商品在庫を取得
        let row = sqlx::query("SELECT id, quantity FROM products WHERE id = ?")
            .bind(product_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("商品在庫の取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        match row {
            Some(row) => {
                let product_id = ProductId::from_string(row.get("id")).map_err(|e| {
                    RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
                })?;

                let stock = ProductStock::new(product_id, row.get::<u32, _>("quantity"));
                Ok(Some(stock))
            }
            None => Ok(None),
        }
    }
}
