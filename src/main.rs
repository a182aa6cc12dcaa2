use rental_reservation_management::adapter::driven::{
    ConsoleLogger, MySqlProductRepository, MySqlReservationRepository,
};
use rental_reservation_management::adapter::driver::rest_api::{create_router, AppStateInner};
use rental_reservation_management::adapter::{DatabaseConfig, DatabaseMigration};
use rental_reservation_management::application::service::{
    AvailabilityQueryService, ReservationApplicationService,
};
use rental_reservation_management::domain::service::{
    AvailabilityService, ReservationLifecycleService,
};

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== レンタル予約管理システム REST API ===");
    println!("空き状況計算・予約ライフサイクルエンジン");
    println!();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    println!(
        "データベース設定を読み込みました: {}:{}",
        config.host, config.port
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    println!("データベース接続プールを作成しました");

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;
    println!("データベースマイグレーションを実行しました");

    // MySQLリポジトリを作成
    let product_repository = Arc::new(MySqlProductRepository::new(pool.clone()));
    let reservation_repository = Arc::new(MySqlReservationRepository::new(pool.clone()));

    // ロガーを作成
    let logger = Arc::new(ConsoleLogger::new());

    // ドメインサービスを作成
    let availability_service =
        AvailabilityService::new(product_repository.clone(), reservation_repository.clone());
    let lifecycle_service = ReservationLifecycleService::new(reservation_repository.clone());

    // アプリケーションサービスを作成
    let availability_query_service =
        AvailabilityQueryService::new(availability_service, logger.clone());
    let reservation_service = ReservationApplicationService::new(
        lifecycle_service,
        reservation_repository.clone(),
        logger.clone(),
    );

    // アプリケーション状態を作成
    let app_state = AppStateInner {
        availability_service: Arc::new(availability_query_service),
        reservation_service: Arc::new(reservation_service),
        product_repository: product_repository.clone(),
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("REST APIサーバーが起動しました: http://localhost:3000");
    println!("ヘルスチェック: GET http://localhost:3000/health");
    println!("API仕様:");
    println!("  POST /products - 商品在庫登録（バックオフィス・テスト用）");
    println!("  GET  /products/:id/stock - 商品在庫取得");
    println!("  GET  /products/:id/availability - 期間の空き確認");
    println!("  GET  /products/:id/available-dates - 月別の空きカレンダー");
    println!("  POST /reservations - 予約作成（決済検証後に呼び出す）");
    println!("  GET  /reservations?order_id= - 注文別予約一覧");
    println!("  POST /orders/:id/cancel-reservations - 注文キャンセル時の予約解放");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
