// 駆動される側アダプター（リポジトリ実装など）

mod console_logger;
mod product_repository;
mod reservation_repository;

pub use console_logger::ConsoleLogger;
pub use product_repository::MySqlProductRepository;
pub use reservation_repository::MySqlReservationRepository;
