// ドメイン層
// レンタル在庫の空き計算と予約ライフサイクルの中核

pub mod error;
pub mod model;
pub mod port;
pub mod service;

pub use error::DomainError;
