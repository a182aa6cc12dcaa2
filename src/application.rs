// アプリケーション層
// ドメインサービスをまとめ、ドライバーアダプターへ公開する

pub mod error;
pub mod service;

pub use error::ApplicationError;
