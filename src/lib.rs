// レンタル商品の空き状況・予約管理エンジン
// ヘキサゴナルアーキテクチャ（ポートとアダプター）で構成する

pub mod adapter;
pub mod application;
pub mod domain;
