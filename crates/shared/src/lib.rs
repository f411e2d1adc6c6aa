//! # Todo 共有ユーティリティ
//!
//! サービスから使われる、ビジネスロジックを含まないユーティリティ。
//!
//! - [`ErrorResponse`]: RFC 9457 Problem Details 形式のエラーボディ
//! - [`HealthResponse`] / [`ReadinessResponse`]: ヘルスチェックのレスポンス型
//! - `observability` feature: トレーシング初期化と Canonical Log Line ミドルウェア

#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod error_response;
pub mod health;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
