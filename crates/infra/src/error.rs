//! # インフラ層エラー
//!
//! [`InfraError`] は種別 [`InfraErrorKind`] と、生成時点のスパン階層
//! （[`SpanTrace`]）を持つ。リポジトリの各メソッドは `instrument` でスパンを張るため、
//! 500 を返す際のログにはどのクエリで失敗したかが残る。
//!
//! SpanTrace の取得には subscriber 側に `tracing_error::ErrorLayer` が必要。
//! 登録されていなければ空のトレースになる。

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

#[derive(Debug, Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// sqlx が返したエラー（接続、タイムアウト、クエリ失敗）
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    /// sqlx 以外の想定外の失敗
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    fn capture(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Unexpected(msg.into()))
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(err: sqlx::Error) -> Self {
        Self::capture(InfraErrorKind::Database(err))
    }
}
