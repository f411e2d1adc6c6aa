//! # Todo Service エラー定義
//!
//! サービス固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | ステータス | detail |
//! |---|---|---|
//! | `BadRequest` | 400 | エラー文言 |
//! | `NotFound` | 404 | エラー文言 |
//! | `Database` | 500 | 固定文言（原因はログのみ） |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_domain::DomainError;
use todo_infra::InfraError;
use todo_shared::ErrorResponse;

/// Todo Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// 不正なリクエスト（JSON デコード失敗、ID のパース失敗）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => CoreError::BadRequest(msg),
            not_found @ DomainError::NotFound { .. } => CoreError::NotFound(not_found.to_string()),
        }
    }
}

impl CoreError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            CoreError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            CoreError::NotFound(msg) => ErrorResponse::not_found(msg.clone()),
            CoreError::Database(_) => ErrorResponse::internal_error(),
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        match &self {
            CoreError::BadRequest(msg) | CoreError::NotFound(msg) => {
                tracing::warn!(error.message = %msg, "クライアントエラー");
            }
            CoreError::Database(e) => {
                tracing::error!(
                    error.message = %e,
                    error.span_trace = %e.span_trace(),
                    "データベースエラー"
                );
            }
        }

        let body = self.to_error_response();
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(CoreError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST)]
    #[case(CoreError::NotFound("x".to_string()), StatusCode::NOT_FOUND)]
    #[case(CoreError::Database(InfraError::unexpected("x")), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_バリアントごとのステータスコード(#[case] err: CoreError, #[case] expected: StatusCode) {
        assert_eq!(err.into_response().status(), expected);
    }

    #[tokio::test]
    async fn test_bad_requestはエラー文言をdetailに含める() {
        let response = CoreError::BadRequest("リクエストボディが不正です".to_string()).into_response();

        let json = body_json(response).await;

        assert_eq!(json["type"], "https://todo.example.com/errors/bad-request");
        assert_eq!(json["status"], 400);
        assert_eq!(json["detail"], "リクエストボディが不正です");
    }

    #[tokio::test]
    async fn test_databaseエラーは内部情報をレスポンスに含めない() {
        let response = CoreError::Database(InfraError::unexpected("connection refused")).into_response();

        let json = body_json(response).await;

        assert_eq!(json["status"], 500);
        assert_eq!(json["detail"], "内部エラーが発生しました");
        assert!(!json.to_string().contains("connection refused"));
    }

    #[test]
    fn test_domain_errorのvalidationはbad_requestに変換される() {
        let err: CoreError = DomainError::Validation("ID が不正".to_string()).into();

        assert!(matches!(err, CoreError::BadRequest(msg) if msg == "ID が不正"));
    }

    #[test]
    fn test_domain_errorのnot_foundはnot_foundに変換される() {
        let err: CoreError = DomainError::NotFound {
            entity_type: "Todo",
            id:          "3".to_string(),
        }
        .into();

        assert!(matches!(err, CoreError::NotFound(msg) if msg == "Todo が見つかりません: 3"));
    }
}
