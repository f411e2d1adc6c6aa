//! # RFC 9457 Problem Details
//!
//! エラー時のレスポンスボディ。HTTP への変換（`IntoResponse`）はサービス側で行い、
//! このクレートは axum に依存しない。

use serde::{Deserialize, Serialize};

const PROBLEM_TYPE_BASE: &str = "https://todo.example.com/errors";

/// 問題種別ごとの固定値
struct ProblemKind {
    slug:   &'static str,
    title:  &'static str,
    status: u16,
}

const BAD_REQUEST: ProblemKind = ProblemKind {
    slug:   "bad-request",
    title:  "Bad Request",
    status: 400,
};

const NOT_FOUND: ProblemKind = ProblemKind {
    slug:   "not-found",
    title:  "Not Found",
    status: 404,
};

const INTERNAL_ERROR: ProblemKind = ProblemKind {
    slug:   "internal-error",
    title:  "Internal Server Error",
    status: 500,
};

/// クライアントに返すエラーボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// `https://todo.example.com/errors/{slug}`
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    fn of(kind: ProblemKind, detail: impl Into<String>) -> Self {
        Self {
            error_type: format!("{PROBLEM_TYPE_BASE}/{}", kind.slug),
            title:      kind.title.to_string(),
            status:     kind.status,
            detail:     detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::of(BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::of(NOT_FOUND, detail)
    }

    /// detail は常に同じ文言。原因はレスポンスに載せない
    pub fn internal_error() -> Self {
        Self::of(INTERNAL_ERROR, "内部エラーが発生しました")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_not_foundのボディ() {
        let body = serde_json::to_value(ErrorResponse::not_found("Todo が見つかりません: 7")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "type": "https://todo.example.com/errors/not-found",
                "title": "Not Found",
                "status": 404,
                "detail": "Todo が見つかりません: 7"
            })
        );
    }

    #[test]
    fn test_internal_errorは引数を取らず固定文言になる() {
        let body = ErrorResponse::internal_error();

        assert_eq!(body.status, 500);
        assert_eq!(body.title, "Internal Server Error");
        assert_eq!(body.detail, "内部エラーが発生しました");
    }

    #[test]
    fn test_デシリアライズでtypeフィールドを読む() {
        let json = r#"{"type":"https://todo.example.com/errors/bad-request","title":"Bad Request","status":400,"detail":"x"}"#;

        let body: ErrorResponse = serde_json::from_str(json).unwrap();

        assert_eq!(body, ErrorResponse::bad_request("x"));
    }
}
