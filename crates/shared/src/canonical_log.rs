//! # Canonical Log Line ミドルウェア
//!
//! リクエストごとに 1 行だけ、完了時のサマリを INFO で出力する tower Layer。
//!
//! 出力フィールド:
//!
//! | フィールド | 内容 |
//! |---|---|
//! | `log.type` | 固定値 `"canonical"` |
//! | `http.method` / `http.path` / `http.version` | リクエスト行 |
//! | `http.status_code` | レスポンスステータス |
//! | `http.latency_ms` | 処理時間（ミリ秒） |
//!
//! 接続元アドレスなど接続単位の情報は外側の TraceLayer のスパンが持つ。
//! JSON 出力ではスパンフィールドも同じ行に含まれる。

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Method, Request, Response, Version};
use tower::{Layer, Service};

/// ヘルスチェック（`/health`, `/health/ready`）は出力しない
fn is_health_check_path(path: &str) -> bool {
    path == "/health" || path.starts_with("/health/")
}

/// リクエスト受付時に確定する情報
struct RequestSummary {
    method:  Method,
    path:    String,
    version: Version,
    started: Instant,
}

impl RequestSummary {
    fn capture<B>(req: &Request<B>) -> Self {
        Self {
            method:  req.method().clone(),
            path:    req.uri().path().to_owned(),
            version: req.version(),
            started: Instant::now(),
        }
    }

    fn emit<ResBody, E: fmt::Display>(&self, result: &Result<Response<ResBody>, E>) {
        let latency_ms = self.started.elapsed().as_millis() as u64;
        let version = format!("{:?}", self.version);

        match result {
            Ok(response) => tracing::info!(
                log.r#type = "canonical",
                http.method = self.method.as_str(),
                http.path = self.path.as_str(),
                http.version = version.as_str(),
                http.status_code = response.status().as_u16(),
                http.latency_ms = latency_ms,
                "リクエスト完了"
            ),
            Err(err) => tracing::error!(
                log.r#type = "canonical",
                http.method = self.method.as_str(),
                http.path = self.path.as_str(),
                http.version = version.as_str(),
                http.latency_ms = latency_ms,
                error.message = %err,
                "リクエスト処理エラー"
            ),
        }
    }
}

/// Canonical Log Line を出力する Layer
///
/// ```text
/// TraceLayer → CanonicalLogLineLayer → handler
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLine<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLine { inner }
    }
}

/// [`CanonicalLogLineLayer`] が包む Service
#[derive(Clone, Debug)]
pub struct CanonicalLogLine<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLine<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: fmt::Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // readiness を確認済みの inner で処理し、self には新しい clone を残す
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);

        if is_health_check_path(req.uri().path()) {
            return Box::pin(inner.call(req));
        }

        let summary = RequestSummary::capture(&req);
        Box::pin(async move {
            let result = inner.call(req).await;
            summary.emit(&result);
            result
        })
    }
}
