//! # ルーター構築
//!
//! ```text
//! TraceLayer（リクエストスパン） → CanonicalLogLineLayer → Router → handler
//! ```

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, DefaultBodyLimit},
    http::Request,
    routing::{get, put},
};
use todo_shared::canonical_log::CanonicalLogLineLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handler::{
    ReadinessState,
    TodoState,
    create_todo,
    delete_todo,
    get_todo,
    health_check,
    list_todos,
    mark_todo_done,
    readiness_check,
    update_todo,
};

/// アプリケーション全体のルーター
pub fn router(todo_state: Arc<TodoState>, readiness_state: Arc<ReadinessState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(todo_routes(todo_state))
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
}

/// Todo API のルート
///
/// リクエストボディのサイズは制限しない（axum 既定の 2 MB 上限を外す）。
pub fn todo_routes(state: Arc<TodoState>) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/todos/{id}/done", put(mark_todo_done))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// リクエストスパンを作成する
///
/// 接続元アドレスは `ConnectInfo` があるときだけ記録する。
fn make_request_span(request: &Request<Body>) -> Span {
    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        remote_addr = tracing::field::Empty,
    );
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        span.record("remote_addr", tracing::field::display(addr));
    }
    span
}
