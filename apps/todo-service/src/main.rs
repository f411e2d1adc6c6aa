//! # Todo Service サーバー
//!
//! Todo の作成・取得・更新・削除を提供する HTTP サーバー。
//!
//! ## 構成
//!
//! ```text
//! handler（HTTP） → usecase（時刻採番） → repository（PostgreSQL）
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `TODO_LISTEN_ADDRESS` | No | バインドアドレス（デフォルト: `:8000`） |
//! | `TODO_DB_HOST` | No | DB ホスト（デフォルト: `localhost`） |
//! | `TODO_DB_PORT` | No | DB ポート（デフォルト: `5432`） |
//! | `TODO_DB_USERNAME` | **Yes** | DB ユーザー名 |
//! | `TODO_DB_PASSWORD` | **Yes** | DB パスワード |
//! | `TODO_DB_DBNAME` | **Yes** | DB 名 |
//! | `TODO_LOG_LEVEL` | No | ログレベル（デフォルト: `info`、`RUST_LOG` が優先） |
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! TODO_DB_USERNAME=todo TODO_DB_PASSWORD=secret TODO_DB_DBNAME=todo \
//!     cargo run -p todo-service
//! ```
//!
//! スキーマは事前に `migrations/` の DDL で作成しておくこと。起動時にはマイグレーションしない。

mod app;
mod config;
mod error;
mod handler;
mod server;
mod usecase;

use std::sync::Arc;

use anyhow::Context as _;
use config::AppConfig;
use handler::{ReadinessState, TodoState};
use todo_domain::clock::SystemClock;
use todo_infra::{db, repository::PostgresTodoRepository};
use todo_shared::observability::TracingConfig;
use tokio::net::TcpListener;
use usecase::TodoUseCaseImpl;

const SERVICE_NAME: &str = "todo-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("設定の読み込みに失敗しました")?;

    todo_shared::observability::init_tracing(TracingConfig::new(
        SERVICE_NAME,
        config.log_format,
        config.log_level.clone(),
    ));
    let _tracing_guard = tracing::info_span!("app", service = SERVICE_NAME).entered();

    tracing::info!(database = ?config.database, "設定を読み込みました");

    let pool = db::create_pool(&config.database.url())
        .await
        .context("データベース接続に失敗しました")?;
    db::ping(&pool)
        .await
        .context("データベースの疎通確認に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // Readiness Check 用 State（pool が move される前に clone）
    let readiness_state = Arc::new(ReadinessState { pool: pool.clone() });

    let todo_repository = Arc::new(PostgresTodoRepository::new(pool.clone()));
    let usecase = TodoUseCaseImpl::new(todo_repository, Arc::new(SystemClock));
    let todo_state = Arc::new(TodoState { usecase });

    let router = app::router(todo_state, readiness_state);

    let listener = TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("{} にバインドできませんでした", config.listen_address))?;
    tracing::info!(
        "Todo Service サーバーが起動しました: {}",
        listener.local_addr()?
    );

    server::serve(listener, router, server::shutdown_signal()).await?;

    if tokio::time::timeout(server::SHUTDOWN_GRACE_PERIOD, pool.close())
        .await
        .is_err()
    {
        tracing::warn!("接続プールのクローズがタイムアウトしました");
    }
    tracing::info!("サーバーを停止しました");

    Ok(())
}
