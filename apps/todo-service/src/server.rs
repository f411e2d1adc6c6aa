//! # サーバーのライフサイクル
//!
//! シャットダウン要求を受けると新規接続の受け付けを止め、処理中のリクエストを
//! 猶予期間まで待ってから戻る。猶予を過ぎたリクエストはハンドラの future を
//! 破棄して打ち切り（実行中のクエリもキャンセルされる）、503 を返して接続を閉じる。

use std::{future::Future, net::SocketAddr, time::Duration};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
};
use tokio::{net::TcpListener, sync::watch};

/// 処理中リクエストの完了を待つ猶予期間
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// 打ち切り後、接続が閉じるのを待つ上限
const FORCE_CLOSE_WAIT: Duration = Duration::from_secs(1);

/// `shutdown` が完了するまでリクエストを処理する
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    serve_with_grace_period(listener, router, shutdown, SHUTDOWN_GRACE_PERIOD).await
}

async fn serve_with_grace_period(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
    grace_period: Duration,
) -> anyhow::Result<()> {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let (force_close_tx, force_close_rx) = watch::channel(false);

    let router = router.layer(from_fn_with_state(force_close_rx, cancel_on_force_close));
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = stop_rx.wait_for(|stop| *stop).await;
    });
    let mut handle = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut handle => return Ok(result??),
        () = shutdown => {}
    }

    tracing::info!("シャットダウンを開始します");
    let _ = stop_tx.send(true);

    if let Ok(result) = tokio::time::timeout(grace_period, &mut handle).await {
        result??;
        tracing::info!("すべてのリクエストが完了しました");
        return Ok(());
    }

    tracing::warn!(
        grace_period_secs = grace_period.as_secs_f64(),
        "猶予期間内に完了しなかったリクエストを打ち切ります"
    );
    let _ = force_close_tx.send(true);

    match tokio::time::timeout(FORCE_CLOSE_WAIT, &mut handle).await {
        Ok(result) => result??,
        Err(_) => {
            tracing::warn!("接続が閉じなかったため待機を中止します");
            handle.abort();
        }
    }

    Ok(())
}

/// 打ち切りの通知が来たらハンドラの future を破棄して 503 を返す
async fn cancel_on_force_close(
    State(mut force_close): State<watch::Receiver<bool>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    tokio::select! {
        response = next.run(request) => response,
        () = wait_for_force_close(&mut force_close) => {
            tracing::warn!("猶予期間を過ぎたためリクエストを打ち切りました");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

async fn wait_for_force_close(force_close: &mut watch::Receiver<bool>) {
    // 送信側が先に破棄された場合は打ち切らない
    let sender_dropped = force_close.wait_for(|force| *force).await.is_err();
    if sender_dropped {
        std::future::pending::<()>().await;
    }
}

/// Ctrl-C（SIGINT）または SIGTERM で完了する
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error.message = %e, "Ctrl-C ハンドラを登録できませんでした");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error.message = %e, "SIGTERM ハンドラを登録できませんでした");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
