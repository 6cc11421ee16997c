use std::future::Future;
use tracing::{error, info, warn};

/// Resolves on SIGINT or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Unable to listen for SIGINT: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Unable to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, draining"),
        _ = terminate => info!("Received SIGTERM, draining"),
    }
}

/// Resolves on the first `next()` signal. A later signal runs `on_repeat`, so a drain stuck
/// on a hung read can still be interrupted.
pub async fn graceful_signal<F, Fut, R>(mut next: F, on_repeat: R)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
    R: FnOnce() + Send + 'static,
{
    next().await;
    tokio::spawn(async move {
        next().await;
        warn!("Received a second shutdown signal, exiting without draining");
        on_repeat();
    });
}
