use std::future::Future;
use std::io;

/// Waits on `listener`. A listener that failed to install never resolves, so
/// the server keeps running on the signals that did install.
pub async fn until_signal<F>(name: &str, listener: io::Result<F>)
where
    F: Future<Output = ()>,
{
    match listener {
        Ok(fired) => fired.await,
        Err(err) => {
            tracing::error!(error = %err, signal = name, "failed to install signal handler");
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = until_signal(
        "SIGTERM",
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).map(
            |mut signal| async move {
                signal.recv().await;
            },
        ),
    );

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::until_signal;

    #[tokio::test]
    async fn failed_registration_never_resolves() {
        let listener = Err::<std::future::Ready<()>, _>(std::io::Error::other("no signal support"));
        let waited = tokio::time::timeout(Duration::from_millis(50), until_signal("SIGTERM", listener)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn installed_listener_resolves_when_fired() {
        let listener = Ok(std::future::ready(()));
        let waited = tokio::time::timeout(Duration::from_millis(50), until_signal("SIGTERM", listener)).await;
        assert!(waited.is_ok());
    }
}
