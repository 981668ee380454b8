//! TCP listener and session supervision.
//!
//! The accept loop spawns one [`session`] worker per connection onto a
//! [`TaskTracker`], so shutdown can drain in-flight sessions and a
//! connection cap can be added later without redesign. There is currently
//! no bound on concurrent sessions.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::session;

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn run(bind_addr: &str, shutdown: CancellationToken) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "pixforge task server listening");
    serve(listener, shutdown).await;
    Ok(())
}

/// Accept connections on an already-bound listener.
///
/// Split from [`run`] so integration tests can bind port 0 themselves.
pub async fn serve(listener: TcpListener, shutdown: CancellationToken) {
    let tracker = TaskTracker::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("shutting down, draining sessions");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        tracker.spawn(session::handle_connection(stream, peer));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                    }
                }
            }
        }
    }

    tracker.close();
    tracker.wait().await;
}
