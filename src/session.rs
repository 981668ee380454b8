//! Per-connection session handler.
//!
//! One session owns one TCP connection for its whole lifetime: read bytes,
//! buffer until a complete frame is available, dispatch the request, reply,
//! repeat. The wire format has no length prefix, so the receive buffer is
//! drained with [`protocol::try_parse_request`] rather than assuming one
//! read equals one frame.
//!
//! Termination rules:
//! - zero-byte read (clean disconnect) closes the session without a reply;
//!   a leftover partial frame is logged and discarded
//! - any malformed frame is fatal: one error reply, then close
//! - read or send failures close the session silently

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::protocol::{self, TaskRequest, TaskResult};
use crate::tasks;

/// Read chunk size; frames are far smaller, but a single read may carry
/// several back-to-back requests from a pipelining client.
const READ_CHUNK: usize = 8192;

/// Drive one connection until disconnect or a fatal protocol error.
pub async fn handle_connection(mut stream: TcpStream, peer: SocketAddr) {
    tracing::info!(peer = %peer, "client connected");
    match session_loop(&mut stream).await {
        Ok(()) => tracing::info!(peer = %peer, "session closed"),
        Err(e) => tracing::debug!(peer = %peer, error = %e, "session closed on transport error"),
    }
}

async fn session_loop(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            // Peer disconnected. Anything left in the buffer is a partial
            // frame that can never complete; a disconnect gets no reply, so
            // it is only logged.
            if !pending.is_empty() {
                tracing::warn!(buffered = pending.len(), "connection closed mid-frame");
            }
            return Ok(());
        }
        pending.extend_from_slice(&chunk[..n]);

        // Drain every complete frame currently buffered, in arrival order.
        loop {
            match protocol::try_parse_request(&pending) {
                Ok(Some((request, consumed))) => {
                    pending.drain(..consumed);
                    let result = dispatch(request).await;
                    stream.write_all(&protocol::encode_result(&result)).await?;
                }
                Ok(None) => break,
                Err(e) => {
                    // A malformed frame is fatal to the session, not a
                    // recoverable per-request error.
                    tracing::warn!(error = %e, "protocol error, closing session");
                    let reply = protocol::encode_result(&TaskResult::Failed(e.to_string()));
                    stream.write_all(&reply).await?;
                    return Ok(());
                }
            }
        }
    }
}

/// Run the blocking image work off the async runtime.
async fn dispatch(request: TaskRequest) -> TaskResult {
    match tokio::task::spawn_blocking(move || tasks::execute(&request)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "task worker panicked");
            TaskResult::Failed("task worker failed".to_string())
        }
    }
}
