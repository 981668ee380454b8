//! Minimal task client: one connection, one request, one reply.
//!
//! Used by the `request` CLI subcommand and handy for poking a running
//! server by hand. The result frame has no terminator, so the reply is
//! taken from a single read (the same assumption the original client made).

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::protocol::{self, TaskRequest, TaskResult};

/// Send `request` to the server at `addr` and return the parsed result.
pub async fn submit(addr: &str, request: &TaskRequest) -> anyhow::Result<TaskResult> {
    let frame = protocol::encode_request(request)?;

    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(&frame).await?;

    let mut reply = vec![0u8; 4096];
    let n = stream.read(&mut reply).await?;
    if n == 0 {
        anyhow::bail!("server closed the connection without a reply");
    }
    Ok(protocol::parse_result(&reply[..n]))
}
