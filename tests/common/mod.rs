//! Common test infrastructure for pixforge integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use pixel_ops::{codec, ImageBuffer, Pixel};
use pixforge::server;

/// Start a test server on an available port.
///
/// Returns the port and a shutdown token; dropping the token leaks the
/// server task, which is fine for tests.
pub async fn start_test_server() -> (u16, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let port = listener.local_addr().unwrap().port();

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        server::serve(listener, token).await;
    });

    (port, shutdown)
}

/// Connect a raw client socket to the test server.
pub async fn connect(port: u16) -> TcpStream {
    TcpStream::connect(format!("127.0.0.1:{port}"))
        .await
        .expect("failed to connect")
}

/// Write a deterministic multi-color fixture PNG.
pub fn write_fixture_png(path: &Path, width: usize, height: usize) {
    let mut image = ImageBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            image.set_pixel(
                x,
                y,
                Pixel::opaque((x * 23 % 256) as u8, (y * 41 % 256) as u8, 77),
            );
        }
    }
    codec::encode(path, &image).expect("failed to write fixture");
}

/// Send one frame and read one reply, with a timeout so a hung session
/// fails the test instead of blocking it.
pub async fn send_and_read(stream: &mut TcpStream, frame: &[u8]) -> Vec<u8> {
    stream.write_all(frame).await.expect("failed to send frame");
    read_reply(stream).await
}

/// Read a single reply frame (one read call, matching the protocol's
/// unframed result format).
pub async fn read_reply(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = vec![0u8; 4096];
    let n = tokio::time::timeout(Duration::from_secs(10), stream.read(&mut buf))
        .await
        .expect("timed out waiting for reply")
        .expect("failed to read reply");
    buf.truncate(n);
    buf
}
