// SPDX-License-Identifier: AGPL-3.0-only

mod suite;

pub use suite::{ObjectSuite, Suite, TextSuite};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Opens a connection to the given local port, writes the bytes and
/// closes the write side.
///
/// This bypasses the client crate entirely, so tests can put arbitrary
/// (including malformed) bytes on the wire.
pub async fn send_raw_bytes(port: u16, bytes: &[u8]) -> anyhow::Result<()> {
  let mut stream = TcpStream::connect(("127.0.0.1", port)).await?;

  stream.write_all(bytes).await?;
  stream.flush().await?;
  stream.shutdown().await?;

  Ok(())
}
