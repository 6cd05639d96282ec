// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::anyhow;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// A trait for establishing network connections and returning a stream.
///
/// The `Dialer` trait abstracts the connection logic, allowing different
/// implementations for various transport types or custom connection
/// strategies (such as in-memory streams in tests).
#[async_trait::async_trait]
pub trait Dialer: Send + Sync + 'static {
  /// The type of stream returned by this dialer.
  type Stream: AsyncRead + AsyncWrite + Send + Sync + Unpin + 'static;

  /// Establishes a connection and returns a stream.
  ///
  /// # Errors
  ///
  /// Returns an error if the connection fails.
  async fn dial(&self) -> anyhow::Result<Self::Stream>;
}

/// TCP dialer implementation.
#[derive(Clone, Debug)]
pub struct TcpDialer {
  address: String,
}

// ===== impl TcpDialer =====

impl TcpDialer {
  /// Creates a new TCP dialer with the specified address.
  pub fn new(address: String) -> Self {
    Self { address }
  }
}

#[async_trait::async_trait]
impl Dialer for TcpDialer {
  type Stream = TcpStream;

  async fn dial(&self) -> anyhow::Result<TcpStream> {
    let tcp_stream =
      TcpStream::connect(&self.address).await.map_err(|e| anyhow!("failed to connect to {}: {}", self.address, e))?;

    tcp_stream.set_nodelay(true)?;

    Ok(tcp_stream)
  }
}
