// SPDX-License-Identifier: AGPL-3.0-only

use std::io::IoSlice;
use std::time::Duration;

use anyhow::anyhow;
use serde_derive::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::warn;

use courier_protocol::{Endpoint, ObjectMessage, TextMessage};
use courier_util::conn::{Dialer, TcpDialer};
use courier_util::io::write_all_vectored;

/// Configuration for the sender.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SenderConfig {
  /// The timeout for establishing a connection to the peer.
  #[serde(default = "default_connect_timeout", with = "humantime_serde")]
  pub connect_timeout: Duration,

  /// The timeout for writing a message to the peer.
  #[serde(default = "default_write_timeout", with = "humantime_serde")]
  pub write_timeout: Duration,
}

impl Default for SenderConfig {
  fn default() -> Self {
    Self { connect_timeout: default_connect_timeout(), write_timeout: default_write_timeout() }
  }
}

fn default_connect_timeout() -> Duration {
  Duration::from_secs(5)
}

fn default_write_timeout() -> Duration {
  Duration::from_secs(5)
}

/// A handle to an in-flight background send.
///
/// The dispatching call returns before the delivery completes; awaiting
/// `join` observes the outcome of the background unit of work. Dropping
/// the handle turns the send into fire-and-forget, in which case a
/// delivery failure is still reported through the log.
#[derive(Debug)]
pub struct SendHandle {
  rx: oneshot::Receiver<anyhow::Result<()>>,
}

// ===== impl SendHandle =====

impl SendHandle {
  /// Waits for the background send to complete.
  ///
  /// # Errors
  ///
  /// Returns an error if the connection or write failed, timed out, or
  /// the background task was torn down before completing.
  pub async fn join(self) -> anyhow::Result<()> {
    self.rx.await.map_err(|_| anyhow!("send task dropped before completing"))?
  }
}

/// The message payload carried by one background send.
enum Payload {
  Text(TextMessage),
  Object(ObjectMessage),
}

/// Delivers messages point-to-point, one fresh TCP connection per message.
///
/// The sender is stateless per call: each `send_*` invocation validates
/// its input synchronously, then schedules an independent background unit
/// of work that connects, writes the encoded payload, and closes the
/// connection. Nothing persists across calls.
#[derive(Clone, Debug, Default)]
pub struct Sender {
  /// The sender configuration.
  config: SenderConfig,
}

// ===== impl Sender =====

impl Sender {
  /// Creates a new sender with the given configuration.
  pub fn new(config: SenderConfig) -> Self {
    Self { config }
  }

  /// Sends a text message to the given endpoint.
  ///
  /// The message is stamped with the current local time and written as
  /// raw bytes; the peer reads until the connection closes.
  ///
  /// Validation happens synchronously, before any network I/O: an empty
  /// message never reaches the network layer. Malformed addresses and
  /// ports are rejected earlier still, at `Endpoint` construction.
  ///
  /// # Errors
  ///
  /// Returns an error if the message is empty. Connection failures are
  /// asynchronous and surface through the returned [`SendHandle`].
  pub fn send_text(&self, message: &str, endpoint: &Endpoint) -> anyhow::Result<SendHandle> {
    let msg = TextMessage::now(message)?;

    Ok(self.dispatch(Payload::Text(msg), endpoint.clone()))
  }

  /// Sends an object message to the given endpoint.
  ///
  /// The payload is written as a self-delimiting binary frame; size caps
  /// were already enforced when the [`ObjectMessage`] was constructed.
  ///
  /// # Errors
  ///
  /// Connection failures are asynchronous and surface through the
  /// returned [`SendHandle`].
  pub fn send_object(&self, object: &ObjectMessage, endpoint: &Endpoint) -> anyhow::Result<SendHandle> {
    Ok(self.dispatch(Payload::Object(object.clone()), endpoint.clone()))
  }

  /// Schedules one background unit of work delivering the payload.
  fn dispatch(&self, payload: Payload, endpoint: Endpoint) -> SendHandle {
    let (tx, rx) = oneshot::channel();
    let config = self.config.clone();

    tokio::spawn(async move {
      let result = deliver(&config, payload, &endpoint).await;

      if let Err(err) = &result {
        warn!(endpoint = %endpoint, error = ?err, "failed to deliver message");
      }
      // The caller may have dropped the handle (fire-and-forget).
      let _ = tx.send(result);
    });

    SendHandle { rx }
  }
}

/// Connects to the endpoint, writes the payload, and closes the connection.
async fn deliver(config: &SenderConfig, payload: Payload, endpoint: &Endpoint) -> anyhow::Result<()> {
  let dialer = TcpDialer::new(endpoint.to_string());

  let mut stream = timeout(config.connect_timeout, dialer.dial())
    .await
    .map_err(|_| anyhow!("timed out connecting to {}", endpoint))??;

  let write = async {
    match &payload {
      Payload::Text(msg) => {
        stream.write_all(msg.as_wire_bytes()).await?;
      },
      Payload::Object(obj) => {
        let header = obj.encode_header();
        let mut bufs = [IoSlice::new(&header), IoSlice::new(obj.name.as_bytes()), IoSlice::new(obj.body.as_bytes())];

        write_all_vectored(&mut bufs, &mut stream).await?;
      },
    }
    stream.flush().await?;

    // Half-close so the peer observes EOF; for text mode this is the
    // message boundary.
    stream.shutdown().await?;

    anyhow::Ok(())
  };

  timeout(config.write_timeout, write).await.map_err(|_| anyhow!("timed out writing to {}", endpoint))??;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_empty_message_fails_before_dispatch() {
    let sender = Sender::default();
    let endpoint = Endpoint::default();

    let result = sender.send_text("", &endpoint);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "message can't be empty");
  }

  #[tokio::test]
  async fn test_connection_failure_surfaces_through_handle() {
    let sender = Sender::new(SenderConfig {
      connect_timeout: Duration::from_millis(500),
      write_timeout: Duration::from_millis(500),
    });

    // Bind and immediately drop a listener so the port is very likely
    // closed when the send runs.
    let port = {
      let ln = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
      ln.local_addr().unwrap().port()
    };
    let endpoint = Endpoint::new("127.0.0.1", port).unwrap();

    let handle = sender.send_text("hello", &endpoint).unwrap();

    assert!(handle.join().await.is_err());
  }

  #[test]
  fn test_sender_config_defaults() {
    let config = SenderConfig::default();

    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.write_timeout, Duration::from_secs(5));
  }
}
