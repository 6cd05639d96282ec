// SPDX-License-Identifier: AGPL-3.0-only

use async_trait::async_trait;
use tokio::net::TcpStream;

use courier_protocol::{ObjectMessage, TextMessage, read_object, read_text};

/// A strategy for materializing one inbound connection into one message.
///
/// Implementations define both the wire framing (where a message ends)
/// and the decoding of its bytes.
#[async_trait]
pub trait Decode: Clone + Send + Sync + 'static {
  /// The decoded message type.
  type Item: Send + 'static;

  /// The message kind label, used for logging and metrics.
  const KIND: &'static str;

  /// Reads one complete message from the stream.
  ///
  /// # Errors
  ///
  /// Returns an error if the stream ends prematurely or carries bytes
  /// that do not decode into a message. The connection is abandoned on
  /// error; nothing partial is ever surfaced.
  async fn decode(&self, stream: &mut TcpStream) -> anyhow::Result<Self::Item>;
}

/// Decoder for EOF-delimited text messages.
///
/// The peer closing its write side is the only message boundary, so a
/// peer that never closes holds the read until the listener's timeout.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextDecoder;

#[async_trait]
impl Decode for TextDecoder {
  type Item = TextMessage;

  const KIND: &'static str = "text";

  async fn decode(&self, stream: &mut TcpStream) -> anyhow::Result<TextMessage> {
    read_text(stream).await
  }
}

/// Decoder for self-delimiting binary object frames.
///
/// The frame header declares the payload lengths, so the decode
/// completes as soon as the frame is consumed, independently of EOF.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectDecoder;

#[async_trait]
impl Decode for ObjectDecoder {
  type Item = ObjectMessage;

  const KIND: &'static str = "object";

  async fn decode(&self, stream: &mut TcpStream) -> anyhow::Result<ObjectMessage> {
    read_object(stream).await
  }
}
