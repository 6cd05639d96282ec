// SPDX-License-Identifier: AGPL-3.0-only

use std::fmt::Display;

use chrono::Local;

/// The format used to render the send timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The separator between the message body and the send timestamp.
const SEPARATOR: char = '|';

const EMPTY_ERR_MSG: &str = "message can't be empty";

/// A text message as it travels on the wire.
///
/// The wire representation is the raw UTF-8 bytes of `body|timestamp`,
/// with no length prefix; the message boundary is the sender closing
/// its side of the connection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextMessage {
  /// The full `body|timestamp` string.
  raw: String,
}

// ===== impl TextMessage =====

impl TextMessage {
  /// Creates a new text message, stamping it with the current local time.
  ///
  /// # Errors
  ///
  /// Returns an error if the body is empty.
  pub fn now(body: &str) -> anyhow::Result<Self> {
    if body.is_empty() {
      return Err(anyhow::anyhow!(EMPTY_ERR_MSG));
    }
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);

    Ok(Self { raw: format!("{}{}{}", body, SEPARATOR, timestamp) })
  }

  /// Reconstructs a text message from its wire bytes.
  ///
  /// # Errors
  ///
  /// Returns an error if the bytes are empty or not valid UTF-8.
  pub fn from_wire(bytes: &[u8]) -> anyhow::Result<Self> {
    if bytes.is_empty() {
      return Err(anyhow::anyhow!(EMPTY_ERR_MSG));
    }
    let raw = std::str::from_utf8(bytes)?.to_string();

    Ok(Self { raw })
  }

  /// Returns the wire representation of the message.
  pub fn as_wire_bytes(&self) -> &[u8] {
    self.raw.as_bytes()
  }

  /// Returns the full `body|timestamp` string.
  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// Returns the message body.
  ///
  /// The body and timestamp are split on the last separator, since the
  /// body itself may contain separators but the timestamp cannot.
  pub fn body(&self) -> &str {
    self.raw.rsplit_once(SEPARATOR).map(|(body, _)| body).unwrap_or(&self.raw)
  }

  /// Returns the send timestamp, if one is present.
  pub fn timestamp(&self) -> Option<&str> {
    self.raw.rsplit_once(SEPARATOR).map(|(_, timestamp)| timestamp)
  }
}

impl Display for TextMessage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.raw)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_now_appends_timestamp() {
    let msg = TextMessage::now("hello").unwrap();

    assert!(msg.as_str().starts_with("hello|"));
    assert_eq!(msg.body(), "hello");

    let timestamp = msg.timestamp().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
  }

  #[test]
  fn test_empty_body_rejected() {
    let result = TextMessage::now("");

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), EMPTY_ERR_MSG);
  }

  #[test]
  fn test_body_may_contain_separator() {
    let msg = TextMessage::now("a|b|c").unwrap();

    assert_eq!(msg.body(), "a|b|c");
  }

  #[test]
  fn test_from_wire() {
    let msg = TextMessage::from_wire(b"hello|2026-08-30 12:00:00").unwrap();

    assert_eq!(msg.body(), "hello");
    assert_eq!(msg.timestamp(), Some("2026-08-30 12:00:00"));

    assert!(TextMessage::from_wire(b"").is_err());
    assert!(TextMessage::from_wire(&[0xff, 0xfe]).is_err());
  }
}
