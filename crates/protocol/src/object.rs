// SPDX-License-Identifier: AGPL-3.0-only

/// The frame version written as the first byte of every object frame.
pub const FRAME_VERSION: u8 = 1;

/// The size of an object frame header:
/// `[version: u8][name_len: u32 BE][body_len: u32 BE]`.
pub const FRAME_HEADER_SIZE: usize = 9;

/// The maximum allowed length of an object name.
pub const MAX_NAME_SIZE: usize = 1024;

/// The maximum allowed length of an object body.
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

pub(crate) const MALFORMED_ERR_MSG: &str = "malformed object frame";
pub(crate) const UNSUPPORTED_VERSION_ERR_MSG: &str = "unsupported frame version";
pub(crate) const TOO_LARGE_ERR_MSG: &str = "object frame too large";

/// A named payload carried in a self-delimiting binary frame.
///
/// Unlike text messages, the decoder determines the end of an object
/// frame from the header alone, never from the socket closing, so an
/// object frame could in principle be followed by further data on the
/// same stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectMessage {
  /// The name of the payload.
  pub name: String,

  /// The payload body.
  pub body: String,
}

// ===== impl ObjectMessage =====

impl ObjectMessage {
  /// Creates a new object message, enforcing the frame size caps.
  ///
  /// # Errors
  ///
  /// Returns an error if the name or body exceed the maximum sizes
  /// representable in a single frame.
  pub fn new(name: impl Into<String>, body: impl Into<String>) -> anyhow::Result<Self> {
    let name = name.into();
    let body = body.into();

    if name.len() > MAX_NAME_SIZE || body.len() > MAX_BODY_SIZE {
      return Err(anyhow::anyhow!(TOO_LARGE_ERR_MSG));
    }
    Ok(Self { name, body })
  }

  /// Encodes the frame header for this message.
  pub fn encode_header(&self) -> [u8; FRAME_HEADER_SIZE] {
    let mut header = [0u8; FRAME_HEADER_SIZE];
    header[0] = FRAME_VERSION;
    header[1..5].copy_from_slice(&(self.name.len() as u32).to_be_bytes());
    header[5..9].copy_from_slice(&(self.body.len() as u32).to_be_bytes());
    header
  }

  /// Encodes the full frame into a single buffer.
  pub fn encode(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_HEADER_SIZE + self.name.len() + self.body.len());
    out.extend_from_slice(&self.encode_header());
    out.extend_from_slice(self.name.as_bytes());
    out.extend_from_slice(self.body.as_bytes());
    out
  }
}

impl std::fmt::Display for ObjectMessage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.name, self.body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_encode_header() {
    let msg = ObjectMessage::new("status", "ok").unwrap();
    let header = msg.encode_header();

    assert_eq!(header[0], FRAME_VERSION);
    assert_eq!(u32::from_be_bytes(header[1..5].try_into().unwrap()), 6);
    assert_eq!(u32::from_be_bytes(header[5..9].try_into().unwrap()), 2);
  }

  #[test]
  fn test_encode_layout() {
    let msg = ObjectMessage::new("status", "ok").unwrap();
    let frame = msg.encode();

    assert_eq!(frame.len(), FRAME_HEADER_SIZE + 8);
    assert_eq!(&frame[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + 6], b"status");
    assert_eq!(&frame[FRAME_HEADER_SIZE + 6..], b"ok");
  }

  #[test]
  fn test_size_caps() {
    assert!(ObjectMessage::new("n".repeat(MAX_NAME_SIZE + 1), "body").is_err());
    assert!(ObjectMessage::new("name", "b".repeat(MAX_BODY_SIZE + 1)).is_err());
    assert!(ObjectMessage::new("n".repeat(MAX_NAME_SIZE), "").is_ok());
  }
}
