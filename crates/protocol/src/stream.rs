// SPDX-License-Identifier: AGPL-3.0-only

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::object::{
  FRAME_HEADER_SIZE, FRAME_VERSION, MALFORMED_ERR_MSG, MAX_BODY_SIZE, MAX_NAME_SIZE, ObjectMessage,
  TOO_LARGE_ERR_MSG, UNSUPPORTED_VERSION_ERR_MSG,
};
use crate::text::TextMessage;

/// Reads a text message from the stream.
///
/// Text messages carry no framing: the peer closing its write side is
/// the only message boundary, so this reads until EOF.
///
/// # Errors
///
/// Returns an error if reading fails or the bytes do not form a valid
/// text message.
pub async fn read_text<S>(stream: &mut S) -> anyhow::Result<TextMessage>
where
  S: AsyncRead + Unpin,
{
  let mut buf = Vec::new();
  stream.read_to_end(&mut buf).await?;

  TextMessage::from_wire(&buf)
}

/// Reads one object frame from the stream.
///
/// The frame is self-delimiting: the header carries the name and body
/// lengths, so the read completes as soon as the frame is consumed,
/// independently of the socket closing.
///
/// # Errors
///
/// Returns an error if the stream ends before the frame is complete,
/// the frame version is unknown, a declared length exceeds the caps,
/// or the content is not valid UTF-8.
pub async fn read_object<S>(stream: &mut S) -> anyhow::Result<ObjectMessage>
where
  S: AsyncRead + Unpin,
{
  let mut header = [0u8; FRAME_HEADER_SIZE];
  stream.read_exact(&mut header).await.map_err(|_| anyhow::anyhow!(MALFORMED_ERR_MSG))?;

  if header[0] != FRAME_VERSION {
    return Err(anyhow::anyhow!(UNSUPPORTED_VERSION_ERR_MSG));
  }

  let name_len = u32::from_be_bytes(header[1..5].try_into()?) as usize;
  let body_len = u32::from_be_bytes(header[5..9].try_into()?) as usize;

  if name_len > MAX_NAME_SIZE || body_len > MAX_BODY_SIZE {
    return Err(anyhow::anyhow!(TOO_LARGE_ERR_MSG));
  }

  let mut name = vec![0u8; name_len];
  stream.read_exact(&mut name).await.map_err(|_| anyhow::anyhow!(MALFORMED_ERR_MSG))?;

  let mut body = vec![0u8; body_len];
  stream.read_exact(&mut body).await.map_err(|_| anyhow::anyhow!(MALFORMED_ERR_MSG))?;

  Ok(ObjectMessage { name: String::from_utf8(name)?, body: String::from_utf8(body)? })
}

#[cfg(test)]
mod tests {
  use super::*;

  use std::io::Cursor;

  #[tokio::test]
  async fn test_read_text_until_eof() {
    let mut stream = Cursor::new(b"hello|2026-08-30 12:00:00".to_vec());

    let msg = read_text(&mut stream).await.unwrap();
    assert_eq!(msg.body(), "hello");
  }

  #[tokio::test]
  async fn test_read_object_roundtrip() {
    let original = ObjectMessage::new("status", "all systems nominal").unwrap();
    let mut stream = Cursor::new(original.encode());

    let decoded = read_object(&mut stream).await.unwrap();
    assert_eq!(decoded, original);
  }

  #[tokio::test]
  async fn test_read_object_stops_at_frame_end() {
    let original = ObjectMessage::new("status", "ok").unwrap();

    // Append trailing bytes after the frame; the decoder must not
    // consume past the frame boundary.
    let mut bytes = original.encode();
    bytes.extend_from_slice(b"trailing");
    let mut stream = Cursor::new(bytes);

    let decoded = read_object(&mut stream).await.unwrap();
    assert_eq!(decoded, original);
    assert_eq!(stream.position() as usize, original.encode().len());
  }

  #[tokio::test]
  async fn test_read_object_errors() {
    struct TestCase {
      name: &'static str,
      input: Vec<u8>,
      expected: &'static str,
    }

    let oversized_header = {
      let mut header = [0u8; FRAME_HEADER_SIZE];
      header[0] = FRAME_VERSION;
      header[1..5].copy_from_slice(&u32::MAX.to_be_bytes());
      header.to_vec()
    };

    let test_cases = vec![
      TestCase { name: "empty stream", input: Vec::new(), expected: MALFORMED_ERR_MSG },
      TestCase { name: "truncated header", input: vec![FRAME_VERSION, 0, 0], expected: MALFORMED_ERR_MSG },
      TestCase {
        name: "unknown version",
        input: {
          let mut frame = ObjectMessage::new("status", "ok").unwrap().encode();
          frame[0] = 0x7f;
          frame
        },
        expected: UNSUPPORTED_VERSION_ERR_MSG,
      },
      TestCase { name: "oversized declared length", input: oversized_header, expected: TOO_LARGE_ERR_MSG },
      TestCase {
        name: "truncated content",
        input: ObjectMessage::new("status", "ok").unwrap().encode()[..FRAME_HEADER_SIZE + 3].to_vec(),
        expected: MALFORMED_ERR_MSG,
      },
      TestCase {
        name: "random garbage",
        input: b"\x02\xde\xad\xbe\xef\xde\xad\xbe\xef not a frame".to_vec(),
        expected: UNSUPPORTED_VERSION_ERR_MSG,
      },
    ];

    for tc in test_cases {
      let mut stream = Cursor::new(tc.input);
      let result = read_object(&mut stream).await;

      assert!(result.is_err(), "test case '{}': expected error", tc.name);
      assert_eq!(result.unwrap_err().to_string(), tc.expected, "test case '{}': error mismatch", tc.name);
    }
  }
}
