//! Framed line codec.
//!
//! Splits the inbound byte stream into complete lines terminated by `\r\n`
//! (bare `\n` is accepted), enforcing the protocol's 512-byte line cap, and
//! serializes outgoing [`Message`]s with their terminator.

use bytes::{BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

use crate::message::Message;

/// Maximum line length in bytes, terminator included.
pub const MAX_LINE_LEN: usize = 512;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("line exceeds {MAX_LINE_LEN} bytes")]
    LineTooLong,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Codec for the IRC line protocol.
///
/// Decoded items are complete lines without their terminator, decoded
/// lossily so that arbitrary byte streams never fail to decode; empty
/// lines are skipped. An over-length line is an error, leaving the buffer
/// truncated at the boundary of the last complete message consumed.
#[derive(Debug, Default)]
pub struct IrcCodec {
    scanned: usize,
}

impl IrcCodec {
    pub fn new() -> IrcCodec {
        IrcCodec::default()
    }
}

impl Decoder for IrcCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, CodecError> {
        loop {
            match buf[self.scanned..].iter().position(|&b| b == b'\n') {
                Some(offset) => {
                    let end = self.scanned + offset;
                    let line = buf.split_to(end + 1);
                    self.scanned = 0;

                    if line.len() > MAX_LINE_LEN {
                        buf.clear();
                        return Err(CodecError::LineTooLong);
                    }

                    let mut text: &[u8] = &line;
                    while matches!(text.last(), Some(b'\r') | Some(b'\n')) {
                        text = &text[..text.len() - 1];
                    }

                    if text.is_empty() {
                        continue;
                    }
                    return Ok(Some(String::from_utf8_lossy(text).into_owned()));
                }
                None => {
                    if buf.len() > MAX_LINE_LEN {
                        buf.clear();
                        self.scanned = 0;
                        return Err(CodecError::LineTooLong);
                    }
                    self.scanned = buf.len();
                    return Ok(None);
                }
            }
        }
    }
}

impl Encoder<&Message> for IrcCodec {
    type Error = CodecError;

    fn encode(&mut self, msg: &Message, dst: &mut BytesMut) -> Result<(), CodecError> {
        let line = msg.to_string();
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut IrcCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(Some(line)) = codec.decode(buf) {
            out.push(line);
        }
        out
    }

    #[test]
    fn splits_crlf_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"NICK alice\r\nUSER a 0 * :A\r\n"[..]);
        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec!["NICK alice", "USER a 0 * :A"]
        );
    }

    #[test]
    fn accepts_bare_lf() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"PING x\nPING y\n"[..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING x", "PING y"]);
    }

    #[test]
    fn buffers_partial_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"NICK al"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"ice\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("NICK alice".into()));
    }

    #[test]
    fn skips_empty_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"\r\n\r\nPING x\r\n"[..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING x"]);
    }

    #[test]
    fn rejects_over_length_line() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&vec![b'a'; 600]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::LineTooLong)
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn consumes_complete_lines_before_over_length_error() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"PING x\r\n"[..]);
        buf.extend_from_slice(&vec![b'b'; 600]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING x".into()));
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::LineTooLong)
        ));
    }

    #[test]
    fn never_panics_on_arbitrary_bytes() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"\xff\xfe\x00garbage\r\nPING x\r\n"[..]);
        let lines = decode_all(&mut codec, &mut buf);
        assert_eq!(lines.last().map(String::as_str), Some("PING x"));
    }

    #[test]
    fn encodes_with_terminator() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        let msg = Message::privmsg("#x", "hi there");
        codec.encode(&msg, &mut buf).unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #x :hi there\r\n");
    }
}
