//! Append-only byte buffers shared between the scanner, the dispatcher and renderers.

use std::fmt;
use std::str::Utf8Error;
use std::string::FromUtf8Error;

/// A rendered fragment returned by a renderer method.
///
/// Renderers may return either native text or raw bytes; both are appended
/// to the output unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes, validated only when they are later read back as text.
    Bytes(Vec<u8>),
}

impl Fragment {
    /// Bytes of the fragment regardless of encoding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Whether the fragment emits nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for Fragment {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Fragment {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Growable byte accumulator.
///
/// Buffers only grow while a document renders: children render into their
/// own buffer, which is then handed to the enclosing construct and never
/// touched again. Implements [`fmt::Write`] so renderers can use `write!`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Append text.
    pub fn push_str(&mut self, text: &str) {
        self.data.extend_from_slice(text.as_bytes());
    }

    /// Append a single character.
    pub fn push(&mut self, c: char) {
        let mut utf8 = [0; 4];
        self.push_str(c.encode_utf8(&mut utf8));
    }

    /// Append raw bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append the contents of a rendered fragment.
    pub fn push_fragment(&mut self, fragment: &Fragment) {
        self.push_bytes(fragment.as_bytes());
    }

    /// Append another buffer.
    pub fn push_buffer(&mut self, other: &Buffer) {
        self.push_bytes(&other.data);
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Contents as text.
    ///
    /// Fails when a renderer appended bytes that are not valid UTF-8.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    /// Check whether the buffer ends with `suffix`.
    #[must_use]
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.data.ends_with(suffix.as_bytes())
    }

    /// Consume the buffer and return its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Consume the buffer and return its contents as a `String`.
    pub fn into_string(self) -> Result<String, FromUtf8Error> {
        String::from_utf8(self.data)
    }

    /// Drop everything written after `mark`.
    ///
    /// Only the dispatcher uses this, to discard the partial output of a
    /// block construct whose renderer failed.
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.data.truncate(mark);
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer")
            .field(&String::from_utf8_lossy(&self.data))
            .finish()
    }
}

impl From<&str> for Buffer {
    fn from(text: &str) -> Self {
        Self {
            data: text.as_bytes().to_vec(),
        }
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use super::*;

    #[test]
    fn test_push_text_and_bytes() {
        let mut buf = Buffer::new();
        buf.push_str("hello");
        buf.push(' ');
        buf.push_bytes(b"world");
        assert_eq!(buf.to_str().unwrap(), "hello world");
        assert_eq!(buf.len(), 11);
        assert!(buf.ends_with("world"));
    }

    #[test]
    fn test_push_fragment_accepts_both_encodings() {
        let mut buf = Buffer::new();
        buf.push_fragment(&Fragment::from("text"));
        buf.push_fragment(&Fragment::from(b"-bytes".as_slice()));
        assert_eq!(buf.into_string().unwrap(), "text-bytes");
    }

    #[test]
    fn test_write_macro() {
        let mut buf = Buffer::new();
        write!(buf, "<h{}>", 2).unwrap();
        assert_eq!(buf.to_str().unwrap(), "<h2>");
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let mut buf = Buffer::new();
        buf.push_bytes(&[0xff, 0xfe]);
        assert!(buf.to_str().is_err());
        assert!(buf.into_string().is_err());
    }

    #[test]
    fn test_rollback_discards_tail() {
        let mut buf = Buffer::from("keep");
        let mark = buf.len();
        buf.push_str(" discard");
        buf.rollback(mark);
        assert_eq!(buf.to_str().unwrap(), "keep");
    }

    #[test]
    fn test_empty_fragment() {
        assert!(Fragment::from("").is_empty());
        assert!(!Fragment::from(vec![b'x']).is_empty());
    }
}
