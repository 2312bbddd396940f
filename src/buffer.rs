use bytes::{Buf, Bytes, BytesMut};
use memchr::{memchr_iter, memmem};

use crate::constants;

/// Carry buffer shared by all parse stages.
///
/// Bytes pushed by the caller accumulate here until a stage can classify
/// them; whatever a stage cannot yet classify stays behind for the next
/// `parse_next` call.
pub(crate) struct ParseBuffer {
    buf: BytesMut,
}

impl ParseBuffer {
    pub fn new() -> Self {
        ParseBuffer { buf: BytesMut::new() }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn find(&self, pattern: &[u8]) -> Option<usize> {
        memmem::find(&self.buf, pattern)
    }

    pub fn discard(&mut self, count: usize) {
        self.buf.advance(count);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn read_exact(&mut self, size: usize) -> Option<Bytes> {
        if size <= self.buf.len() {
            Some(self.buf.split_to(size).freeze())
        } else {
            None
        }
    }

    /// Reads through the first occurrence of `pattern`, inclusive.
    pub fn read_until(&mut self, pattern: &[u8]) -> Option<Bytes> {
        memmem::find(&self.buf, pattern).map(|idx| self.buf.split_to(idx + pattern.len()).freeze())
    }

    /// Reads confirmed part body bytes, scanning for the `\r\n--<boundary>`
    /// marker.
    ///
    /// Returns `(true, data)` with the marker consumed when it is found, and
    /// `(false, data)` otherwise. In the latter case any buffer tail that is
    /// a prefix of the marker is held back until more bytes rule it in or
    /// out, so body bytes are never mistaken for a boundary no matter where
    /// the caller splits its chunks.
    pub fn read_part_data(&mut self, boundary: &str) -> (bool, Bytes) {
        let marker = format!("{}{}{}", constants::CRLF, constants::BOUNDARY_EXT, boundary);
        let marker = marker.as_bytes();

        match memmem::find(&self.buf, marker) {
            Some(idx) => {
                let data = self.buf.split_to(idx).freeze();
                self.buf.advance(marker.len());
                (true, data)
            }
            None => {
                // A partial marker can only start within the last
                // `marker.len() - 1` bytes, and always starts with CR.
                let window_start = self.buf.len().saturating_sub(marker.len() - 1);
                let mut confirmed = self.buf.len();

                for rel_idx in memchr_iter(b'\r', &self.buf[window_start..]) {
                    let idx = window_start + rel_idx;
                    if marker.starts_with(&self.buf[idx..]) {
                        confirmed = idx;
                        break;
                    }
                }

                (false, self.buf.split_to(confirmed).freeze())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_part_data_full_marker() {
        let mut buffer = ParseBuffer::new();
        buffer.push(b"hello world\r\n--XYZ rest");

        let (done, data) = buffer.read_part_data("XYZ");
        assert!(done);
        assert_eq!(&data[..], b"hello world");
        assert_eq!(buffer.as_slice(), b" rest");
    }

    #[test]
    fn test_read_part_data_holds_back_partial_marker() {
        let mut buffer = ParseBuffer::new();
        buffer.push(b"hello\r\n--XY");

        let (done, data) = buffer.read_part_data("XYZ");
        assert!(!done);
        assert_eq!(&data[..], b"hello");
        assert_eq!(buffer.as_slice(), b"\r\n--XY");

        // The next byte rules the marker out, so everything is released.
        buffer.push(b"Q");
        let (done, data) = buffer.read_part_data("XYZ");
        assert!(!done);
        assert_eq!(&data[..], b"\r\n--XYQ");
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_read_part_data_releases_stray_cr() {
        let mut buffer = ParseBuffer::new();
        buffer.push(b"a\rb\rc");

        let (done, data) = buffer.read_part_data("XYZ");
        assert!(!done);
        // The trailing CR could still start a marker.
        assert_eq!(&data[..], b"a\rb");
        assert_eq!(buffer.as_slice(), b"\rc");
    }

    #[test]
    fn test_read_part_data_near_miss_boundary() {
        let mut buffer = ParseBuffer::new();
        buffer.push(b"line1\r\n--1234line2\r\n--12345");

        let (done, data) = buffer.read_part_data("12345");
        assert!(done);
        assert_eq!(&data[..], b"line1\r\n--1234line2");
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_read_until() {
        let mut buffer = ParseBuffer::new();
        buffer.push(b"Name: Value\r\n\r\nrest");

        let block = buffer.read_until(b"\r\n\r\n").unwrap();
        assert_eq!(&block[..], b"Name: Value\r\n\r\n");
        assert_eq!(buffer.as_slice(), b"rest");

        assert!(buffer.read_until(b"\r\n\r\n").is_none());
    }

    #[test]
    fn test_read_exact() {
        let mut buffer = ParseBuffer::new();
        buffer.push(b"ab");

        assert!(buffer.read_exact(3).is_none());
        assert_eq!(&buffer.read_exact(2).unwrap()[..], b"ab");
    }
}
