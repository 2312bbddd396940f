//! An incremental push parser for `multipart/form-data` byte streams.
//!
//! The caller feeds raw body bytes to a [`StatefulParser`] in chunks of any
//! size — straight off a socket, a buffered reader, whatever — and the parser
//! reports parts to a [`Listener`] as soon as they are recognized, without
//! ever buffering the whole message. Boundary markers that straddle chunk
//! splits are handled by a small carry buffer, so the listener sees identical
//! output no matter how the stream is fragmented.
//!
//! # Examples
//!
//! ```
//! use multipart_push::{PartCollector, StatefulParser};
//!
//! # fn run() -> multipart_push::Result<()> {
//! let data: &[u8] = b"--X-BOUNDARY\r\n\
//!     Content-Disposition: form-data; name=\"my_text_field\"\r\n\r\n\
//!     abcd\r\n\
//!     --X-BOUNDARY\r\n\
//!     Content-Disposition: form-data; name=\"my_file\"; filename=\"a.txt\"\r\n\r\n\
//!     file contents\r\n\
//!     --X-BOUNDARY--\r\n";
//!
//! let mut parser = StatefulParser::new("X-BOUNDARY", PartCollector::new())?;
//!
//! // Byte-at-a-time fragmentation works just like one big chunk.
//! for byte in data {
//!     parser.parse_next(std::slice::from_ref(byte))?;
//! }
//! assert!(parser.finished());
//!
//! let collector = parser.into_listener();
//! assert_eq!(collector.parts().len(), 2);
//! assert_eq!(collector.part("my_text_field").unwrap().text(), Some("abcd".to_owned()));
//! assert_eq!(collector.part("my_file").unwrap().file_name(), Some("a.txt"));
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```

pub use error::Error;
pub use listener::{Listener, PartCollector};
pub use parser::StatefulParser;
pub use part::{Part, PartData};

mod buffer;
mod constants;
mod content_disposition;
mod error;
mod helpers;
mod listener;
mod parser;
mod part;
mod state;

/// A Result type often returned from methods that can have `multipart-push`
/// errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `Content-Type` header value to extract the boundary token.
///
/// # Examples
///
/// ```
/// let content_type = "multipart/form-data; boundary=ABCDEFG";
/// assert_eq!(multipart_push::parse_boundary(content_type), Ok("ABCDEFG".to_owned()));
/// ```
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    let m = content_type
        .as_ref()
        .parse::<mime::Mime>()
        .map_err(Error::DecodeContentType)?;

    if !(m.type_() == mime::MULTIPART_FORM_DATA.type_() && m.subtype() == mime::MULTIPART_FORM_DATA.subtype()) {
        return Err(Error::NoMultipart);
    }

    m.get_param(mime::BOUNDARY)
        .map(|name| name.as_str().to_owned())
        .ok_or(Error::NoBoundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boundary() {
        let content_type = "multipart/form-data; boundary=ABCDEFG";
        assert_eq!(parse_boundary(content_type), Ok("ABCDEFG".to_owned()));

        let content_type = "multipart/form-data; boundary=------ABCDEFG";
        assert_eq!(parse_boundary(content_type), Ok("------ABCDEFG".to_owned()));

        let content_type = "boundary=------ABCDEFG";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "text/plain";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "text/plain; boundary=------ABCDEFG";
        assert!(parse_boundary(content_type).is_err());

        let content_type = "multipart/form-data";
        assert_eq!(parse_boundary(content_type), Err(Error::NoBoundary));
    }
}
