use std::borrow::Cow;
use std::fmt;
use std::io::{Cursor, Read};

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use http::header::{self, HeaderMap};
#[cfg(feature = "json")]
use serde::de::DeserializeOwned;

use crate::content_disposition::ContentDisposition;
#[cfg(feature = "json")]
use crate::Error;

/// A single part of a multipart message: its headers plus, once the body has
/// been delivered, its body payload.
///
/// A `Part` is created from the header block alone; the body is attached
/// exactly once via [`set_data`](Part::set_data) after all body bytes for the
/// part have been received.
#[derive(Debug)]
pub struct Part {
    headers: HeaderMap,
    name: String,
    file_name: Option<String>,
    content_type: Option<mime::Mime>,
    data: Option<PartData>,
}

/// Body payload of a [`Part`].
///
/// Small fields are cheaply buffered in memory while large file uploads can
/// be spooled elsewhere and handed back as a reader, so both representations
/// are supported. Which one a part ends up with is the listener's choice, not
/// the parser's.
pub enum PartData {
    /// The whole body, buffered.
    InMemory(Bytes),
    /// An externally supplied readable source plus the known body size.
    Stream {
        reader: Box<dyn Read + Send>,
        size: u64,
    },
}

impl PartData {
    /// Total body size in bytes.
    pub fn size(&self) -> u64 {
        match self {
            PartData::InMemory(bytes) => bytes.len() as u64,
            PartData::Stream { size, .. } => *size,
        }
    }
}

impl fmt::Debug for PartData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartData::InMemory(bytes) => f.debug_tuple("InMemory").field(&bytes.len()).finish(),
            PartData::Stream { size, .. } => f.debug_struct("Stream").field("size", size).finish(),
        }
    }
}

impl Part {
    /// Constructs a `Part` from its name and parsed header block, with no
    /// body attached yet.
    pub fn new<N: Into<String>>(name: N, headers: HeaderMap) -> Part {
        let file_name = ContentDisposition::parse(&headers).file_name;
        let content_type = Self::parse_content_type(&headers);

        Part {
            headers,
            name: name.into(),
            file_name,
            content_type,
            data: None,
        }
    }

    fn parse_content_type(headers: &HeaderMap) -> Option<mime::Mime> {
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<mime::Mime>().ok())
    }

    /// The `Content-Disposition` `name` parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `Content-Disposition` `filename` parameter, if any. Present for
    /// file uploads, absent for simple fields.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The part's `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&mime::Mime> {
        self.content_type.as_ref()
    }

    /// The part's full header map.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Attaches the body payload. Intended to be called exactly once, after
    /// the part's end-of-body sentinel.
    pub fn set_data(&mut self, data: PartData) {
        debug_assert!(self.data.is_none(), "part body is attached exactly once");
        self.data = Some(data);
    }

    /// The body payload, or `None` if the body has not been attached yet.
    pub fn data(&self) -> Option<&PartData> {
        self.data.as_ref()
    }

    /// Total body size in bytes, if the body has been attached.
    pub fn size(&self) -> Option<u64> {
        self.data.as_ref().map(|data| data.size())
    }

    /// The body as a byte buffer. `None` if the body is absent or stored as
    /// a stream.
    pub fn bytes(&self) -> Option<&Bytes> {
        match self.data.as_ref()? {
            PartData::InMemory(bytes) => Some(bytes),
            PartData::Stream { .. } => None,
        }
    }

    /// The body as a reader plus its known size, regardless of how it is
    /// stored. `None` if the body has not been attached.
    pub fn into_reader(self) -> Option<(Box<dyn Read + Send>, u64)> {
        match self.data? {
            PartData::InMemory(bytes) => {
                let size = bytes.len() as u64;
                Some((Box::new(Cursor::new(bytes)), size))
            }
            PartData::Stream { reader, size } => Some((reader, size)),
        }
    }

    /// The body decoded as text, using the charset from the part's
    /// `Content-Type` and falling back to UTF-8. `None` for absent or
    /// streamed bodies.
    pub fn text(&self) -> Option<String> {
        self.text_with_charset("utf-8")
    }

    /// The body decoded as text with the given default charset.
    pub fn text_with_charset(&self, default_encoding: &str) -> Option<String> {
        let bytes = self.bytes()?;

        let encoding_name = self
            .content_type()
            .and_then(|mime| mime.get_param(mime::CHARSET))
            .map(|charset| charset.as_str())
            .unwrap_or(default_encoding);

        let encoding = Encoding::for_label(encoding_name.as_bytes()).unwrap_or(UTF_8);

        let (text, _, _) = encoding.decode(bytes);

        match text {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(s) => Some(String::from(s)),
        }
    }

    /// The body decoded as JSON. `None` for absent or streamed bodies.
    ///
    /// # Optional
    ///
    /// This requires the optional `json` feature to be enabled.
    #[cfg(feature = "json")]
    pub fn json<T: DeserializeOwned>(&self) -> Option<crate::Result<T>> {
        let bytes = self.bytes()?;
        Some(serde_json::from_slice(bytes).map_err(Error::DecodeJson))
    }
}
