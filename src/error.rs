use std::fmt::{self, Debug, Display, Formatter};

use derive_more::Display;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A set of errors that can occur while parsing a multipart stream and in
/// other operations.
#[derive(Display)]
#[non_exhaustive]
pub enum Error {
    /// The boundary token supplied at construction is empty.
    #[display(fmt = "multipart boundary cannot be empty")]
    EmptyBoundary,

    /// A part's header block ended before the terminating blank line.
    #[display(fmt = "incomplete part headers")]
    IncompleteHeaders,

    /// A part's header block grew past the maximum allowed size without a
    /// terminating blank line.
    #[display(fmt = "part headers exceeded the maximum size limit: {} bytes", limit)]
    HeadersTooLarge { limit: usize },

    /// A part's header block could not be parsed.
    #[display(fmt = "failed to read part headers: {}", _0)]
    ReadHeaderFailed(httparse::Error),

    /// Failed to decode a part's raw header name to a
    /// [`HeaderName`](http::header::HeaderName).
    #[display(fmt = "failed to decode part's raw header name: {:?}: {}", name, cause)]
    DecodeHeaderName { name: String, cause: BoxError },

    /// Failed to decode a part's raw header value to a
    /// [`HeaderValue`](http::header::HeaderValue).
    #[display(fmt = "failed to decode part's raw header value: {}", cause)]
    DecodeHeaderValue { value: Vec<u8>, cause: BoxError },

    /// A part carries no `Content-Disposition` `name` parameter.
    #[display(fmt = "part is missing the Content-Disposition `name` parameter")]
    MissingPartName,

    /// A boundary delimiter was followed by neither CRLF nor `--`.
    #[display(fmt = "boundary delimiter must be followed by CRLF or `--`")]
    MalformedBoundary,

    /// The `Content-Type` header is not `multipart/form-data`.
    #[display(fmt = "Content-Type is not multipart/form-data")]
    NoMultipart,

    /// Failed to convert the `Content-Type` to a [`mime::Mime`] type.
    #[display(fmt = "failed to convert Content-Type to `mime::Mime` type: {}", _0)]
    DecodeContentType(mime::FromStrError),

    /// No boundary found in the `Content-Type` header.
    #[display(fmt = "multipart boundary not found in Content-Type")]
    NoBoundary,

    /// Failed to decode a part's body as `JSON` in the
    /// [`Part::json`](crate::Part::json) method.
    #[cfg(feature = "json")]
    #[display(fmt = "failed to decode part body as JSON: {}", _0)]
    DecodeJson(serde_json::Error),
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}
