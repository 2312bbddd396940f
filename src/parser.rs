use crate::buffer::ParseBuffer;
use crate::constants;
use crate::content_disposition::ContentDisposition;
use crate::helpers;
use crate::state::ParseStage;
use crate::{Error, Listener};

/// An incremental push parser for a `multipart/form-data` byte stream.
///
/// The caller feeds the raw body bytes (without the surrounding HTTP headers)
/// through [`parse_next`](StatefulParser::parse_next) in chunks of any size;
/// the parser drives its [`Listener`] with part headers and body data as soon
/// as they are unambiguously recognized. The listener output is identical for
/// any fragmentation of the same stream, including one byte at a time.
///
/// # Examples
///
/// ```
/// use multipart_push::{PartCollector, StatefulParser};
///
/// # fn run() -> multipart_push::Result<()> {
/// let data: &[u8] =
///     b"--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";
///
/// let mut parser = StatefulParser::new("X-BOUNDARY", PartCollector::new())?;
/// for chunk in data.chunks(7) {
///     parser.parse_next(chunk)?;
/// }
/// assert!(parser.finished());
///
/// let collector = parser.into_listener();
/// let part = collector.part("my_text_field").unwrap();
/// assert_eq!(part.text(), Some("abcd".to_owned()));
/// # Ok(())
/// # }
/// # run().unwrap();
/// ```
pub struct StatefulParser<L> {
    boundary: String,
    stage: ParseStage,
    buffer: ParseBuffer,
    curr_part_name: String,
    listener: L,
}

impl<L: Listener> StatefulParser<L> {
    /// Constructs a parser for the given boundary token (without the two
    /// leading dashes) driving the given listener.
    pub fn new<B: Into<String>>(boundary: B, listener: L) -> crate::Result<StatefulParser<L>> {
        let boundary = boundary.into();
        if boundary.is_empty() {
            return Err(Error::EmptyBoundary);
        }

        Ok(StatefulParser {
            boundary,
            stage: ParseStage::FindingFirstBoundary,
            buffer: ParseBuffer::new(),
            curr_part_name: String::new(),
            listener,
        })
    }

    /// Consumes the next chunk of the stream.
    ///
    /// Bytes that cannot yet be classified — because they might be the start
    /// of a boundary marker that has not finished arriving — are carried over
    /// to the next call. A zero-length chunk is a no-op. Once the closing
    /// boundary has been consumed the parser is inert: any further input is
    /// treated as epilogue and ignored.
    pub fn parse_next(&mut self, chunk: &[u8]) -> crate::Result<()> {
        if self.stage == ParseStage::Eof {
            log::trace!("closing boundary already seen; ignoring {} epilogue bytes", chunk.len());
            return Ok(());
        }

        self.buffer.push(chunk);

        loop {
            match self.stage {
                ParseStage::FindingFirstBoundary => {
                    if !self.find_first_boundary()? {
                        return Ok(());
                    }
                }
                ParseStage::ReadingPartHeaders => {
                    if !self.read_part_headers()? {
                        return Ok(());
                    }
                }
                ParseStage::ReadingPartData => {
                    let (done, data) = self.buffer.read_part_data(&self.boundary);

                    if !data.is_empty() {
                        self.listener.on_part_data(&self.curr_part_name, &data);
                    }

                    if done {
                        // End-of-body sentinel.
                        self.listener.on_part_data(&self.curr_part_name, &[]);
                        self.stage = ParseStage::DeterminingBoundaryType;
                    } else {
                        return Ok(());
                    }
                }
                ParseStage::DeterminingBoundaryType => {
                    let bytes = match self.buffer.read_exact(2) {
                        Some(bytes) => bytes,
                        None => return Ok(()),
                    };

                    if &bytes[..] == constants::BOUNDARY_EXT.as_bytes() {
                        self.finish();
                        return Ok(());
                    } else if &bytes[..] == constants::CRLF.as_bytes() {
                        self.stage = ParseStage::ReadingPartHeaders;
                    } else {
                        return Err(Error::MalformedBoundary);
                    }
                }
                ParseStage::Eof => return Ok(()),
            }
        }
    }

    /// Returns `true` once the closing `--<boundary>--` marker has been
    /// consumed, and stays `true` from then on.
    pub fn finished(&self) -> bool {
        self.stage == ParseStage::Eof
    }

    /// The boundary token this parser was constructed with.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Consumes the parser, returning its listener.
    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Scans for the opening `--<boundary>` delimiter, discarding any
    /// preamble before it. Returns `false` when more input is needed.
    fn find_first_boundary(&mut self) -> crate::Result<bool> {
        let delimiter = format!("{}{}", constants::BOUNDARY_EXT, self.boundary);
        let delimiter = delimiter.as_bytes();

        loop {
            match self.buffer.find(delimiter) {
                Some(idx) => {
                    let tail_start = idx + delimiter.len();

                    // Two lookahead bytes decide whether this is a real
                    // delimiter line.
                    if self.buffer.len() < tail_start + 2 {
                        self.buffer.discard(idx);
                        return Ok(false);
                    }

                    let tail = &self.buffer.as_slice()[tail_start..tail_start + 2];

                    if tail == constants::CRLF.as_bytes() {
                        self.buffer.discard(tail_start + 2);
                        log::debug!("opening boundary found");
                        self.stage = ParseStage::ReadingPartHeaders;
                        return Ok(true);
                    } else if tail == constants::BOUNDARY_EXT.as_bytes() {
                        // Degenerate but legal: a multipart message with no
                        // parts at all.
                        self.buffer.discard(tail_start + 2);
                        self.finish();
                        return Ok(false);
                    } else {
                        // Preamble text that merely contains the delimiter
                        // bytes; keep scanning past it.
                        self.buffer.discard(idx + 1);
                    }
                }
                None => {
                    // Only a tail that could still grow into the delimiter is
                    // worth keeping.
                    let keep = self.buffer.len().min(delimiter.len() - 1);
                    self.buffer.discard(self.buffer.len() - keep);
                    return Ok(false);
                }
            }
        }
    }

    /// Reads a part's header block through its terminating blank line and
    /// reports it to the listener. Returns `false` when more input is needed.
    fn read_part_headers(&mut self) -> crate::Result<bool> {
        let header_bytes = match self.buffer.read_until(constants::CRLF_CRLF.as_bytes()) {
            Some(bytes) => bytes,
            None => {
                if self.buffer.len() > constants::MAX_HEADER_BLOCK_SIZE {
                    return Err(Error::HeadersTooLarge {
                        limit: constants::MAX_HEADER_BLOCK_SIZE,
                    });
                }
                return Ok(false);
            }
        };

        // The cap is a property of the message, not of its fragmentation: a
        // block must be rejected whether or not its blank line happened to
        // arrive in the same chunk.
        if header_bytes.len() > constants::MAX_HEADER_BLOCK_SIZE {
            return Err(Error::HeadersTooLarge {
                limit: constants::MAX_HEADER_BLOCK_SIZE,
            });
        }

        let mut raw_headers = [httparse::EMPTY_HEADER; constants::MAX_HEADERS];

        let headers = match httparse::parse_headers(&header_bytes, &mut raw_headers) {
            Ok(httparse::Status::Complete((_, raw_headers))) => {
                helpers::convert_raw_headers_to_header_map(raw_headers)?
            }
            Ok(httparse::Status::Partial) => return Err(Error::IncompleteHeaders),
            Err(err) => return Err(Error::ReadHeaderFailed(err)),
        };

        let content_disposition = ContentDisposition::parse(&headers);
        let name = content_disposition.field_name.ok_or(Error::MissingPartName)?;

        log::debug!(
            "part headers parsed: name={:?}, filename={:?}",
            name,
            content_disposition.file_name
        );

        self.listener.on_part_headers(&name, &headers);
        self.curr_part_name = name;
        self.stage = ParseStage::ReadingPartData;

        Ok(true)
    }

    fn finish(&mut self) {
        log::debug!("closing boundary found");
        self.stage = ParseStage::Eof;
        self.buffer.clear();
    }
}
