use lazy_static::lazy_static;
use regex::Regex;

pub(crate) const MAX_HEADERS: usize = 32;

// Cap on an unterminated header block, so pathological input cannot grow the
// carry buffer without bound while the parser waits for the blank line.
pub(crate) const MAX_HEADER_BLOCK_SIZE: usize = 64 * 1024;

pub(crate) const BOUNDARY_EXT: &str = "--";
pub(crate) const CRLF: &str = "\r\n";
pub(crate) const CRLF_CRLF: &str = "\r\n\r\n";

lazy_static! {
    // Parameter values may be double-quoted, single-quoted or bare. The
    // leading `(^|[;\s])` guard keeps `name=` from matching inside
    // `filename=`. Quote characters are trimmed off by the caller.
    pub(crate) static ref CONTENT_DISPOSITION_FIELD_NAME_RE: Regex =
        Regex::new(r#"(?:^|[;\s])name=("[^"]*"|'[^']*'|[^;\s]+)"#).unwrap();
    pub(crate) static ref CONTENT_DISPOSITION_FILE_NAME_RE: Regex =
        Regex::new(r#"(?:^|[;\s])filename=("[^"]*"|'[^']*'|[^;\s]+)"#).unwrap();
}
