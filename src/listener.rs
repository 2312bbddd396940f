use bytes::BytesMut;
use http::header::HeaderMap;

use crate::part::{Part, PartData};

/// Receives parse events from a [`StatefulParser`](crate::StatefulParser).
///
/// Callbacks run synchronously, inline in
/// [`parse_next`](crate::StatefulParser::parse_next); if a callback blocks,
/// parsing blocks with it, so the parser never runs ahead of the listener.
/// The listener decides what happens to body bytes (buffer them, spool them
/// to disk, forward them) — the parser only reports them.
pub trait Listener {
    /// Called exactly once per part, as soon as its header block is fully
    /// parsed and before any of its body bytes are reported.
    fn on_part_headers(&mut self, name: &str, headers: &HeaderMap);

    /// Called with successive body chunks for the part named `name`. An
    /// empty `data` slice is the end-of-body sentinel: it fires exactly once
    /// per part, after all body bytes and before the next part's headers.
    fn on_part_data(&mut self, name: &str, data: &[u8]);
}

/// A reference [`Listener`] that buffers every part body in memory.
///
/// Suitable for small form submissions; large file uploads are better served
/// by a listener that spools to disk and attaches a
/// [`PartData::Stream`](crate::PartData::Stream) instead.
#[derive(Debug, Default)]
pub struct PartCollector {
    parts: Vec<Part>,
    buf: BytesMut,
}

impl PartCollector {
    pub fn new() -> PartCollector {
        PartCollector::default()
    }

    /// All parts collected so far, in message order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Looks up a collected part by its `name` parameter. When several parts
    /// share a name, the first one in message order is returned; use
    /// [`parts`](PartCollector::parts) to see them all.
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.name() == name)
    }

    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }
}

impl Listener for PartCollector {
    fn on_part_headers(&mut self, name: &str, headers: &HeaderMap) {
        self.parts.push(Part::new(name, headers.clone()));
    }

    fn on_part_data(&mut self, name: &str, data: &[u8]) {
        if !data.is_empty() {
            self.buf.extend_from_slice(data);
            return;
        }

        // Part names need not be unique (several files can share one field
        // name), so the body belongs to the most recent part with that name
        // that has no body yet.
        let body = self.buf.split().freeze();
        if let Some(part) = self
            .parts
            .iter_mut()
            .rev()
            .find(|part| part.name() == name && part.data().is_none())
        {
            part.set_data(PartData::InMemory(body));
        }
    }
}
