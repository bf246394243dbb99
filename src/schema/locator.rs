//! Locating the session document and the variable header table
//!
//! The region starts with a single header line, followed by the session
//! document as newline-delimited text terminated by a `...` line. After a
//! short fixed gap and a run of zero padding, the binary variable header
//! table begins.
//!
//! ```text
//! offset 0
//! ┌──────────────────────────┐
//! │ header line ... \n       │  skipped, but counted
//! │ session document lines   │
//! │ ...\n                    │  sentinel
//! ├──────────────────────────┤ ← document end (lines + 4)
//! │ 00 00 00 ...             │  padding of unknown length
//! ├──────────────────────────┤ ← header start (first non-zero byte)
//! │ variable header table    │
//! └──────────────────────────┘
//! ```
//!
//! Both functions are pure over a byte slice and bounded by its length, so a
//! corrupt or still-initialising region fails instead of looping.

use std::ops::Range;

use crate::reader::ByteReader;
use crate::{Result, TelemetryError};
use tracing::{debug, trace};

/// Trimmed content of the line terminating the session document.
pub const DOCUMENT_SENTINEL: &[u8] = b"...";

/// Fixed gap added after the document lines by the producer's layout.
pub const DOCUMENT_TRAILER_GAP: usize = 4;

/// Where the session document sits within the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSpan {
    /// Length of the leading header line, newline included
    pub header_len: usize,
    /// Byte range of the document lines, sentinel excluded
    pub body: Range<usize>,
}

impl DocumentSpan {
    /// Offset the padding scan starts from.
    pub fn document_end(&self) -> usize {
        self.body.end + DOCUMENT_TRAILER_GAP
    }
}

/// Scan the line-oriented prefix of the region for the sentinel line.
pub fn scan_document(region: &[u8]) -> Result<DocumentSpan> {
    let mut reader = ByteReader::new(region);

    let header_len = reader.read_line().len();
    if header_len == 0 {
        return Err(TelemetryError::format_error("Session document", "region is empty"));
    }

    let mut body_len = 0;
    loop {
        let line = reader.read_line();
        if line.is_empty() {
            return Err(TelemetryError::format_error(
                "Session document",
                format!("no '...' terminator within {} bytes", region.len()),
            ));
        }
        if line.trim_ascii() == DOCUMENT_SENTINEL {
            break;
        }
        body_len += line.len();
    }

    let span = DocumentSpan { header_len, body: header_len..header_len + body_len };
    trace!(header_len, body_len, "Scanned session document");
    Ok(span)
}

/// Offset just past the session document.
pub fn locate_document_end(region: &[u8]) -> Result<usize> {
    scan_document(region).map(|span| span.document_end())
}

/// Offset of the first non-zero byte at or after `document_end`.
pub fn locate_header_start(region: &[u8], document_end: usize) -> Result<usize> {
    if document_end >= region.len() {
        return Err(TelemetryError::format_error(
            "Header table",
            format!(
                "document end {:#x} leaves no room for a header table in {} bytes",
                document_end,
                region.len()
            ),
        ));
    }

    let mut reader = ByteReader::new(region);
    reader.seek(document_end)?;

    while let Some(byte) = reader.read_byte() {
        if byte != 0 {
            return Ok(reader.position() - 1);
        }
    }

    Err(TelemetryError::format_error(
        "Header table",
        format!("only zero bytes after document end {:#x}", document_end),
    ))
}

/// Layout offsets discovered once per open region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLayout {
    pub document: DocumentSpan,
    pub document_end: usize,
    pub header_start: usize,
}

impl RegionLayout {
    /// Run both scans over the region.
    pub fn discover(region: &[u8]) -> Result<Self> {
        let document = scan_document(region)?;
        let document_end = document.document_end();
        let header_start = locate_header_start(region, document_end)?;

        debug!(document_end, header_start, "Discovered region layout");
        Ok(Self { document, document_end, header_start })
    }
}
