//! HTTP Range header handling for video streaming
//!
//! Only single `bytes=<start>-<end>` ranges are served. A missing start means
//! offset 0, a missing end means "to the end of the file", and only the
//! first range of a multi-range header is honored.

/// Inclusive byte span of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range; never zero
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a file of `total_size` bytes
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total_size)
    }
}

/// How a request's Range header resolves against a concrete file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable Range header: serve the whole file
    Full,
    /// Serve the given slice with 206
    Partial(ByteRange),
    /// The range lies outside the file: 416
    Unsatisfiable,
}

/// Resolve a `Range` header value against a file of `total_size` bytes.
///
/// Headers that don't follow the `bytes=` grammar are ignored (full body).
/// An end past EOF is clamped to the last byte; a start at or past EOF, or
/// an end before the start, is unsatisfiable.
///
/// ```
/// use vidvault_storage::range::{parse_range_header, ByteRange, RangeRequest};
/// assert_eq!(
///     parse_range_header(Some("bytes=100-199"), 1000),
///     RangeRequest::Partial(ByteRange { start: 100, end: 199 })
/// );
/// ```
pub fn parse_range_header(range: Option<&str>, total_size: u64) -> RangeRequest {
    let Some(range) = range else {
        return RangeRequest::Full;
    };

    let Some(range_spec) = range.trim().strip_prefix("bytes=") else {
        return RangeRequest::Full;
    };

    let first = range_spec.split(',').next().unwrap_or("").trim();
    let Some((start_str, end_str)) = first.split_once('-') else {
        return RangeRequest::Full;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    let start = if start_str.is_empty() {
        0
    } else {
        match start_str.parse::<u64>() {
            Ok(start) => start,
            Err(_) => return RangeRequest::Full,
        }
    };

    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<u64>() {
            Ok(end) => Some(end),
            Err(_) => return RangeRequest::Full,
        }
    };

    if total_size == 0 || start >= total_size {
        return RangeRequest::Unsatisfiable;
    }

    let last_byte = total_size - 1;
    let end = end.map_or(last_byte, |end| end.min(last_byte));
    if end < start {
        return RangeRequest::Unsatisfiable;
    }

    RangeRequest::Partial(ByteRange { start, end })
}
