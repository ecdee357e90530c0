//! HTTP Range header parsing for video delivery
//!
//! Handles single `bytes=start-end` ranges against a known payload size,
//! tolerating the sloppy forms players send (`bytes=100`, `0-100`).
//! Multi-range requests are not supported: only the first range of a
//! comma-separated set is honored and the rest are ignored.

use tracing::debug;

/// Inclusive byte range satisfiable against a payload.
///
/// Invariant: `start <= end < size` for the size it was parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: u64,
}

impl RangeSpec {
    /// Number of bytes covered by this range.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a partial response.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

/// Reasons a Range header cannot be served as partial content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Header does not follow `bytes=<start>-<end>`
    #[error("Malformed range header: {header}")]
    Malformed { header: String },

    /// Range lies outside the payload
    #[error("Range starting at {start} not satisfiable for {size} bytes")]
    Unsatisfiable { start: u64, size: u64 },
}

/// Parses a Range header against a payload of `size` bytes.
///
/// The `bytes=` prefix is optional. An empty or absent start means offset 0
/// and an empty or absent end means the last byte, so `bytes=100` reads to the
/// end of the payload. An end beyond the payload, including one too large for
/// `u64`, is clamped to the last byte.
///
/// # Errors
/// - `RangeError::Malformed` - A bound contains anything but ASCII digits, including a foreign unit such as `items=0-5`
/// - `RangeError::Unsatisfiable` - Empty payload, start past the last byte, or start after end
///
/// # Examples
/// ```
/// use streamz_core::streaming::range::{RangeSpec, parse_range_header};
///
/// let range = parse_range_header("bytes=900-1500", 1000).unwrap();
/// assert_eq!(range, RangeSpec { start: 900, end: 999 });
/// ```
pub fn parse_range_header(header: &str, size: u64) -> Result<RangeSpec, RangeError> {
    let malformed = || RangeError::Malformed {
        header: header.to_string(),
    };

    let trimmed = header.trim();
    let set = strip_bytes_unit(trimmed).unwrap_or(trimmed);

    let mut ranges = set.split(',');
    let first = ranges.next().unwrap_or_default().trim();
    if ranges.any(|extra| !extra.trim().is_empty()) {
        debug!("Multi-range request '{}', serving only '{}'", header, first);
    }

    let (start_str, end_str) = first.split_once('-').unwrap_or((first, ""));
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    let start = match parse_offset(start_str).ok_or_else(malformed)? {
        Offset::Absent => 0,
        Offset::Value(start) => start,
        Offset::Overflow => u64::MAX,
    };

    let unsatisfiable = RangeError::Unsatisfiable { start, size };
    let Some(last) = size.checked_sub(1) else {
        return Err(unsatisfiable);
    };
    if start > last {
        return Err(unsatisfiable);
    }

    let end = match parse_offset(end_str).ok_or_else(malformed)? {
        Offset::Absent | Offset::Overflow => last,
        Offset::Value(end) => end.min(last),
    };
    if start > end {
        return Err(unsatisfiable);
    }

    Ok(RangeSpec { start, end })
}

fn strip_bytes_unit(header: &str) -> Option<&str> {
    let (unit, rest) = header.split_once('=')?;
    unit.trim().eq_ignore_ascii_case("bytes").then_some(rest)
}

enum Offset {
    Absent,
    Value(u64),
    Overflow,
}

fn parse_offset(digits: &str) -> Option<Offset> {
    if digits.is_empty() {
        return Some(Offset::Absent);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().map_or(Offset::Overflow, Offset::Value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(start: u64, end: u64) -> RangeSpec {
        RangeSpec { start, end }
    }

    #[test]
    fn test_parse_closed_range() {
        assert_eq!(parse_range_header("bytes=500-699", 1000), Ok(spec(500, 699)));
    }

    #[test]
    fn test_parse_open_end() {
        assert_eq!(parse_range_header("bytes=100-", 1000), Ok(spec(100, 999)));
    }

    #[test]
    fn test_parse_empty_start_means_zero() {
        assert_eq!(parse_range_header("bytes=-499", 1000), Ok(spec(0, 499)));
    }

    #[test]
    fn test_end_is_clamped() {
        assert_eq!(parse_range_header("bytes=900-1500", 1000), Ok(spec(900, 999)));
    }

    #[test]
    fn test_single_byte_ranges() {
        assert_eq!(parse_range_header("bytes=0-0", 1000), Ok(spec(0, 0)));
        assert_eq!(parse_range_header("bytes=999-999", 1000), Ok(spec(999, 999)));
    }

    #[test]
    fn test_start_past_end_of_payload() {
        assert_eq!(
            parse_range_header("bytes=1000-1010", 1000),
            Err(RangeError::Unsatisfiable {
                start: 1000,
                size: 1000
            })
        );
        assert!(matches!(
            parse_range_header("bytes=999999-", 1000),
            Err(RangeError::Unsatisfiable { .. })
        ));
    }

    #[test]
    fn test_inverted_range_is_unsatisfiable() {
        assert!(matches!(
            parse_range_header("bytes=500-100", 1000),
            Err(RangeError::Unsatisfiable { .. })
        ));
    }

    #[test]
    fn test_empty_payload_is_unsatisfiable() {
        assert!(matches!(
            parse_range_header("bytes=0-", 0),
            Err(RangeError::Unsatisfiable { .. })
        ));
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["bytes=abc-100", "bytes=10-xyz", "bytes=+5-10", "items=0-5"] {
            assert!(
                matches!(
                    parse_range_header(header, 1000),
                    Err(RangeError::Malformed { .. })
                ),
                "{header} should be malformed"
            );
        }
    }

    #[test]
    fn test_missing_end_reads_to_last_byte() {
        assert_eq!(parse_range_header("bytes=100", 1000), Ok(spec(100, 999)));
    }

    #[test]
    fn test_unit_prefix_is_optional() {
        assert_eq!(parse_range_header("0-100", 1000), Ok(spec(0, 100)));
    }

    #[test]
    fn test_oversized_end_is_clamped() {
        assert_eq!(
            parse_range_header("bytes=0-99999999999999999999999", 1000),
            Ok(spec(0, 999))
        );
        assert!(matches!(
            parse_range_header("bytes=99999999999999999999999-", 1000),
            Err(RangeError::Unsatisfiable { .. })
        ));
    }

    #[test]
    fn test_both_bounds_empty_is_whole_payload() {
        assert_eq!(parse_range_header("bytes=-", 1000), Ok(spec(0, 999)));
    }

    #[test]
    fn test_multi_range_honors_first_only() {
        assert_eq!(
            parse_range_header("bytes=0-99,200-299", 1000),
            Ok(spec(0, 99))
        );
    }

    #[test]
    fn test_whitespace_and_case_tolerated() {
        assert_eq!(parse_range_header(" Bytes = 10 - 19 ", 1000), Ok(spec(10, 19)));
    }

    #[test]
    fn test_content_range_and_length() {
        let range = RangeSpec { start: 500, end: 699 };
        assert_eq!(range.len(), 200);
        assert_eq!(range.content_range(1000), "bytes 500-699/1000");
    }
}
