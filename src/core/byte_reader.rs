use super::error::{PDFError, PDFResult};
use std::sync::Arc;

/// Checks if a byte is whitespace according to the PDF spec.
///
/// PDF whitespace: NUL, TAB, LF, FF, CR, SPACE
pub fn is_space_byte(b: u8) -> bool {
    matches!(b, 0x00 | 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

/// Checks if a byte is a delimiter according to the PDF spec.
///
/// PDF delimiters: ( ) < > [ ] { } / %
pub fn is_delimiter_byte(b: u8) -> bool {
    matches!(
        b,
        0x28 | 0x29 | 0x3C | 0x3E | 0x5B | 0x5D | 0x7B | 0x7D | 0x2F | 0x25
    )
}

/// Checks if a byte is regular: neither whitespace nor delimiter.
pub fn is_regular_byte(b: u8) -> bool {
    !is_space_byte(b) && !is_delimiter_byte(b)
}

/// Checks if a byte is a decimal digit.
pub fn is_digit_byte(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Scan direction for the search primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Inclusive byte range of a parsed value.
///
/// Composite values (dictionaries, arrays, strings) additionally carry the
/// inclusive range of the bytes inside their delimiters; values with empty
/// interiors omit it. Invariant: `start <= content_start <= content_end <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub start: usize,
    pub end: usize,
    pub content_start: Option<usize>,
    pub content_end: Option<usize>,
}

impl Bounds {
    pub fn new(start: usize, end: usize) -> Self {
        Bounds {
            start,
            end,
            content_start: None,
            content_end: None,
        }
    }

    pub fn with_content(start: usize, end: usize, content_start: usize, content_end: usize) -> Self {
        Bounds {
            start,
            end,
            content_start: Some(content_start),
            content_end: Some(content_end),
        }
    }

    /// Returns the inner content range, if the value has any content.
    pub fn content(&self) -> Option<(usize, usize)> {
        match (self.content_start, self.content_end) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }

    /// Number of bytes covered, delimiters included.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Options for [`ByteReader::find_subarray_index`].
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub direction: Direction,
    /// Lowest index a match may start at (clipped to the buffer)
    pub min_index: Option<usize>,
    /// Highest index a match may end at (clipped to the buffer)
    pub max_index: Option<usize>,
    /// Require the byte following the match to be non-regular
    pub closed_only: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            direction: Direction::Forward,
            min_index: None,
            max_index: None,
            closed_only: false,
        }
    }
}

/// Random-access view over an immutable byte buffer.
///
/// All indices are inclusive and relative to the view. Sub-readers share the
/// underlying buffer through an `Arc` instead of copying it, so a resolved
/// indirect object costs no allocation beyond the handle itself. Searches
/// never fail: a miss is `None`.
#[derive(Debug, Clone)]
pub struct ByteReader {
    bytes: Arc<Vec<u8>>,
    start: usize,
    /// Inclusive index of the last accessible byte, in view coordinates
    max: usize,
}

impl ByteReader {
    /// Creates a reader owning the given buffer.
    ///
    /// Fails on an empty buffer: an inclusive maximum index cannot represent one.
    pub fn new(bytes: Vec<u8>) -> PDFResult<Self> {
        if bytes.is_empty() {
            return Err(PDFError::invalid_input("empty byte buffer"));
        }
        let max = bytes.len() - 1;
        Ok(ByteReader {
            bytes: Arc::new(bytes),
            start: 0,
            max,
        })
    }

    /// Creates a sub-view over `[start, end]` of this view, sharing the buffer.
    pub fn sub_reader(&self, start: usize, end: usize) -> Option<ByteReader> {
        if start > end || end > self.max {
            return None;
        }
        Some(ByteReader {
            bytes: Arc::clone(&self.bytes),
            start: self.start + start,
            max: end - start,
        })
    }

    /// Inclusive maximum index.
    pub fn max_index(&self) -> usize {
        self.max
    }

    /// Number of accessible bytes; at least 1 by construction.
    pub fn len(&self) -> usize {
        self.max + 1
    }

    /// True if `i` falls outside `[0, max]`.
    pub fn is_outside(&self, i: usize) -> bool {
        i > self.max
    }

    /// The byte at `i`. Callers check `is_outside` first; the accessors below
    /// that take arbitrary positions all do.
    pub fn byte_at(&self, i: usize) -> u8 {
        self.bytes[self.start + i]
    }

    pub fn get(&self, i: usize) -> Option<u8> {
        if self.is_outside(i) {
            None
        } else {
            Some(self.byte_at(i))
        }
    }

    /// Inclusive slice `[start, end]`.
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        &self.bytes[self.start + start..=self.start + end]
    }

    /// Linear scan for a single byte.
    pub fn find_char_index(&self, code: u8, direction: Direction, start: usize) -> Option<usize> {
        self.find_index_where(|b| b == code, direction, start)
    }

    fn find_index_where(
        &self,
        pred: impl Fn(u8) -> bool,
        direction: Direction,
        start: usize,
    ) -> Option<usize> {
        match direction {
            Direction::Forward => {
                let mut i = start;
                while i <= self.max {
                    if pred(self.byte_at(i)) {
                        return Some(i);
                    }
                    i += 1;
                }
                None
            }
            Direction::Backward => {
                let mut i = start.min(self.max);
                loop {
                    if pred(self.byte_at(i)) {
                        return Some(i);
                    }
                    if i == 0 {
                        return None;
                    }
                    i -= 1;
                }
            }
        }
    }

    /// Searches for a literal byte sequence.
    ///
    /// With `closed_only`, the byte immediately following the match must be
    /// non-regular (whitespace or delimiter); a match flush against the end
    /// of the buffer also counts as closed.
    pub fn find_subarray_index(&self, needle: &[u8], options: &SearchOptions) -> Option<Bounds> {
        if needle.is_empty() {
            return None;
        }
        let min = options.min_index.unwrap_or(0);
        let max = options.max_index.unwrap_or(self.max).min(self.max);
        if min > max || max - min + 1 < needle.len() {
            return None;
        }
        let last_start = max + 1 - needle.len();

        let matches_at = |i: usize| -> bool {
            for (k, &b) in needle.iter().enumerate() {
                if self.byte_at(i + k) != b {
                    return false;
                }
            }
            if options.closed_only {
                let follower = i + needle.len();
                if follower <= self.max && is_regular_byte(self.byte_at(follower)) {
                    return false;
                }
            }
            true
        };

        match options.direction {
            Direction::Forward => {
                let mut i = min;
                while i <= last_start {
                    if matches_at(i) {
                        return Some(Bounds::new(i, i + needle.len() - 1));
                    }
                    i += 1;
                }
                None
            }
            Direction::Backward => {
                let mut i = last_start;
                loop {
                    if matches_at(i) {
                        return Some(Bounds::new(i, i + needle.len() - 1));
                    }
                    if i == min {
                        return None;
                    }
                    i -= 1;
                }
            }
        }
    }

    /// Finds the next line break, treating CRLF as a single terminator.
    ///
    /// Forward: returns the index just past the terminator (the first byte of
    /// the next line). Backward: returns the index just before it (the last
    /// byte of the previous line). `None` if no break exists in that
    /// direction, or the resulting index would fall outside the buffer.
    pub fn find_newline_index(&self, direction: Direction, start: usize) -> Option<usize> {
        match direction {
            Direction::Forward => {
                let i = self.find_index_where(|b| b == 0x0D || b == 0x0A, direction, start)?;
                let past = if self.byte_at(i) == 0x0D && self.get(i + 1) == Some(0x0A) {
                    i + 2
                } else {
                    i + 1
                };
                if past > self.max { None } else { Some(past) }
            }
            Direction::Backward => {
                let i = self.find_index_where(|b| b == 0x0D || b == 0x0A, direction, start)?;
                let before = if self.byte_at(i) == 0x0A && i >= 1 && self.byte_at(i - 1) == 0x0D {
                    i.checked_sub(2)
                } else {
                    i.checked_sub(1)
                };
                before
            }
        }
    }

    /// Finds the next whitespace byte.
    pub fn find_space_index(&self, direction: Direction, start: usize) -> Option<usize> {
        self.find_index_where(is_space_byte, direction, start)
    }

    /// Finds the next non-whitespace byte.
    pub fn find_non_space_index(&self, direction: Direction, start: usize) -> Option<usize> {
        self.find_index_where(|b| !is_space_byte(b), direction, start)
    }

    /// Finds the next delimiter byte.
    pub fn find_delimiter_index(&self, direction: Direction, start: usize) -> Option<usize> {
        self.find_index_where(is_delimiter_byte, direction, start)
    }

    /// Finds the next non-delimiter byte.
    pub fn find_non_delimiter_index(&self, direction: Direction, start: usize) -> Option<usize> {
        self.find_index_where(|b| !is_delimiter_byte(b), direction, start)
    }

    /// Finds the next regular byte.
    pub fn find_regular_index(&self, direction: Direction, start: usize) -> Option<usize> {
        self.find_index_where(is_regular_byte, direction, start)
    }

    /// Finds the next irregular byte (whitespace or delimiter).
    pub fn find_irregular_index(&self, direction: Direction, start: usize) -> Option<usize> {
        self.find_index_where(|b| !is_regular_byte(b), direction, start)
    }
}
