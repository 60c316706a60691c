use super::byte_reader::{
    Bounds, ByteReader, Direction, SearchOptions, is_digit_byte, is_regular_byte,
};

/// Classification of the value starting at a byte position.
///
/// `Unknown` covers anything the dispatch table cannot commit to, including
/// positions past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Name,
    Number,
    StringLiteral,
    HexString,
    Array,
    Dictionary,
    Stream,
    Boolean,
    Reference,
    Comment,
    Unknown,
}

/// Random-access lexical engine over a [`ByteReader`].
///
/// Unlike a token pump, every operation takes an explicit position and
/// returns either a classification or the inclusive bounds of a composite
/// value. Misses are `None`; nothing here allocates or fails hard, so the
/// engine can be pointed at arbitrary offsets of damaged files.
#[derive(Debug, Clone)]
pub struct Lexer {
    reader: ByteReader,
}

impl Lexer {
    pub fn new(reader: ByteReader) -> Self {
        Lexer { reader }
    }

    pub fn reader(&self) -> &ByteReader {
        &self.reader
    }

    /// Advances past whitespace and full-line `%`-comments.
    ///
    /// Idempotent: applying it to its own result returns the same index.
    /// `None` when only whitespace and comments remain.
    pub fn skip_empty(&self, i: usize) -> Option<usize> {
        let mut i = self.reader.find_non_space_index(Direction::Forward, i)?;
        while self.reader.byte_at(i) == b'%' {
            let next_line = self.reader.find_newline_index(Direction::Forward, i)?;
            i = self.reader.find_non_space_index(Direction::Forward, next_line)?;
        }
        Some(i)
    }

    /// Classifies the value at `i`, optionally skipping whitespace and
    /// comments first.
    pub fn value_kind_at(&self, i: usize, skip_empty: bool) -> ValueKind {
        let i = if skip_empty {
            match self.skip_empty(i) {
                Some(i) => i,
                None => return ValueKind::Unknown,
            }
        } else {
            i
        };
        if self.reader.is_outside(i) {
            return ValueKind::Unknown;
        }

        match self.reader.byte_at(i) {
            b'/' => {
                if self.next_is_regular(i) {
                    ValueKind::Name
                } else {
                    ValueKind::Unknown
                }
            }
            b'[' => ValueKind::Array,
            b'(' => ValueKind::StringLiteral,
            b'%' => ValueKind::Comment,
            b'<' => {
                if self.reader.get(i + 1) == Some(b'<') {
                    ValueKind::Dictionary
                } else {
                    ValueKind::HexString
                }
            }
            b if is_digit_byte(b) => self.classify_numeric(i),
            b'.' | b'-' => {
                if self.reader.get(i + 1).is_some_and(is_digit_byte) {
                    ValueKind::Number
                } else {
                    ValueKind::Unknown
                }
            }
            b's' => {
                if self.keyword_at(i, b"stream") {
                    ValueKind::Stream
                } else {
                    ValueKind::Unknown
                }
            }
            b't' => {
                if self.keyword_at(i, b"true") {
                    ValueKind::Boolean
                } else {
                    ValueKind::Unknown
                }
            }
            b'f' => {
                if self.keyword_at(i, b"false") {
                    ValueKind::Boolean
                } else {
                    ValueKind::Unknown
                }
            }
            _ => ValueKind::Unknown,
        }
    }

    fn next_is_regular(&self, i: usize) -> bool {
        self.reader.get(i + 1).is_some_and(is_regular_byte)
    }

    /// The literal keyword at `i`, with a non-regular (or absent) follower.
    pub fn keyword_at(&self, i: usize, keyword: &[u8]) -> bool {
        let end = i + keyword.len() - 1;
        if self.reader.is_outside(end) {
            return false;
        }
        if self.reader.slice(i, end) != keyword {
            return false;
        }
        !self.reader.get(end + 1).is_some_and(is_regular_byte)
    }

    /// Digit dispatch: the token runs to the next delimiter; a closed `R`
    /// inside it makes the value a reference, otherwise it is a number.
    fn classify_numeric(&self, i: usize) -> ValueKind {
        let token_end = self
            .reader
            .find_delimiter_index(Direction::Forward, i)
            .map(|d| d.saturating_sub(1))
            .unwrap_or(self.reader.max_index());
        if token_end < i {
            return ValueKind::Number;
        }
        let found = self.reader.find_subarray_index(
            b"R",
            &SearchOptions {
                direction: Direction::Backward,
                min_index: Some(i),
                max_index: Some(token_end),
                closed_only: true,
            },
        );
        if found.is_some() {
            ValueKind::Reference
        } else {
            ValueKind::Number
        }
    }

    /// Bounds of the dictionary starting at `start` (`<<`).
    ///
    /// Tracks nesting with two counters: dictionary depth and string-literal
    /// depth. Dict delimiters inside literals are ignored, parens preceded by
    /// a backslash do not change literal depth, and `<<`/`>>` matching is
    /// non-overlapping (a latch resets after each recognized pair).
    pub fn dict_bounds_at(&self, start: usize, skip_empty: bool) -> Option<Bounds> {
        let start = self.resolve(start, skip_empty)?;
        if self.reader.get(start) != Some(b'<') || self.reader.get(start + 1) != Some(b'<') {
            return None;
        }

        let mut depth = 1u32;
        let mut literal = 0u32;
        let mut prev = b'<';
        let mut latched = true;
        let mut i = start + 2;
        let mut end = None;

        while !self.reader.is_outside(i) {
            let b = self.reader.byte_at(i);
            if literal > 0 {
                if b == b'(' && prev != b'\\' {
                    literal += 1;
                } else if b == b')' && prev != b'\\' {
                    literal -= 1;
                }
                latched = false;
            } else if b == b'(' && prev != b'\\' {
                literal = 1;
                latched = false;
            } else if b == b'<' && prev == b'<' && !latched {
                depth += 1;
                latched = true;
            } else if b == b'>' && prev == b'>' && !latched {
                depth -= 1;
                if depth == 0 {
                    end = Some(i);
                    break;
                }
                latched = true;
            } else {
                latched = false;
            }
            prev = b;
            i += 1;
        }

        let end = end?;
        Some(self.with_trimmed_content(start, end, start + 2, end.checked_sub(2)?))
    }

    /// Bounds of the array starting at `start` (`[`). Plain depth counting;
    /// raw brackets cannot appear unescaped inside literals in valid input.
    pub fn array_bounds_at(&self, start: usize, skip_empty: bool) -> Option<Bounds> {
        let start = self.resolve(start, skip_empty)?;
        if self.reader.get(start) != Some(b'[') {
            return None;
        }
        let mut depth = 1u32;
        let mut i = start + 1;
        while !self.reader.is_outside(i) {
            match self.reader.byte_at(i) {
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(self.with_trimmed_content(
                            start,
                            i,
                            start + 1,
                            i.checked_sub(1)?,
                        ));
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Bounds of the hex string starting at `start` (`<`, not `<<`).
    pub fn hex_bounds_at(&self, start: usize, skip_empty: bool) -> Option<Bounds> {
        let start = self.resolve(start, skip_empty)?;
        if self.reader.get(start) != Some(b'<') || self.reader.get(start + 1) == Some(b'<') {
            return None;
        }
        let end = self.reader.find_char_index(b'>', Direction::Forward, start + 1)?;
        Some(self.with_raw_content(start, end))
    }

    /// Bounds of the string literal starting at `start` (`(`).
    ///
    /// Walks forward tracking an escape flag and a nested-paren count; closes
    /// on the unescaped `)` that balances the opener.
    pub fn literal_bounds_at(&self, start: usize, skip_empty: bool) -> Option<Bounds> {
        let start = self.resolve(start, skip_empty)?;
        if self.reader.get(start) != Some(b'(') {
            return None;
        }
        let mut opened = 0u32;
        let mut escaped = false;
        let mut i = start + 1;
        while !self.reader.is_outside(i) {
            let b = self.reader.byte_at(i);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'(' {
                opened += 1;
            } else if b == b')' {
                if opened == 0 {
                    return Some(self.with_raw_content(start, i));
                }
                opened -= 1;
            }
            i += 1;
        }
        None
    }

    /// Bounds of the indirect object definition at or after `start`.
    ///
    /// Spans from `start` through the `endobj` keyword. Content bounds trim
    /// surrounding whitespace; when the content is a dictionary the content
    /// bounds additionally move past the `<<`/`>>` pair so callers receive
    /// the dict interior directly.
    pub fn indirect_object_bounds_at(&self, start: usize, skip_empty: bool) -> Option<Bounds> {
        let start = self.resolve(start, skip_empty)?;
        let obj = self.reader.find_subarray_index(
            b"obj",
            &SearchOptions {
                min_index: Some(start),
                closed_only: true,
                ..SearchOptions::default()
            },
        )?;
        let endobj = self.reader.find_subarray_index(
            b"endobj",
            &SearchOptions {
                min_index: Some(obj.end + 1),
                closed_only: true,
                ..SearchOptions::default()
            },
        )?;

        let mut bounds = Bounds::new(start, endobj.end);
        if endobj.start >= obj.end + 2 {
            if let Some((mut cs, mut ce)) =
                self.trimmed_range(obj.end + 1, endobj.start - 1)
            {
                // A dict body is handed to callers without its << >> pair
                if ce >= cs + 3
                    && self.reader.slice(cs, cs + 1) == b"<<"
                    && self.reader.slice(ce - 1, ce) == b">>"
                    && !self.stream_follows(cs, ce)
                {
                    let inner = self.trimmed_range(cs + 2, ce - 2);
                    match inner {
                        Some((s, e)) => {
                            cs = s;
                            ce = e;
                        }
                        None => return Some(bounds),
                    }
                }
                bounds.content_start = Some(cs);
                bounds.content_end = Some(ce);
            }
        }
        Some(bounds)
    }

    /// True when the object content at `[cs, ce]` is a stream definition:
    /// a dictionary whose closing `>>` is followed by the `stream` keyword.
    fn stream_follows(&self, cs: usize, ce: usize) -> bool {
        if let Some(dict) = self.dict_bounds_at(cs, false) {
            if dict.end < ce {
                if let Some(next) = self.skip_empty(dict.end + 1) {
                    return next <= ce && self.keyword_at(next, b"stream");
                }
            }
        }
        false
    }

    /// Bounds of the cross-reference table at or after `start`: from the
    /// `xref` keyword through the `trailer` keyword. Tables with no entries
    /// between the keywords are illegal and return `None`.
    pub fn xref_table_bounds_at(&self, start: usize) -> Option<Bounds> {
        let mut from = start;
        let xref = loop {
            let found = self.reader.find_subarray_index(
                b"xref",
                &SearchOptions {
                    min_index: Some(from),
                    closed_only: true,
                    ..SearchOptions::default()
                },
            )?;
            // Guard against the tail of "startxref"
            if found.start == 0 || !is_regular_byte(self.reader.byte_at(found.start - 1)) {
                break found;
            }
            from = found.end + 1;
        };
        let trailer = self.reader.find_subarray_index(
            b"trailer",
            &SearchOptions {
                min_index: Some(xref.end + 1),
                closed_only: true,
                ..SearchOptions::default()
            },
        )?;
        if trailer.start < xref.end + 2 {
            return None;
        }
        let (cs, ce) = self.trimmed_range(xref.end + 1, trailer.start - 1)?;
        Some(Bounds::with_content(xref.start, trailer.end, cs, ce))
    }

    /// Walks forward from `start` to the next name token, skipping over
    /// whole composite values, numeric and boolean tokens, and comments.
    /// `None` once the walk passes `max_index`.
    pub fn skip_to_next_name(&self, start: usize, max_index: usize) -> Option<usize> {
        let max_index = max_index.min(self.reader.max_index());
        let mut i = start;
        while i <= max_index {
            i = match self.skip_empty(i) {
                Some(i) if i <= max_index => i,
                _ => return None,
            };
            match self.value_kind_at(i, false) {
                ValueKind::Name => return Some(i),
                ValueKind::Dictionary => match self.dict_bounds_at(i, false) {
                    Some(b) => i = b.end + 1,
                    None => i += 1,
                },
                ValueKind::Array => match self.array_bounds_at(i, false) {
                    Some(b) => i = b.end + 1,
                    None => i += 1,
                },
                ValueKind::StringLiteral => match self.literal_bounds_at(i, false) {
                    Some(b) => i = b.end + 1,
                    None => i += 1,
                },
                ValueKind::HexString => match self.hex_bounds_at(i, false) {
                    Some(b) => i = b.end + 1,
                    None => i += 1,
                },
                ValueKind::Number | ValueKind::Boolean => {
                    i = self
                        .reader
                        .find_irregular_index(Direction::Forward, i)
                        .unwrap_or(self.reader.max_index() + 1);
                }
                ValueKind::Reference => {
                    let token_end = self.reference_end(i);
                    i = token_end + 1;
                }
                ValueKind::Comment => {
                    i = self.reader.find_newline_index(Direction::Forward, i)?;
                }
                _ => i += 1,
            }
        }
        None
    }

    /// End index of the `N G R` token classified at `i`.
    fn reference_end(&self, i: usize) -> usize {
        let token_end = self
            .reader
            .find_delimiter_index(Direction::Forward, i)
            .map(|d| d.saturating_sub(1))
            .unwrap_or(self.reader.max_index());
        self.reader
            .find_subarray_index(
                b"R",
                &SearchOptions {
                    direction: Direction::Backward,
                    min_index: Some(i),
                    max_index: Some(token_end),
                    closed_only: true,
                },
            )
            .map(|b| b.end)
            .unwrap_or(token_end)
    }

    fn resolve(&self, i: usize, skip_empty: bool) -> Option<usize> {
        let i = if skip_empty { self.skip_empty(i)? } else { i };
        if self.reader.is_outside(i) { None } else { Some(i) }
    }

    /// First/last non-whitespace pair inside `[from, to]`, if any.
    fn trimmed_range(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        if from > to || self.reader.is_outside(to) {
            return None;
        }
        let cs = self.reader.find_non_space_index(Direction::Forward, from)?;
        if cs > to {
            return None;
        }
        let ce = self.reader.find_non_space_index(Direction::Backward, to)?;
        if ce < cs { None } else { Some((cs, ce)) }
    }

    fn with_trimmed_content(
        &self,
        start: usize,
        end: usize,
        inner_from: usize,
        inner_to: usize,
    ) -> Bounds {
        match self.trimmed_range(inner_from, inner_to) {
            Some((cs, ce)) => Bounds::with_content(start, end, cs, ce),
            None => Bounds::new(start, end),
        }
    }

    /// Raw (untrimmed) interior for values where whitespace is significant.
    fn with_raw_content(&self, start: usize, end: usize) -> Bounds {
        if end > start + 1 {
            Bounds::with_content(start, end, start + 1, end - 1)
        } else {
            Bounds::new(start, end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer(data: &[u8]) -> Lexer {
        Lexer::new(ByteReader::new(data.to_vec()).unwrap())
    }

    #[test]
    fn test_kind_dispatch() {
        let lex = lexer(b"/Name [1] (s) <AB> <</X 1>> true false stream");
        assert_eq!(lex.value_kind_at(0, false), ValueKind::Name);
        assert_eq!(lex.value_kind_at(6, false), ValueKind::Array);
        assert_eq!(lex.value_kind_at(10, false), ValueKind::StringLiteral);
        assert_eq!(lex.value_kind_at(14, false), ValueKind::HexString);
        assert_eq!(lex.value_kind_at(19, false), ValueKind::Dictionary);
        assert_eq!(lex.value_kind_at(28, false), ValueKind::Boolean);
        assert_eq!(lex.value_kind_at(33, false), ValueKind::Boolean);
        assert_eq!(lex.value_kind_at(39, false), ValueKind::Stream);
    }

    #[test]
    fn test_kind_slash_without_body() {
        let lex = lexer(b"/ x");
        assert_eq!(lex.value_kind_at(0, false), ValueKind::Unknown);
    }

    #[test]
    fn test_kind_reference_vs_number() {
        // Backward R rule: "12 0 R" is a reference, "5 0" is a number
        let lex = lexer(b"12 0 R /Next");
        assert_eq!(lex.value_kind_at(0, false), ValueKind::Reference);

        let lex = lexer(b"5 0 /Next");
        assert_eq!(lex.value_kind_at(0, false), ValueKind::Number);

        let lex = lexer(b"12 0 R");
        assert_eq!(lex.value_kind_at(0, false), ValueKind::Reference);
    }

    #[test]
    fn test_kind_leading_dot_and_minus() {
        let lex = lexer(b".5 -3 -x .");
        assert_eq!(lex.value_kind_at(0, false), ValueKind::Number);
        assert_eq!(lex.value_kind_at(3, false), ValueKind::Number);
        assert_eq!(lex.value_kind_at(6, false), ValueKind::Unknown);
        assert_eq!(lex.value_kind_at(9, false), ValueKind::Unknown);
    }

    #[test]
    fn test_kind_keyword_must_close() {
        let lex = lexer(b"truest");
        assert_eq!(lex.value_kind_at(0, false), ValueKind::Unknown);
    }

    #[test]
    fn test_skip_empty_whitespace_and_comments() {
        let lex = lexer(b"  % note\n  % more\n/Name");
        let i = lex.skip_empty(0).unwrap();
        assert_eq!(i, 18);
        assert_eq!(lex.reader().byte_at(i), b'/');
        // Idempotent
        assert_eq!(lex.skip_empty(i), Some(i));
    }

    #[test]
    fn test_skip_empty_exhausted() {
        let lex = lexer(b"   % trailing");
        assert_eq!(lex.skip_empty(0), None);
    }

    #[test]
    fn test_dict_bounds_simple() {
        let data = b"<< /Length 42 /Type /Catalog >>";
        let lex = lexer(data);
        let b = lex.dict_bounds_at(0, true).unwrap();
        assert_eq!(b.start, 0);
        assert_eq!(b.end, data.len() - 1);
        let (cs, ce) = b.content().unwrap();
        assert_eq!(lex.reader().byte_at(cs), b'/');
        assert_eq!(lex.reader().byte_at(ce), b'g');
    }

    #[test]
    fn test_dict_bounds_empty() {
        let lex = lexer(b"<<>> x");
        let b = lex.dict_bounds_at(0, false).unwrap();
        assert_eq!((b.start, b.end), (0, 3));
        assert!(b.content().is_none());
    }

    #[test]
    fn test_dict_bounds_nested() {
        let data = b"<< /A << /B << /C 1 >> >> >>";
        let lex = lexer(data);
        let b = lex.dict_bounds_at(0, false).unwrap();
        assert_eq!(b.end, data.len() - 1);
    }

    #[test]
    fn test_dict_bounds_ignores_literal_delimiters() {
        // The ">>" inside the literal must not close the outer dict
        let data = b"<< /A (>>) /B <</X 1>> >>";
        let lex = lexer(data);
        let b = lex.dict_bounds_at(0, false).unwrap();
        assert_eq!(b.end, data.len() - 1);
    }

    #[test]
    fn test_dict_bounds_escaped_parens_in_literal() {
        // Escaped parens do not change literal depth; the dict still closes
        let data = b"<< /S (a\\)>>b) >>";
        let lex = lexer(data);
        let b = lex.dict_bounds_at(0, false).unwrap();
        assert_eq!(b.end, data.len() - 1);
    }

    #[test]
    fn test_dict_bounds_non_overlapping_pairs() {
        // "<<<<" right after the opener is one nested dict, not two
        let data = b"<<<< /X 1 >>>>";
        let lex = lexer(data);
        let b = lex.dict_bounds_at(0, false).unwrap();
        assert_eq!(b.end, data.len() - 1);
    }

    #[test]
    fn test_dict_bounds_unterminated() {
        let lex = lexer(b"<< /A 1");
        assert!(lex.dict_bounds_at(0, false).is_none());
    }

    #[test]
    fn test_array_bounds() {
        let data = b"[1 [2 3] 4] tail";
        let lex = lexer(data);
        let b = lex.array_bounds_at(0, false).unwrap();
        assert_eq!((b.start, b.end), (0, 10));
        let (cs, ce) = b.content().unwrap();
        assert_eq!((cs, ce), (1, 9));
    }

    #[test]
    fn test_array_bounds_unbalanced() {
        let lex = lexer(b"[1 [2 3] 4");
        assert!(lex.array_bounds_at(0, false).is_none());
    }

    #[test]
    fn test_hex_bounds() {
        let lex = lexer(b"<48 65> x");
        let b = lex.hex_bounds_at(0, false).unwrap();
        assert_eq!((b.start, b.end), (0, 6));
        assert_eq!(b.content(), Some((1, 5)));
    }

    #[test]
    fn test_literal_bounds_escapes() {
        let data = b"(abc\\(def\\)ghi)";
        let lex = lexer(data);
        let b = lex.literal_bounds_at(0, false).unwrap();
        assert_eq!((b.start, b.end), (0, data.len() - 1));
    }

    #[test]
    fn test_literal_bounds_nested() {
        let data = b"(a(b)c)";
        let lex = lexer(data);
        let b = lex.literal_bounds_at(0, false).unwrap();
        assert_eq!(b.end, 6);
    }

    #[test]
    fn test_literal_bounds_double_backslash() {
        // "\\\\" is an escaped backslash; the ")" after it closes the string
        let data = b"(a\\\\)";
        let lex = lexer(data);
        let b = lex.literal_bounds_at(0, false).unwrap();
        assert_eq!(b.end, 4);
    }

    #[test]
    fn test_indirect_object_bounds_dict_interior() {
        let data = b"12 0 obj << /Type /Page >> endobj";
        let lex = lexer(data);
        let b = lex.indirect_object_bounds_at(0, true).unwrap();
        assert_eq!(b.start, 0);
        assert_eq!(b.end, data.len() - 1);
        let (cs, ce) = b.content().unwrap();
        // Content is the dict interior, not the << >> pair
        assert_eq!(&data[cs..=ce], b"/Type /Page");
    }

    #[test]
    fn test_indirect_object_bounds_non_dict() {
        let data = b"3 0 obj [1 2 3] endobj";
        let lex = lexer(data);
        let b = lex.indirect_object_bounds_at(0, true).unwrap();
        let (cs, ce) = b.content().unwrap();
        assert_eq!(&data[cs..=ce], b"[1 2 3]");
    }

    #[test]
    fn test_indirect_object_bounds_stream_kept_whole() {
        let data = b"4 0 obj << /Length 2 >> stream\nAB\nendstream endobj";
        let lex = lexer(data);
        let b = lex.indirect_object_bounds_at(0, true).unwrap();
        let (cs, _ce) = b.content().unwrap();
        // Stream definitions keep their dict delimiters
        assert_eq!(&data[cs..cs + 2], b"<<");
    }

    #[test]
    fn test_xref_table_bounds() {
        let data = b"xref\n0 1\n0000000000 65535 f\ntrailer <<>>";
        let lex = lexer(data);
        let b = lex.xref_table_bounds_at(0).unwrap();
        assert_eq!(b.start, 0);
        assert_eq!(&data[b.end..=b.end], b"r");
        assert_eq!(&data[b.end - 6..=b.end], b"trailer");
        let (cs, ce) = b.content().unwrap();
        assert_eq!(&data[cs..=ce], b"0 1\n0000000000 65535 f");
    }

    #[test]
    fn test_xref_table_bounds_skips_startxref() {
        let data = b"startxref\n9\nxref\n0 1\n0000000000 65535 f\ntrailer <<>>";
        let lex = lexer(data);
        let b = lex.xref_table_bounds_at(0).unwrap();
        assert_eq!(&data[b.start..b.start + 4], b"xref");
        assert!(b.start > 9);
    }

    #[test]
    fn test_xref_table_bounds_empty_is_illegal() {
        let lex = lexer(b"xref\ntrailer <<>>");
        assert!(lex.xref_table_bounds_at(0).is_none());
    }

    #[test]
    fn test_skip_to_next_name() {
        let data = b"<< /A [1 2] /B (x) /C 5 >>";
        let lex = lexer(data);
        let b = lex.dict_bounds_at(0, false).unwrap();
        let (cs, ce) = b.content().unwrap();

        let first = lex.skip_to_next_name(cs, ce).unwrap();
        assert_eq!(&data[first..first + 2], b"/A");
        // Past "/A" itself the array is skipped whole
        let second = lex.skip_to_next_name(first + 2, ce).unwrap();
        assert_eq!(&data[second..second + 2], b"/B");
        let third = lex.skip_to_next_name(second + 2, ce).unwrap();
        assert_eq!(&data[third..third + 2], b"/C");
        assert!(lex.skip_to_next_name(third + 2, ce).is_none());
    }

    #[test]
    fn test_skip_to_next_name_over_comment() {
        let data = b"% header\n42 /Key";
        let lex = lexer(data);
        let i = lex.skip_to_next_name(0, data.len() - 1).unwrap();
        assert_eq!(&data[i..i + 4], b"/Key");
    }
}
