use super::byte_reader::{
    Bounds, ByteReader, Direction, SearchOptions, is_digit_byte, is_regular_byte,
};
use super::lexer::Lexer;

/// A decoded leaf value together with the inclusive byte range it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedValue<T> {
    pub value: T,
    pub start: usize,
    pub end: usize,
}

/// Typed leaf decoders built on top of [`Lexer`].
///
/// Every parser takes an explicit position, optionally skips whitespace and
/// comments first, and answers `None` on anything it cannot decode — the
/// position is never advanced behind the caller's back.
#[derive(Debug, Clone)]
pub struct ValueParser {
    lexer: Lexer,
}

impl ValueParser {
    pub fn new(lexer: Lexer) -> Self {
        ValueParser { lexer }
    }

    pub fn from_reader(reader: ByteReader) -> Self {
        ValueParser {
            lexer: Lexer::new(reader),
        }
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn reader(&self) -> &ByteReader {
        self.lexer.reader()
    }

    /// Parses a number token.
    ///
    /// Lenient per the COS grammar actually found in the wild: `-.5`, `.5`,
    /// `5`, `5.` and `5.0` are all valid; `.`, `-` and `-.` are not. A
    /// leading `.` reads as `0.`; at most one dot, and only when `float`.
    pub fn parse_number_at(
        &self,
        start: usize,
        float: bool,
        skip_empty: bool,
    ) -> Option<ParsedValue<f64>> {
        let reader = self.reader();
        let start = self.resolve(start, skip_empty)?;
        let mut text = String::new();
        let mut i = start;

        if reader.get(i) == Some(b'-') {
            text.push('-');
            i += 1;
        }
        let mut seen_dot = false;
        if reader.get(i) == Some(b'.') {
            if !float {
                return None;
            }
            text.push_str("0.");
            seen_dot = true;
            i += 1;
        }

        let mut seen_digit = false;
        while let Some(b) = reader.get(i) {
            if is_digit_byte(b) {
                text.push(b as char);
                seen_digit = true;
            } else if b == b'.' && float && !seen_dot {
                text.push('.');
                seen_dot = true;
            } else {
                break;
            }
            i += 1;
        }

        if !seen_digit {
            return None;
        }
        let value = text.parse::<f64>().ok()?;
        Some(ParsedValue {
            value,
            start,
            end: i - 1,
        })
    }

    /// Parses a name token: `/` followed by a non-empty run of regular bytes.
    /// The returned string keeps the slash iff `include_slash`.
    pub fn parse_name_at(
        &self,
        start: usize,
        include_slash: bool,
        skip_empty: bool,
    ) -> Option<ParsedValue<String>> {
        let reader = self.reader();
        let start = self.resolve(start, skip_empty)?;
        if reader.byte_at(start) != b'/' {
            return None;
        }
        if !reader.get(start + 1).is_some_and(is_regular_byte) {
            return None;
        }
        let end = reader
            .find_irregular_index(Direction::Forward, start + 1)
            .map(|i| i - 1)
            .unwrap_or(reader.max_index());

        let body_start = if include_slash { start } else { start + 1 };
        let value = String::from_utf8_lossy(reader.slice(body_start, end)).into_owned();
        Some(ParsedValue { value, start, end })
    }

    /// Parses an unquoted run of regular bytes starting at `start`.
    /// Internal building block for keyword-shaped tokens.
    pub fn parse_token_at(&self, start: usize, skip_empty: bool) -> Option<ParsedValue<Vec<u8>>> {
        let reader = self.reader();
        let start = self.resolve(start, skip_empty)?;
        if !is_regular_byte(reader.byte_at(start)) {
            return None;
        }
        let end = reader
            .find_irregular_index(Direction::Forward, start)
            .map(|i| i - 1)
            .unwrap_or(reader.max_index());
        Some(ParsedValue {
            value: reader.slice(start, end).to_vec(),
            start,
            end,
        })
    }

    /// Parses a boolean: a closed `true` or `false` within the sub-range
    /// bounded by the next delimiter.
    pub fn parse_bool_at(&self, start: usize, skip_empty: bool) -> Option<ParsedValue<bool>> {
        let reader = self.reader();
        let start = self.resolve(start, skip_empty)?;
        let limit = reader
            .find_delimiter_index(Direction::Forward, start)
            .map(|i| i.saturating_sub(1))
            .unwrap_or(reader.max_index());
        if limit < start {
            return None;
        }
        for (keyword, value) in [(&b"true"[..], true), (&b"false"[..], false)] {
            if let Some(found) = reader.find_subarray_index(
                keyword,
                &SearchOptions {
                    min_index: Some(start),
                    max_index: Some(limit),
                    closed_only: true,
                    ..SearchOptions::default()
                },
            ) {
                return Some(ParsedValue {
                    value,
                    start: found.start,
                    end: found.end,
                });
            }
        }
        None
    }

    /// Parses a homogeneous number array: `[`…`]` bounds are required and
    /// leaves are read until the first unparsable byte.
    pub fn parse_number_array_at(
        &self,
        start: usize,
        float: bool,
        skip_empty: bool,
    ) -> Option<ParsedValue<Vec<f64>>> {
        let bounds = self.lexer.array_bounds_at(start, skip_empty)?;
        let mut values = Vec::new();
        if let Some((cs, ce)) = bounds.content() {
            let mut i = cs;
            while i <= ce {
                match self.parse_number_at(i, float, true) {
                    Some(parsed) if parsed.end <= ce => {
                        i = parsed.end + 1;
                        values.push(parsed.value);
                    }
                    _ => break,
                }
            }
        }
        Some(ParsedValue {
            value: values,
            start: bounds.start,
            end: bounds.end,
        })
    }

    /// Parses a homogeneous name array.
    pub fn parse_name_array_at(
        &self,
        start: usize,
        include_slash: bool,
        skip_empty: bool,
    ) -> Option<ParsedValue<Vec<String>>> {
        let bounds = self.lexer.array_bounds_at(start, skip_empty)?;
        let mut values = Vec::new();
        if let Some((cs, ce)) = bounds.content() {
            let mut i = cs;
            while i <= ce {
                match self.parse_name_at(i, include_slash, true) {
                    Some(parsed) if parsed.end <= ce => {
                        i = parsed.end + 1;
                        values.push(parsed.value);
                    }
                    _ => break,
                }
            }
        }
        Some(ParsedValue {
            value: values,
            start: bounds.start,
            end: bounds.end,
        })
    }

    /// Looks up a name-valued property inside dictionary content bounds.
    ///
    /// Scans byte-by-byte with the same literal/dict-nesting tracker as the
    /// dictionary bounds finder and only accepts a key match at depth
    /// exactly 1 whose following byte is non-regular. `name` includes the
    /// slash (e.g. `b"/Type"`).
    pub fn parse_dict_property_by_name(
        &self,
        name: &[u8],
        bounds: &Bounds,
    ) -> Option<ParsedValue<String>> {
        let reader = self.reader();
        let (cs, ce) = bounds.content()?;
        if name.is_empty() {
            return None;
        }

        let mut depth = 1u32;
        let mut literal = 0u32;
        let mut prev = 0u8;
        let mut latched = false;
        let mut i = cs;

        while i <= ce {
            let b = reader.byte_at(i);
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
                depth = depth.checked_sub(1)?;
                latched = true;
            } else {
                latched = false;
                if depth == 1 && b == name[0] && self.matches_closed(i, name, ce) {
                    let value = self.parse_name_at(i + name.len(), true, true)?;
                    if value.end <= ce {
                        return Some(value);
                    }
                    return None;
                }
            }
            prev = b;
            i += 1;
        }
        None
    }

    fn matches_closed(&self, i: usize, name: &[u8], ce: usize) -> bool {
        let reader = self.reader();
        let end = i + name.len() - 1;
        if end > ce || reader.slice(i, end) != name {
            return false;
        }
        !reader.get(end + 1).is_some_and(is_regular_byte)
    }

    fn resolve(&self, i: usize, skip_empty: bool) -> Option<usize> {
        let i = if skip_empty { self.lexer.skip_empty(i)? } else { i };
        if self.reader().is_outside(i) {
            None
        } else {
            Some(i)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(data: &[u8]) -> ValueParser {
        ValueParser::from_reader(ByteReader::new(data.to_vec()).unwrap())
    }

    #[test]
    fn test_number_forms_accepted() {
        for (text, expected) in [
            ("0", 0.0),
            ("-0", 0.0),
            ("0.", 0.0),
            (".0", 0.0),
            ("-.5", -0.5),
            ("123.456", 123.456),
            ("5.", 5.0),
        ] {
            let p = parser(text.as_bytes());
            let parsed = p.parse_number_at(0, true, false).unwrap();
            assert_eq!(parsed.value, expected, "input {:?}", text);
            assert_eq!(parsed.end, text.len() - 1, "input {:?}", text);
        }
    }

    #[test]
    fn test_number_forms_rejected() {
        for text in [".", "-", "-.", "abc"] {
            let p = parser(text.as_bytes());
            assert!(p.parse_number_at(0, true, false).is_none(), "input {:?}", text);
        }
    }

    #[test]
    fn test_number_integer_mode_stops_at_dot() {
        let p = parser(b"12.5");
        let parsed = p.parse_number_at(0, false, false).unwrap();
        assert_eq!(parsed.value, 12.0);
        assert_eq!(parsed.end, 1);
    }

    #[test]
    fn test_number_skips_leading_empty() {
        let p = parser(b"  % size\n 42 ");
        let parsed = p.parse_number_at(0, true, true).unwrap();
        assert_eq!(parsed.value, 42.0);
        assert_eq!(parsed.start, 10);
        assert_eq!(parsed.end, 11);
    }

    #[test]
    fn test_name_with_and_without_slash() {
        let p = parser(b"/Catalog ");
        let with = p.parse_name_at(0, true, false).unwrap();
        assert_eq!(with.value, "/Catalog");
        assert_eq!((with.start, with.end), (0, 7));

        let without = p.parse_name_at(0, false, false).unwrap();
        assert_eq!(without.value, "Catalog");
    }

    #[test]
    fn test_name_empty_body_fails() {
        let p = parser(b"/ ");
        assert!(p.parse_name_at(0, true, false).is_none());
        let p = parser(b"//X");
        assert!(p.parse_name_at(0, true, false).is_none());
    }

    #[test]
    fn test_name_at_buffer_end() {
        let p = parser(b"/ID");
        let parsed = p.parse_name_at(0, true, false).unwrap();
        assert_eq!(parsed.value, "/ID");
        assert_eq!(parsed.end, 2);
    }

    #[test]
    fn test_token_run() {
        let p = parser(b"endstream>>");
        let parsed = p.parse_token_at(0, false).unwrap();
        assert_eq!(parsed.value, b"endstream".to_vec());
        assert_eq!(parsed.end, 8);
    }

    #[test]
    fn test_bool() {
        let p = parser(b" true>>");
        let parsed = p.parse_bool_at(0, true).unwrap();
        assert!(parsed.value);
        assert_eq!((parsed.start, parsed.end), (1, 4));

        let p = parser(b"false ");
        assert!(!p.parse_bool_at(0, true).unwrap().value);

        let p = parser(b"truism ");
        assert!(p.parse_bool_at(0, true).is_none());
    }

    #[test]
    fn test_number_array() {
        let p = parser(b"[0 612 .5 -3]");
        let parsed = p.parse_number_array_at(0, true, false).unwrap();
        assert_eq!(parsed.value, vec![0.0, 612.0, 0.5, -3.0]);
        assert_eq!((parsed.start, parsed.end), (0, 12));
    }

    #[test]
    fn test_number_array_stops_at_unparsable() {
        let p = parser(b"[1 2 /X 3]");
        let parsed = p.parse_number_array_at(0, true, false).unwrap();
        assert_eq!(parsed.value, vec![1.0, 2.0]);
    }

    #[test]
    fn test_number_array_requires_brackets() {
        let p = parser(b"1 2 3");
        assert!(p.parse_number_array_at(0, true, false).is_none());
    }

    #[test]
    fn test_name_array() {
        let p = parser(b"[/PDF /Text /ImageB]");
        let parsed = p.parse_name_array_at(0, true, false).unwrap();
        assert_eq!(parsed.value, vec!["/PDF", "/Text", "/ImageB"]);
    }

    #[test]
    fn test_dict_property_by_name() {
        let data = b"<< /Type /Page /Subtype /Form >>";
        let p = parser(data);
        let bounds = p.lexer().dict_bounds_at(0, false).unwrap();

        let ty = p.parse_dict_property_by_name(b"/Type", &bounds).unwrap();
        assert_eq!(ty.value, "/Page");
        let sub = p.parse_dict_property_by_name(b"/Subtype", &bounds).unwrap();
        assert_eq!(sub.value, "/Form");
        assert!(p.parse_dict_property_by_name(b"/Kids", &bounds).is_none());
    }

    #[test]
    fn test_dict_property_ignores_nested_depth() {
        // /Type inside the nested dict must not match at depth 1
        let data = b"<< /Inner << /Type /Font >> /Type /Page >>";
        let p = parser(data);
        let bounds = p.lexer().dict_bounds_at(0, false).unwrap();
        let ty = p.parse_dict_property_by_name(b"/Type", &bounds).unwrap();
        assert_eq!(ty.value, "/Page");
    }

    #[test]
    fn test_dict_property_ignores_literal_text() {
        let data = b"<< /Title (/Type /Fake) /Type /Real >>";
        let p = parser(data);
        let bounds = p.lexer().dict_bounds_at(0, false).unwrap();
        let ty = p.parse_dict_property_by_name(b"/Type", &bounds).unwrap();
        assert_eq!(ty.value, "/Real");
    }
}
