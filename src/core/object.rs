use super::byte_reader::{Bounds, SearchOptions};
use super::crypt::CryptInfo;
use super::decode::decode_stream;
use super::error::{PDFError, PDFResult};
use super::lexer::ValueKind;
use super::object_index::ObjectResolver;
use super::parser::{ParsedValue, ValueParser};
use indexmap::IndexMap;
use log::warn;
use smallvec::SmallVec;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Identifier of an indirect object.
///
/// Serialized as `"<id> <gen> R"` when referenced and as the
/// `"<id> <gen> obj … endobj"` header when defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    pub id: u32,
    pub generation: u16,
}

impl ObjectId {
    pub fn new(id: u32, generation: u16) -> Self {
        ObjectId { id, generation }
    }

    /// Appends the reference form `N G R`.
    pub fn write_ref(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(format!("{} {} R", self.id, self.generation).as_bytes());
    }

    /// Appends the definition header `N G obj`.
    pub fn write_open(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(format!("{} {} obj", self.id, self.generation).as_bytes());
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.id, self.generation)
    }
}

/// Shared edit-notification channel.
///
/// Dicts attached to the same channel bump a single revision counter; the
/// owning collaborator compares revisions to invalidate dependent caches.
/// Single-threaded by design, like the rest of the core.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    revision: Rc<Cell<u64>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        ChangeNotifier::default()
    }

    pub fn notify(&self) {
        self.revision.set(self.revision.get() + 1);
    }

    pub fn revision(&self) -> u64 {
        self.revision.get()
    }
}

/// A parsed COS object.
///
/// String variants keep the raw interior bytes exactly as they appeared
/// between their delimiters, so re-emission is byte-exact even for escape
/// sequences the parser never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum PDFObject {
    Null,
    Bool(bool),
    Number(f64),
    /// Name with its leading slash, e.g. `"/Catalog"`
    Name(String),
    StringLit(Vec<u8>),
    HexStr(Vec<u8>),
    Array(Vec<PDFObject>),
    Dict(PDFDict),
    Stream(PDFStream),
    Ref(ObjectId),
}

impl PDFObject {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PDFObject::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PDFObject::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            PDFObject::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<ObjectId> {
        match self {
            PDFObject::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PDFObject]> {
        match self {
            PDFObject::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PDFDict> {
        match self {
            PDFObject::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&PDFStream> {
        match self {
            PDFObject::Stream(s) => Some(s),
            _ => None,
        }
    }

    /// Decoded bytes of a string object: literal escapes or hex pairs
    /// interpreted. The raw bytes stay authoritative for round-trips.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        match self {
            PDFObject::StringLit(raw) => Some(decode_literal(raw)),
            PDFObject::HexStr(raw) => Some(decode_hex(raw)),
            _ => None,
        }
    }

    /// Serializes this object, consulting `crypt` for stream payloads.
    pub fn write_bytes(&self, out: &mut Vec<u8>, crypt: Option<&dyn CryptInfo>) -> PDFResult<()> {
        match self {
            PDFObject::Null => out.extend_from_slice(b"null"),
            PDFObject::Bool(true) => out.extend_from_slice(b"true"),
            PDFObject::Bool(false) => out.extend_from_slice(b"false"),
            PDFObject::Number(n) => write_number(out, *n),
            PDFObject::Name(n) => out.extend_from_slice(n.as_bytes()),
            PDFObject::StringLit(raw) => {
                out.push(b'(');
                out.extend_from_slice(raw);
                out.push(b')');
            }
            PDFObject::HexStr(raw) => {
                out.push(b'<');
                out.extend_from_slice(raw);
                out.push(b'>');
            }
            PDFObject::Array(items) => {
                out.push(b'[');
                for (k, item) in items.iter().enumerate() {
                    if k > 0 {
                        out.push(b' ');
                    }
                    item.write_bytes(out, crypt)?;
                }
                out.push(b']');
            }
            PDFObject::Dict(d) => d.write_bytes(out, crypt)?,
            PDFObject::Stream(s) => s.write_bytes(out, crypt)?,
            PDFObject::Ref(id) => id.write_ref(out),
        }
        Ok(())
    }

    pub fn to_bytes(&self, crypt: Option<&dyn CryptInfo>) -> PDFResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_bytes(&mut out, crypt)?;
        Ok(out)
    }

    /// Serializes this object as a full `N G obj … endobj` definition.
    pub fn to_indirect_bytes(
        &self,
        id: ObjectId,
        crypt: Option<&dyn CryptInfo>,
    ) -> PDFResult<Vec<u8>> {
        let mut out = Vec::new();
        id.write_open(&mut out);
        out.push(b'\n');
        self.write_bytes(&mut out, crypt)?;
        out.extend_from_slice(b"\nendobj\n");
        Ok(out)
    }
}

/// Canonical number emission: integral values print without a fraction,
/// so `1.0` and `1` serialize identically.
fn write_number(out: &mut Vec<u8>, n: f64) {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        out.extend_from_slice(format!("{}", n as i64).as_bytes());
    } else {
        out.extend_from_slice(format!("{}", n).as_bytes());
    }
}

/// Interprets literal-string escape sequences.
pub fn decode_literal(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        i += 1;
        let Some(&e) = raw.get(i) else { break };
        match e {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'\\' | b'(' | b')' => out.push(e),
            b'0'..=b'7' => {
                let mut value = (e - b'0') as u32;
                let mut taken = 1;
                while taken < 3 {
                    match raw.get(i + taken) {
                        Some(&d @ b'0'..=b'7') => {
                            value = (value << 3) | (d - b'0') as u32;
                            taken += 1;
                        }
                        _ => break,
                    }
                }
                out.push(value as u8);
                i += taken;
                continue;
            }
            // Line continuation: backslash-EOL drops the break
            b'\r' => {
                if raw.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => {}
            other => out.push(other),
        }
        i += 1;
    }
    out
}

/// Interprets hex-string digit pairs; whitespace is ignored and a trailing
/// odd digit reads as if followed by zero.
pub fn decode_hex(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() / 2);
    let mut pending: Option<u8> = None;
    for &b in raw {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => continue,
        };
        match pending.take() {
            Some(high) => out.push((high << 4) | digit),
            None => pending = Some(digit),
        }
    }
    if let Some(high) = pending {
        out.push(high << 4);
    }
    out
}

/// Insertion-ordered COS dictionary.
///
/// All mutation goes through setters so the dirty flag and the attached
/// notification channel stay truthful; the map itself is never exposed
/// mutably. The optional parent is a handle into the owner's object table,
/// not an owning pointer.
#[derive(Debug, Clone, Default)]
pub struct PDFDict {
    props: IndexMap<String, PDFObject>,
    id: Option<ObjectId>,
    parent: Option<ObjectId>,
    edited: bool,
    notifier: Option<ChangeNotifier>,
}

impl PartialEq for PDFDict {
    fn eq(&self, other: &Self) -> bool {
        self.props == other.props && self.id == other.id
    }
}

impl PDFDict {
    pub fn new() -> Self {
        PDFDict::default()
    }

    /// Parses the dictionary inside `bounds` (as produced by the lexer's
    /// dict bounds finder). An empty interior is a valid empty dict.
    pub fn parse(
        parser: &ValueParser,
        bounds: &Bounds,
        resolver: Option<&dyn ObjectResolver>,
    ) -> Option<PDFDict> {
        match bounds.content() {
            Some((cs, ce)) => PDFDict::parse_content(parser, cs, ce, resolver),
            None => Some(PDFDict::new()),
        }
    }

    /// Parses dict properties from an interior byte range.
    pub fn parse_content(
        parser: &ValueParser,
        content_start: usize,
        content_end: usize,
        resolver: Option<&dyn ObjectResolver>,
    ) -> Option<PDFDict> {
        let lexer = parser.lexer();
        let mut dict = PDFDict::new();
        let mut i = content_start;
        loop {
            let Some(name_idx) = lexer.skip_to_next_name(i, content_end) else {
                break;
            };
            let Some(key) = parser.parse_name_at(name_idx, true, false) else {
                i = name_idx + 1;
                continue;
            };
            match parse_object_at(parser, key.end + 1, resolver) {
                Some(value) if value.end <= content_end => {
                    i = value.end + 1;
                    dict.props.insert(key.value, value.value);
                }
                _ => {
                    warn!("dropping dict entry {} with unparsable value", key.value);
                    i = key.end + 1;
                }
            }
            if i > content_end {
                break;
            }
        }
        Some(dict)
    }

    pub fn get(&self, key: &str) -> Option<&PDFObject> {
        self.props.get(key)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_number()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn get_name(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_name()
    }

    pub fn get_ref(&self, key: &str) -> Option<ObjectId> {
        self.get(key)?.as_ref_id()
    }

    pub fn get_array(&self, key: &str) -> Option<&[PDFObject]> {
        self.get(key)?.as_array()
    }

    pub fn get_dict(&self, key: &str) -> Option<&PDFDict> {
        self.get(key)?.as_dict()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PDFObject)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Replaces a property and marks the dict edited.
    pub fn set(&mut self, key: &str, value: PDFObject) {
        let key = normalize_key(key);
        self.props.insert(key, value);
        self.mark_edited();
    }

    /// Removes a property and marks the dict edited; `false` if absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.props.shift_remove(key).is_some();
        if removed {
            self.mark_edited();
        }
        removed
    }

    /// Parser-side insertion: no dirty flag, no notification.
    pub(crate) fn insert_raw(&mut self, key: String, value: PDFObject) {
        self.props.insert(key, value);
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn set_object_id(&mut self, id: Option<ObjectId>) {
        self.id = id;
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Attaches this dict to an owner: edits bubble to `notifier`, and
    /// `parent` records which table entry owns it.
    pub fn attach(&mut self, notifier: ChangeNotifier, parent: Option<ObjectId>) {
        self.notifier = Some(notifier);
        self.parent = parent;
    }

    pub fn edited(&self) -> bool {
        self.edited
    }

    pub fn mark_edited(&mut self) {
        self.edited = true;
        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
    }

    /// Emits `<<`, each property as name, space, value, then `>>`.
    pub fn write_bytes(&self, out: &mut Vec<u8>, crypt: Option<&dyn CryptInfo>) -> PDFResult<()> {
        out.extend_from_slice(b"<<");
        for (key, value) in &self.props {
            out.extend_from_slice(key.as_bytes());
            out.push(b' ');
            value.write_bytes(out, crypt)?;
        }
        out.extend_from_slice(b">>");
        Ok(())
    }

    pub fn to_bytes(&self, crypt: Option<&dyn CryptInfo>) -> PDFResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_bytes(&mut out, crypt)?;
        Ok(out)
    }
}

fn normalize_key(key: &str) -> String {
    if key.starts_with('/') {
        key.to_string()
    } else {
        format!("/{}", key)
    }
}

/// One entry of a stream's filter chain.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFilter {
    /// Filter name with its slash, e.g. `"/FlateDecode"`
    pub name: String,
    pub decode_parms: Option<PDFDict>,
}

/// A stream object: a dictionary plus a byte payload.
///
/// The payload is kept exactly as stored in the file (still filtered, still
/// encrypted); [`PDFStream::decoded_data`] produces the plaintext view.
#[derive(Debug, Clone, PartialEq)]
pub struct PDFStream {
    pub dict: PDFDict,
    data: Vec<u8>,
    filters: SmallVec<[StreamFilter; 1]>,
}

impl PDFStream {
    pub fn new(dict: PDFDict, data: Vec<u8>) -> Self {
        let filters = filters_from_dict(&dict);
        PDFStream {
            dict,
            data,
            filters,
        }
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.dict.object_id()
    }

    /// The stored payload, unfiltered and undecrypted.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn filters(&self) -> &[StreamFilter] {
        &self.filters
    }

    /// Replaces the payload with already-filtered bytes and marks the
    /// owning dict edited.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
        self.dict.mark_edited();
    }

    /// Decrypts (when `crypt` is present and the stream is indirect) and
    /// then applies the filter chain in order.
    pub fn decoded_data(&self, crypt: Option<&dyn CryptInfo>) -> PDFResult<Vec<u8>> {
        let mut data = match (crypt, self.object_id()) {
            (Some(crypt), Some(id)) => crypt.decrypt(id.id, id.generation, &self.data),
            _ => self.data.clone(),
        };
        for filter in &self.filters {
            data = decode_stream(&data, Some(&filter.name))?;
        }
        Ok(data)
    }

    /// Emits the dictionary (with `/Length` reflecting the emitted payload)
    /// followed by `stream … endstream`. With `crypt` present the stream
    /// must be indirect: per-object keys need an object number.
    pub fn write_bytes(&self, out: &mut Vec<u8>, crypt: Option<&dyn CryptInfo>) -> PDFResult<()> {
        let payload = match crypt {
            Some(crypt) => {
                let id = self.object_id().ok_or_else(|| {
                    PDFError::serialization_failure("encrypted stream without a reference")
                })?;
                crypt.encrypt(id.id, id.generation, &self.data)
            }
            None => self.data.clone(),
        };

        let mut dict = self.dict.clone();
        dict.insert_raw("/Length".to_string(), PDFObject::Number(payload.len() as f64));
        dict.write_bytes(out, crypt)?;

        out.extend_from_slice(b"stream\n");
        out.extend_from_slice(&payload);
        out.extend_from_slice(b"\nendstream");
        Ok(())
    }
}

fn filters_from_dict(dict: &PDFDict) -> SmallVec<[StreamFilter; 1]> {
    let mut filters = SmallVec::new();
    let parms_at = |k: usize| -> Option<PDFDict> {
        match dict.get("/DecodeParms") {
            Some(PDFObject::Dict(d)) if k == 0 => Some(d.clone()),
            Some(PDFObject::Array(items)) => match items.get(k) {
                Some(PDFObject::Dict(d)) => Some(d.clone()),
                _ => None,
            },
            _ => None,
        }
    };
    match dict.get("/Filter") {
        Some(PDFObject::Name(name)) => filters.push(StreamFilter {
            name: name.clone(),
            decode_parms: parms_at(0),
        }),
        Some(PDFObject::Array(items)) => {
            for (k, item) in items.iter().enumerate() {
                if let PDFObject::Name(name) = item {
                    filters.push(StreamFilter {
                        name: name.clone(),
                        decode_parms: parms_at(k),
                    });
                }
            }
        }
        _ => {}
    }
    filters
}

/// Parses the object value at `start`, dispatching on its classified kind.
///
/// A dictionary followed by the `stream` keyword continues into a stream
/// parse; `/Length` references are resolved through `resolver` when one is
/// available, with an `endstream` search as the fallback.
pub fn parse_object_at(
    parser: &ValueParser,
    start: usize,
    resolver: Option<&dyn ObjectResolver>,
) -> Option<ParsedValue<PDFObject>> {
    let lexer = parser.lexer();
    let reader = parser.reader();
    let i = lexer.skip_empty(start)?;

    match lexer.value_kind_at(i, false) {
        ValueKind::Name => parser.parse_name_at(i, true, false).map(|p| ParsedValue {
            value: PDFObject::Name(p.value),
            start: p.start,
            end: p.end,
        }),
        ValueKind::Number => parser.parse_number_at(i, true, false).map(|p| ParsedValue {
            value: PDFObject::Number(p.value),
            start: p.start,
            end: p.end,
        }),
        ValueKind::Boolean => parser.parse_bool_at(i, false).map(|p| ParsedValue {
            value: PDFObject::Bool(p.value),
            start: p.start,
            end: p.end,
        }),
        ValueKind::Reference => parse_ref_at(parser, i).map(|p| ParsedValue {
            value: PDFObject::Ref(p.value),
            start: p.start,
            end: p.end,
        }),
        ValueKind::StringLiteral => {
            let bounds = lexer.literal_bounds_at(i, false)?;
            let raw = match bounds.content() {
                Some((cs, ce)) => reader.slice(cs, ce).to_vec(),
                None => Vec::new(),
            };
            Some(ParsedValue {
                value: PDFObject::StringLit(raw),
                start: bounds.start,
                end: bounds.end,
            })
        }
        ValueKind::HexString => {
            let bounds = lexer.hex_bounds_at(i, false)?;
            let raw = match bounds.content() {
                Some((cs, ce)) => reader.slice(cs, ce).to_vec(),
                None => Vec::new(),
            };
            Some(ParsedValue {
                value: PDFObject::HexStr(raw),
                start: bounds.start,
                end: bounds.end,
            })
        }
        ValueKind::Array => {
            let bounds = lexer.array_bounds_at(i, false)?;
            let mut items = Vec::new();
            if let Some((cs, ce)) = bounds.content() {
                let mut j = cs;
                while j <= ce {
                    match parse_object_at(parser, j, resolver) {
                        Some(item) if item.end <= ce => {
                            j = item.end + 1;
                            items.push(item.value);
                        }
                        _ => break,
                    }
                }
            }
            Some(ParsedValue {
                value: PDFObject::Array(items),
                start: bounds.start,
                end: bounds.end,
            })
        }
        ValueKind::Dictionary => {
            let bounds = lexer.dict_bounds_at(i, false)?;
            let dict = PDFDict::parse(parser, &bounds, resolver)?;
            if let Some(kw) = lexer.skip_empty(bounds.end + 1) {
                if lexer.keyword_at(kw, b"stream") {
                    return parse_stream_tail(parser, dict, bounds.start, kw, resolver);
                }
            }
            Some(ParsedValue {
                value: PDFObject::Dict(dict),
                start: bounds.start,
                end: bounds.end,
            })
        }
        ValueKind::Unknown => {
            if lexer.keyword_at(i, b"null") {
                Some(ParsedValue {
                    value: PDFObject::Null,
                    start: i,
                    end: i + 3,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Parses an `N G R` reference token.
pub fn parse_ref_at(parser: &ValueParser, start: usize) -> Option<ParsedValue<ObjectId>> {
    let lexer = parser.lexer();
    let id = parser.parse_number_at(start, false, true)?;
    let generation = parser.parse_number_at(id.end + 1, false, true)?;
    let r = lexer.skip_empty(generation.end + 1)?;
    if parser.reader().byte_at(r) != b'R' || !lexer.keyword_at(r, b"R") {
        return None;
    }
    Some(ParsedValue {
        value: ObjectId::new(id.value as u32, generation.value as u16),
        start: id.start,
        end: r,
    })
}

/// Parses the `N G obj … endobj` definition at `offset` and returns its
/// identifier with the contained value. Dicts and streams come back carrying
/// their own `ObjectId`.
pub fn parse_indirect_at(
    parser: &ValueParser,
    offset: usize,
    resolver: Option<&dyn ObjectResolver>,
) -> Option<(ObjectId, ParsedValue<PDFObject>)> {
    let lexer = parser.lexer();
    let id = parser.parse_number_at(offset, false, true)?;
    let generation = parser.parse_number_at(id.end + 1, false, true)?;
    let kw = lexer.skip_empty(generation.end + 1)?;
    if !lexer.keyword_at(kw, b"obj") {
        return None;
    }
    let object_id = ObjectId::new(id.value as u32, generation.value as u16);
    let mut value = parse_object_at(parser, kw + 3, resolver)?;
    match &mut value.value {
        PDFObject::Dict(d) => d.set_object_id(Some(object_id)),
        PDFObject::Stream(s) => s.dict.set_object_id(Some(object_id)),
        _ => {}
    }
    Some((object_id, value))
}

/// Continues a dictionary parse into `stream … endstream`.
fn parse_stream_tail(
    parser: &ValueParser,
    dict: PDFDict,
    start: usize,
    keyword_start: usize,
    resolver: Option<&dyn ObjectResolver>,
) -> Option<ParsedValue<PDFObject>> {
    let reader = parser.reader();

    // The keyword is followed by CRLF or LF (CR alone tolerated)
    let mut data_start = keyword_start + b"stream".len();
    match reader.get(data_start) {
        Some(0x0D) => {
            data_start += 1;
            if reader.get(data_start) == Some(0x0A) {
                data_start += 1;
            }
        }
        Some(0x0A) => data_start += 1,
        _ => {}
    }

    let declared = stream_length(&dict, resolver);
    let from_length = declared.and_then(|length| {
        let (data_end, after) = if length == 0 {
            (None, data_start)
        } else {
            let e = data_start + length - 1;
            if reader.is_outside(e) {
                return None;
            }
            (Some(e), e + 1)
        };
        let kw = parser
            .lexer()
            .skip_empty(after)
            .filter(|&kw| parser.lexer().keyword_at(kw, b"endstream"))?;
        Some((data_end, kw + b"endstream".len() - 1))
    });

    let (data_end, end) = match from_length {
        Some(found) => found,
        None => {
            // Broken or indirect /Length: fall back to the keyword itself
            let endstream = reader.find_subarray_index(
                b"endstream",
                &SearchOptions {
                    min_index: Some(data_start),
                    closed_only: true,
                    ..SearchOptions::default()
                },
            )?;
            let mut data_end = endstream.start.checked_sub(1);
            // Drop the single EOL separating payload from the keyword
            if let Some(e) = data_end {
                if reader.byte_at(e) == 0x0A {
                    data_end = e.checked_sub(1);
                }
            }
            if let Some(e) = data_end {
                if reader.byte_at(e) == 0x0D {
                    data_end = e.checked_sub(1);
                }
            }
            let data_end = match data_end {
                Some(e) if e >= data_start => Some(e),
                _ => None,
            };
            (data_end, endstream.end)
        }
    };

    let data = match data_end {
        Some(e) => reader.slice(data_start, e).to_vec(),
        None => Vec::new(),
    };

    Some(ParsedValue {
        value: PDFObject::Stream(PDFStream::new(dict, data)),
        start,
        end,
    })
}

/// Reads `/Length`, following an indirect reference through the resolver.
fn stream_length(dict: &PDFDict, resolver: Option<&dyn ObjectResolver>) -> Option<usize> {
    match dict.get("/Length") {
        Some(PDFObject::Number(n)) if *n >= 0.0 => Some(*n as usize),
        Some(PDFObject::Ref(id)) => {
            let info = resolver?.resolve(id.id)?;
            let (cs, _ce) = info.bounds.content()?;
            let parsed = info.parser.parse_number_at(cs, false, true)?;
            if parsed.value >= 0.0 {
                Some(parsed.value as usize)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::byte_reader::ByteReader;
    use crate::core::crypt::test_support::XorCrypt;
    use crate::core::lexer::Lexer;

    fn parser(data: &[u8]) -> ValueParser {
        ValueParser::new(Lexer::new(ByteReader::new(data.to_vec()).unwrap()))
    }

    fn parse_dict(data: &[u8]) -> PDFDict {
        let p = parser(data);
        let bounds = p.lexer().dict_bounds_at(0, true).unwrap();
        PDFDict::parse(&p, &bounds, None).unwrap()
    }

    #[test]
    fn test_dict_parse_typed_values() {
        let dict = parse_dict(b"<< /Length 42 /Type /Catalog >>");
        assert_eq!(dict.get_number("/Length"), Some(42.0));
        assert_eq!(dict.get_name("/Type"), Some("/Catalog"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_dict_parse_mixed_values() {
        let dict = parse_dict(
            b"<< /N -0.5 /B true /S (lit) /H <4142> /A [1 /X] /D << /Inner 1 >> /R 7 0 R /Z null >>",
        );
        assert_eq!(dict.get_number("/N"), Some(-0.5));
        assert_eq!(dict.get_bool("/B"), Some(true));
        assert_eq!(dict.get("/S"), Some(&PDFObject::StringLit(b"lit".to_vec())));
        assert_eq!(dict.get("/H"), Some(&PDFObject::HexStr(b"4142".to_vec())));
        let array = dict.get_array("/A").unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[1], PDFObject::Name("/X".to_string()));
        assert_eq!(dict.get_dict("/D").unwrap().get_number("/Inner"), Some(1.0));
        assert_eq!(dict.get_ref("/R"), Some(ObjectId::new(7, 0)));
        assert_eq!(dict.get("/Z"), Some(&PDFObject::Null));
    }

    #[test]
    fn test_dict_preserves_insertion_order() {
        let dict = parse_dict(b"<< /C 1 /A 2 /B 3 >>");
        let keys: Vec<&str> = dict.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["/C", "/A", "/B"]);
    }

    #[test]
    fn test_dict_round_trip() {
        let source = b"<< /Length 42 /Type /Catalog >>";
        let dict = parse_dict(source);
        let emitted = dict.to_bytes(None).unwrap();
        assert_eq!(emitted, b"<</Length 42/Type /Catalog>>".to_vec());

        let reparsed = parse_dict(&emitted);
        assert_eq!(reparsed, dict);
    }

    #[test]
    fn test_literal_round_trip_is_byte_exact() {
        let source = b"(abc\\(def\\)ghi)";
        let p = parser(source);
        let parsed = parse_object_at(&p, 0, None).unwrap();
        assert_eq!(parsed.value.to_bytes(None).unwrap(), source.to_vec());
        assert_eq!(
            parsed.value.decoded_bytes().unwrap(),
            b"abc(def)ghi".to_vec()
        );
    }

    #[test]
    fn test_hex_decoding() {
        let p = parser(b"<48 65 6c 6c 6f>");
        let parsed = parse_object_at(&p, 0, None).unwrap();
        assert_eq!(parsed.value.decoded_bytes().unwrap(), b"Hello".to_vec());

        let p = parser(b"<41>");
        let odd = parse_object_at(&p, 0, None).unwrap();
        assert_eq!(odd.value.decoded_bytes().unwrap(), b"A".to_vec());
    }

    #[test]
    fn test_number_canonicalization() {
        let mut out = Vec::new();
        PDFObject::Number(1.0).write_bytes(&mut out, None).unwrap();
        out.push(b' ');
        PDFObject::Number(0.5).write_bytes(&mut out, None).unwrap();
        assert_eq!(out, b"1 0.5".to_vec());
    }

    #[test]
    fn test_ref_parse_and_emit() {
        let p = parser(b"12 0 R ");
        let parsed = parse_ref_at(&p, 0).unwrap();
        assert_eq!(parsed.value, ObjectId::new(12, 0));
        assert_eq!(parsed.end, 5);

        let mut out = Vec::new();
        PDFObject::Ref(parsed.value).write_bytes(&mut out, None).unwrap();
        assert_eq!(out, b"12 0 R".to_vec());
    }

    #[test]
    fn test_edit_tracking_and_notification() {
        let notifier = ChangeNotifier::new();
        let mut dict = parse_dict(b"<< /CA 1 >>");
        dict.attach(notifier.clone(), Some(ObjectId::new(3, 0)));
        assert!(!dict.edited());
        assert_eq!(notifier.revision(), 0);

        dict.set("/CA", PDFObject::Number(0.5));
        assert!(dict.edited());
        assert_eq!(notifier.revision(), 1);
        assert_eq!(dict.parent(), Some(ObjectId::new(3, 0)));

        assert!(dict.remove("/CA"));
        assert_eq!(notifier.revision(), 2);
        assert!(!dict.remove("/Gone"));
        assert_eq!(notifier.revision(), 2);
    }

    #[test]
    fn test_parse_does_not_mark_edited() {
        let dict = parse_dict(b"<< /A 1 >>");
        assert!(!dict.edited());
    }

    #[test]
    fn test_indirect_parse_assigns_id() {
        let p = parser(b"9 0 obj << /Type /Page >> endobj");
        let (id, value) = parse_indirect_at(&p, 0, None).unwrap();
        assert_eq!(id, ObjectId::new(9, 0));
        let dict = value.value.as_dict().unwrap();
        assert_eq!(dict.object_id(), Some(id));
    }

    #[test]
    fn test_stream_parse_with_length() {
        let p = parser(b"<< /Length 5 >> stream\nhello\nendstream");
        let parsed = parse_object_at(&p, 0, None).unwrap();
        let stream = parsed.value.as_stream().unwrap();
        assert_eq!(stream.data(), b"hello");
        assert_eq!(parsed.end, 37);
    }

    #[test]
    fn test_stream_parse_without_length_falls_back() {
        let p = parser(b"<< /Type /XObject >> stream\r\ndata bytes\r\nendstream");
        let parsed = parse_object_at(&p, 0, None).unwrap();
        let stream = parsed.value.as_stream().unwrap();
        assert_eq!(stream.data(), b"data bytes");
    }

    #[test]
    fn test_stream_filter_chain() {
        let content = b"BT ET";
        let encoded = crate::core::decode::encode_flate(content).unwrap();
        let mut source = format!("<< /Length {} /Filter /FlateDecode >> stream\n", encoded.len())
            .into_bytes();
        source.extend_from_slice(&encoded);
        source.extend_from_slice(b"\nendstream");

        let p = parser(&source);
        let parsed = parse_object_at(&p, 0, None).unwrap();
        let stream = parsed.value.as_stream().unwrap();
        assert_eq!(stream.filters().len(), 1);
        assert_eq!(stream.filters()[0].name, "/FlateDecode");
        assert_eq!(stream.decoded_data(None).unwrap(), content.to_vec());
    }

    #[test]
    fn test_stream_emit_updates_length() {
        let mut dict = PDFDict::new();
        dict.insert_raw("/Length".to_string(), PDFObject::Number(0.0));
        let stream = PDFStream::new(dict, b"payload".to_vec());
        let out = PDFObject::Stream(stream).to_bytes(None).unwrap();
        assert_eq!(out, b"<</Length 7>>stream\npayload\nendstream".to_vec());
    }

    #[test]
    fn test_stream_encryption_requires_reference() {
        let stream = PDFStream::new(PDFDict::new(), b"secret".to_vec());
        let crypt = XorCrypt;
        let err = PDFObject::Stream(stream).to_bytes(Some(&crypt));
        assert!(matches!(
            err,
            Err(PDFError::SerializationFailure { .. })
        ));
    }

    #[test]
    fn test_stream_encryption_round_trip() {
        let mut dict = PDFDict::new();
        dict.set_object_id(Some(ObjectId::new(8, 0)));
        let stream = PDFStream::new(dict, b"secret".to_vec());
        let crypt = XorCrypt;
        let emitted = PDFObject::Stream(stream).to_bytes(Some(&crypt)).unwrap();
        assert!(!emitted.windows(6).any(|w| w == b"secret"));

        // Parse back and decrypt through the same hook
        let p = parser(&emitted);
        let reparsed = parse_object_at(&p, 0, None).unwrap();
        let mut stream = match reparsed.value {
            PDFObject::Stream(s) => s,
            other => panic!("expected stream, got {:?}", other),
        };
        stream.dict.set_object_id(Some(ObjectId::new(8, 0)));
        assert_eq!(stream.decoded_data(Some(&crypt)).unwrap(), b"secret".to_vec());
    }

    #[test]
    fn test_indirect_emission() {
        let dict = parse_dict(b"<< /Type /Page >>");
        let out = PDFObject::Dict(dict)
            .to_indirect_bytes(ObjectId::new(4, 0), None)
            .unwrap();
        assert_eq!(out, b"4 0 obj\n<</Type /Page>>\nendobj\n".to_vec());
    }
}
