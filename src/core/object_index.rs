use super::byte_reader::{Bounds, ByteReader, Direction, SearchOptions, is_digit_byte};
use super::error::{PDFError, PDFResult};
use super::object::{ObjectId, PDFDict};
use super::parser::ValueParser;
use log::{debug, warn};
use lru::LruCache;
use std::cell::RefCell;
use std::collections::HashSet;
use std::num::NonZeroUsize;

/// Everything a caller needs to parse a resolved indirect object: a parser
/// over the shared buffer, the object's bounds (content trimmed, and for
/// dict-bodied objects already inside the `<<`/`>>` pair), and its
/// identifier.
#[derive(Debug, Clone)]
pub struct ParseInfo {
    pub parser: ValueParser,
    pub bounds: Bounds,
    pub id: ObjectId,
}

/// Resolution contract for indirect references.
///
/// `None` means the reference dangles. Callers drop the affected entry and
/// keep going; a document with stale references is still openable.
pub trait ObjectResolver {
    fn resolve(&self, id: u32) -> Option<ParseInfo>;
}

/// Location of one indirect object definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub offset: usize,
    pub generation: u16,
}

/// Map from object number to the byte offset of its definition.
///
/// Built from the traditional cross-reference tables reachable through
/// `startxref` and the `/Prev` chain; when no usable table exists the index
/// is rebuilt by scanning for `N G obj` headers. Resolved bounds are kept in
/// a bounded LRU cache so repeated lookups skip the keyword scans.
pub struct ObjectIndex {
    parser: ValueParser,
    entries: rustc_hash::FxHashMap<u32, IndexEntry>,
    trailer: Option<PDFDict>,
    cache: RefCell<LruCache<u32, Bounds, std::hash::BuildHasherDefault<rustc_hash::FxHasher>>>,
}

/// Bounded cache capacity: object bounds are small, lookups are hot
const CACHE_CAPACITY: usize = 256;

impl ObjectIndex {
    /// Builds the index for a whole document buffer.
    pub fn parse(reader: ByteReader) -> PDFResult<Self> {
        let parser = ValueParser::from_reader(reader);
        let cache = match NonZeroUsize::new(CACHE_CAPACITY) {
            Some(capacity) => LruCache::with_hasher(
                capacity,
                std::hash::BuildHasherDefault::<rustc_hash::FxHasher>::default(),
            ),
            None => return Err(PDFError::invalid_input("zero cache capacity")),
        };
        let mut index = ObjectIndex {
            parser,
            entries: rustc_hash::FxHashMap::default(),
            trailer: None,
            cache: RefCell::new(cache),
        };

        if let Some(start) = index.find_startxref() {
            index.read_table_chain(start);
        }
        if index.entries.is_empty() {
            debug!("no usable xref table, rebuilding index by scan");
            index.rebuild_by_scan();
        }
        if index.entries.is_empty() {
            return Err(PDFError::invalid_input("no indirect objects found"));
        }
        Ok(index)
    }

    /// The trailer dictionary of the newest cross-reference section.
    pub fn trailer(&self) -> Option<&PDFDict> {
        self.trailer.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Byte offset of an object's definition, if indexed.
    pub fn offset_of(&self, id: u32) -> Option<usize> {
        self.entries.get(&id).map(|e| e.offset)
    }

    /// Indexed object numbers in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn parser(&self) -> &ValueParser {
        &self.parser
    }

    /// Locates `startxref` near the buffer tail and reads the offset after it.
    fn find_startxref(&self) -> Option<usize> {
        let reader = self.parser.reader();
        let found = reader.find_subarray_index(
            b"startxref",
            &SearchOptions {
                direction: Direction::Backward,
                closed_only: true,
                ..SearchOptions::default()
            },
        )?;
        let offset = self.parser.parse_number_at(found.end + 1, false, true)?;
        Some(offset.value as usize)
    }

    /// Processes the table at `start` and every `/Prev` section behind it.
    /// The first-seen entry for an object number wins: the newest section is
    /// processed first, exactly the incremental-update rule.
    fn read_table_chain(&mut self, start: usize) {
        let mut queue = vec![start];
        let mut seen = HashSet::new();

        while let Some(pos) = queue.pop() {
            if !seen.insert(pos) {
                continue;
            }
            let Some(bounds) = self.parser.lexer().xref_table_bounds_at(pos) else {
                warn!("no xref table at offset {}", pos);
                continue;
            };
            if let Some((cs, ce)) = bounds.content() {
                self.read_table_entries(cs, ce);
            }

            let Some(dict_start) = self.parser.lexer().skip_empty(bounds.end + 1) else {
                continue;
            };
            let Some(dict_bounds) = self.parser.lexer().dict_bounds_at(dict_start, false) else {
                warn!("xref table at {} has no trailer dictionary", pos);
                continue;
            };
            let Some(trailer) = PDFDict::parse(&self.parser, &dict_bounds, None) else {
                continue;
            };
            if let Some(prev) = trailer.get_number("/Prev") {
                queue.push(prev as usize);
            }
            if self.trailer.is_none() {
                self.trailer = Some(trailer);
            }
        }
    }

    /// Reads `first count` subsection headers and their 20-byte entries.
    fn read_table_entries(&mut self, content_start: usize, content_end: usize) {
        let mut i = content_start;
        loop {
            let Some(first) = self.bounded_number(i, content_end) else {
                break;
            };
            let Some(count) = self.bounded_number(first.1 + 1, content_end) else {
                break;
            };
            i = count.1 + 1;

            let mut object_number = first.0 as u32;
            for _ in 0..count.0 as usize {
                let Some(offset) = self.bounded_number(i, content_end) else {
                    return;
                };
                let Some(generation) = self.bounded_number(offset.1 + 1, content_end) else {
                    return;
                };
                let Some(kind) = self.parser.parse_token_at(generation.1 + 1, true) else {
                    return;
                };
                if kind.end > content_end {
                    return;
                }
                if kind.value == b"n" {
                    self.entries
                        .entry(object_number)
                        .or_insert(IndexEntry {
                            offset: offset.0 as usize,
                            generation: generation.0 as u16,
                        });
                }
                object_number += 1;
                i = kind.end + 1;
            }
        }
    }

    fn bounded_number(&self, i: usize, max: usize) -> Option<(f64, usize)> {
        let parsed = self.parser.parse_number_at(i, false, true)?;
        if parsed.start > max || parsed.end > max {
            return None;
        }
        Some((parsed.value, parsed.end))
    }

    /// Damage recovery: walk the buffer for closed `obj` keywords and read
    /// the two numbers in front of each. Later definitions overwrite earlier
    /// ones, matching how appended updates shadow old objects.
    fn rebuild_by_scan(&mut self) {
        let reader = self.parser.reader().clone();
        let mut from = 0;
        loop {
            let Some(found) = reader.find_subarray_index(
                b"obj",
                &SearchOptions {
                    min_index: Some(from),
                    closed_only: true,
                    ..SearchOptions::default()
                },
            ) else {
                break;
            };
            from = found.end + 1;
            let Some(start) = found.start.checked_sub(1) else {
                continue;
            };
            let Some((generation, generation_start)) = number_ending_before(&reader, start)
            else {
                continue;
            };
            let Some(gen_lead) = generation_start.checked_sub(1) else {
                continue;
            };
            let Some((id, id_start)) = number_ending_before(&reader, gen_lead) else {
                continue;
            };
            self.entries.insert(
                id as u32,
                IndexEntry {
                    offset: id_start,
                    generation: generation as u16,
                },
            );
        }

        // The last trailer in the file pairs with the newest objects
        if self.trailer.is_none() {
            if let Some(found) = reader.find_subarray_index(
                b"trailer",
                &SearchOptions {
                    direction: Direction::Backward,
                    closed_only: true,
                    ..SearchOptions::default()
                },
            ) {
                if let Some(dict_start) = self.parser.lexer().skip_empty(found.end + 1) {
                    if let Some(bounds) = self.parser.lexer().dict_bounds_at(dict_start, false) {
                        self.trailer = PDFDict::parse(&self.parser, &bounds, None);
                    }
                }
            }
        }
    }
}

/// The run of digits ending at or before `pos` (whitespace between the run
/// and `pos` is allowed). Returns the value and the run's start index.
fn number_ending_before(reader: &ByteReader, pos: usize) -> Option<(u64, usize)> {
    let end = reader.find_non_space_index(Direction::Backward, pos)?;
    if !is_digit_byte(reader.byte_at(end)) {
        return None;
    }
    let mut start = end;
    while start > 0 && is_digit_byte(reader.byte_at(start - 1)) {
        start -= 1;
    }
    let text = String::from_utf8_lossy(reader.slice(start, end)).into_owned();
    let value = text.parse::<u64>().ok()?;
    Some((value, start))
}

impl ObjectResolver for ObjectIndex {
    fn resolve(&self, id: u32) -> Option<ParseInfo> {
        let entry = self.entries.get(&id)?;
        if let Some(bounds) = self.cache.borrow_mut().get(&id) {
            return Some(ParseInfo {
                parser: self.parser.clone(),
                bounds: *bounds,
                id: ObjectId::new(id, entry.generation),
            });
        }
        let Some(bounds) = self
            .parser
            .lexer()
            .indirect_object_bounds_at(entry.offset, true)
        else {
            warn!("object {} has no definition at offset {}", id, entry.offset);
            return None;
        };
        self.cache.borrow_mut().put(id, bounds);
        Some(ParseInfo {
            parser: self.parser.clone(),
            bounds,
            id: ObjectId::new(id, entry.generation),
        })
    }
}
