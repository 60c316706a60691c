use super::byte_reader::{Bounds, SearchOptions};
use super::crypt::CryptInfo;
use super::error::{PDFError, PDFResult};
use super::object::{ChangeNotifier, ObjectId, PDFDict, PDFObject, PDFStream, parse_object_at};
use super::object_index::{ObjectResolver, ParseInfo};
use super::parser::ValueParser;
use indexmap::IndexMap;
use log::warn;

/// Category prefixes for resolved resource keys.
///
/// A raw name like `/F1` may name both a font and a pattern, so resolved
/// maps key by `prefix + name`; the prefix is stripped again on emission.
/// Iterators expose the prefixed form, which is part of the contract.
pub const GS_PREFIX: &str = "/ExtGState";
pub const FONT_PREFIX: &str = "/Font";
pub const XOBJECT_PREFIX: &str = "/XObject";

fn prefixed(prefix: &str, name: &str) -> String {
    match name.strip_prefix('/') {
        Some(body) => format!("{}{}", prefix, body),
        None => format!("{}{}", prefix, name),
    }
}

/// An untyped resource sub-map: PDF names mapped to indirect references or
/// inline values. Ordering follows the source bytes and is not guaranteed
/// across producers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMapDict {
    dict: PDFDict,
}

impl ObjectMapDict {
    pub fn new() -> Self {
        ObjectMapDict::default()
    }

    pub fn from_dict(dict: PDFDict) -> Self {
        ObjectMapDict { dict }
    }

    /// Builds a sub-map from a dict value, chasing one level of indirection
    /// when the sub-map itself is a reference.
    pub fn from_object(value: &PDFObject, resolver: Option<&dyn ObjectResolver>) -> Option<Self> {
        match value {
            PDFObject::Dict(d) => Some(ObjectMapDict::from_dict(d.clone())),
            PDFObject::Ref(id) => {
                let Some(info) = resolver.and_then(|r| r.resolve(id.id)) else {
                    warn!("dropping resource sub-map with dangling reference {}", id);
                    return None;
                };
                let (cs, ce) = info.bounds.content()?;
                let dict = PDFDict::parse_content(&info.parser, cs, ce, resolver)?;
                Some(ObjectMapDict::from_dict(dict))
            }
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PDFObject> {
        self.dict.get(name)
    }

    pub fn insert(&mut self, name: &str, value: PDFObject) {
        self.dict.set(name, value);
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &PDFObject)> {
        self.dict.iter()
    }

    /// The `(name, id)` pairs backed by indirect references.
    pub fn object_ids(&self) -> impl Iterator<Item = (&str, ObjectId)> {
        self.dict
            .iter()
            .filter_map(|(name, value)| value.as_ref_id().map(|id| (name, id)))
    }

    /// The inline dictionary entries.
    pub fn dict_entries(&self) -> impl Iterator<Item = (&str, &PDFDict)> {
        self.dict
            .iter()
            .filter_map(|(name, value)| value.as_dict().map(|d| (name, d)))
    }

    pub fn write_bytes(&self, out: &mut Vec<u8>, crypt: Option<&dyn CryptInfo>) -> PDFResult<()> {
        self.dict.write_bytes(out, crypt)
    }
}

/// A parsed `/ExtGState` dictionary.
///
/// Declaration order here is emission order. Keys the type does not model
/// are kept as raw bytes and re-emitted verbatim.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStateDict {
    id: Option<ObjectId>,
    pub line_width: Option<f64>,
    pub line_cap: Option<i64>,
    pub line_join: Option<i64>,
    pub miter_limit: Option<f64>,
    pub dash: Option<(Vec<f64>, f64)>,
    pub blend_mode: Option<String>,
    pub font: Option<(ObjectId, f64)>,
    pub stroke_alpha: Option<f64>,
    pub fill_alpha: Option<f64>,
    pub alpha_is_shape: Option<bool>,
    pub text_knockout: Option<bool>,
    extra: IndexMap<String, Vec<u8>>,
    edited: bool,
    notifier: Option<ChangeNotifier>,
}

impl PartialEq for GraphicsStateDict {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.line_width == other.line_width
            && self.line_cap == other.line_cap
            && self.line_join == other.line_join
            && self.miter_limit == other.miter_limit
            && self.dash == other.dash
            && self.blend_mode == other.blend_mode
            && self.font == other.font
            && self.stroke_alpha == other.stroke_alpha
            && self.fill_alpha == other.fill_alpha
            && self.alpha_is_shape == other.alpha_is_shape
            && self.text_knockout == other.text_knockout
            && self.extra == other.extra
    }
}

impl GraphicsStateDict {
    /// Populates the typed fields from a generically parsed dict.
    /// `None` when the dict declares a different `/Type`.
    pub fn from_dict(dict: &PDFDict) -> Option<Self> {
        if let Some(ty) = dict.get_name("/Type") {
            if ty != "/ExtGState" {
                warn!("not a graphics state dict: /Type {}", ty);
                return None;
            }
        }
        let mut gs = GraphicsStateDict {
            id: dict.object_id(),
            ..GraphicsStateDict::default()
        };
        for (key, value) in dict.iter() {
            match key {
                "/Type" => {}
                "/LW" => gs.line_width = value.as_number(),
                "/LC" => gs.line_cap = value.as_number().map(|n| n as i64),
                "/LJ" => gs.line_join = value.as_number().map(|n| n as i64),
                "/ML" => gs.miter_limit = value.as_number(),
                "/D" => gs.dash = dash_from(value),
                "/BM" => gs.blend_mode = value.as_name().map(str::to_string),
                "/Font" => gs.font = font_entry_from(value),
                "/CA" => gs.stroke_alpha = value.as_number(),
                "/ca" => gs.fill_alpha = value.as_number(),
                "/AIS" => gs.alpha_is_shape = value.as_bool(),
                "/TK" => gs.text_knockout = value.as_bool(),
                _ => match value.to_bytes(None) {
                    Ok(raw) => {
                        gs.extra.insert(key.to_string(), raw);
                    }
                    Err(_) => warn!("dropping unserializable graphics state key {}", key),
                },
            }
        }
        Some(gs)
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn set_object_id(&mut self, id: Option<ObjectId>) {
        self.id = id;
    }

    pub fn attach(&mut self, notifier: ChangeNotifier) {
        self.notifier = Some(notifier);
    }

    pub fn edited(&self) -> bool {
        self.edited
    }

    fn mark_edited(&mut self) {
        self.edited = true;
        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = Some(width);
        self.mark_edited();
    }

    pub fn set_blend_mode(&mut self, mode: &str) {
        self.blend_mode = Some(format!("/{}", mode.trim_start_matches('/')));
        self.mark_edited();
    }

    pub fn set_stroke_alpha(&mut self, alpha: f64) {
        self.stroke_alpha = Some(alpha);
        self.mark_edited();
    }

    pub fn set_fill_alpha(&mut self, alpha: f64) {
        self.fill_alpha = Some(alpha);
        self.mark_edited();
    }

    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<</Type /ExtGState");
        if let Some(v) = self.line_width {
            push_number_prop(out, "/LW", v);
        }
        if let Some(v) = self.line_cap {
            out.extend_from_slice(format!("/LC {}", v).as_bytes());
        }
        if let Some(v) = self.line_join {
            out.extend_from_slice(format!("/LJ {}", v).as_bytes());
        }
        if let Some(v) = self.miter_limit {
            push_number_prop(out, "/ML", v);
        }
        if let Some((dashes, phase)) = &self.dash {
            out.extend_from_slice(b"/D [[");
            for (k, d) in dashes.iter().enumerate() {
                if k > 0 {
                    out.push(b' ');
                }
                push_number(out, *d);
            }
            out.extend_from_slice(b"] ");
            push_number(out, *phase);
            out.push(b']');
        }
        if let Some(v) = &self.blend_mode {
            out.extend_from_slice(format!("/BM {}", v).as_bytes());
        }
        if let Some((id, size)) = &self.font {
            out.extend_from_slice(format!("/Font [{} ", id).as_bytes());
            push_number(out, *size);
            out.push(b']');
        }
        if let Some(v) = self.stroke_alpha {
            push_number_prop(out, "/CA", v);
        }
        if let Some(v) = self.fill_alpha {
            push_number_prop(out, "/ca", v);
        }
        if let Some(v) = self.alpha_is_shape {
            out.extend_from_slice(format!("/AIS {}", v).as_bytes());
        }
        if let Some(v) = self.text_knockout {
            out.extend_from_slice(format!("/TK {}", v).as_bytes());
        }
        for (key, raw) in &self.extra {
            out.extend_from_slice(key.as_bytes());
            out.push(b' ');
            out.extend_from_slice(raw);
        }
        out.extend_from_slice(b">>");
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_bytes(&mut out);
        out
    }
}

fn dash_from(value: &PDFObject) -> Option<(Vec<f64>, f64)> {
    let items = value.as_array()?;
    let dashes = items
        .first()?
        .as_array()?
        .iter()
        .map(|d| d.as_number())
        .collect::<Option<Vec<f64>>>()?;
    let phase = items.get(1)?.as_number()?;
    Some((dashes, phase))
}

fn font_entry_from(value: &PDFObject) -> Option<(ObjectId, f64)> {
    let items = value.as_array()?;
    let id = items.first()?.as_ref_id()?;
    let size = items.get(1)?.as_number()?;
    Some((id, size))
}

fn push_number(out: &mut Vec<u8>, n: f64) {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        out.extend_from_slice(format!("{}", n as i64).as_bytes());
    } else {
        out.extend_from_slice(format!("{}", n).as_bytes());
    }
}

fn push_number_prop(out: &mut Vec<u8>, key: &str, n: f64) {
    out.extend_from_slice(key.as_bytes());
    out.push(b' ');
    push_number(out, n);
}

/// A parsed font dictionary. Only the identity keys the annotation layers
/// need are typed; everything else rides in the raw bag.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDict {
    id: Option<ObjectId>,
    pub subtype: String,
    pub base_font: Option<String>,
    pub encoding: Option<String>,
    extra: IndexMap<String, Vec<u8>>,
}

impl FontDict {
    pub fn from_dict(dict: &PDFDict) -> Option<Self> {
        if let Some(ty) = dict.get_name("/Type") {
            if ty != "/Font" {
                warn!("not a font dict: /Type {}", ty);
                return None;
            }
        }
        let Some(subtype) = dict.get_name("/Subtype") else {
            warn!("font dict without /Subtype");
            return None;
        };
        let mut font = FontDict {
            id: dict.object_id(),
            subtype: subtype.to_string(),
            base_font: dict.get_name("/BaseFont").map(str::to_string),
            encoding: dict.get_name("/Encoding").map(str::to_string),
            extra: IndexMap::new(),
        };
        for (key, value) in dict.iter() {
            match key {
                "/Type" | "/Subtype" | "/BaseFont" | "/Encoding" => {}
                _ => {
                    if let Ok(raw) = value.to_bytes(None) {
                        font.extra.insert(key.to_string(), raw);
                    }
                }
            }
        }
        Some(font)
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<</Type /Font");
        out.extend_from_slice(format!("/Subtype {}", self.subtype).as_bytes());
        if let Some(v) = &self.base_font {
            out.extend_from_slice(format!("/BaseFont {}", v).as_bytes());
        }
        if let Some(v) = &self.encoding {
            out.extend_from_slice(format!("/Encoding {}", v).as_bytes());
        }
        for (key, raw) in &self.extra {
            out.extend_from_slice(key.as_bytes());
            out.push(b' ');
            out.extend_from_slice(raw);
        }
        out.extend_from_slice(b">>");
    }
}

/// A form XObject: a reusable nested content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct XFormStream {
    pub stream: PDFStream,
    pub bbox: [f64; 4],
    pub matrix: Option<[f64; 6]>,
}

impl XFormStream {
    pub fn from_info(info: &ParseInfo, resolver: &dyn ObjectResolver) -> Option<Self> {
        let stream = parse_stream_child(info, resolver)?;
        let Some(bbox) = number_array(&stream.dict, "/BBox") else {
            warn!("form XObject {} without /BBox", info.id);
            return None;
        };
        let matrix = number_array(&stream.dict, "/Matrix");
        Some(XFormStream {
            stream,
            bbox,
            matrix,
        })
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.stream.object_id()
    }
}

/// An image XObject. Pixel decoding belongs to the host renderer; the core
/// only models the identity keys and carries the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStream {
    pub stream: PDFStream,
    pub width: f64,
    pub height: f64,
    pub bits_per_component: Option<i64>,
    pub color_space: Option<String>,
}

impl ImageStream {
    pub fn from_info(info: &ParseInfo, resolver: &dyn ObjectResolver) -> Option<Self> {
        let stream = parse_stream_child(info, resolver)?;
        let (Some(width), Some(height)) = (
            stream.dict.get_number("/Width"),
            stream.dict.get_number("/Height"),
        ) else {
            warn!("image XObject {} without /Width and /Height", info.id);
            return None;
        };
        let bits_per_component = stream
            .dict
            .get_number("/BitsPerComponent")
            .map(|n| n as i64);
        let color_space = stream.dict.get_name("/ColorSpace").map(str::to_string);
        Some(ImageStream {
            stream,
            width,
            height,
            bits_per_component,
            color_space,
        })
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.stream.object_id()
    }
}

fn parse_stream_child(info: &ParseInfo, resolver: &dyn ObjectResolver) -> Option<PDFStream> {
    let (cs, _ce) = info.bounds.content()?;
    let parsed = parse_object_at(&info.parser, cs, Some(resolver))?;
    match parsed.value {
        PDFObject::Stream(mut stream) => {
            stream.dict.set_object_id(Some(info.id));
            Some(stream)
        }
        _ => {
            warn!("XObject {} is not a stream", info.id);
            None
        }
    }
}

fn number_array<const N: usize>(dict: &PDFDict, key: &str) -> Option<[f64; N]> {
    let items = dict.get_array(key)?;
    if items.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (k, item) in items.iter().enumerate() {
        out[k] = item.as_number()?;
    }
    Some(out)
}

/// A resolved XObject child: form or image.
#[derive(Debug, Clone, PartialEq)]
pub enum XObjectStream {
    Form(XFormStream),
    Image(ImageStream),
}

impl XObjectStream {
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            XObjectStream::Form(f) => f.object_id(),
            XObjectStream::Image(i) => i.object_id(),
        }
    }

    pub fn stream(&self) -> &PDFStream {
        match self {
            XObjectStream::Form(f) => &f.stream,
            XObjectStream::Image(i) => &i.stream,
        }
    }
}

/// A page resource dictionary.
///
/// Owns both the raw sub-maps exactly as parsed and, once a resolver has
/// run, the typed children under prefix-qualified keys. Dangling references
/// are dropped entry-by-entry; the rest of the map survives.
#[derive(Debug, Clone, Default)]
pub struct ResourceDict {
    id: Option<ObjectId>,
    pub ext_g_state: Option<ObjectMapDict>,
    pub color_space: Option<ObjectMapDict>,
    pub pattern: Option<ObjectMapDict>,
    pub shading: Option<ObjectMapDict>,
    pub xobject: Option<ObjectMapDict>,
    pub font: Option<ObjectMapDict>,
    pub properties: Option<ObjectMapDict>,
    pub proc_set: Option<Vec<String>>,
    gs_map: IndexMap<String, GraphicsStateDict>,
    font_map: IndexMap<String, FontDict>,
    xobject_map: IndexMap<String, XObjectStream>,
    extra: IndexMap<String, Vec<u8>>,
    edited: bool,
    notifier: Option<ChangeNotifier>,
}

impl ResourceDict {
    /// Parses the resource dict inside `bounds`; with a resolver present the
    /// typed maps are populated immediately.
    pub fn parse(
        parser: &ValueParser,
        bounds: &Bounds,
        resolver: Option<&dyn ObjectResolver>,
    ) -> Option<ResourceDict> {
        let dict = PDFDict::parse(parser, bounds, resolver)?;
        let mut resources = ResourceDict::from_dict(&dict, resolver)?;
        if let Some(resolver) = resolver {
            resources.fill_maps(resolver);
        }
        Some(resources)
    }

    pub fn from_dict(dict: &PDFDict, resolver: Option<&dyn ObjectResolver>) -> Option<ResourceDict> {
        let mut resources = ResourceDict {
            id: dict.object_id(),
            ..ResourceDict::default()
        };
        for (key, value) in dict.iter() {
            match key {
                "/ExtGState" => resources.ext_g_state = ObjectMapDict::from_object(value, resolver),
                "/ColorSpace" => resources.color_space = ObjectMapDict::from_object(value, resolver),
                "/Pattern" => resources.pattern = ObjectMapDict::from_object(value, resolver),
                "/Shading" => resources.shading = ObjectMapDict::from_object(value, resolver),
                "/XObject" => resources.xobject = ObjectMapDict::from_object(value, resolver),
                "/Font" => resources.font = ObjectMapDict::from_object(value, resolver),
                "/Properties" => resources.properties = ObjectMapDict::from_object(value, resolver),
                "/ProcSet" => {
                    resources.proc_set = value.as_array().map(|items| {
                        items
                            .iter()
                            .filter_map(|v| v.as_name().map(str::to_string))
                            .collect()
                    });
                }
                _ => {
                    if let Ok(raw) = value.to_bytes(None) {
                        resources.extra.insert(key.to_string(), raw);
                    }
                }
            }
        }
        Some(resources)
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn set_object_id(&mut self, id: Option<ObjectId>) {
        self.id = id;
    }

    pub fn attach(&mut self, notifier: ChangeNotifier) {
        self.notifier = Some(notifier);
    }

    pub fn edited(&self) -> bool {
        self.edited
    }

    fn mark_edited(&mut self) {
        self.edited = true;
        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
    }

    /// Rebuilds the resolved maps from the raw sub-maps.
    ///
    /// `ExtGState` consumes both references and inline dicts; `XObject` and
    /// `Font` consume references only. Each dangling or malformed entry is
    /// dropped on its own.
    pub fn fill_maps(&mut self, resolver: &dyn ObjectResolver) {
        self.gs_map.clear();
        self.font_map.clear();
        self.xobject_map.clear();

        if let Some(map) = &self.ext_g_state {
            for (name, id) in map.object_ids() {
                let Some(info) = resolver.resolve(id.id) else {
                    warn!("dropping graphics state {} -> dangling {}", name, id);
                    continue;
                };
                let Some(gs) = parse_dict_child(&info).and_then(|d| GraphicsStateDict::from_dict(&d))
                else {
                    continue;
                };
                self.gs_map.insert(prefixed(GS_PREFIX, name), gs);
            }
            for (name, inline) in map.dict_entries() {
                if let Some(gs) = GraphicsStateDict::from_dict(inline) {
                    self.gs_map.insert(prefixed(GS_PREFIX, name), gs);
                }
            }
        }

        if let Some(map) = &self.xobject {
            for (name, id) in map.object_ids() {
                let Some(info) = resolver.resolve(id.id) else {
                    warn!("dropping XObject {} -> dangling {}", name, id);
                    continue;
                };
                let child = if is_form_xobject(&info) {
                    XFormStream::from_info(&info, resolver).map(XObjectStream::Form)
                } else {
                    ImageStream::from_info(&info, resolver).map(XObjectStream::Image)
                };
                if let Some(child) = child {
                    self.xobject_map.insert(prefixed(XOBJECT_PREFIX, name), child);
                }
            }
        }

        if let Some(map) = &self.font {
            for (name, id) in map.object_ids() {
                let Some(info) = resolver.resolve(id.id) else {
                    warn!("dropping font {} -> dangling {}", name, id);
                    continue;
                };
                if let Some(font) = parse_dict_child(&info).and_then(|d| FontDict::from_dict(&d)) {
                    self.font_map.insert(prefixed(FONT_PREFIX, name), font);
                }
            }
        }
    }

    /// Resolved graphics state for a raw resource name like `/GS1`.
    pub fn get_graphics_state(&self, name: &str) -> Option<&GraphicsStateDict> {
        self.gs_map.get(&prefixed(GS_PREFIX, name))
    }

    pub fn get_font(&self, name: &str) -> Option<&FontDict> {
        self.font_map.get(&prefixed(FONT_PREFIX, name))
    }

    pub fn get_xobject(&self, name: &str) -> Option<&XObjectStream> {
        self.xobject_map.get(&prefixed(XOBJECT_PREFIX, name))
    }

    /// Resolved entries under their prefixed keys, in insertion order.
    pub fn graphics_states(&self) -> impl Iterator<Item = (&str, &GraphicsStateDict)> {
        self.gs_map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn fonts(&self) -> impl Iterator<Item = (&str, &FontDict)> {
        self.font_map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn xobjects(&self) -> impl Iterator<Item = (&str, &XObjectStream)> {
        self.xobject_map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Inserts a resolved graphics state under the prefixed key.
    pub fn set_graphics_state(&mut self, name: &str, gs: GraphicsStateDict) {
        self.gs_map.insert(prefixed(GS_PREFIX, name), gs);
        self.mark_edited();
    }

    pub fn set_xobject(&mut self, name: &str, xobject: XObjectStream) {
        self.xobject_map.insert(prefixed(XOBJECT_PREFIX, name), xobject);
        self.mark_edited();
    }

    /// Serializes the dict in strict category order: ExtGState, XObject,
    /// ColorSpace, Pattern, Shading, Font, Properties, ProcSet.
    ///
    /// ExtGState and XObject come from the resolved maps with the category
    /// prefix stripped back off; an XObject entry without a reference is a
    /// serialization failure (forms and images are always indirect). When no
    /// resolver ever ran, the raw maps are emitted so nothing is lost.
    pub fn write_bytes(&self, out: &mut Vec<u8>, crypt: Option<&dyn CryptInfo>) -> PDFResult<()> {
        out.extend_from_slice(b"<<");

        if !self.gs_map.is_empty() {
            out.extend_from_slice(b"/ExtGState<<");
            for (key, gs) in &self.gs_map {
                push_stripped_name(out, key, GS_PREFIX);
                out.push(b' ');
                match gs.object_id() {
                    Some(id) => id.write_ref(out),
                    None => gs.write_bytes(out),
                }
            }
            out.extend_from_slice(b">>");
        } else if let Some(map) = &self.ext_g_state {
            if !map.is_empty() {
                out.extend_from_slice(b"/ExtGState ");
                map.write_bytes(out, crypt)?;
            }
        }

        if !self.xobject_map.is_empty() {
            out.extend_from_slice(b"/XObject<<");
            for (key, xobject) in &self.xobject_map {
                let Some(id) = xobject.object_id() else {
                    return Err(PDFError::serialization_failure(format!(
                        "XObject {} has no reference",
                        key
                    )));
                };
                push_stripped_name(out, key, XOBJECT_PREFIX);
                out.push(b' ');
                id.write_ref(out);
            }
            out.extend_from_slice(b">>");
        } else if let Some(map) = &self.xobject {
            if !map.is_empty() {
                out.extend_from_slice(b"/XObject ");
                map.write_bytes(out, crypt)?;
            }
        }

        for (key, map) in [
            ("/ColorSpace", &self.color_space),
            ("/Pattern", &self.pattern),
            ("/Shading", &self.shading),
            ("/Font", &self.font),
            ("/Properties", &self.properties),
        ] {
            if let Some(map) = map {
                out.extend_from_slice(key.as_bytes());
                out.push(b' ');
                map.write_bytes(out, crypt)?;
            }
        }

        if let Some(names) = &self.proc_set {
            out.extend_from_slice(b"/ProcSet [");
            for (k, name) in names.iter().enumerate() {
                if k > 0 {
                    out.push(b' ');
                }
                out.extend_from_slice(name.as_bytes());
            }
            out.push(b']');
        }

        for (key, raw) in &self.extra {
            out.extend_from_slice(key.as_bytes());
            out.push(b' ');
            out.extend_from_slice(raw);
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

fn parse_dict_child(info: &ParseInfo) -> Option<PDFDict> {
    let (cs, ce) = info.bounds.content()?;
    let mut dict = PDFDict::parse_content(&info.parser, cs, ce, None)?;
    dict.set_object_id(Some(info.id));
    Some(dict)
}

/// Form vs image: a closed `/Form` token anywhere in the child's bytes.
fn is_form_xobject(info: &ParseInfo) -> bool {
    info.parser
        .reader()
        .find_subarray_index(
            b"/Form",
            &SearchOptions {
                min_index: Some(info.bounds.start),
                max_index: Some(info.bounds.end),
                closed_only: true,
                ..SearchOptions::default()
            },
        )
        .is_some()
}

fn push_stripped_name(out: &mut Vec<u8>, key: &str, prefix: &str) {
    let body = key.strip_prefix(prefix).unwrap_or(key);
    out.push(b'/');
    out.extend_from_slice(body.as_bytes());
}
