//! Font loading and glyph outline access.
//!
//! [`FontStore`] loads every font a content stream selects exactly once and
//! hands out a [`FontId`] for it. It implements [`GlyphSource`], which is
//! all the core needs to measure glyphs:
//!
//! - TrueType programs (`/FontFile2`, OpenType `/FontFile3`) are read with
//!   `ttf-parser`; simple TrueType fonts map codes to glyphs through the
//!   encoding or the font's own `cmap`, composite fonts through
//!   `/CIDToGIDMap`.
//! - Bare CFF programs (`/FontFile3` `Type1C`/`CIDFontType0C`) are read with
//!   `ttf_parser::cff`. Type1C glyphs are looked up by glyph name, falling
//!   back to the program's built-in encoding; CID-keyed programs map CIDs
//!   through their charset.
//! - Type3 glyphs are measured by the `d1` box of their glyph procedure.
//!
//! Programs are parsed once, when the font loads, into a `GlyphTable`;
//! glyph lookups afterwards never touch the font data again.
//!
//! Non-embedded fonts and Type1 programs (`/FontFile`) have no outline
//! access and are reported as [`FontKind::Unsupported`].

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tagbox_core::{AnalysisWarning, FontId, FontKind, GlyphSource, Matrix, Rect, WarningCode};
use ttf_parser::{Face, GlyphId, OutlineBuilder, cff, cmap::Subtable};

use crate::cmap::ToUnicodeCMap;
use crate::encoding::{BaseEncoding, DifferencesEntry, SimpleEncoding, glyph_name_to_unicode};
use crate::font_metrics::FontMetrics;
use crate::objects::{dict_entry, entry, matrix_entry, name_entry, rect_entry, stream_bytes};
use crate::tokenizer::tokenize;

/// `/Flags` bit marking a font whose glyphs are outside the standard Latin set.
const SYMBOLIC_FLAG: i64 = 1 << 2;

/// Windows symbol `cmap` subtables place codes in one of these pages.
const SYMBOL_PAGES: [u32; 4] = [0x0000, 0xF000, 0xF100, 0xF200];

/// An embedded font program.
#[derive(Debug, Clone)]
enum FontProgram {
    /// TrueType or OpenType (`sfnt`) data.
    Sfnt(Vec<u8>),
    /// Bare Compact Font Format data.
    Cff(Vec<u8>),
}

/// How a font addresses the glyphs of its program.
#[derive(Clone, Copy)]
enum Addressing<'e> {
    /// Single-byte codes; symbolic fonts skip the encoding and go straight
    /// to the program's `cmap`.
    Simple {
        encoding: &'e SimpleEncoding,
        symbolic: bool,
    },
    /// Two-byte CIDs of a composite font.
    Cid,
}

/// Glyph data read out of an embedded program when the font loads.
#[derive(Debug, Clone, Default)]
struct GlyphTable {
    /// Units per em: the `head` value, or the inverse of the CFF `FontMatrix`.
    units_per_em: Option<u16>,
    /// Outline bounds by glyph id.
    bounds: Vec<Option<ttf_parser::Rect>>,
    /// Glyph of each single-byte code of a simple TrueType font.
    by_code: Vec<Option<GlyphId>>,
    by_name: HashMap<String, GlyphId>,
    /// Glyph names the program's built-in encoding assigns to codes.
    builtin_names: Vec<Option<String>>,
    /// CID to glyph for CID-keyed CFF programs.
    cid_glyphs: Option<HashMap<u32, GlyphId>>,
}

impl GlyphTable {
    fn read(program: &FontProgram, addressing: Addressing<'_>) -> Option<Self> {
        match program {
            FontProgram::Sfnt(data) => Face::parse(data, 0)
                .ok()
                .map(|face| Self::from_face(&face, addressing)),
            FontProgram::Cff(data) => cff::Table::parse(data).map(|table| Self::from_cff(&table)),
        }
    }

    fn from_face(face: &Face<'_>, addressing: Addressing<'_>) -> Self {
        let mut glyphs = Self {
            units_per_em: Some(face.units_per_em()),
            bounds: (0..face.number_of_glyphs())
                .map(|gid| face.glyph_bounding_box(GlyphId(gid)))
                .collect(),
            ..Self::default()
        };
        if let Addressing::Simple { encoding, symbolic } = addressing {
            glyphs.by_code = (0..=u8::MAX)
                .map(|code| truetype_glyph(face, encoding, symbolic, code))
                .collect();
            for name in (0..=u8::MAX).filter_map(|code| encoding.glyph_name(code)) {
                let gid = face.glyph_index_by_name(name).or_else(|| {
                    glyph_name_to_unicode(name).and_then(|ch| face.glyph_index(ch))
                });
                if let Some(gid) = gid {
                    glyphs.by_name.insert(name.to_string(), gid);
                }
            }
        }
        glyphs
    }

    fn from_cff(table: &cff::Table<'_>) -> Self {
        let gids = || (0..table.number_of_glyphs()).map(GlyphId);
        let mut glyphs = Self {
            units_per_em: cff_units_per_em(table.matrix()),
            bounds: gids()
                .map(|gid| table.outline(gid, &mut BoundsOnly).ok())
                .collect(),
            ..Self::default()
        };
        if table.glyph_cid(GlyphId(0)).is_some() {
            glyphs.cid_glyphs = Some(
                gids()
                    .filter_map(|gid| Some((u32::from(table.glyph_cid(gid)?), gid)))
                    .collect(),
            );
            return glyphs;
        }
        glyphs.by_name = gids()
            .filter_map(|gid| Some((table.glyph_name(gid)?.to_string(), gid)))
            .collect();
        glyphs.builtin_names = (0..=u8::MAX)
            .map(|code| {
                table
                    .glyph_index(code)
                    .filter(|gid| gid.0 != 0)
                    .and_then(|gid| table.glyph_name(gid))
                    .map(String::from)
            })
            .collect();
        glyphs
    }

    fn bounds(&self, gid: GlyphId) -> Option<Rect> {
        self.bounds.get(usize::from(gid.0)).copied().flatten().map(to_rect)
    }

    fn code_glyph(&self, code: u32) -> Option<GlyphId> {
        self.by_code.get(code as usize).copied().flatten()
    }

    fn builtin_name(&self, code: u8) -> Option<&str> {
        self.builtin_names.get(usize::from(code))?.as_deref()
    }
}

/// Units per em implied by a CFF `FontMatrix`; `None` for a skewed or
/// degenerate matrix.
fn cff_units_per_em(matrix: cff::Matrix) -> Option<u16> {
    if matrix.sx <= 0.0 {
        return None;
    }
    let units = (1.0 / matrix.sx).round();
    (16.0..=16384.0).contains(&units).then_some(units as u16)
}

/// One loaded font.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    base_font: String,
    kind: FontKind,
    composite: bool,
    metrics: FontMetrics,
    encoding: SimpleEncoding,
    to_unicode: Option<ToUnicodeCMap>,
    font_matrix: Matrix,
    /// `/FontBBox` of a Type3 font or of the descriptor.
    font_bbox: Option<Rect>,
    /// `d1` boxes of Type3 glyph procedures, by character code.
    char_procs: HashMap<u32, Rect>,
    glyphs: Option<GlyphTable>,
    /// Explicit CID to glyph id table; `None` means identity.
    cid_to_gid: Option<Vec<u16>>,
}

impl LoadedFont {
    fn unsupported(base_font: String, metrics: FontMetrics) -> Self {
        Self {
            base_font,
            kind: FontKind::Unsupported,
            composite: false,
            metrics,
            encoding: SimpleEncoding::new(None),
            to_unicode: None,
            font_matrix: Matrix::scale(0.001, 0.001),
            font_bbox: None,
            char_procs: HashMap::new(),
            glyphs: None,
            cid_to_gid: None,
        }
    }

    /// `/BaseFont`, or the resource-independent subtype for Type3 fonts.
    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    pub fn kind(&self) -> FontKind {
        self.kind
    }

    /// `Type0` fonts use two-byte codes.
    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// Split the bytes of a shown string into character codes.
    pub fn decode(&self, bytes: &[u8]) -> Vec<u32> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }

    /// Horizontal displacement `w0` of `code` in text space units per unit
    /// of font size.
    pub fn advance(&self, code: u32) -> f64 {
        let width = self.metrics.width(code);
        if self.kind == FontKind::Type3 {
            width * self.font_matrix.a
        } else {
            width / 1000.0
        }
    }

    /// Unicode text of `code`: ToUnicode first, then the glyph name.
    pub fn unicode(&self, code: u32) -> Option<String> {
        if let Some(text) = self.to_unicode.as_ref().and_then(|cmap| cmap.lookup(code)) {
            return Some(text.to_string());
        }
        if self.composite {
            return None;
        }
        self.glyph_name(code)
            .and_then(glyph_name_to_unicode)
            .map(String::from)
    }

    /// Glyph name of a single-byte code: the PDF encoding first, then the
    /// built-in encoding of a CFF program.
    fn glyph_name(&self, code: u32) -> Option<&str> {
        let code = u8::try_from(code).ok()?;
        self.encoding
            .glyph_name(code)
            .or_else(|| self.glyphs.as_ref()?.builtin_name(code))
    }

    fn glyph_outline(&self, code: u32) -> Option<Rect> {
        let glyphs = self.glyphs.as_ref()?;
        let gid = if self.composite {
            self.cid_glyph(glyphs, code)?
        } else {
            glyphs.code_glyph(code)?
        };
        glyphs.bounds(gid)
    }

    fn named_glyph_outline(&self, name: &str) -> Option<Rect> {
        let glyphs = self.glyphs.as_ref()?;
        glyphs.bounds(*glyphs.by_name.get(name)?)
    }

    fn cid_glyph(&self, glyphs: &GlyphTable, cid: u32) -> Option<GlyphId> {
        if let Some(by_cid) = &glyphs.cid_glyphs {
            return by_cid.get(&cid).copied();
        }
        Some(match &self.cid_to_gid {
            Some(table) => GlyphId(table.get(cid as usize).copied().unwrap_or(0)),
            None => GlyphId(u16::try_from(cid).unwrap_or(0)),
        })
    }
}

/// Glyph of a simple TrueType font: through the encoding's glyph name
/// for non-symbolic fonts, otherwise straight through the `cmap`.
fn truetype_glyph(
    face: &Face<'_>,
    encoding: &SimpleEncoding,
    symbolic: bool,
    code: u8,
) -> Option<GlyphId> {
    if !symbolic {
        if let Some(name) = encoding.glyph_name(code) {
            let by_unicode = glyph_name_to_unicode(name).and_then(|ch| face.glyph_index(ch));
            if let Some(gid) = by_unicode.or_else(|| face.glyph_index_by_name(name)) {
                return Some(gid);
            }
        }
    }
    let code = u32::from(code);
    let cmap = face.tables().cmap?;
    let mut mac_roman = None;
    for subtable in cmap.subtables {
        match (subtable.platform_id, subtable.encoding_id) {
            (ttf_parser::PlatformId::Windows, 0) => {
                if let Some(gid) = symbol_glyph(&subtable, code) {
                    return Some(gid);
                }
            }
            (ttf_parser::PlatformId::Macintosh, 0) => mac_roman = Some(subtable),
            _ => {}
        }
    }
    mac_roman.and_then(|subtable| subtable.glyph_index(code))
}

fn symbol_glyph(subtable: &Subtable<'_>, code: u32) -> Option<GlyphId> {
    SYMBOL_PAGES
        .iter()
        .find_map(|page| subtable.glyph_index(page + code))
        .filter(|gid| gid.0 != 0)
}

fn to_rect(r: ttf_parser::Rect) -> Rect {
    Rect::new(
        f64::from(r.x_min),
        f64::from(r.y_min),
        f64::from(r.x_max),
        f64::from(r.y_max),
    )
}

/// Outline sink for when only the bounding box matters.
struct BoundsOnly;

impl OutlineBuilder for BoundsOnly {
    fn move_to(&mut self, _x: f32, _y: f32) {}
    fn line_to(&mut self, _x: f32, _y: f32) {}
    fn quad_to(&mut self, _x1: f32, _y1: f32, _x: f32, _y: f32) {}
    fn curve_to(&mut self, _x1: f32, _y1: f32, _x2: f32, _y2: f32, _x: f32, _y: f32) {}
    fn close(&mut self) {}
}

/// Every font loaded for a document, addressed by [`FontId`].
#[derive(Debug, Default)]
pub struct FontStore {
    fonts: Vec<LoadedFont>,
    by_object: HashMap<ObjectId, FontId>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the font `font_obj` (a reference or an inline dictionary).
    ///
    /// Indirect fonts are loaded once; later calls return the same id.
    /// Loading never fails: a font that can't be read is kept as
    /// [`FontKind::Unsupported`] and the problem appended to `warnings`.
    pub fn load(
        &mut self,
        doc: &Document,
        font_obj: &Object,
        warnings: &mut Vec<AnalysisWarning>,
    ) -> FontId {
        let object_id = match font_obj {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        if let Some(id) = object_id.and_then(|oid| self.by_object.get(&oid)) {
            return *id;
        }
        let font = match crate::objects::resolve(doc, font_obj).as_dict() {
            Ok(dict) => load_font(doc, dict, warnings),
            Err(_) => {
                warnings.push(AnalysisWarning::with_code(
                    WarningCode::MalformedObject,
                    "font resource is not a dictionary",
                ));
                LoadedFont::unsupported(String::new(), FontMetrics::default())
            }
        };
        tracing::debug!(font = font.base_font(), kind = ?font.kind(), "loaded font");
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        if let Some(oid) = object_id {
            self.by_object.insert(oid, id);
        }
        id
    }

    pub fn font(&self, id: FontId) -> Option<&LoadedFont> {
        self.fonts.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl GlyphSource for FontStore {
    fn font_kind(&self, font: FontId) -> FontKind {
        self.font(font).map_or(FontKind::Unsupported, LoadedFont::kind)
    }

    fn font_matrix(&self, font: FontId) -> Matrix {
        self.font(font)
            .map_or(Matrix::scale(0.001, 0.001), |f| f.font_matrix)
    }

    fn units_per_em(&self, font: FontId) -> Option<u16> {
        self.font(font)?.glyphs.as_ref()?.units_per_em
    }

    fn glyph_outline(&self, font: FontId, code: u32) -> Option<Rect> {
        self.font(font)?.glyph_outline(code)
    }

    fn char_proc_bbox(&self, font: FontId, code: u32) -> Option<Rect> {
        self.font(font)?.char_procs.get(&code).copied()
    }

    fn font_bbox(&self, font: FontId) -> Option<Rect> {
        self.font(font)?.font_bbox
    }

    fn glyph_name(&self, font: FontId, code: u32) -> Option<String> {
        self.font(font)?.glyph_name(code).map(String::from)
    }

    fn named_glyph_outline(&self, font: FontId, name: &str) -> Option<Rect> {
        self.font(font)?.named_glyph_outline(name)
    }

    fn metrics_box(&self, font: FontId, code: u32) -> Option<Rect> {
        let f = self.font(font)?;
        if f.kind == FontKind::Type3 {
            let bbox = f.font_bbox?;
            return Some(Rect::new(0.0, bbox.y_min, f.metrics.width(code), bbox.y_max));
        }
        Some(f.metrics.metrics_box(code))
    }
}

fn load_font(
    doc: &Document,
    dict: &Dictionary,
    warnings: &mut Vec<AnalysisWarning>,
) -> LoadedFont {
    let subtype = name_entry(doc, dict, b"Subtype").unwrap_or_default();
    let base_font = name_entry(doc, dict, b"BaseFont").unwrap_or_else(|| subtype.clone());
    let to_unicode = load_to_unicode(doc, dict, &base_font, warnings);
    let mut font = match subtype.as_str() {
        "Type0" => load_composite(doc, dict, base_font, warnings),
        "Type3" => load_type3(doc, dict, base_font),
        _ => load_simple(doc, dict, base_font, warnings),
    };
    font.to_unicode = to_unicode;
    font
}

fn load_to_unicode(
    doc: &Document,
    dict: &Dictionary,
    base_font: &str,
    warnings: &mut Vec<AnalysisWarning>,
) -> Option<ToUnicodeCMap> {
    let stream = entry(doc, dict, b"ToUnicode")?.as_stream().ok()?;
    let parsed = stream_bytes(stream).and_then(|data| ToUnicodeCMap::parse(&data));
    match parsed {
        Ok(cmap) => Some(cmap),
        Err(e) => {
            warnings.push(AnalysisWarning::with_code(
                WarningCode::MalformedObject,
                format!("unreadable ToUnicode CMap of {base_font}: {e}"),
            ));
            None
        }
    }
}

fn load_simple(
    doc: &Document,
    dict: &Dictionary,
    base_font: String,
    warnings: &mut Vec<AnalysisWarning>,
) -> LoadedFont {
    let metrics = FontMetrics::simple(doc, dict);
    let descriptor = dict_entry(doc, dict, b"FontDescriptor");
    let symbolic = descriptor
        .and_then(|d| entry(doc, d, b"Flags"))
        .and_then(|f| f.as_i64().ok())
        .is_some_and(|flags| flags & SYMBOLIC_FLAG != 0);

    let mut font = LoadedFont::unsupported(base_font, metrics);
    font.font_bbox = font.metrics.font_bbox();
    let default_base = (!symbolic).then_some(BaseEncoding::Standard);
    font.encoding = load_encoding(doc, dict, default_base);

    let Some(program) = descriptor.and_then(|d| load_program(doc, d, &font.base_font, warnings))
    else {
        tracing::trace!(font = font.base_font(), "no embedded font program");
        return font;
    };
    let addressing = Addressing::Simple {
        encoding: &font.encoding,
        symbolic,
    };
    let Some(glyphs) = GlyphTable::read(&program, addressing) else {
        return font;
    };
    font.kind = match program {
        FontProgram::Sfnt(_) if !is_type1_flavour(doc, dict) => FontKind::Outline,
        _ => FontKind::Simple,
    };
    font.glyphs = Some(glyphs);
    font
}

fn is_type1_flavour(doc: &Document, dict: &Dictionary) -> bool {
    matches!(
        name_entry(doc, dict, b"Subtype").as_deref(),
        Some("Type1" | "MMType1")
    )
}

fn load_composite(
    doc: &Document,
    dict: &Dictionary,
    base_font: String,
    warnings: &mut Vec<AnalysisWarning>,
) -> LoadedFont {
    let descendant = match entry(doc, dict, b"DescendantFonts") {
        Some(Object::Array(items)) => items
            .first()
            .map(|d| crate::objects::resolve(doc, d))
            .and_then(|d| d.as_dict().ok()),
        _ => None,
    };
    let Some(cid_font) = descendant else {
        warnings.push(AnalysisWarning::with_code(
            WarningCode::MalformedObject,
            format!("Type0 font {base_font} has no descendant font"),
        ));
        return LoadedFont::unsupported(base_font, FontMetrics::default());
    };
    let encoding = name_entry(doc, dict, b"Encoding");
    if !matches!(encoding.as_deref(), Some("Identity-H" | "Identity-V")) {
        tracing::debug!(
            font = %base_font,
            encoding = ?encoding,
            "non-identity CMap, treating codes as CIDs"
        );
    }

    let mut font = LoadedFont::unsupported(base_font, FontMetrics::cid(doc, cid_font));
    font.composite = true;
    font.font_bbox = font.metrics.font_bbox();
    font.cid_to_gid = match entry(doc, cid_font, b"CIDToGIDMap") {
        Some(Object::Stream(stream)) => stream_bytes(stream).ok().map(|data| {
            data.chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect()
        }),
        _ => None,
    };
    let program = dict_entry(doc, cid_font, b"FontDescriptor")
        .and_then(|d| load_program(doc, d, &font.base_font, warnings));
    if let Some(glyphs) = program.and_then(|p| GlyphTable::read(&p, Addressing::Cid)) {
        font.kind = FontKind::Outline;
        font.glyphs = Some(glyphs);
    }
    font
}

fn load_type3(doc: &Document, dict: &Dictionary, base_font: String) -> LoadedFont {
    let mut font = LoadedFont::unsupported(base_font, FontMetrics::simple(doc, dict));
    font.kind = FontKind::Type3;
    font.font_matrix = matrix_entry(doc, dict, b"FontMatrix").unwrap_or(Matrix::scale(0.001, 0.001));
    font.font_bbox = rect_entry(doc, dict, b"FontBBox");
    font.encoding = load_encoding(doc, dict, None);

    let Some(procs) = dict_entry(doc, dict, b"CharProcs") else {
        return font;
    };
    for code in 0..=u8::MAX {
        let Some(name) = font.encoding.glyph_name(code) else {
            continue;
        };
        let Some(stream) = entry(doc, procs, name.as_bytes()).and_then(|o| o.as_stream().ok())
        else {
            continue;
        };
        match stream_bytes(stream).and_then(|data| tokenize(&data)) {
            Ok(ops) => {
                let bbox = ops
                    .iter()
                    .take_while(|op| op.name != "d0")
                    .find(|op| op.name == "d1")
                    .and_then(|op| {
                        Some(Rect::new(
                            op.number(2)?,
                            op.number(3)?,
                            op.number(4)?,
                            op.number(5)?,
                        ))
                    });
                if let Some(bbox) = bbox {
                    font.char_procs.insert(u32::from(code), bbox);
                }
            }
            Err(e) => tracing::trace!(glyph = name, error = %e, "unreadable glyph procedure"),
        }
    }
    font
}

/// Resolve `/Encoding` into a base encoding plus differences.
fn load_encoding(
    doc: &Document,
    dict: &Dictionary,
    default_base: Option<BaseEncoding>,
) -> SimpleEncoding {
    match entry(doc, dict, b"Encoding") {
        Some(Object::Name(name)) => SimpleEncoding::new(
            std::str::from_utf8(name)
                .ok()
                .and_then(BaseEncoding::from_name)
                .or(default_base),
        ),
        Some(Object::Dictionary(enc)) => {
            let base = name_entry(doc, enc, b"BaseEncoding")
                .and_then(|n| BaseEncoding::from_name(&n))
                .or(default_base);
            let mut encoding = SimpleEncoding::new(base);
            if let Some(Object::Array(diffs)) = entry(doc, enc, b"Differences") {
                encoding.apply_differences(diffs.iter().filter_map(|item| {
                    match crate::objects::resolve(doc, item) {
                        Object::Integer(code) => u32::try_from(*code).ok().map(DifferencesEntry::Code),
                        Object::Name(name) => std::str::from_utf8(name).ok().map(DifferencesEntry::Name),
                        _ => None,
                    }
                }));
            }
            encoding
        }
        _ => SimpleEncoding::new(default_base),
    }
}

/// Read the embedded program of a font descriptor.
fn load_program(
    doc: &Document,
    descriptor: &Dictionary,
    base_font: &str,
    warnings: &mut Vec<AnalysisWarning>,
) -> Option<FontProgram> {
    let (key, stream) = [&b"FontFile2"[..], b"FontFile3", b"FontFile"]
        .into_iter()
        .find_map(|key| Some((key, entry(doc, descriptor, key)?.as_stream().ok()?)))?;
    if key == b"FontFile" {
        tracing::trace!(font = base_font, "Type1 font programs are not read");
        return None;
    }
    let data = match stream_bytes(stream) {
        Ok(data) => data,
        Err(e) => {
            warnings.push(AnalysisWarning::with_code(
                WarningCode::UnsupportedFont,
                format!("font program of {base_font} unreadable: {e}"),
            ));
            return None;
        }
    };
    let is_sfnt = key == b"FontFile2"
        || matches!(
            stream.dict.get(b"Subtype").and_then(|s| s.as_name()),
            Ok(b"OpenType")
        );
    let valid = if is_sfnt {
        Face::parse(&data, 0).is_ok()
    } else {
        cff::Table::parse(&data).is_some()
    };
    if !valid {
        warnings.push(AnalysisWarning::with_code(
            WarningCode::UnsupportedFont,
            format!("font program of {base_font} could not be parsed"),
        ));
        return None;
    }
    Some(if is_sfnt {
        FontProgram::Sfnt(data)
    } else {
        FontProgram::Cff(data)
    })
}
