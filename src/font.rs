use crate::{
    refs::{ObjectReferences, RefType},
    PagerError, Result,
};
use id_arena::Id;
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use pdf_writer::{
    types::{CidFontType, FontFlags, SystemInfo},
    Filter, Finish, Name, Pdf, Ref, Str,
};
use std::collections::BTreeMap;
use std::io::Write;

/// Every glyph of the Courier family advances by the same amount.
const COURIER_ADVANCE: f32 = 600.0;

/// Which member of a font family to use
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

/// The monospace standard PDF fonts every reader ships with. These need no
/// embedding and are the defaults of a [Controller](crate::Controller).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BuiltinFont {
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl BuiltinFont {
    /// The built-in face matching a style
    pub fn for_style(style: FontStyle) -> BuiltinFont {
        match style {
            FontStyle::Regular => BuiltinFont::Courier,
            FontStyle::Bold => BuiltinFont::CourierBold,
            FontStyle::Italic => BuiltinFont::CourierOblique,
            FontStyle::BoldItalic => BuiltinFont::CourierBoldOblique,
        }
    }

    /// The PostScript name the PDF refers to the font by
    pub fn base_font(&self) -> &'static str {
        match self {
            BuiltinFont::Courier => "Courier",
            BuiltinFont::CourierBold => "Courier-Bold",
            BuiltinFont::CourierOblique => "Courier-Oblique",
            BuiltinFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Height of the AFM `FontBBox`, in glyph space
    fn bounding_box_height(&self) -> f32 {
        match self {
            BuiltinFont::Courier | BuiltinFont::CourierOblique => 805.0 + 250.0,
            BuiltinFont::CourierBold | BuiltinFont::CourierBoldOblique => 801.0 + 250.0,
        }
    }

    /// Map a character onto its WinAnsiEncoding byte. Only the printable ASCII
    /// and Latin-1 ranges map onto themselves, everything else is rejected.
    fn encode_char(ch: char) -> Result<u8> {
        match ch {
            ' '..='~' | '\u{A0}'..='\u{FF}' => Ok(ch as u32 as u8),
            _ => Err(PagerError::MissingGlyph { ch }),
        }
    }
}

enum Face {
    Builtin(BuiltinFont),
    Embedded(OwnedFace),
}

/// A font that text can be measured against and drawn with.
///
/// Metrics are reported in 1000-unit glyph space: a width of 600 means the
/// text is 0.6 times the font size wide. Loaded TTF / OTF fonts are embedded in
/// their entirety when the document is written.
pub struct Font {
    face: Face,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font").field("name", &self.name()).finish()
    }
}

impl Font {
    /// One of the built-in standard fonts
    pub fn builtin(font: BuiltinFont) -> Font {
        Font {
            face: Face::Builtin(font),
        }
    }

    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font {
            face: Face::Embedded(face),
        })
    }

    /// Obtain the full name of the font, falling back to "Unnamed" for fonts without one
    pub fn name(&self) -> String {
        match &self.face {
            Face::Builtin(builtin) => builtin.base_font().to_string(),
            Face::Embedded(face) => face
                .as_face_ref()
                .names()
                .into_iter()
                .find(|name| {
                    name.name_id == owned_ttf_parser::name_id::FULL_NAME && name.is_unicode()
                })
                .and_then(|name| name.to_string())
                .unwrap_or_else(|| "Unnamed".to_string()),
        }
    }

    /// Whether this is one of the standard fonts rather than a loaded file
    pub fn is_builtin(&self) -> bool {
        matches!(self.face, Face::Builtin(_))
    }

    /// Width of the text in glyph space. Fails on the first character the font
    /// has no glyph for.
    pub fn width(&self, text: &str) -> Result<f32> {
        match &self.face {
            Face::Builtin(_) => text.chars().try_fold(0.0, |width, ch| {
                BuiltinFont::encode_char(ch)?;
                Ok(width + COURIER_ADVANCE)
            }),
            Face::Embedded(face) => {
                let face = face.as_face_ref();
                let scaling = 1000.0 / face.units_per_em() as f32;
                text.chars().try_fold(0.0, |width, ch| {
                    let gid = face
                        .glyph_index(ch)
                        .ok_or(PagerError::MissingGlyph { ch })?;
                    let advance = face.glyph_hor_advance(gid).unwrap_or_default();
                    Ok(width + advance as f32 * scaling)
                })
            }
        }
    }

    /// Height of the font's bounding box in glyph space
    pub fn bounding_box_height(&self) -> f32 {
        match &self.face {
            Face::Builtin(builtin) => builtin.bounding_box_height(),
            Face::Embedded(face) => {
                let face = face.as_face_ref();
                let bbox = face.global_bounding_box();
                (bbox.y_max as f32 - bbox.y_min as f32) * 1000.0 / face.units_per_em() as f32
            }
        }
    }

    /// Append the text as a content stream string operand: a literal string for
    /// built-in fonts, hex glyph ids for embedded ones.
    pub(crate) fn encode(&self, text: &str, out: &mut Vec<u8>) -> Result<()> {
        match &self.face {
            Face::Builtin(_) => {
                out.push(b'(');
                for ch in text.chars() {
                    let byte = BuiltinFont::encode_char(ch)?;
                    if matches!(byte, b'(' | b')' | b'\\') {
                        out.push(b'\\');
                    }
                    out.push(byte);
                }
                out.push(b')');
            }
            Face::Embedded(face) => {
                write!(out, "<")?;
                for ch in text.chars() {
                    let gid = face
                        .as_face_ref()
                        .glyph_index(ch)
                        .ok_or(PagerError::MissingGlyph { ch })?;
                    write!(out, "{:04x}", gid.0)?;
                }
                write!(out, ">")?;
            }
        }
        Ok(())
    }

    /// Write the font objects, returning the reference page resources should point at
    pub(crate) fn write(&self, refs: &mut ObjectReferences, id: Id<Font>, writer: &mut Pdf) -> Ref {
        let font_index = id.index();
        let font_id = refs.gen(RefType::Font(font_index));
        match &self.face {
            Face::Builtin(builtin) => {
                writer
                    .type1_font(font_id)
                    .base_font(Name(builtin.base_font().as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
            }
            Face::Embedded(face) => {
                let glyphs = glyph_map(face);
                let cid_font_id = write_cid(face, &glyphs, refs, font_index, writer);
                let to_unicode_id = write_to_unicode(&glyphs, refs, font_index, writer);

                let mut font = writer.type0_font(font_id);
                font.base_font(Name(format!("F{font_index}").as_bytes()));
                font.encoding_predefined(Name(b"Identity-H"));
                font.descendant_font(cid_font_id);
                font.to_unicode(to_unicode_id);
            }
        }
        font_id
    }
}

/// Glyph id to the first unicode character that maps onto it
fn glyph_map(face: &OwnedFace) -> BTreeMap<u16, char> {
    let mut map = BTreeMap::new();
    let Some(cmap) = face.as_face_ref().tables().cmap else {
        return map;
    };
    for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
        subtable.codepoints(|codepoint| {
            if let Ok(ch) = char::try_from(codepoint) {
                if let Some(gid) = subtable.glyph_index(codepoint).filter(|gid| gid.0 > 0) {
                    map.entry(gid.0).or_insert(ch);
                }
            }
        });
    }
    map
}

fn write_cid(
    face: &OwnedFace,
    glyphs: &BTreeMap<u16, char>,
    refs: &mut ObjectReferences,
    font_index: usize,
    writer: &mut Pdf,
) -> Ref {
    let face_ref = face.as_face_ref();
    let scaling = 1000.0 / face_ref.units_per_em() as f32;
    let advances: Vec<(u16, f32)> = glyphs
        .keys()
        .map(|&gid| {
            let advance = face_ref
                .glyph_hor_advance(owned_ttf_parser::GlyphId(gid))
                .unwrap_or_default();
            (gid, advance as f32 * scaling)
        })
        .collect();
    let max_width = advances.iter().map(|&(_, w)| w).fold(0.0, f32::max);

    let descriptor_id = write_descriptor(face, max_width, refs, font_index, writer);

    let id = refs.gen(RefType::CidFont(font_index));
    let mut cid_font = writer.cid_font(id);
    cid_font.subtype(CidFontType::Type2);
    cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
    cid_font.system_info(SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    });
    cid_font.font_descriptor(descriptor_id);
    cid_font.default_width(max_width);

    // glyph ids are sorted, so runs of consecutive ids become one widths block
    let mut widths = cid_font.widths();
    let mut run: Vec<f32> = Vec::new();
    let mut run_start: u16 = 0;
    for (gid, width) in advances {
        if !run.is_empty() && gid as usize != run_start as usize + run.len() {
            widths.consecutive(run_start, run.drain(..));
        }
        if run.is_empty() {
            run_start = gid;
        }
        run.push(width);
    }
    if !run.is_empty() {
        widths.consecutive(run_start, run);
    }
    widths.finish();

    cid_font.cid_to_gid_map_predefined(Name(b"Identity"));
    id
}

fn write_descriptor(
    face: &OwnedFace,
    max_width: f32,
    refs: &mut ObjectReferences,
    font_index: usize,
    writer: &mut Pdf,
) -> Ref {
    let face_ref = face.as_face_ref();
    let scaling = 1000.0 / face_ref.units_per_em() as f32;

    let data_id = refs.gen(RefType::FontData(font_index));
    writer
        .stream(data_id, face.as_slice())
        .pair(Name(b"Length1"), face.as_slice().len() as i32);

    let id = refs.gen(RefType::FontDescriptor(font_index));
    let mut descriptor = writer.font_descriptor(id);
    descriptor.name(Name(format!("F{font_index}").as_bytes()));

    let mut flags = FontFlags::SYMBOLIC;
    if face_ref.is_monospaced() {
        flags.insert(FontFlags::FIXED_PITCH);
    }
    if face_ref.is_italic() {
        flags.insert(FontFlags::ITALIC);
    }
    descriptor.flags(flags);

    let bbox = face_ref.global_bounding_box();
    descriptor.bbox(pdf_writer::Rect {
        x1: bbox.x_min as f32 * scaling,
        y1: bbox.y_min as f32 * scaling,
        x2: bbox.x_max as f32 * scaling,
        y2: bbox.y_max as f32 * scaling,
    });
    descriptor.italic_angle(face_ref.italic_angle());
    descriptor.ascent(face_ref.ascender() as f32 * scaling);
    descriptor.descent(face_ref.descender() as f32 * scaling);
    descriptor.cap_height(
        face_ref
            .capital_height()
            .map(|h| h as f32 * scaling)
            .unwrap_or(1000.0),
    );
    descriptor.stem_v(80.0);
    descriptor.max_width(max_width);
    descriptor.font_file2(data_id);
    id
}

fn write_to_unicode(
    glyphs: &BTreeMap<u16, char>,
    refs: &mut ObjectReferences,
    font_index: usize,
    writer: &mut Pdf,
) -> Ref {
    let id = refs.gen(RefType::ToUnicode(font_index));

    let mut map = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    // bfchar blocks are limited to 100 entries
    let entries: Vec<(&u16, &char)> = glyphs.iter().collect();
    for block in entries.chunks(100) {
        map.push_str(&format!("{} beginbfchar\n", block.len()));
        for (gid, ch) in block {
            let mut utf16 = [0u16; 2];
            let units: String = ch
                .encode_utf16(&mut utf16)
                .iter()
                .map(|unit| format!("{unit:04x}"))
                .collect();
            map.push_str(&format!("<{gid:04x}> <{units}>\n"));
        }
        map.push_str("endbfchar\n");
    }
    map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
        map.as_bytes(),
        miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
    );
    writer.stream(id, compressed.as_slice()).filter(Filter::FlateDecode);
    id
}
