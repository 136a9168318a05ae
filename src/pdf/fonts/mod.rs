//! Font resolution and embedding (spec §4.K, 12% weight): reduces a
//! `(family, bold, italic)` request to either a Standard 14 base font or a
//! caller-supplied TrueType/OTF buffer embedded as a CID font, and builds
//! the PDF font object chain either way.

pub mod cid;
pub mod cmap;
pub mod standard14;
pub mod truetype;

use crate::errors::FontError;
use crate::pdf::object::{dict, Object, ObjectId};
use crate::pdf::writer::PdfWriter;
use cid::CidFont;
use standard14::Standard14;
use std::collections::HashMap;

/// Which concrete font backs a resolved `(family, bold, italic)` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontRef {
    Standard14(Standard14),
    /// Key into [`FontRegistry`]'s embedded-font table.
    Cid(String),
}

impl FontRef {
    pub fn is_cid(&self) -> bool {
        matches!(self, FontRef::Cid(_))
    }
}

/// `"<family lower>:[bold][:italic]"` (spec §4.M `exportToPdf` options):
/// `"arial::"`, `"arial:bold:"`, `"arial::italic"`, `"arial:bold:italic"`.
pub fn font_key(family: &str, bold: bool, italic: bool) -> String {
    format!(
        "{}:{}:{}",
        family.to_ascii_lowercase(),
        if bold { "bold" } else { "" },
        if italic { "italic" } else { "" }
    )
}

#[derive(Default)]
pub struct FontRegistry {
    cid_fonts: HashMap<String, CidFont>,
}

impl FontRegistry {
    pub fn new() -> Self {
        FontRegistry::default()
    }

    /// Registers a caller-supplied font buffer for a `(family, bold,
    /// italic)` triple. Later `resolve` calls for that triple return
    /// [`FontRef::Cid`] instead of falling back to Standard 14.
    pub fn register_font_buffer(
        &mut self,
        family: &str,
        bold: bool,
        italic: bool,
        data: Vec<u8>,
    ) -> Result<(), FontError> {
        let key = font_key(family, bold, italic);
        let font = CidFont::parse(family.to_string(), bold, italic, data)?;
        self.cid_fonts.insert(key, font);
        Ok(())
    }

    /// Reduces a `(family, bold, italic)` tuple to a font key and resolves
    /// it to an embedded CID font if one was registered, else a Standard 14
    /// fallback (spec §4.K).
    pub fn resolve(&self, family: &str, bold: bool, italic: bool) -> FontRef {
        let key = font_key(family, bold, italic);
        if self.cid_fonts.contains_key(&key) {
            FontRef::Cid(key)
        } else {
            FontRef::Standard14(standard14::resolve_standard14(family, bold, italic))
        }
    }

    pub fn cid_font_mut(&mut self, key: &str) -> Option<&mut CidFont> {
        self.cid_fonts.get_mut(key)
    }

    pub fn cid_font(&self, key: &str) -> Option<&CidFont> {
        self.cid_fonts.get(key)
    }

    /// Encodes `text` against the font `font_ref` points at. For Standard 14
    /// fonts this is identity (they're addressed by WinAnsi byte, not glyph
    /// id); for CID fonts it records codepoint usage and returns glyph ids.
    pub fn encode(&mut self, font_ref: &FontRef, text: &str) -> Encoded {
        match font_ref {
            FontRef::Standard14(_) => Encoded::Bytes(text.as_bytes().to_vec()),
            FontRef::Cid(key) => {
                let font = self.cid_fonts.get_mut(key).expect("resolve only returns keys it registered");
                Encoded::GlyphIds(font.encode_text(text))
            }
        }
    }

    /// Builds the font's PDF object(s) and returns the id of the top-level
    /// `/Font` dictionary (a plain Type1 dict for Standard 14, or the
    /// Type0/CIDFontType2/FontDescriptor/FontFile2 chain for CID fonts).
    pub fn build_font_object(&self, writer: &mut PdfWriter, font_ref: &FontRef) -> ObjectId {
        match font_ref {
            FontRef::Standard14(base) => writer.add(Object::Dictionary(dict! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base.base_font_name(),
                "Encoding" => "WinAnsiEncoding",
            })),
            FontRef::Cid(key) => {
                let font = self.cid_font(key).expect("resolve only returns keys it registered");
                build_cid_font_chain(writer, font)
            }
        }
    }
}

pub enum Encoded {
    /// Single-byte WinAnsi codes, for `(…) Tj` against a Standard 14 font.
    Bytes(Vec<u8>),
    /// Two-byte glyph ids, for `<…> Tj` against a CID font.
    GlyphIds(Vec<u16>),
}

fn build_cid_font_chain(writer: &mut PdfWriter, font: &CidFont) -> ObjectId {
    let flags = standard14::font_flags(&font.family, font.italic).bits();

    let font_file = writer.add(Object::Stream(vec![("Length1".to_string(), Object::Int(font.raw_bytes().len() as i64))], font.raw_bytes().to_vec()));

    let descriptor = writer.add(Object::Dictionary(dict! {
        "Type" => "FontDescriptor",
        "FontName" => font.family.as_str(),
        "Flags" => flags as i64,
        "FontBBox" => Object::Array(vec![Object::Int(0), Object::Int(0), Object::Int(1000), Object::Int(1000)]),
        "ItalicAngle" => if font.italic { -12 } else { 0 },
        "Ascent" => 900,
        "Descent" => -200,
        "CapHeight" => 700,
        "StemV" => if font.bold { 120 } else { 80 },
        "FontFile2" => ObjectId(font_file.0),
    }));

    let descendant = writer.add(Object::Dictionary(dict! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => font.family.as_str(),
        "CIDSystemInfo" => Object::Dictionary(dict! {
            "Registry" => Object::literal_string("Adobe"),
            "Ordering" => Object::literal_string("Identity"),
            "Supplement" => 0,
        }),
        "FontDescriptor" => ObjectId(descriptor.0),
        "CIDToGIDMap" => "Identity",
        "W" => Object::Array(font.width_array()),
    }));

    let to_unicode = writer.add(Object::Stream(vec![], font.to_unicode_stream()));

    writer.add(Object::Dictionary(dict! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => font.family.as_str(),
        "Encoding" => "Identity-H",
        "DescendantFonts" => Object::Array(vec![Object::Reference(descendant)]),
        "ToUnicode" => ObjectId(to_unicode.0),
    }))
}
