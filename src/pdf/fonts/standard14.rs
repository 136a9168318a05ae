//! Standard 14 font mapping and font-descriptor flags (spec §4.K), grounded
//! on the teacher's font-classification heuristics in `fonts2/mod.rs`.

/// One of the 14 base fonts every PDF viewer is required to ship, addressed
/// directly by `/BaseFont` name with no embedded program.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Standard14 {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl Standard14 {
    pub fn base_font_name(self) -> &'static str {
        match self {
            Standard14::Helvetica => "Helvetica",
            Standard14::HelveticaBold => "Helvetica-Bold",
            Standard14::HelveticaOblique => "Helvetica-Oblique",
            Standard14::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Standard14::TimesRoman => "Times-Roman",
            Standard14::TimesBold => "Times-Bold",
            Standard14::TimesItalic => "Times-Italic",
            Standard14::TimesBoldItalic => "Times-BoldItalic",
            Standard14::Courier => "Courier",
            Standard14::CourierBold => "Courier-Bold",
            Standard14::CourierOblique => "Courier-Oblique",
            Standard14::CourierBoldOblique => "Courier-BoldOblique",
            Standard14::Symbol => "Symbol",
            Standard14::ZapfDingbats => "ZapfDingbats",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Classification {
    Serif,
    Mono,
    Sans,
}

/// Case-insensitive family-name heuristic (spec §4.K: "Serif/mono
/// classification uses a case-insensitive family-name heuristic").
fn classify_family(family: &str) -> Classification {
    let lower = family.to_ascii_lowercase();
    const MONO_MARKERS: [&str; 5] = ["courier", "mono", "consolas", "menlo", "code"];
    const SERIF_MARKERS: [&str; 6] = ["times", "georgia", "garamond", "serif", "cambria", "book"];
    if MONO_MARKERS.iter().any(|m| lower.contains(m)) {
        Classification::Mono
    } else if SERIF_MARKERS.iter().any(|m| lower.contains(m)) {
        Classification::Serif
    } else {
        Classification::Sans
    }
}

/// Picks the Standard 14 variant matching `family`'s classification and the
/// requested bold/italic flags.
pub fn resolve_standard14(family: &str, bold: bool, italic: bool) -> Standard14 {
    match (classify_family(family), bold, italic) {
        (Classification::Mono, false, false) => Standard14::Courier,
        (Classification::Mono, true, false) => Standard14::CourierBold,
        (Classification::Mono, false, true) => Standard14::CourierOblique,
        (Classification::Mono, true, true) => Standard14::CourierBoldOblique,
        (Classification::Serif, false, false) => Standard14::TimesRoman,
        (Classification::Serif, true, false) => Standard14::TimesBold,
        (Classification::Serif, false, true) => Standard14::TimesItalic,
        (Classification::Serif, true, true) => Standard14::TimesBoldItalic,
        (Classification::Sans, false, false) => Standard14::Helvetica,
        (Classification::Sans, true, false) => Standard14::HelveticaBold,
        (Classification::Sans, false, true) => Standard14::HelveticaOblique,
        (Classification::Sans, true, true) => Standard14::HelveticaBoldOblique,
    }
}

bitflags::bitflags! {
    /// `/FontDescriptor /Flags` bits this crate sets (PDF32000 §9.8.2).
    /// `Nonsymbolic` is always set for text fonts; the rest follow the
    /// family classification and style.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct FontFlags: u32 {
        const FIXED_PITCH = 1;
        const SERIF = 2;
        const NONSYMBOLIC = 32;
        const ITALIC = 64;
    }
}

pub fn font_flags(family: &str, italic: bool) -> FontFlags {
    let mut flags = FontFlags::NONSYMBOLIC;
    match classify_family(family) {
        Classification::Mono => flags |= FontFlags::FIXED_PITCH,
        Classification::Serif => flags |= FontFlags::SERIF,
        Classification::Sans => {}
    }
    if italic {
        flags |= FontFlags::ITALIC;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_new_classifies_as_mono() {
        assert_eq!(resolve_standard14("Courier New", false, false), Standard14::Courier);
    }

    #[test]
    fn times_new_roman_classifies_as_serif_bold_italic() {
        assert_eq!(resolve_standard14("Times New Roman", true, true), Standard14::TimesBoldItalic);
    }

    #[test]
    fn unknown_family_falls_back_to_helvetica() {
        assert_eq!(resolve_standard14("Calibri", false, false), Standard14::Helvetica);
    }

    #[test]
    fn flags_always_set_nonsymbolic() {
        assert!(font_flags("Arial", false).contains(FontFlags::NONSYMBOLIC));
        assert!(font_flags("Georgia", false).contains(FontFlags::SERIF));
        assert!(font_flags("Consolas", false).contains(FontFlags::FIXED_PITCH));
        assert!(font_flags("Arial", true).contains(FontFlags::ITALIC));
    }
}
