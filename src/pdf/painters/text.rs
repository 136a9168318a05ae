//! Text painter (spec §4.L): one content-stream `BT…ET` block per
//! fragment, with caps/script/decoration handling layered around it.
//! Grounded on the teacher's `Fragment::paint_onto` recursive walk in
//! `paint.rs`, generalized from "paint a background and recurse" to the
//! richer per-fragment styling this spec's run properties need.

use crate::pdf::content::ContentBuilder;
use crate::pdf::fonts::{Encoded, FontRef, FontRegistry};
use crate::pdf::layout_contract::{TextFragment, Underline, VerticalAlign};

/// Fraction of the font size a super/subscript run shrinks to, and the
/// fraction it shifts by (spec §4.L: "0.65× size, ±y shift").
const SCRIPT_SCALE: f64 = 0.65;
const SCRIPT_SHIFT_RATIO: f64 = 0.35;

/// Offsets below the baseline for underline/strikethrough, and the gap
/// between the two strokes of a double variant, in fractions of font size.
const UNDERLINE_OFFSET_RATIO: f64 = 0.12;
const STRIKE_OFFSET_RATIO: f64 = 0.30;
const DOUBLE_LINE_GAP_RATIO: f64 = 0.08;

/// Hebrew (U+0590–U+05FF) and Arabic (U+0600–U+06FF, U+0750–U+077F)
/// ranges, used to reverse glyph order for right-to-left runs (spec §4.L).
fn is_rtl_codepoint(c: char) -> bool {
    matches!(c as u32, 0x0590..=0x05FF | 0x0600..=0x06FF | 0x0750..=0x077F)
}

fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_codepoint)
}

/// Paints one text fragment against an already-resolved font. The
/// orchestrator resolves `font_ref` itself (spec §4.M pass 1/pass 2) so it
/// can assign a stable `/Resources /Font` name before any glyph is drawn.
pub fn paint_text_fragment(
    content: &mut ContentBuilder,
    fonts: &mut FontRegistry,
    font_ref: &FontRef,
    resource_name: &str,
    page_height: f64,
    fragment: &TextFragment,
) {
    let style = &fragment.style;

    let text = if style.all_caps { fragment.text.to_uppercase() } else { fragment.text.clone() };
    // Glyph order in a content-stream show-text op is always logical-LTR;
    // an RTL run's glyphs draw left-to-right across the fragment's box, so
    // they must be reversed into visual order before encoding (spec §4.L).
    let text: String = if contains_rtl(&text) { text.chars().rev().collect() } else { text };

    let (size_pt, y_shift) = match style.vertical_align {
        VerticalAlign::Baseline => (style.size_pt, 0.0),
        VerticalAlign::Superscript => (style.size_pt * SCRIPT_SCALE, style.size_pt * SCRIPT_SHIFT_RATIO),
        VerticalAlign::Subscript => (style.size_pt * SCRIPT_SCALE, -style.size_pt * SCRIPT_SHIFT_RATIO),
    };

    // LayoutRect is top-left-origin; PDF content space is bottom-left-origin.
    let baseline_x = fragment.rect.x;
    let baseline_y = page_height - fragment.rect.y - fragment.rect.height + y_shift;
    let text_width = fragment.rect.width;

    if let Some(highlight) = style.highlight {
        content.save_state();
        content.set_fill_color(highlight);
        content.rectangle(fragment.rect.x, page_height - fragment.rect.y - fragment.rect.height, text_width, fragment.rect.height);
        content.fill();
        content.restore_state();
    }

    content.begin_text();
    content.set_fill_color(style.color);
    content.set_font(resource_name, size_pt);
    content.text_position(baseline_x, baseline_y);
    match fonts.encode(font_ref, &text) {
        Encoded::Bytes(bytes) => content.show_text_literal(&String::from_utf8_lossy(&bytes)),
        Encoded::GlyphIds(ids) => content.show_text_hex(&ids),
    };
    content.end_text();

    paint_decorations(content, style, baseline_x, baseline_y, text_width, style.size_pt);
}

fn paint_decorations(content: &mut ContentBuilder, style: &crate::pdf::layout_contract::FragmentStyle, x: f64, baseline_y: f64, width: f64, size_pt: f64) {
    if style.underline != Underline::None {
        let y = baseline_y - size_pt * UNDERLINE_OFFSET_RATIO;
        draw_stroke_line(content, style, x, y, width, style.underline == Underline::Double, size_pt);
    }
    if style.strike {
        let y = baseline_y + size_pt * STRIKE_OFFSET_RATIO;
        draw_stroke_line(content, style, x, y, width, style.double_strike, size_pt);
    }
}

fn draw_stroke_line(content: &mut ContentBuilder, style: &crate::pdf::layout_contract::FragmentStyle, x: f64, y: f64, width: f64, double: bool, size_pt: f64) {
    content.save_state();
    content.set_stroke_color(style.color);
    content.set_line_width((size_pt * 0.06).max(0.5));
    content.move_to(x, y);
    content.line_to(x + width, y);
    content.stroke();
    if double {
        let y2 = y - size_pt * DOUBLE_LINE_GAP_RATIO;
        content.move_to(x, y2);
        content.line_to(x + width, y2);
        content.stroke();
    }
    content.restore_state();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout_contract::{FragmentStyle, LayoutRect};
    use crate::path::Path;

    fn fragment(text: &str, style: FragmentStyle) -> TextFragment {
        TextFragment {
            text: text.to_string(),
            rect: LayoutRect { x: 10.0, y: 10.0, width: 50.0, height: 12.0 },
            run_path: Path::new(),
            style,
            href: None,
        }
    }

    #[test]
    fn all_caps_uppercases_before_drawing() {
        let mut content = ContentBuilder::new();
        let mut fonts = FontRegistry::new();
        let style = FragmentStyle { all_caps: true, ..Default::default() };
        let f = fragment("hello", style);
        let font_ref = fonts.resolve(&f.style.font_family, f.style.bold, f.style.italic);
        paint_text_fragment(&mut content, &mut fonts, &font_ref, "F1", 800.0, &f);
        let text = String::from_utf8(content.into_bytes()).unwrap();
        assert!(text.contains("(HELLO) Tj"));
    }

    #[test]
    fn superscript_shrinks_font_size() {
        let mut content = ContentBuilder::new();
        let mut fonts = FontRegistry::new();
        let style = FragmentStyle { size_pt: 20.0, vertical_align: VerticalAlign::Superscript, ..Default::default() };
        let f = fragment("x", style);
        let font_ref = fonts.resolve(&f.style.font_family, f.style.bold, f.style.italic);
        paint_text_fragment(&mut content, &mut fonts, &font_ref, "F1", 800.0, &f);
        let text = String::from_utf8(content.into_bytes()).unwrap();
        assert!(text.contains("/F1 13.00 Tf"));
    }

    #[test]
    fn hebrew_text_is_detected_as_rtl() {
        assert!(contains_rtl("\u{05D0}\u{05D1}"));
        assert!(!contains_rtl("abc"));
    }

    #[test]
    fn rtl_fragment_is_encoded_in_reversed_order() {
        let mut content = ContentBuilder::new();
        let mut fonts = FontRegistry::new();
        let original = "\u{05D0}\u{05D1}\u{05D2}";
        let f = fragment(original, FragmentStyle::default());
        let font_ref = fonts.resolve(&f.style.font_family, f.style.bold, f.style.italic);
        paint_text_fragment(&mut content, &mut fonts, &font_ref, "F1", 800.0, &f);
        let text = String::from_utf8(content.into_bytes()).unwrap();

        // Standard-14 text is shown as a literal `(...) Tj` string built one
        // input byte per output char (see `ContentBuilder::show_text_literal`);
        // mirror that transform over the expected reversed order rather than
        // comparing Unicode scalars directly.
        let reversed: String = original.chars().rev().collect();
        let expected_literal: String = reversed.as_bytes().iter().map(|&b| b as char).collect();
        assert!(text.contains(&format!("({expected_literal}) Tj")));
    }

    #[test]
    fn underline_emits_a_stroked_segment_after_text() {
        let mut content = ContentBuilder::new();
        let mut fonts = FontRegistry::new();
        let style = FragmentStyle { underline: Underline::Single, ..Default::default() };
        let f = fragment("x", style);
        let font_ref = fonts.resolve(&f.style.font_family, f.style.bold, f.style.italic);
        paint_text_fragment(&mut content, &mut fonts, &font_ref, "F1", 800.0, &f);
        let text = String::from_utf8(content.into_bytes()).unwrap();
        assert!(text.contains(" S\n"));
    }
}
