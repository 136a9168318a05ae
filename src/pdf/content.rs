//! Fluent content-stream operator builder (spec §4.J). Grounded on the
//! teacher's macro-driven PDF syntax writer, but emits the actual page
//! operator stream rather than object syntax.

use crate::properties::Color;

#[derive(Default)]
pub struct ContentBuilder {
    buf: Vec<u8>,
}

fn fmt2(v: f64) -> String {
    format!("{:.2}", (v * 100.0).round() / 100.0)
}

impl ContentBuilder {
    pub fn new() -> Self {
        ContentBuilder::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn op(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.buf.extend_from_slice(line.as_ref().as_bytes());
        self.buf.push(b'\n');
        self
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.op("q")
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.op("Q")
    }

    pub fn concat_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.op(format!("{} {} {} {} {} {} cm", fmt2(a), fmt2(b), fmt2(c), fmt2(d), fmt2(e), fmt2(f)))
    }

    pub fn begin_text(&mut self) -> &mut Self {
        self.op("BT")
    }

    pub fn end_text(&mut self) -> &mut Self {
        self.op("ET")
    }

    pub fn set_font(&mut self, font_resource_name: &str, size_pt: f64) -> &mut Self {
        self.op(format!("/{} {} Tf", font_resource_name, fmt2(size_pt)))
    }

    pub fn text_position(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(format!("{} {} Td", fmt2(x), fmt2(y)))
    }

    /// `(escaped text) Tj` for Standard-14 fonts addressed by codepoint.
    pub fn show_text_literal(&mut self, text: &str) -> &mut Self {
        let mut line = String::from("(");
        for byte in escape_literal(text.as_bytes()) {
            line.push(byte as char);
        }
        line.push_str(") Tj");
        self.op(line)
    }

    /// `<hex> Tj` for CID fonts addressed by glyph index.
    pub fn show_text_hex(&mut self, glyph_ids: &[u16]) -> &mut Self {
        let mut line = String::from("<");
        for &gid in glyph_ids {
            line.push_str(&format!("{gid:04X}"));
        }
        line.push_str("> Tj");
        self.op(line)
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        let (r, g, b) = color.to_rgb_f32();
        self.op(format!("{} {} {} rg", fmt2(r as f64), fmt2(g as f64), fmt2(b as f64)))
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        let (r, g, b) = color.to_rgb_f32();
        self.op(format!("{} {} {} RG", fmt2(r as f64), fmt2(g as f64), fmt2(b as f64)))
    }

    pub fn set_line_width(&mut self, width_pt: f64) -> &mut Self {
        self.op(format!("{} w", fmt2(width_pt)))
    }

    pub fn set_dash_pattern(&mut self, segments: &[f64], phase: f64) -> &mut Self {
        let parts: Vec<String> = segments.iter().map(|s| fmt2(*s)).collect();
        self.op(format!("[{}] {} d", parts.join(" "), fmt2(phase)))
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(format!("{} {} m", fmt2(x), fmt2(y)))
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.op(format!("{} {} l", fmt2(x), fmt2(y)))
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> &mut Self {
        self.op(format!("{} {} {} {} {} {} c", fmt2(x1), fmt2(y1), fmt2(x2), fmt2(y2), fmt2(x3), fmt2(y3)))
    }

    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.op(format!("{} {} {} {} re", fmt2(x), fmt2(y), fmt2(width), fmt2(height)))
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.op("h")
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.op("S")
    }

    pub fn fill(&mut self) -> &mut Self {
        self.op("f")
    }

    pub fn fill_and_stroke(&mut self) -> &mut Self {
        self.op("B")
    }

    pub fn paint_xobject(&mut self, resource_name: &str) -> &mut Self {
        self.op(format!("/{resource_name} Do"))
    }

    pub fn begin_marked_content(&mut self, tag: &str, mcid: u32) -> &mut Self {
        self.op(format!("/{tag} <</MCID {mcid}>> BDC"))
    }

    pub fn end_marked_content(&mut self) -> &mut Self {
        self.op("EMC")
    }
}

fn escape_literal(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if matches!(b, b'\\' | b'(' | b')') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluent_builder_emits_newline_separated_operators() {
        let mut builder = ContentBuilder::new();
        builder.save_state().begin_text().set_font("F1", 12.0).show_text_literal("Hi").end_text().restore_state();
        let text = String::from_utf8(builder.into_bytes()).unwrap();
        assert_eq!(text, "q\nBT\n/F1 12.00 Tf\n(Hi) Tj\nET\nQ\n");
    }

    #[test]
    fn hex_text_pads_glyph_ids_to_four_digits() {
        let mut builder = ContentBuilder::new();
        builder.show_text_hex(&[0x1, 0xabcd]);
        assert_eq!(String::from_utf8(builder.into_bytes()).unwrap(), "<0001ABCD> Tj\n");
    }
}
