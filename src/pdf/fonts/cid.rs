//! A single embedded CID font's state across the two-pass render (spec
//! §4.K, §4.M): pass 1 records which codepoints get drawn, pass 2 reads
//! back the glyph ids and widths those codepoints resolved to.
//!
//! This embeds the caller-supplied font buffer as-is rather than
//! physically rewriting its `glyf`/`loca`/`hmtx` tables down to only the
//! glyphs actually used — true table-level subsetting needs a glyph-outline
//! compactor this crate doesn't carry. "Subset" here means restricting the
//! `/W` array and `ToUnicode` CMap to the glyphs seen in pass 1; the
//! `FontFile2` stream embeds the complete source font. Noted in DESIGN.md.

use super::truetype::ParsedFont;
use crate::errors::FontError;
use crate::pdf::object::Object;
use std::collections::BTreeSet;

pub struct CidFont {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    parsed: ParsedFont,
    raw_bytes: Vec<u8>,
    used_codepoints: BTreeSet<u32>,
}

impl CidFont {
    pub fn parse(family: String, bold: bool, italic: bool, data: Vec<u8>) -> Result<Self, FontError> {
        let parsed = ParsedFont::parse(&data)?;
        Ok(CidFont { family, bold, italic, parsed, raw_bytes: data, used_codepoints: BTreeSet::new() })
    }

    /// Glyph id for `codepoint`, falling back to glyph 0 (`.notdef`) when
    /// unmapped, and recording the codepoint as seen.
    pub fn encode_codepoint(&mut self, codepoint: u32) -> u16 {
        let glyph = self.parsed.codepoint_to_glyph.get(&codepoint).copied().unwrap_or(0);
        self.used_codepoints.insert(codepoint);
        glyph
    }

    pub fn encode_text(&mut self, text: &str) -> Vec<u16> {
        text.chars().map(|c| self.encode_codepoint(c as u32)).collect()
    }

    /// Glyph ids touched so far, `.notdef` (CID 0) always included (spec §4.K).
    pub fn used_glyph_ids(&self) -> BTreeSet<u16> {
        let mut ids: BTreeSet<u16> =
            self.used_codepoints.iter().filter_map(|cp| self.parsed.codepoint_to_glyph.get(cp).copied()).collect();
        ids.insert(0);
        ids
    }

    fn cid_to_codepoint_pairs(&self) -> Vec<(u16, u32)> {
        let mut pairs: Vec<(u16, u32)> = self
            .used_codepoints
            .iter()
            .filter_map(|&cp| self.parsed.codepoint_to_glyph.get(&cp).map(|&gid| (gid, cp)))
            .collect();
        pairs.sort_by_key(|&(gid, _)| gid);
        pairs
    }

    /// Compact `/W` array: runs of consecutive CIDs collapse into one
    /// `start [w1 w2 …]` group (spec §4.K).
    pub fn width_array(&self) -> Vec<Object> {
        let ids: Vec<u16> = self.used_glyph_ids().into_iter().collect();
        let mut out = Vec::new();
        let mut i = 0;
        while i < ids.len() {
            let start = ids[i];
            let mut widths = vec![Object::Int(self.parsed.advance_width_1000(start) as i64)];
            let mut j = i + 1;
            while j < ids.len() && ids[j] == ids[j - 1] + 1 {
                widths.push(Object::Int(self.parsed.advance_width_1000(ids[j]) as i64));
                j += 1;
            }
            out.push(Object::Int(start as i64));
            out.push(Object::Array(widths));
            i = j;
        }
        out
    }

    pub fn to_unicode_stream(&self) -> Vec<u8> {
        super::cmap::build_to_unicode_cmap(&self.cid_to_codepoint_pairs())
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    fn synthetic_font_with_two_glyphs() -> Vec<u8> {
        let mut head = vec![0u8; 54];
        head[18..20].copy_from_slice(&1000u16.to_be_bytes());
        let mut hhea = vec![0u8; 36];
        hhea[34..36].copy_from_slice(&3u16.to_be_bytes());
        let mut hmtx = Vec::new();
        for w in [0u16, 300, 600] {
            push_u16(&mut hmtx, w);
            push_u16(&mut hmtx, 0);
        }
        let mut cmap = Vec::new();
        push_u16(&mut cmap, 0);
        push_u16(&mut cmap, 1);
        push_u16(&mut cmap, 3);
        push_u16(&mut cmap, 1);
        push_u32(&mut cmap, 12);
        let mut subtable = Vec::new();
        push_u16(&mut subtable, 4);
        push_u16(&mut subtable, 0);
        push_u16(&mut subtable, 0);
        push_u16(&mut subtable, 4);
        push_u16(&mut subtable, 0);
        push_u16(&mut subtable, 0);
        push_u16(&mut subtable, 0);
        push_u16(&mut subtable, 0x0042);
        push_u16(&mut subtable, 0xffff);
        push_u16(&mut subtable, 0);
        push_u16(&mut subtable, 0x0041);
        push_u16(&mut subtable, 0xffff);
        push_u16(&mut subtable, (1i16 - 0x0041) as u16);
        push_u16(&mut subtable, 1);
        push_u16(&mut subtable, 0);
        push_u16(&mut subtable, 0);
        cmap.extend_from_slice(&subtable);

        let mut out = Vec::new();
        push_u32(&mut out, 0x00010000);
        push_u16(&mut out, 4);
        push_u16(&mut out, 0);
        push_u16(&mut out, 0);
        push_u16(&mut out, 0);
        let header_len = 12 + 4 * 16;
        let mut offset = header_len as u32;
        let mut dir = Vec::new();
        for (tag, table) in [(*b"head", &head), (*b"hhea", &hhea), (*b"hmtx", &hmtx), (*b"cmap", &cmap)] {
            dir.extend_from_slice(&tag);
            push_u32(&mut dir, 0);
            push_u32(&mut dir, offset);
            push_u32(&mut dir, table.len() as u32);
            offset += table.len() as u32;
        }
        out.extend_from_slice(&dir);
        out.extend_from_slice(&head);
        out.extend_from_slice(&hhea);
        out.extend_from_slice(&hmtx);
        out.extend_from_slice(&cmap);
        out
    }

    #[test]
    fn width_array_groups_consecutive_cids() {
        let data = synthetic_font_with_two_glyphs();
        let mut font = CidFont::parse("Test".into(), false, false, data).unwrap();
        font.encode_text("AB");
        let widths = font.width_array();
        // notdef (0) and glyphs 1,2 are consecutive -> one run starting at 0.
        assert_eq!(widths, vec![Object::Int(0), Object::Array(vec![Object::Int(0), Object::Int(300), Object::Int(600)])]);
    }

    #[test]
    fn to_unicode_round_trips_codepoints() {
        let data = synthetic_font_with_two_glyphs();
        let mut font = CidFont::parse("Test".into(), false, false, data).unwrap();
        font.encode_text("A");
        let cmap = String::from_utf8(font.to_unicode_stream()).unwrap();
        assert!(cmap.contains("<0001> <0041>"));
    }

    #[test]
    fn unmapped_codepoint_falls_back_to_notdef() {
        let data = synthetic_font_with_two_glyphs();
        let mut font = CidFont::parse("Test".into(), false, false, data).unwrap();
        assert_eq!(font.encode_codepoint(0x1234), 0);
    }
}
