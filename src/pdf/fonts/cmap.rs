//! Two jobs named `cmap` on purpose, mirroring the teacher's split: reading
//! a source font's `cmap` table (subtable formats 4 and 12) to resolve
//! Unicode codepoints to glyph ids, and writing the `ToUnicode` CMap stream
//! PDF viewers use for copy/paste and search (spec §4.K), grounded on the
//! teacher's `fonts/cmap.rs` subtable walk.

use crate::errors::FontError;
use std::collections::HashMap;
use std::fmt::Write as _;

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn at(data: &'a [u8], pos: usize) -> Self {
        Reader { data, pos }
    }
    fn u16(&mut self) -> Result<u16, FontError> {
        let b = self.data.get(self.pos..self.pos + 2).ok_or(FontError::OffsetBeyondEof)?;
        self.pos += 2;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
    fn i16(&mut self) -> Result<i16, FontError> {
        Ok(self.u16()? as i16)
    }
    fn u32(&mut self) -> Result<u32, FontError> {
        let b = self.data.get(self.pos..self.pos + 4).ok_or(FontError::OffsetBeyondEof)?;
        self.pos += 4;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
    fn skip(&mut self, n: usize) {
        self.pos += n;
    }
}

/// Parses the font's `cmap` table, preferring a platform 3/encoding 10 or
/// 3/1 Unicode subtable, falling back to platform 0 (Unicode) otherwise.
pub fn parse_cmap_table(data: &[u8], (table_offset, _len): (u32, u32)) -> Result<HashMap<u32, u16>, FontError> {
    let base = table_offset as usize;
    let mut header = Reader::at(data, base);
    let _version = header.u16()?;
    let num_subtables = header.u16()?;

    let mut best: Option<(i32, usize)> = None; // (priority, subtable offset)
    for _ in 0..num_subtables {
        let platform_id = header.u16()?;
        let encoding_id = header.u16()?;
        let offset = header.u32()? as usize;
        let priority = match (platform_id, encoding_id) {
            (3, 10) => 3,
            (3, 1) => 2,
            (0, _) => 1,
            _ => 0,
        };
        if best.map(|(p, _)| priority > p).unwrap_or(true) {
            best = Some((priority, offset));
        }
    }

    let (_priority, subtable_offset) = best.ok_or(FontError::NoSupportedCmap)?;
    let subtable_base = base + subtable_offset;
    let format = Reader::at(data, subtable_base).u16()?;
    match format {
        4 => parse_format4(data, subtable_base),
        12 => parse_format12(data, subtable_base),
        _ => Err(FontError::NoSupportedCmap),
    }
}

fn parse_format4(data: &[u8], base: usize) -> Result<HashMap<u32, u16>, FontError> {
    let mut r = Reader::at(data, base);
    let _format = r.u16()?;
    let _length = r.u16()?;
    let _language = r.u16()?;
    let seg_count_x2 = r.u16()?;
    let seg_count = (seg_count_x2 / 2) as usize;
    r.skip(6); // searchRange, entrySelector, rangeShift

    let end_codes_offset = r.pos;
    let mut end_codes = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        end_codes.push(r.u16()?);
    }
    r.skip(2); // reservedPad
    let start_codes_offset = r.pos;
    let mut start_codes = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        start_codes.push(r.u16()?);
    }
    let id_deltas_offset = r.pos;
    let mut id_deltas = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        id_deltas.push(r.i16()?);
    }
    let id_range_offsets_base = r.pos;
    let mut id_range_offsets = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        id_range_offsets.push(r.u16()?);
    }
    let _ = (end_codes_offset, start_codes_offset, id_deltas_offset);

    let mut map = HashMap::new();
    for seg in 0..seg_count {
        let start = start_codes[seg];
        let end = end_codes[seg];
        if start == 0xffff && end == 0xffff {
            continue;
        }
        for code in start..=end {
            let glyph = if id_range_offsets[seg] == 0 {
                (code as i32 + id_deltas[seg] as i32) as u16
            } else {
                let glyph_index_addr = id_range_offsets_base
                    + seg * 2
                    + id_range_offsets[seg] as usize
                    + (code - start) as usize * 2;
                let raw = Reader::at(data, glyph_index_addr).u16()?;
                if raw == 0 {
                    0
                } else {
                    (raw as i32 + id_deltas[seg] as i32) as u16
                }
            };
            if glyph != 0 {
                map.insert(code as u32, glyph);
            }
            if code == 0xffff {
                break;
            }
        }
    }
    Ok(map)
}

fn parse_format12(data: &[u8], base: usize) -> Result<HashMap<u32, u16>, FontError> {
    let mut r = Reader::at(data, base);
    let _format = r.u16()?;
    r.skip(2); // reserved
    let _length = r.u32()?;
    let _language = r.u32()?;
    let num_groups = r.u32()?;

    let mut map = HashMap::new();
    for _ in 0..num_groups {
        let start_char_code = r.u32()?;
        let end_char_code = r.u32()?;
        let start_glyph_id = r.u32()?;
        for (i, code) in (start_char_code..=end_char_code).enumerate() {
            map.insert(code, (start_glyph_id + i as u32) as u16);
        }
    }
    Ok(map)
}

/// Builds a `/ToUnicode` CMap stream body mapping CIDs to their source
/// codepoints, in `bfchar` blocks capped at 100 entries each (spec §4.K).
/// Supplementary codepoints are encoded as UTF-16 surrogate pairs (8 hex
/// digits); codepoints within the BMP are 4 hex digits.
pub fn build_to_unicode_cmap(cid_to_codepoint: &[(u16, u32)]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str("/CIDInit /ProcSet findresource begin\n");
    out.push_str("12 dict begin\nbegincmap\n");
    out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    out.push_str("/CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    for chunk in cid_to_codepoint.chunks(100) {
        let _ = write!(out, "{} beginbfchar\n", chunk.len());
        for &(cid, codepoint) in chunk {
            let _ = write!(out, "<{cid:04X}> <{}>\n", utf16_hex(codepoint));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend");
    out.into_bytes()
}

fn utf16_hex(codepoint: u32) -> String {
    if codepoint <= 0xffff {
        format!("{codepoint:04X}")
    } else {
        let v = codepoint - 0x10000;
        let high = 0xd800 + (v >> 10);
        let low = 0xdc00 + (v & 0x3ff);
        format!("{high:04X}{low:04X}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmp_codepoint_is_four_hex_digits() {
        assert_eq!(utf16_hex(0x0041), "0041");
    }

    #[test]
    fn supplementary_codepoint_is_surrogate_pair() {
        // U+1F600 (grinning face) -> D83D DE00
        assert_eq!(utf16_hex(0x1F600), "D83DDE00");
    }

    #[test]
    fn bfchar_blocks_split_at_one_hundred_entries() {
        let entries: Vec<(u16, u32)> = (0..150).map(|i| (i as u16, 0x41 + i as u32)).collect();
        let cmap = String::from_utf8(build_to_unicode_cmap(&entries)).unwrap();
        assert_eq!(cmap.matches("beginbfchar").count(), 2);
        assert!(cmap.contains("100 beginbfchar"));
        assert!(cmap.contains("50 beginbfchar"));
    }
}
