//! Property records for every node kind that carries formatting (spec §3).
//! Each is a plain `Option<T>`-per-field struct generated by
//! [`super::macros::property_record`], which also gives it the `get`/`set`/
//! `merged` methods `set_properties` (spec §4.D) needs to apply a patch
//! generically regardless of which node kind it targets.

use crate::properties::macros::property_record;
use crate::properties::value::Color;

property_record! {
    /// Inline run formatting (spec §3 invariant 3).
    pub struct RunProperties {
        bold: bool => Bool,
        italic: bool => Bool,
        underline: String => Text,
        strike: bool => Bool,
        vertical_align: String => Text,
        font_family: String => Text,
        size_half_points: i64 => Int,
        color: Color => Color,
        highlight: String => Text,
        caps: bool => Bool,
        letter_spacing_twips: i64 => Int,
        language: String => Text,
        style_id: String => Text,
    }
}

property_record! {
    pub struct ParagraphProperties {
        alignment: String => Text,
        indent_start_twips: i64 => Int,
        indent_end_twips: i64 => Int,
        indent_first_line_twips: i64 => Int,
        spacing_before_twips: i64 => Int,
        spacing_after_twips: i64 => Int,
        line_spacing_twips: i64 => Int,
        keep_with_next: bool => Bool,
        keep_lines_together: bool => Bool,
        outline_level: i64 => Int,
        style_id: String => Text,
        numbering_id: i64 => Int,
        numbering_level: i64 => Int,
    }
}

property_record! {
    pub struct SectionProperties {
        page_width_twips: i64 => Int,
        page_height_twips: i64 => Int,
        margin_top_twips: i64 => Int,
        margin_bottom_twips: i64 => Int,
        margin_left_twips: i64 => Int,
        margin_right_twips: i64 => Int,
        header_distance_twips: i64 => Int,
        footer_distance_twips: i64 => Int,
        orientation: String => Text,
        columns_count: i64 => Int,
        column_spacing_twips: i64 => Int,
    }
}

property_record! {
    pub struct TableProperties {
        width_twips: i64 => Int,
        alignment: String => Text,
        style_id: String => Text,
        cell_spacing_twips: i64 => Int,
    }
}

property_record! {
    pub struct TableCellProperties {
        width_twips: i64 => Int,
        vertical_alignment: String => Text,
        shading_color: Color => Color,
        grid_span: i64 => Int,
        vertical_merge: String => Text,
    }
}

property_record! {
    pub struct ImageProperties {
        width_emu: i64 => Int,
        height_emu: i64 => Int,
        rotation_degrees: i64 => Int,
        src_media_id: String => Text,
        alt_text: String => Text,
    }
}

property_record! {
    pub struct HyperlinkProperties {
        href: String => Text,
        tooltip: String => Text,
        anchor: String => Text,
    }
}

property_record! {
    pub struct FieldProperties {
        field_type: String => Text,
        instruction: String => Text,
        cached_result: String => Text,
    }
}

property_record! {
    pub struct ShapeProperties {
        fill_color: Color => Color,
        stroke_color: Color => Color,
        stroke_width_eighths: i64 => Int,
        rotation_degrees: i64 => Int,
    }
}

property_record! {
    pub struct MentionProperties {
        mention_id: String => Text,
        display_text: String => Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::value::{PropertyPatch, PropertyValue};

    #[test]
    fn merged_sets_and_deletes_fields_in_order() {
        let base = RunProperties { bold: Some(false), ..Default::default() };
        let patch = PropertyPatch::new()
            .set("bold", PropertyValue::Bool(true))
            .set("italic", PropertyValue::Bool(true))
            .delete("italic");
        let merged = base.merged(&patch);
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.italic, None);
    }

    #[test]
    fn diff_patch_captures_preimage_for_inversion() {
        let base = RunProperties { bold: Some(true), ..Default::default() };
        let patch = PropertyPatch::new().delete("bold").set("italic", PropertyValue::Bool(true));
        let old = base.diff_patch(&patch);
        assert_eq!(old.0[0], ("bold".to_string(), Some(PropertyValue::Bool(true))));
        assert_eq!(old.0[1], ("italic".to_string(), None));
    }
}
