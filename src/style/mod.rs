//! Named style registry and `basedOn` inheritance resolution (spec §3, §4.C).
//!
//! A style is a named bundle of paragraph/run/table property patches that a
//! node can reference by id instead of carrying formatting inline. Styles
//! form a `basedOn` chain: resolving a style means walking from its
//! root-most ancestor down to itself, applying each ancestor's properties in
//! order so the most specific style wins field-by-field (the same
//! later-entry-wins rule [`crate::properties::PropertyPatch`] uses).

use crate::properties::{ParagraphProperties, RunProperties, TableProperties};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
    Numbering,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    pub id: String,
    pub name: String,
    pub kind: Option<StyleKind>,
    pub based_on: Option<String>,
    pub next: Option<String>,
    pub is_default: bool,
    pub paragraph_properties: ParagraphProperties,
    pub run_properties: RunProperties,
    pub table_properties: TableProperties,
}

impl Style {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: StyleKind) -> Self {
        Style { id: id.into(), name: name.into(), kind: Some(kind), ..Default::default() }
    }
}

/// The resolved, flattened formatting a style contributes once its whole
/// `basedOn` chain has been folded in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedStyle {
    pub paragraph_properties: ParagraphProperties,
    pub run_properties: RunProperties,
    pub table_properties: TableProperties,
}

#[derive(Clone, Debug, Default)]
pub struct StyleRegistry {
    styles: HashMap<String, Style>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        StyleRegistry::default()
    }

    /// Inserts or replaces a style. Enforces at most one default per kind
    /// (spec §3): inserting a second default of the same kind clears the
    /// `is_default` flag on the previous holder.
    pub fn insert(&mut self, style: Style) {
        if style.is_default {
            if let Some(kind) = style.kind {
                for existing in self.styles.values_mut() {
                    if existing.kind == Some(kind) && existing.id != style.id {
                        existing.is_default = false;
                    }
                }
            }
        }
        self.styles.insert(style.id.clone(), style);
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    pub fn default_for(&self, kind: StyleKind) -> Option<&Style> {
        self.styles.values().find(|s| s.is_default && s.kind == Some(kind))
    }

    /// Resolves `id`'s full `basedOn` chain into a flattened
    /// [`ResolvedStyle`]. Cycles are broken with a visited set: a style that
    /// reappears in its own ancestry is treated as having no further base,
    /// which guarantees termination (spec §8 property 5) even on malformed
    /// input rather than looping or erroring.
    pub fn resolve(&self, id: &str) -> ResolvedStyle {
        let mut chain = Vec::new();
        let mut visited = std::collections::HashSet::new();
        let mut current = Some(id.to_string());
        while let Some(current_id) = current {
            if !visited.insert(current_id.clone()) {
                break;
            }
            match self.styles.get(&current_id) {
                Some(style) => {
                    chain.push(style);
                    current = style.based_on.clone();
                }
                None => break,
            }
        }
        let mut resolved = ResolvedStyle::default();
        for style in chain.into_iter().rev() {
            resolved.paragraph_properties =
                merge_paragraph(&resolved.paragraph_properties, &style.paragraph_properties);
            resolved.run_properties = merge_run(&resolved.run_properties, &style.run_properties);
            resolved.table_properties =
                merge_table(&resolved.table_properties, &style.table_properties);
        }
        resolved
    }
}

fn merge_paragraph(base: &ParagraphProperties, overlay: &ParagraphProperties) -> ParagraphProperties {
    base.merged(&crate::properties::PropertyPatch::from_fields(overlay.fields()))
}

fn merge_run(base: &RunProperties, overlay: &RunProperties) -> RunProperties {
    base.merged(&crate::properties::PropertyPatch::from_fields(overlay.fields()))
}

fn merge_table(base: &TableProperties, overlay: &TableProperties) -> TableProperties {
    base.merged(&crate::properties::PropertyPatch::from_fields(overlay.fields()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{PropertyPatch, PropertyValue};

    #[test]
    fn resolve_applies_based_on_chain_in_root_to_leaf_order() {
        let mut registry = StyleRegistry::new();
        let mut base = Style::new("Normal", "Normal", StyleKind::Paragraph);
        base.run_properties = base.run_properties.merged(&PropertyPatch::new().set("font_family", PropertyValue::Text("Calibri".into())));
        registry.insert(base);

        let mut heading = Style::new("Heading1", "Heading 1", StyleKind::Paragraph);
        heading.based_on = Some("Normal".to_string());
        heading.run_properties = heading.run_properties.merged(&PropertyPatch::new().set("bold", PropertyValue::Bool(true)));
        registry.insert(heading);

        let resolved = registry.resolve("Heading1");
        assert_eq!(resolved.run_properties.font_family, Some("Calibri".to_string()));
        assert_eq!(resolved.run_properties.bold, Some(true));
    }

    #[test]
    fn resolve_terminates_on_cyclic_based_on() {
        let mut registry = StyleRegistry::new();
        let mut a = Style::new("A", "A", StyleKind::Paragraph);
        a.based_on = Some("B".to_string());
        let mut b = Style::new("B", "B", StyleKind::Paragraph);
        b.based_on = Some("A".to_string());
        registry.insert(a);
        registry.insert(b);

        let _ = registry.resolve("A");
    }

    #[test]
    fn insert_enforces_single_default_per_kind() {
        let mut registry = StyleRegistry::new();
        let mut first = Style::new("A", "A", StyleKind::Paragraph);
        first.is_default = true;
        registry.insert(first);
        let mut second = Style::new("B", "B", StyleKind::Paragraph);
        second.is_default = true;
        registry.insert(second);

        assert!(!registry.get("A").unwrap().is_default);
        assert!(registry.get("B").unwrap().is_default);
    }

    #[test]
    fn numbering_default_is_tracked_independently_of_paragraph_default() {
        let mut registry = StyleRegistry::new();
        let mut paragraph_default = Style::new("Normal", "Normal", StyleKind::Paragraph);
        paragraph_default.is_default = true;
        registry.insert(paragraph_default);
        let mut numbering_default = Style::new("ListParagraph", "List Paragraph", StyleKind::Numbering);
        numbering_default.is_default = true;
        registry.insert(numbering_default);

        assert_eq!(registry.default_for(StyleKind::Paragraph).unwrap().id, "Normal");
        assert_eq!(registry.default_for(StyleKind::Numbering).unwrap().id, "ListParagraph");
    }
}
