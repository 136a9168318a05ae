//! Abstract/concrete numbering registries for list formatting (spec §3).
//!
//! A paragraph's `numbering_id`/`numbering_level` properties
//! ([`crate::properties::ParagraphProperties`]) point into a concrete
//! [`NumberingInstance`], which in turn binds to an [`AbstractNumbering`]'s
//! nine levels (spec: numbered lists support up to nine levels, matching the
//! WordprocessingML convention this model is grounded on).

use std::collections::HashMap;

pub const MAX_LEVELS: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    Decimal,
    UpperRoman,
    LowerRoman,
    UpperLetter,
    LowerLetter,
    Bullet,
    None,
}

/// Formatting for a single level of an abstract numbering definition.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberingLevel {
    pub format: NumberFormat,
    /// Text pattern for the rendered number, e.g. `"%1."` or `"%1.%2"`,
    /// where `%N` is a placeholder for the Nth ancestor level's counter.
    pub text_pattern: String,
    pub alignment: String,
    pub indent_twips: i64,
    pub hanging_twips: i64,
    pub start: i64,
}

impl Default for NumberingLevel {
    fn default() -> Self {
        NumberingLevel {
            format: NumberFormat::Decimal,
            text_pattern: "%1.".to_string(),
            alignment: "start".to_string(),
            indent_twips: 720,
            hanging_twips: 360,
            start: 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AbstractNumbering {
    pub id: i64,
    pub levels: [NumberingLevel; MAX_LEVELS],
}

impl AbstractNumbering {
    pub fn new(id: i64) -> Self {
        AbstractNumbering { id, levels: std::array::from_fn(|_| NumberingLevel::default()) }
    }

    pub fn level(&self, level: usize) -> &NumberingLevel {
        &self.levels[level.min(MAX_LEVELS - 1)]
    }
}

/// A concrete instance binds a `numId` (what paragraphs actually reference)
/// to an `abstractNumId`, optionally overriding each level's start value
/// (used when e.g. restarting a numbered list partway through a document).
#[derive(Clone, Debug)]
pub struct NumberingInstance {
    pub num_id: i64,
    pub abstract_num_id: i64,
    pub start_overrides: HashMap<usize, i64>,
}

impl NumberingInstance {
    pub fn new(num_id: i64, abstract_num_id: i64) -> Self {
        NumberingInstance { num_id, abstract_num_id, start_overrides: HashMap::new() }
    }

    pub fn override_start(&mut self, level: usize, start: i64) {
        self.start_overrides.insert(level, start);
    }

    pub fn start_for(&self, abstract_def: &AbstractNumbering, level: usize) -> i64 {
        self.start_overrides.get(&level).copied().unwrap_or_else(|| abstract_def.level(level).start)
    }
}

#[derive(Clone, Debug, Default)]
pub struct NumberingRegistry {
    abstracts: HashMap<i64, AbstractNumbering>,
    instances: HashMap<i64, NumberingInstance>,
}

impl NumberingRegistry {
    pub fn new() -> Self {
        NumberingRegistry::default()
    }

    pub fn insert_abstract(&mut self, definition: AbstractNumbering) {
        self.abstracts.insert(definition.id, definition);
    }

    pub fn insert_instance(&mut self, instance: NumberingInstance) {
        self.instances.insert(instance.num_id, instance);
    }

    pub fn instance(&self, num_id: i64) -> Option<&NumberingInstance> {
        self.instances.get(&num_id)
    }

    pub fn abstract_definition(&self, abstract_num_id: i64) -> Option<&AbstractNumbering> {
        self.abstracts.get(&abstract_num_id)
    }

    /// Resolves `numId`/`level` down to the effective level formatting and
    /// starting counter value, or `None` if either the instance or its
    /// backing abstract definition is missing.
    pub fn resolve(&self, num_id: i64, level: usize) -> Option<(NumberingLevel, i64)> {
        let instance = self.instances.get(&num_id)?;
        let definition = self.abstracts.get(&instance.abstract_num_id)?;
        Some((definition.level(level).clone(), instance.start_for(definition, level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_combines_abstract_format_with_instance_start_override() {
        let mut registry = NumberingRegistry::new();
        let abs = AbstractNumbering::new(1);
        registry.insert_abstract(abs);
        let mut instance = NumberingInstance::new(10, 1);
        instance.override_start(0, 5);
        registry.insert_instance(instance);

        let (level, start) = registry.resolve(10, 0).unwrap();
        assert_eq!(level.format, NumberFormat::Decimal);
        assert_eq!(start, 5);
    }

    #[test]
    fn resolve_falls_back_to_abstract_default_start() {
        let mut registry = NumberingRegistry::new();
        registry.insert_abstract(AbstractNumbering::new(2));
        registry.insert_instance(NumberingInstance::new(20, 2));

        let (_, start) = registry.resolve(20, 3).unwrap();
        assert_eq!(start, 1);
    }

    #[test]
    fn resolve_returns_none_for_unknown_num_id() {
        let registry = NumberingRegistry::new();
        assert!(registry.resolve(99, 0).is_none());
    }
}
