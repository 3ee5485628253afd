//! Trait containers
//!
//! A [`TraitContainer`] is the untyped storage behind every mode type: a
//! sparse map of explicit values keyed by schema slot, one child container
//! per nested trait, and a frozen flag. Typed modes are transparent wrappers
//! around it (see [`declare_mode!`](crate::declare_mode)).

use crate::error::{Result, TraitError};
use crate::identity;
use crate::resolver::Resolver;
use crate::schema::{FALLBACK_ID, ID_SLOT, Schema};
use crate::value::AnyValue;
use fxhash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyMode {
    /// Every explicit value except the id
    All,
    /// Skip traits marked ignore-on-merge
    Merge,
}

/// Sparse, schema-driven storage of explicit trait values
#[derive(Clone)]
pub struct TraitContainer {
    schema: &'static Schema,
    values: FxHashMap<usize, AnyValue>,
    children: Vec<TraitContainer>,
    frozen: bool,
}

impl TraitContainer {
    /// Empty, mutable container. Nested containers are created eagerly.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: FxHashMap::default(),
            children: schema
                .nested()
                .iter()
                .map(|field| TraitContainer::new(field.schema()))
                .collect(),
            frozen: false,
        }
    }

    /// Schema this container was built from
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Whether the container rejects mutation
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Nested containers, in declaration order
    pub fn children(&self) -> &[TraitContainer] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [TraitContainer] {
        &mut self.children
    }

    /// This container or the first nested one built from `schema`
    pub fn find(&self, schema: &Schema) -> Option<&TraitContainer> {
        if self.schema.is(schema) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(schema))
    }

    /// Mutable variant of [`find`](Self::find)
    pub fn find_mut(&mut self, schema: &Schema) -> Option<&mut TraitContainer> {
        if self.schema.is(schema) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(schema))
    }

    /// Explicit value in `slot`
    pub fn value(&self, slot: usize) -> Option<&AnyValue> {
        self.values.get(&slot)
    }

    /// Explicit value in `slot`, or the field default
    pub fn value_or_default(&self, slot: usize) -> &AnyValue {
        match self.values.get(&slot) {
            Some(value) => value,
            None => self.schema.values()[slot].default_value(),
        }
    }

    /// Explicit value, then `resolver`, then the field default
    pub fn resolve_value(&self, slot: usize, resolver: &dyn Resolver) -> AnyValue {
        if let Some(value) = self.values.get(&slot) {
            return value.clone();
        }
        let field = &self.schema.values()[slot];
        resolver
            .resolve(self, field)
            .unwrap_or_else(|| field.default_value().clone())
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(TraitError::frozen(self));
        }
        Ok(())
    }

    // A child can be frozen on its own through a typed handle.
    fn any_frozen(&self) -> bool {
        self.frozen || self.children.iter().any(TraitContainer::any_frozen)
    }

    pub(crate) fn set_value(&mut self, slot: usize, value: AnyValue) -> Result<()> {
        self.ensure_mutable()?;
        self.values.insert(slot, value);
        Ok(())
    }

    pub(crate) fn clear_value(&mut self, slot: usize) -> Result<()> {
        self.ensure_mutable()?;
        self.values.remove(&slot);
        Ok(())
    }

    /// Explicit id
    pub fn id(&self) -> Option<&str> {
        self.values
            .get(&ID_SLOT)
            .and_then(|value| value.downcast_ref::<String>())
            .map(String::as_str)
    }

    /// Whether an id was set explicitly
    pub fn has_id(&self) -> bool {
        self.values.contains_key(&ID_SLOT)
    }

    /// Set the id. An empty id clears it.
    pub fn set_id(&mut self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        if id.is_empty() {
            return self.clear_value(ID_SLOT);
        }
        self.set_value(ID_SLOT, AnyValue::new(id))
    }

    /// Whether any non-hidden trait in the tree has an explicit value
    pub fn has_changes(&self) -> bool {
        let presentable = self
            .values
            .keys()
            .any(|slot| !self.schema.values()[*slot].is_hidden());
        presentable || self.children.iter().any(TraitContainer::has_changes)
    }

    /// Number of explicit values in the tree
    pub fn explicit_count(&self) -> usize {
        self.values.len() + self.children.iter().map(TraitContainer::explicit_count).sum::<usize>()
    }

    /// Freeze the tree. Idempotent.
    pub fn freeze(&mut self) -> &mut Self {
        if !self.frozen || self.children.iter().any(|child| !child.frozen) {
            self.frozen = true;
            for child in &mut self.children {
                child.freeze();
            }
        }
        self
    }

    /// Mutable deep copy carrying every explicit value except the id
    pub fn unfreeze_copy(&self) -> Self {
        let mut copy = TraitContainer::new(self.schema);
        copy.copy_traits(self, CopyMode::All);
        copy
    }

    /// Overlay the explicit values of `source` onto this container.
    ///
    /// Traits marked ignore-on-merge are skipped. The source id is adopted
    /// only when both sides share a schema and this container has no id of
    /// its own. `source` may be this container's schema, a container nesting
    /// it, or a container nested inside it; anything else is a
    /// `SchemaMismatch`. Fails before touching anything.
    pub fn apply(&mut self, source: &TraitContainer) -> Result<&mut Self> {
        self.apply_with(source, true)
    }

    /// [`apply`](Self::apply) without adopting the source id
    pub fn apply_traits(&mut self, source: &TraitContainer) -> Result<&mut Self> {
        self.apply_with(source, false)
    }

    fn apply_with(&mut self, source: &TraitContainer, adopt_id: bool) -> Result<&mut Self> {
        if self.any_frozen() {
            return Err(TraitError::frozen(&*self));
        }
        if self.schema.is(source.schema) {
            if adopt_id && !self.has_id() {
                if let Some(id) = source.values.get(&ID_SLOT) {
                    self.values.insert(ID_SLOT, id.clone());
                }
            }
            self.copy_traits(source, CopyMode::Merge);
        } else if let Some(inner) = source.find(self.schema) {
            self.copy_traits(inner, CopyMode::Merge);
        } else if self.schema.contains(source.schema) {
            if let Some(target) = self.find_mut(source.schema) {
                target.copy_traits(source, CopyMode::Merge);
            }
        } else {
            return Err(TraitError::SchemaMismatch {
                expected: self.schema.name(),
                found: source.schema.name(),
            });
        }
        tracing::trace!(
            target_schema = self.schema.name(),
            source_schema = source.schema.name(),
            "applied traits"
        );
        Ok(self)
    }

    // Both sides must share a schema; slots and children line up.
    fn copy_traits(&mut self, source: &TraitContainer, mode: CopyMode) {
        debug_assert!(self.schema.is(source.schema));
        for (slot, field) in self.schema.values().iter().enumerate() {
            if slot == ID_SLOT || (mode == CopyMode::Merge && field.is_ignored_on_merge()) {
                continue;
            }
            if let Some(value) = source.values.get(&slot) {
                self.values.insert(slot, value.clone());
            }
        }
        for (child, source_child) in self.children.iter_mut().zip(&source.children) {
            child.copy_traits(source_child, mode);
        }
    }

    /// `Name=Value` list of explicit, non-hidden traits
    pub fn presentation(&self) -> String {
        identity::presentation(self)
    }
}

impl PartialEq for TraitContainer {
    /// Same schema and the same effective value for every non-hidden trait
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if !self.schema.is(other.schema) {
            return false;
        }
        let values_match = self
            .schema
            .values()
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.is_hidden())
            .all(|(slot, _)| self.value_or_default(slot) == other.value_or_default(slot));
        values_match && self.children == other.children
    }
}

impl fmt::Debug for TraitContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraitContainer")
            .field("schema", &self.schema.name())
            .field("id", &self.id())
            .field("traits", &self.presentation())
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl fmt::Display for TraitContainer {
    /// The explicit id, else the presentation, else `Default`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = self.id() {
            return f.write_str(id);
        }
        let presentation = self.presentation();
        if presentation.is_empty() {
            f.write_str(FALLBACK_ID)
        } else {
            f.write_str(&presentation)
        }
    }
}

impl AsRef<TraitContainer> for TraitContainer {
    fn as_ref(&self) -> &TraitContainer {
        self
    }
}

impl AsMut<TraitContainer> for TraitContainer {
    fn as_mut(&mut self) -> &mut TraitContainer {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::testing::{Inner, Probe};

    #[test]
    fn test_new_container_is_empty() {
        let probe = Probe::new();
        assert!(!probe.as_ref().has_changes());
        assert_eq!(probe.as_ref().explicit_count(), 0);
        assert_eq!(probe.as_ref().children().len(), 1);
        assert_eq!(probe.to_string(), "Default");
    }

    #[test]
    fn test_freeze_is_recursive_and_idempotent() {
        let mut probe = Probe::new();
        probe.freeze();
        probe.freeze();
        assert!(probe.is_frozen());
        assert!(Probe::INNER.get(&probe).is_frozen());
        assert!(Inner::LEVEL.set(&mut probe, 1).is_err());
    }

    #[test]
    fn test_unfreeze_copy_drops_id_and_keeps_traits() {
        let mut probe = Probe::new();
        probe.set_id("Mine").unwrap();
        probe.set_count(4).unwrap().set_sticky(true).unwrap();
        Inner::LEVEL.set(&mut probe, 9).unwrap();
        probe.freeze();

        let copy = probe.unfreeze_copy();
        assert!(!copy.is_frozen());
        assert!(!Probe::INNER.get(&copy).is_frozen());
        assert_eq!(copy.id(), None);
        assert_eq!(copy.count(), 4);
        assert!(copy.sticky());
        assert_eq!(Probe::INNER.get(&copy).level(), 9);
        assert!(probe.is_frozen());
    }

    #[test]
    fn test_apply_overlays_explicit_values_only() {
        let mut target = Probe::new();
        target.set_count(2).unwrap().set_label("kept".into()).unwrap();

        let mut source = Probe::new();
        source.set_count(3).unwrap();
        Inner::LEVEL.set(&mut source, 5).unwrap();

        target.apply(&source).unwrap();
        assert_eq!(target.count(), 3);
        assert_eq!(target.label(), "kept");
        assert_eq!(Probe::INNER.get(&target).level(), 5);
    }

    #[test]
    fn test_apply_skips_ignore_on_merge() {
        let mut source = Probe::new();
        source.set_sticky(true).unwrap();
        let mut target = Probe::new();
        target.apply(&source).unwrap();
        assert!(!Probe::STICKY.has_value(&target));
    }

    #[test]
    fn test_apply_adopts_id_only_when_missing() {
        let mut source = Probe::new();
        source.set_id("Source").unwrap();

        let mut anonymous = Probe::new();
        anonymous.apply(&source).unwrap();
        assert_eq!(anonymous.id(), Some("Source"));

        let mut named = Probe::new();
        named.set_id("Named").unwrap();
        named.apply(&source).unwrap();
        assert_eq!(named.id(), Some("Named"));

        let mut plain = Probe::new();
        plain.as_mut().apply_traits(source.as_ref()).unwrap();
        assert_eq!(plain.id(), None);
    }

    #[test]
    fn test_apply_between_parent_and_nested() {
        let mut inner = Inner::new();
        inner.set_level(8).unwrap();

        let mut probe = Probe::new();
        probe.apply(&inner).unwrap();
        assert_eq!(Probe::INNER.get(&probe).level(), 8);

        let mut extracted = Inner::new();
        extracted.apply(&probe).unwrap();
        assert_eq!(extracted.level(), 8);
    }

    #[test]
    fn test_apply_to_frozen_fails_without_changes() {
        let mut target = Probe::new();
        target.set_count(2).unwrap();
        target.freeze();
        let mut source = Probe::new();
        source.set_count(3).unwrap();

        let err = target.apply(&source).unwrap_err();
        assert!(matches!(err, TraitError::InvalidState { .. }));
        assert_eq!(target.count(), 2);
    }

    #[test]
    fn test_apply_rejects_frozen_child() {
        let mut target = Probe::new();
        Probe::INNER.get_mut(&mut target).unwrap().freeze();
        let mut source = Probe::new();
        source.set_count(3).unwrap();

        assert!(target.apply(&source).is_err());
        assert!(!Probe::COUNT.has_value(&target));
    }

    #[test]
    fn test_apply_unrelated_schema_is_a_mismatch() {
        let mut first = Inner::new();
        let other = crate::testing::Loose::new();
        let err = first.apply(&other).unwrap_err();
        assert_eq!(
            err,
            TraitError::SchemaMismatch {
                expected: "Inner",
                found: "Loose"
            }
        );
    }

    #[test]
    fn test_equality_uses_effective_values() {
        let plain = Probe::new();
        let mut explicit_default = Probe::new();
        explicit_default.set_count(1).unwrap();
        assert_eq!(plain, explicit_default);

        let mut different = Probe::new();
        different.set_count(2).unwrap();
        assert_ne!(plain, different);
    }

    #[test]
    fn test_equality_ignores_hidden_traits() {
        let mut first = Probe::new();
        first.set_secret(true).unwrap();
        first.set_id("A").unwrap();
        let mut second = Probe::new();
        second.set_id("B").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_has_changes_ignores_hidden() {
        let mut probe = Probe::new();
        probe.set_id("Named").unwrap().set_secret(true).unwrap();
        assert!(!probe.has_changes());
        Inner::LEVEL.set(&mut probe, 1).unwrap();
        assert!(probe.has_changes());
    }

    #[test]
    fn test_empty_id_clears() {
        let mut probe = Probe::new();
        probe.set_id("X").unwrap();
        probe.set_id("").unwrap();
        assert!(!probe.as_ref().has_id());
    }

    #[test]
    fn test_display_prefers_id_then_presentation() {
        let mut probe = Probe::new();
        probe.set_count(3).unwrap();
        assert_eq!(probe.to_string(), "Count=3");
        probe.set_id("Named").unwrap();
        assert_eq!(probe.to_string(), "Named");
    }
}
