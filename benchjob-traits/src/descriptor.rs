//! Trait descriptors
//!
//! A descriptor is the typed key for one trait of one mode type. Descriptors
//! hold no state of their own: they are `const` items, and every read or
//! write goes through the schema the mode type registered them in.

use crate::container::TraitContainer;
use crate::error::{Result, TraitError};
use crate::mode::Mode;
use crate::resolver::Resolver;
use crate::value::{AnyValue, TraitValue};
use std::fmt;
use std::marker::PhantomData;

/// Typed key for a value trait owned by mode type `M`
pub struct TraitDescriptor<M, T> {
    name: &'static str,
    default: fn() -> T,
    hidden: bool,
    ignore_on_merge: bool,
    _mode: PhantomData<fn() -> M>,
}

impl<M, T> Clone for TraitDescriptor<M, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, T> Copy for TraitDescriptor<M, T> {}

impl<M, T> fmt::Debug for TraitDescriptor<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraitDescriptor")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("ignore_on_merge", &self.ignore_on_merge)
            .finish()
    }
}

impl<M, T> TraitDescriptor<M, T> {
    /// Declare a trait with a static default
    pub const fn declare(name: &'static str, default: fn() -> T) -> Self {
        Self {
            name,
            default,
            hidden: false,
            ignore_on_merge: false,
            _mode: PhantomData,
        }
    }

    /// Exclude the trait from presentation and identity
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Make `apply` skip the trait
    pub const fn ignore_on_merge(mut self) -> Self {
        self.ignore_on_merge = true;
        self
    }

    /// Trait name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// See [`hidden`](Self::hidden)
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// See [`ignore_on_merge`](Self::ignore_on_merge)
    pub const fn is_ignored_on_merge(&self) -> bool {
        self.ignore_on_merge
    }

    /// Static default value
    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

impl<M: Mode, T: TraitValue> TraitDescriptor<M, T> {
    fn slot(&self) -> Option<usize> {
        M::schema().value_slot(self.name)
    }

    fn mismatch(&self, container: &TraitContainer) -> TraitError {
        TraitError::SchemaMismatch {
            expected: M::schema().name(),
            found: container.schema().name(),
        }
    }

    fn locate<'a>(&self, container: &'a TraitContainer) -> Option<(&'a TraitContainer, usize)> {
        let owner = container.find(M::schema())?;
        Some((owner, self.slot()?))
    }

    fn explicit_value<'a>(&self, container: &'a TraitContainer) -> Option<&'a T> {
        let (owner, slot) = self.locate(container)?;
        owner.value(slot)?.downcast_ref::<T>()
    }

    /// Effective value: the explicit value if set, otherwise the default.
    ///
    /// `container` may be the owning mode itself or any container that nests
    /// it, so `RunMode::LAUNCH_COUNT.get(&job)` reads through the job.
    pub fn get<C>(&self, container: &C) -> T
    where
        C: AsRef<TraitContainer> + ?Sized,
    {
        self.explicit(container)
            .unwrap_or_else(|| self.default_value())
    }

    /// The explicit value, if one is set
    pub fn explicit<C>(&self, container: &C) -> Option<T>
    where
        C: AsRef<TraitContainer> + ?Sized,
    {
        self.explicit_value(container.as_ref()).cloned()
    }

    /// Whether the trait was set explicitly
    pub fn has_value<C>(&self, container: &C) -> bool
    where
        C: AsRef<TraitContainer> + ?Sized,
    {
        self.explicit_value(container.as_ref()).is_some()
    }

    /// Set the trait explicitly.
    ///
    /// Fails with `InvalidState` on a frozen container and with
    /// `SchemaMismatch` when `container` does not hold an `M`.
    pub fn set<C>(&self, container: &mut C, value: T) -> Result<()>
    where
        C: AsMut<TraitContainer> + ?Sized,
    {
        let container = container.as_mut();
        let Some(slot) = self.slot() else {
            return Err(self.mismatch(container));
        };
        let error = self.mismatch(container);
        match container.find_mut(M::schema()) {
            Some(owner) => owner.set_value(slot, AnyValue::new(value)),
            None => Err(error),
        }
    }

    /// Remove the explicit value so the default applies again
    pub fn clear<C>(&self, container: &mut C) -> Result<()>
    where
        C: AsMut<TraitContainer> + ?Sized,
    {
        let container = container.as_mut();
        let Some(slot) = self.slot() else {
            return Err(self.mismatch(container));
        };
        let error = self.mismatch(container);
        match container.find_mut(M::schema()) {
            Some(owner) => owner.clear_value(slot),
            None => Err(error),
        }
    }

    /// Effective value with a resolver consulted before the static default
    pub fn resolve<C>(&self, container: &C, resolver: &dyn Resolver) -> T
    where
        C: AsRef<TraitContainer> + ?Sized,
    {
        let container = container.as_ref();
        if let Some(value) = self.explicit_value(container) {
            return value.clone();
        }
        let resolved = self.locate(container).and_then(|(owner, slot)| {
            let field = &M::schema().values()[slot];
            resolver.resolve(owner, field)
        });
        match resolved {
            Some(value) => match value.downcast_ref::<T>() {
                Some(value) => value.clone(),
                None => {
                    tracing::warn!(
                        schema = M::schema().name(),
                        name = self.name,
                        "resolver returned a value of the wrong type; using the default"
                    );
                    self.default_value()
                }
            },
            None => self.default_value(),
        }
    }
}

/// Typed key for a nested container of mode type `C` inside parent mode `P`
pub struct NestedDescriptor<P, C> {
    name: &'static str,
    _types: PhantomData<fn() -> (P, C)>,
}

impl<P, C> Clone for NestedDescriptor<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for NestedDescriptor<P, C> {}

impl<P, C> fmt::Debug for NestedDescriptor<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

impl<P, C> NestedDescriptor<P, C> {
    /// Declare a nested trait
    pub const fn declare(name: &'static str) -> Self {
        Self {
            name,
            _types: PhantomData,
        }
    }

    /// Trait name
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<P: Mode, C: Mode> NestedDescriptor<P, C> {
    // Every nested descriptor is registered on its parent's schema.
    fn slot(&self) -> usize {
        match P::schema().nested_slot(self.name) {
            Some(slot) => slot,
            None => panic!(
                "nested trait `{}` is not registered on schema {}",
                self.name,
                P::schema().name()
            ),
        }
    }

    /// Borrow the nested container
    pub fn get<'a>(&self, parent: &'a P) -> &'a C {
        C::cast_ref(&parent.as_ref().children()[self.slot()])
    }

    /// Borrow the nested container for modification.
    ///
    /// Fails with `InvalidState` when the parent is frozen.
    pub fn get_mut<'a>(&self, parent: &'a mut P) -> Result<&'a mut C> {
        let slot = self.slot();
        let parent = parent.as_mut();
        if parent.is_frozen() {
            return Err(TraitError::frozen(&*parent));
        }
        Ok(C::cast_mut(&mut parent.children_mut()[slot]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Inner, Probe};

    #[test]
    fn test_get_falls_back_to_default() {
        let probe = Probe::new();
        assert_eq!(Probe::COUNT.get(&probe), 1);
        assert!(!Probe::COUNT.has_value(&probe));
        assert_eq!(Probe::COUNT.explicit(&probe), None);
    }

    #[test]
    fn test_set_and_clear() {
        let mut probe = Probe::new();
        Probe::COUNT.set(&mut probe, 7).unwrap();
        assert_eq!(Probe::COUNT.get(&probe), 7);
        assert!(Probe::COUNT.has_value(&probe));

        Probe::COUNT.clear(&mut probe).unwrap();
        assert_eq!(Probe::COUNT.get(&probe), 1);
        assert!(!Probe::COUNT.has_value(&probe));
    }

    #[test]
    fn test_explicit_default_counts_as_set() {
        let mut probe = Probe::new();
        Probe::COUNT.set(&mut probe, 1).unwrap();
        assert!(Probe::COUNT.has_value(&probe));
    }

    #[test]
    fn test_nested_access_through_parent() {
        let mut probe = Probe::new();
        Inner::LEVEL.set(&mut probe, 3).unwrap();
        assert_eq!(Inner::LEVEL.get(&probe), 3);
        assert_eq!(Probe::INNER.get(&probe).level(), 3);
    }

    #[test]
    fn test_set_on_foreign_schema_is_a_mismatch() {
        let mut inner = Inner::new();
        let err = Probe::COUNT.set(&mut inner, 2).unwrap_err();
        assert_eq!(
            err,
            TraitError::SchemaMismatch {
                expected: "Probe",
                found: "Inner"
            }
        );
        // Reads through an unrelated container see the default
        assert_eq!(Probe::COUNT.get(&inner), 1);
    }

    #[test]
    fn test_set_on_frozen_fails_and_leaves_value() {
        let mut probe = Probe::new();
        probe.set_count(5).unwrap();
        probe.freeze();
        let err = Probe::COUNT.set(&mut probe, 6).unwrap_err();
        assert!(matches!(err, TraitError::InvalidState { .. }));
        assert_eq!(probe.count(), 5);
        assert!(Probe::COUNT.clear(&mut probe).is_err());
        assert!(Probe::INNER.get_mut(&mut probe).is_err());
    }

    #[test]
    fn test_resolve_order() {
        let resolver = |_: &TraitContainer, field: &crate::ValueField| {
            (field.name() == "Count").then(|| AnyValue::new(40u32))
        };
        let mut probe = Probe::new();
        assert_eq!(Probe::COUNT.resolve(&probe, &resolver), 40);
        // Resolver has nothing for Label, so the static default wins
        assert_eq!(Probe::LABEL.resolve(&probe, &resolver), "none");

        probe.set_count(2).unwrap();
        assert_eq!(Probe::COUNT.resolve(&probe, &resolver), 2);
    }

    #[test]
    fn test_resolver_type_mismatch_uses_default() {
        let resolver = |_: &TraitContainer, _: &crate::ValueField| Some(AnyValue::new("x".to_string()));
        let probe = Probe::new();
        assert_eq!(Probe::COUNT.resolve(&probe, &resolver), 1);
    }
}
