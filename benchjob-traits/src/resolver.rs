//! Fallback resolution
//!
//! A [`Resolver`] supplies values for traits that were never set, ahead of
//! the static default. Resolvers are asked in order; the first answer wins.

use crate::container::TraitContainer;
use crate::schema::ValueField;
use crate::value::AnyValue;

/// Supplies a fallback value for an unset trait
pub trait Resolver: Send + Sync {
    /// Value for `field` of `container`, or `None` to defer
    fn resolve(&self, container: &TraitContainer, field: &ValueField) -> Option<AnyValue>;
}

impl<F> Resolver for F
where
    F: Fn(&TraitContainer, &ValueField) -> Option<AnyValue> + Send + Sync,
{
    fn resolve(&self, container: &TraitContainer, field: &ValueField) -> Option<AnyValue> {
        self(container, field)
    }
}

/// Resolver that never answers, leaving every trait at its static default
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve(&self, _: &TraitContainer, _: &ValueField) -> Option<AnyValue> {
        None
    }
}

/// Ordered list of resolvers
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverChain {
    /// Empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver, builder style
    pub fn with(mut self, resolver: impl Resolver + 'static) -> Self {
        self.push(resolver);
        self
    }

    /// Append a resolver
    pub fn push(&mut self, resolver: impl Resolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Number of resolvers
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain")
            .field("len", &self.resolvers.len())
            .finish()
    }
}

impl Resolver for ResolverChain {
    fn resolve(&self, container: &TraitContainer, field: &ValueField) -> Option<AnyValue> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(container, field))
    }
}
