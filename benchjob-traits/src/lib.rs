#![warn(missing_docs)]
//! Benchjob Traits - Sparse Typed Configuration Containers
//!
//! Hierarchical configuration objects whose fields ("traits") are declared
//! once per type, stored sparsely, and layered by overlaying explicit values.
//! Containers can be frozen, which turns every later mutation into an error.
//! Unset traits fall back to a pluggable resolver and then to a static
//! default.

mod comparer;
mod container;
mod descriptor;
mod error;
mod identity;
mod mode;
mod resolver;
mod schema;
#[cfg(test)]
mod testing;
mod value;

pub use comparer::{OrderPolicy, TraitComparer, numeric_cmp};
pub use container::TraitContainer;
pub use descriptor::{NestedDescriptor, TraitDescriptor};
pub use error::{Result, TraitError};
pub use identity::{DEFAULT_ID, GENERATED_PREFIX, SEPARATOR, generate_id, presentation, resolved_id};
pub use mode::{Frozen, Mode};
pub use resolver::{NoResolver, Resolver, ResolverChain};
pub use schema::{FALLBACK_ID, ID_NAME, ID_SLOT, NestedField, Schema, SchemaBuilder, ValueField};
pub use value::{AnyValue, TraitValue};
