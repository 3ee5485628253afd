//! Trait model errors

use thiserror::Error;

/// Result alias for trait container operations
pub type Result<T> = std::result::Result<T, TraitError>;

/// Errors raised by descriptors, schemas and containers.
///
/// None of these are recoverable input errors: each one marks a call that
/// broke the container contract. The failing call leaves the container
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TraitError {
    /// A mutation was attempted on a frozen container.
    #[error("{container} is frozen; create a copy with unfreeze_copy() to modify it")]
    InvalidState {
        /// Display form of the frozen container
        container: String,
    },

    /// Two containers (or a descriptor and a container) of unrelated schemas were combined.
    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Schema the operation required
        expected: &'static str,
        /// Schema it was given
        found: &'static str,
    },

    /// A schema declared two descriptors with the same name.
    #[error("descriptor `{name}` is declared more than once on schema {schema}")]
    DuplicateDescriptor {
        /// Schema being registered
        schema: &'static str,
        /// Repeated descriptor name
        name: &'static str,
    },
}

impl TraitError {
    pub(crate) fn frozen(container: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            container: container.to_string(),
        }
    }
}
