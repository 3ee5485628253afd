//! Schema Registry
//!
//! A schema is the static list of traits one mode type declares. It is built
//! once per type (normally inside a `LazyLock`), validated for duplicate
//! names, and shared read-only by every container of that type.

use crate::descriptor::{NestedDescriptor, TraitDescriptor};
use crate::error::{Result, TraitError};
use crate::mode::Mode;
use crate::value::{AnyValue, TraitValue};
use std::fmt;

/// Name of the implicit identifier trait every schema carries
pub const ID_NAME: &str = "Id";

/// Value of the identifier trait when no id was set
pub const FALLBACK_ID: &str = "Default";

/// Slot of the identifier trait in every schema
pub const ID_SLOT: usize = 0;

/// A registered value trait
#[derive(Debug)]
pub struct ValueField {
    name: &'static str,
    hidden: bool,
    ignore_on_merge: bool,
    default: AnyValue,
}

impl ValueField {
    /// Trait name, as shown in presentations
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the trait is excluded from presentation and identity
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether `apply` skips the trait
    pub fn is_ignored_on_merge(&self) -> bool {
        self.ignore_on_merge
    }

    /// Static default of the trait
    pub fn default_value(&self) -> &AnyValue {
        &self.default
    }
}

/// A registered nested-container trait
#[derive(Debug)]
pub struct NestedField {
    name: &'static str,
    schema: &'static Schema,
}

impl NestedField {
    /// Trait name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Schema of the nested container
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }
}

/// Per-type trait registry
pub struct Schema {
    name: &'static str,
    values: Vec<ValueField>,
    nested: Vec<NestedField>,
}

impl Schema {
    /// Start declaring a schema. The `Id` trait is registered first.
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            values: vec![ValueField {
                name: ID_NAME,
                hidden: true,
                ignore_on_merge: true,
                default: AnyValue::new(FALLBACK_ID.to_string()),
            }],
            nested: Vec::new(),
            error: None,
        }
    }

    /// Schema name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Value traits in declaration order (slot order)
    pub fn values(&self) -> &[ValueField] {
        &self.values
    }

    /// Nested traits in declaration order
    pub fn nested(&self) -> &[NestedField] {
        &self.nested
    }

    /// Slot of the value trait called `name`
    pub fn value_slot(&self, name: &str) -> Option<usize> {
        self.values.iter().position(|field| field.name == name)
    }

    /// Slot of the nested trait called `name`
    pub fn nested_slot(&self, name: &str) -> Option<usize> {
        self.nested.iter().position(|field| field.name == name)
    }

    /// Schema identity. Schemas are singletons, so this compares addresses.
    pub fn is(&self, other: &Schema) -> bool {
        std::ptr::eq(self, other)
    }

    /// Whether `other` is this schema or is nested somewhere below it
    pub fn contains(&self, other: &Schema) -> bool {
        self.is(other) || self.nested.iter().any(|field| field.schema.contains(other))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field(
                "values",
                &self.values.iter().map(|v| v.name).collect::<Vec<_>>(),
            )
            .field(
                "nested",
                &self.nested.iter().map(|n| n.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder returned by [`Schema::builder`]
pub struct SchemaBuilder {
    name: &'static str,
    values: Vec<ValueField>,
    nested: Vec<NestedField>,
    error: Option<TraitError>,
}

impl SchemaBuilder {
    /// Register a value trait
    pub fn value<M, T: TraitValue>(mut self, descriptor: &TraitDescriptor<M, T>) -> Self {
        if self.check_unique(descriptor.name()) {
            self.values.push(ValueField {
                name: descriptor.name(),
                hidden: descriptor.is_hidden(),
                ignore_on_merge: descriptor.is_ignored_on_merge(),
                default: AnyValue::new(descriptor.default_value()),
            });
        }
        self
    }

    /// Register a nested-container trait
    pub fn nested<P, C: Mode>(mut self, descriptor: &NestedDescriptor<P, C>) -> Self {
        if self.check_unique(descriptor.name()) {
            self.nested.push(NestedField {
                name: descriptor.name(),
                schema: C::schema(),
            });
        }
        self
    }

    fn check_unique(&mut self, name: &'static str) -> bool {
        let taken = self.values.iter().any(|v| v.name == name)
            || self.nested.iter().any(|n| n.name == name);
        if taken && self.error.is_none() {
            self.error = Some(TraitError::DuplicateDescriptor {
                schema: self.name,
                name,
            });
        }
        !taken
    }

    /// Finish the schema, reporting the first duplicate name
    pub fn build(self) -> Result<Schema> {
        if let Some(error) = self.error {
            return Err(error);
        }
        tracing::trace!(
            schema = self.name,
            values = self.values.len(),
            nested = self.nested.len(),
            "schema registered"
        );
        Ok(Schema {
            name: self.name,
            values: self.values,
            nested: self.nested,
        })
    }

    /// Finish a schema declared in a static initializer.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate descriptor. Schemas are declared in code, so this
    /// fires on first use of the mode type, before any container exists.
    pub fn register(self) -> Schema {
        match self.build() {
            Ok(schema) => schema,
            Err(error) => panic!("invalid trait schema: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Probe, probe_schema};

    #[test]
    fn test_id_is_registered_first() {
        let schema = probe_schema();
        assert_eq!(schema.values()[ID_SLOT].name(), ID_NAME);
        assert!(schema.values()[ID_SLOT].is_hidden());
        assert!(schema.values()[ID_SLOT].is_ignored_on_merge());
    }

    #[test]
    fn test_declaration_order_is_slot_order() {
        let schema = probe_schema();
        let names: Vec<_> = schema.values().iter().map(|v| v.name()).collect();
        assert_eq!(names, ["Id", "Count", "Label", "Secret", "Sticky"]);
        assert_eq!(schema.value_slot("Label"), Some(2));
        assert_eq!(schema.nested_slot("Inner"), Some(0));
    }

    #[test]
    fn test_duplicate_descriptor_is_rejected() {
        let result = Schema::builder("Broken")
            .value(&Probe::COUNT)
            .value(&Probe::COUNT)
            .build();
        assert_eq!(
            result.unwrap_err(),
            TraitError::DuplicateDescriptor {
                schema: "Broken",
                name: "Count"
            }
        );
    }

    #[test]
    fn test_duplicate_of_implicit_id_is_rejected() {
        let id_clash: TraitDescriptor<Probe, String> =
            TraitDescriptor::declare("Id", String::new);
        let result = Schema::builder("Broken").value(&id_clash).build();
        assert!(matches!(
            result,
            Err(TraitError::DuplicateDescriptor { name: "Id", .. })
        ));
    }

    #[test]
    #[should_panic(expected = "invalid trait schema")]
    fn test_register_panics_on_duplicate() {
        let _ = Schema::builder("Broken")
            .value(&Probe::LABEL)
            .value(&Probe::LABEL)
            .register();
    }

    #[test]
    fn test_contains_nested() {
        let outer = probe_schema();
        let inner = outer.nested()[0].schema();
        assert!(outer.contains(inner));
        assert!(outer.contains(outer));
        assert!(!inner.contains(outer));
    }
}
