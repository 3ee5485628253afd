//! Typed mode containers
//!
//! A mode is a `#[repr(transparent)]` wrapper around [`TraitContainer`] bound
//! to one schema. [`declare_mode!`] generates the wrapper and [`Mode`] impl;
//! [`define_traits!`] generates descriptor constants plus typed accessors.

use crate::container::TraitContainer;
use crate::descriptor::TraitDescriptor;
use crate::error::Result;
use crate::identity;
use crate::schema::Schema;
use crate::value::TraitValue;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A typed view over a [`TraitContainer`] of one schema
pub trait Mode: AsRef<TraitContainer> + AsMut<TraitContainer> + Clone + Sized {
    /// Schema every container of this type is built from
    fn schema() -> &'static Schema;

    /// Wrap a container built from [`Mode::schema`]
    fn from_container(container: TraitContainer) -> Self;

    /// Reinterpret a container reference. The schema must match.
    fn cast_ref(container: &TraitContainer) -> &Self;

    /// Reinterpret a mutable container reference. The schema must match.
    fn cast_mut(container: &mut TraitContainer) -> &mut Self;

    /// Empty, mutable instance
    fn fresh() -> Self {
        Self::from_container(TraitContainer::new(Self::schema()))
    }

    /// Whether `descriptor` has an explicit value here (or in a nested container)
    fn has_value<N: Mode, T: TraitValue>(&self, descriptor: &TraitDescriptor<N, T>) -> bool {
        descriptor.has_value(self.as_ref())
    }

    /// Whether any non-hidden trait is set
    fn has_changes(&self) -> bool {
        self.as_ref().has_changes()
    }

    /// Explicit id
    fn id(&self) -> Option<&str> {
        self.as_ref().id()
    }

    /// Set the id. An empty id clears it.
    fn set_id(&mut self, id: impl Into<String>) -> Result<&mut Self> {
        self.as_mut().set_id(id)?;
        Ok(self)
    }

    /// Explicit id, or one generated from the presentation
    fn resolved_id(&self) -> String {
        identity::resolved_id(self.as_ref())
    }

    /// `Name=Value` list of explicit, non-hidden traits
    fn presentation(&self) -> String {
        self.as_ref().presentation()
    }

    /// Whether the container rejects mutation
    fn is_frozen(&self) -> bool {
        self.as_ref().is_frozen()
    }

    /// Freeze in place, nested containers included. Idempotent.
    fn freeze(&mut self) -> &mut Self {
        self.as_mut().freeze();
        self
    }

    /// Freeze and move into a shared immutable handle
    fn into_frozen(mut self) -> Frozen<Self> {
        self.freeze();
        Frozen(Arc::new(self))
    }

    /// Mutable deep copy without the id
    fn unfreeze_copy(&self) -> Self {
        Self::from_container(self.as_ref().unfreeze_copy())
    }

    /// Overlay the explicit traits of `source`. See [`TraitContainer::apply`].
    fn apply<S>(&mut self, source: &S) -> Result<&mut Self>
    where
        S: AsRef<TraitContainer> + ?Sized,
    {
        self.as_mut().apply(source.as_ref())?;
        Ok(self)
    }

    /// Overlay the explicit traits of `source` without adopting its id
    fn apply_traits<S>(&mut self, source: &S) -> Result<&mut Self>
    where
        S: AsRef<TraitContainer> + ?Sized,
    {
        self.as_mut().apply_traits(source.as_ref())?;
        Ok(self)
    }
}

/// Shared handle to a frozen mode.
///
/// Freezing a `Frozen` again hands back the same allocation.
pub struct Frozen<M>(Arc<M>);

impl<M: Mode> Frozen<M> {
    /// Same instance
    pub fn freeze(&self) -> Self {
        Self(Arc::clone(&self.0))
    }

    /// Mutable deep copy without the id
    pub fn unfreeze_copy(&self) -> M {
        self.0.unfreeze_copy()
    }

    /// Owned clone of the frozen mode; it stays frozen
    pub fn to_mode(&self) -> M {
        M::clone(&self.0)
    }

    /// Whether both handles share one instance
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl<M> Clone for Frozen<M> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<M> Deref for Frozen<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.0
    }
}

impl<M: Mode> AsRef<TraitContainer> for Frozen<M> {
    fn as_ref(&self) -> &TraitContainer {
        M::as_ref(&self.0)
    }
}

impl<M: PartialEq> PartialEq for Frozen<M> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl<M: fmt::Debug> fmt::Debug for Frozen<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frozen").field(&self.0).finish()
    }
}

impl<M: fmt::Display> fmt::Display for Frozen<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Declare a mode type over a schema.
///
/// ```ignore
/// declare_mode! {
///     /// Launch and iteration counts
///     pub struct RunMode => &RUN_SCHEMA;
/// }
/// ```
///
/// The schema expression must evaluate to a `&'static Schema` (a reference to
/// a `LazyLock<Schema>` static works through deref).
#[macro_export]
macro_rules! declare_mode {
    ($(#[$meta:meta])* $vis:vis struct $name:ident => $schema:expr;) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq)]
        #[repr(transparent)]
        $vis struct $name($crate::TraitContainer);

        impl $crate::Mode for $name {
            fn schema() -> &'static $crate::Schema {
                $schema
            }

            fn from_container(container: $crate::TraitContainer) -> Self {
                debug_assert!(container.schema().is(<Self as $crate::Mode>::schema()));
                Self(container)
            }

            fn cast_ref(container: &$crate::TraitContainer) -> &Self {
                debug_assert!(container.schema().is(<Self as $crate::Mode>::schema()));
                // SAFETY: `Self` is a `#[repr(transparent)]` wrapper around `TraitContainer`.
                unsafe { &*(container as *const $crate::TraitContainer as *const Self) }
            }

            fn cast_mut(container: &mut $crate::TraitContainer) -> &mut Self {
                debug_assert!(container.schema().is(<Self as $crate::Mode>::schema()));
                // SAFETY: `Self` is a `#[repr(transparent)]` wrapper around `TraitContainer`.
                unsafe { &mut *(container as *mut $crate::TraitContainer as *mut Self) }
            }
        }

        impl ::std::convert::AsRef<$crate::TraitContainer> for $name {
            fn as_ref(&self) -> &$crate::TraitContainer {
                &self.0
            }
        }

        impl ::std::convert::AsMut<$crate::TraitContainer> for $name {
            fn as_mut(&mut self) -> &mut $crate::TraitContainer {
                &mut self.0
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                <Self as $crate::Mode>::fresh()
            }
        }

        impl $name {
            /// Empty, mutable instance
            #[must_use]
            pub fn new() -> Self {
                <Self as $crate::Mode>::fresh()
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

/// Declare the value traits of a mode type.
///
/// Each line yields a descriptor constant, a getter returning the effective
/// value and a setter. Flags after the name are `hidden` and
/// `ignore_on_merge`. A private `register_traits` helper feeds the
/// descriptors to a [`SchemaBuilder`](crate::SchemaBuilder) in declaration
/// order.
///
/// ```ignore
/// define_traits! {
///     RunMode {
///         /// Number of processes to launch
///         LAUNCH_COUNT("LaunchCount"): u32 = 0 => launch_count, set_launch_count;
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_traits {
    (
        $mode:ident {
            $(
                $(#[$doc:meta])*
                $konst:ident ($name:literal $(, $flag:ident)*): $ty:ty = $default:expr
                    => $getter:ident, $setter:ident;
            )*
        }
    ) => {
        impl $mode {
            $(
                #[doc = concat!("Descriptor of the `", $name, "` trait")]
                pub const $konst: $crate::TraitDescriptor<$mode, $ty> =
                    $crate::TraitDescriptor::declare($name, || $default) $(.$flag())*;
            )*

            $(
                $(#[$doc])*
                pub fn $getter(&self) -> $ty {
                    Self::$konst.get(self)
                }

                #[doc = concat!("Set `", $name, "` explicitly")]
                pub fn $setter(&mut self, value: $ty) -> $crate::Result<&mut Self> {
                    Self::$konst.set(&mut *self, value)?;
                    Ok(self)
                }
            )*

            fn register_traits(builder: $crate::SchemaBuilder) -> $crate::SchemaBuilder {
                builder $(.value(&Self::$konst))*
            }
        }
    };
}
