//! Trait values
//!
//! Containers store values of many types side by side, so each value is kept
//! behind a small object-safe trait and recovered by downcasting through the
//! typed descriptor that wrote it.

use std::any::Any;
use std::fmt;

/// Types that can be stored in a trait slot.
///
/// `Display` provides the presentation form (`Name=<display>`), so it must be
/// deterministic for equal values.
pub trait TraitValue: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> TraitValue for T where T: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static
{}

trait ErasedValue: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedValue>;
    fn eq_erased(&self, other: &dyn ErasedValue) -> bool;
    fn present(&self) -> String;
}

impl<T: TraitValue> ErasedValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValue> {
        Box::new(self.clone())
    }

    // Values that are not equal to themselves (NaN) still match their own
    // presentation, so a container always equals its copy.
    fn eq_erased(&self, other: &dyn ErasedValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self || other.to_string() == self.to_string())
    }

    fn present(&self) -> String {
        self.to_string()
    }
}

/// A type-erased trait value.
pub struct AnyValue(Box<dyn ErasedValue>);

impl AnyValue {
    /// Wrap a typed value
    pub fn new<T: TraitValue>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Borrow the value as `T`, if that is its type
    pub fn downcast_ref<T: TraitValue>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Presentation text of the value
    pub fn present(&self) -> String {
        self.0.present()
    }
}

impl Clone for AnyValue {
    fn clone(&self) -> Self {
        Self(self.0.clone_boxed())
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_erased(other.0.as_ref())
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.present())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast() {
        let value = AnyValue::new(42u32);
        assert_eq!(value.downcast_ref::<u32>(), Some(&42));
        assert_eq!(value.downcast_ref::<i64>(), None);
    }

    #[test]
    fn test_equality_is_type_aware() {
        assert_eq!(AnyValue::new(1u32), AnyValue::new(1u32));
        assert_ne!(AnyValue::new(1u32), AnyValue::new(2u32));
        // Same presentation, different type
        assert_ne!(AnyValue::new(1u32), AnyValue::new(1i64));
    }

    #[test]
    fn test_nan_equals_its_copy() {
        let nan = AnyValue::new(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(nan, AnyValue::new(0.5f64));
        assert_eq!(AnyValue::new(0.0f64), AnyValue::new(-0.0f64));
    }

    #[test]
    fn test_clone_is_deep() {
        let original = AnyValue::new(String::from("abc"));
        let copy = original.clone();
        assert_eq!(original, copy);
        assert_eq!(copy.present(), "abc");
    }
}
