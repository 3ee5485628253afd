//! Presentation and generated identifiers
//!
//! The presentation of a container lists its explicit, non-hidden traits as
//! `Name=Value` pairs: value traits in declaration order first, then nested
//! containers in declaration order. A container without an explicit id is
//! named after a short code derived from that text, so equal configurations
//! always get the same name.

use crate::container::TraitContainer;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Separator between `Name=Value` pairs
pub const SEPARATOR: &str = ", ";

/// Id of a container with nothing to present
pub const DEFAULT_ID: &str = "DefaultJob";

/// Prefix of generated ids
pub const GENERATED_PREFIX: &str = "Job-";

const GENERATED_LETTERS: usize = 6;

/// `Name=Value` list of the explicit, non-hidden traits in `container`
pub fn presentation(container: &TraitContainer) -> String {
    let mut parts = Vec::new();
    collect(container, &mut parts);
    parts.join(SEPARATOR)
}

fn collect(container: &TraitContainer, parts: &mut Vec<String>) {
    for (slot, field) in container.schema().values().iter().enumerate() {
        if field.is_hidden() {
            continue;
        }
        if let Some(value) = container.value(slot) {
            parts.push(format!("{}={}", field.name(), value));
        }
    }
    for child in container.children() {
        collect(child, parts);
    }
}

/// Explicit id of `container`, or one generated from its presentation
pub fn resolved_id(container: &TraitContainer) -> String {
    match container.id() {
        Some(id) => id.to_string(),
        None => generate_id(&presentation(container)),
    }
}

/// Deterministic id for a presentation string.
///
/// An empty presentation maps to [`DEFAULT_ID`]. Anything else is hashed and
/// the hash seeds a ChaCha12 stream; each of the six letters is the high part
/// of a 32-bit word scaled to `A..=Z`.
pub fn generate_id(presentation: &str) -> String {
    if presentation.is_empty() {
        return DEFAULT_ID.to_string();
    }
    let mut rng = ChaCha12Rng::seed_from_u64(fxhash::hash64(presentation));
    let letters: String = (0..GENERATED_LETTERS)
        .map(|_| {
            let offset = (u64::from(rng.next_u32()) * 26) >> 32;
            char::from(b'A' + offset as u8)
        })
        .collect();
    format!("{GENERATED_PREFIX}{letters}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::testing::{Inner, Probe};

    #[test]
    fn test_presentation_order_and_hidden() {
        let mut probe = Probe::new();
        Inner::LEVEL.set(&mut probe, 2).unwrap();
        probe.set_secret(true).unwrap();
        probe.set_label("x".into()).unwrap();
        probe.set_count(3).unwrap();
        probe.set_id("Named").unwrap();
        assert_eq!(presentation(probe.as_ref()), "Count=3, Label=x, Level=2");
    }

    #[test]
    fn test_presentation_of_empty_container() {
        assert_eq!(presentation(Probe::new().as_ref()), "");
    }

    #[test]
    fn test_generated_id_shape_and_stability() {
        let first = generate_id("Count=3");
        let second = generate_id("Count=3");
        assert_eq!(first, second);
        assert!(first.starts_with(GENERATED_PREFIX));
        let letters = &first[GENERATED_PREFIX.len()..];
        assert_eq!(letters.len(), 6);
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generated_ids_are_pinned() {
        assert_eq!(generate_id("Count=3"), "Job-VNUZRV");
        assert_eq!(
            generate_id("LaunchCount=1, WarmupCount=3, IterationCount=3"),
            "Job-DNLEKY"
        );
        assert_eq!(generate_id("Platform=X64, LaunchCount=1"), "Job-RSLHYH");
    }

    #[test]
    fn test_empty_presentation_is_default_job() {
        assert_eq!(generate_id(""), DEFAULT_ID);
        assert_eq!(resolved_id(Probe::new().as_ref()), DEFAULT_ID);
    }

    #[test]
    fn test_resolved_id_prefers_explicit() {
        let mut probe = Probe::new();
        probe.set_count(3).unwrap();
        assert_eq!(resolved_id(probe.as_ref()), generate_id("Count=3"));
        probe.set_id("Named").unwrap();
        assert_eq!(resolved_id(probe.as_ref()), "Named");
    }

    #[test]
    fn test_equal_presentations_share_an_id() {
        let mut first = Probe::new();
        first.set_count(3).unwrap();
        let mut second = Probe::new();
        second.set_count(3).unwrap().set_secret(true).unwrap();
        assert_eq!(resolved_id(first.as_ref()), resolved_id(second.as_ref()));
    }
}
