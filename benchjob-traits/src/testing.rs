//! Small mode types shared by the unit tests

#![allow(dead_code)]

use crate::{NestedDescriptor, Schema, declare_mode, define_traits};
use std::sync::LazyLock;

static INNER_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| Inner::register_traits(Schema::builder("Inner")).register());

static PROBE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Probe::register_traits(Schema::builder("Probe"))
        .nested(&Probe::INNER)
        .register()
});

static LOOSE_SCHEMA: LazyLock<Schema> =
    LazyLock::new(|| Loose::register_traits(Schema::builder("Loose")).register());

declare_mode! {
    pub(crate) struct Inner => &INNER_SCHEMA;
}

define_traits! {
    Inner {
        LEVEL("Level"): u32 = 0 => level, set_level;
    }
}

declare_mode! {
    pub(crate) struct Probe => &PROBE_SCHEMA;
}

define_traits! {
    Probe {
        COUNT("Count"): u32 = 1 => count, set_count;
        LABEL("Label"): String = String::from("none") => label, set_label;
        SECRET("Secret", hidden): bool = false => secret, set_secret;
        STICKY("Sticky", ignore_on_merge): bool = false => sticky, set_sticky;
    }
}

impl Probe {
    pub(crate) const INNER: NestedDescriptor<Probe, Inner> = NestedDescriptor::declare("Inner");
}

declare_mode! {
    pub(crate) struct Loose => &LOOSE_SCHEMA;
}

define_traits! {
    Loose {
        FLAG("Flag"): bool = false => flag, set_flag;
    }
}

pub(crate) fn probe_schema() -> &'static Schema {
    &PROBE_SCHEMA
}
