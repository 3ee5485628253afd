//! Value types stored in job traits
//!
//! Every type here displays in its presentation form and parses back from
//! the same text (case-insensitively for enums), so job files and command
//! line options share one syntax.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Error parsing a trait value from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseValueError {
    /// Not a known variant of an enumerated value
    #[error("unknown {kind} `{value}`; expected one of: {expected}")]
    UnknownVariant {
        /// Value type
        kind: &'static str,
        /// Rejected input
        value: String,
        /// Accepted names
        expected: String,
    },

    /// Malformed time interval
    #[error("invalid time interval `{0}`")]
    InvalidInterval(String),

    /// Time interval with an unknown unit suffix
    #[error("unknown time unit `{unit}` in `{value}`")]
    UnknownUnit {
        /// Rejected unit
        unit: String,
        /// Full input
        value: String,
    },

    /// Malformed CPU mask
    #[error("invalid affinity mask `{0}`")]
    InvalidAffinity(String),

    /// Environment variable without `=`
    #[error("invalid environment variable `{0}`; expected KEY=VALUE")]
    InvalidVariable(String),
}

macro_rules! value_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Presentation name
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ParseValueError::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|variant| variant.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

value_enum! {
    /// Target processor architecture
    Platform {
        /// Whatever the host runs
        AnyCpu => "AnyCpu",
        /// 32-bit x86
        X86 => "X86",
        /// 64-bit x86
        X64 => "X64",
        /// 32-bit ARM
        Arm => "Arm",
        /// 64-bit ARM
        Arm64 => "Arm64",
    }
}

impl Platform {
    /// Architecture of the running process
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86" => Platform::X86,
            "x86_64" => Platform::X64,
            "arm" => Platform::Arm,
            "aarch64" => Platform::Arm64,
            _ => Platform::AnyCpu,
        }
    }
}

value_enum! {
    /// Code generator
    Jit {
        /// Runtime default
        Default => "Default",
        /// Legacy generator
        LegacyJit => "LegacyJit",
        /// Current generator
        RyuJit => "RyuJit",
        /// LLVM backend
        Llvm => "Llvm",
    }
}

value_enum! {
    /// Runtime the benchmark runs on
    Runtime {
        /// Same runtime as the host process
        Host => "Host",
        /// Desktop CLR
        Clr => "Clr",
        /// Cross-platform core runtime
        Core => "Core",
        /// Mono
        Mono => "Mono",
        /// Ahead-of-time native build
        NativeAot => "NativeAot",
    }
}

value_enum! {
    /// Operating system power plan requested while benchmarking
    PowerPlan {
        /// Balanced plan
        Balanced => "Balanced",
        /// High performance plan
        HighPerformance => "HighPerformance",
        /// Power saver plan
        PowerSaver => "PowerSaver",
    }
}

value_enum! {
    /// How iterations are scheduled
    RunStrategy {
        /// Many invocations per iteration, steady state
        Throughput => "Throughput",
        /// No pilot or warmup stage, one invocation per iteration
        ColdStart => "ColdStart",
        /// No overhead evaluation, for long-running macro benchmarks
        Monitoring => "Monitoring",
    }
}

impl RunStrategy {
    /// Whether the strategy measures single invocations from a cold start
    pub fn is_single_shot(self) -> bool {
        matches!(self, RunStrategy::ColdStart | RunStrategy::Monitoring)
    }
}

value_enum! {
    /// Which outliers are removed from measurements
    OutlierMode {
        /// Keep every measurement
        DontRemove => "DontRemove",
        /// Remove upper outliers
        RemoveUpper => "RemoveUpper",
        /// Remove lower outliers
        RemoveLower => "RemoveLower",
        /// Remove both
        RemoveAll => "RemoveAll",
    }
}

/// A span of time with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeInterval(Duration);

impl TimeInterval {
    /// Zero length
    pub const ZERO: Self = Self(Duration::ZERO);

    /// From nanoseconds
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(Duration::from_nanos(nanos))
    }

    /// From milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// From seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// As a standard duration
    pub const fn as_duration(self) -> Duration {
        self.0
    }

    /// Whole nanoseconds
    pub const fn as_nanos(self) -> u128 {
        self.0.as_nanos()
    }
}

impl From<Duration> for TimeInterval {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl fmt::Display for TimeInterval {
    /// Largest unit that represents the interval exactly
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        let (value, unit) = match nanos {
            0 => (0, "ns"),
            n if n % 60_000_000_000 == 0 => (n / 60_000_000_000, "m"),
            n if n % 1_000_000_000 == 0 => (n / 1_000_000_000, "s"),
            n if n % 1_000_000 == 0 => (n / 1_000_000, "ms"),
            n if n % 1_000 == 0 => (n / 1_000, "us"),
            n => (n, "ns"),
        };
        write!(f, "{value}{unit}")
    }
}

impl FromStr for TimeInterval {
    type Err = ParseValueError;

    /// Accepts `ns`, `us`, `ms`, `s` and `m`; a bare number is seconds
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseValueError::InvalidInterval(s.to_string()));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| ParseValueError::InvalidInterval(s.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(ParseValueError::InvalidInterval(s.to_string()));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            unit => {
                return Err(ParseValueError::UnknownUnit {
                    unit: unit.to_string(),
                    value: s.to_string(),
                });
            }
        };

        let nanos = (value * multiplier as f64).round();
        if nanos >= u64::MAX as f64 {
            return Err(ParseValueError::InvalidInterval(s.to_string()));
        }
        Ok(Self::from_nanos(nanos as u64))
    }
}

impl<'de> Deserialize<'de> for TimeInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// CPU affinity mask, one bit per logical processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Affinity(u64);

impl Affinity {
    /// From a raw mask
    pub const fn new(mask: u64) -> Self {
        Self(mask)
    }

    /// Mask covering the first `cpus` processors
    pub fn all(cpus: usize) -> Self {
        match cpus {
            0 => Self(0),
            n if n >= 64 => Self(u64::MAX),
            n => Self((1u64 << n) - 1),
        }
    }

    /// Mask covering every processor of the host
    pub fn host() -> Self {
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        Self::all(cpus)
    }

    /// Raw mask
    pub const fn mask(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for Affinity {
    type Err = ParseValueError;

    /// Hex with a `0x` prefix, otherwise decimal
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed
            .map(Self)
            .map_err(|_| ParseValueError::InvalidAffinity(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Affinity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Environment variables set for the benchmark process, sorted by name
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentVariables(BTreeMap<String, String>);

impl EnvironmentVariables {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy with `key` set to `value`, replacing an earlier value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variable is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EnvironmentVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<_> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        f.write_str(&pairs.join(";"))
    }
}

impl FromStr for EnvironmentVariables {
    type Err = ParseValueError;

    /// `KEY=VALUE` pairs separated by `;`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .try_fold(Self::new(), |vars, pair| match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    Ok(vars.with(key.trim(), value.trim()))
                }
                _ => Err(ParseValueError::InvalidVariable(pair.to_string())),
            })
    }
}

/// Extra arguments passed to the benchmark process
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Vec<String>);

impl Arguments {
    /// No arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy with `argument` appended
    pub fn with(mut self, argument: impl Into<String>) -> Self {
        self.0.push(argument.into());
        self
    }

    /// Arguments in order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Whether there are no arguments
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
