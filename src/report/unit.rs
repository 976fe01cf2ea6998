//! Conversion from native nanoseconds to a display unit.

use serde::Serialize;
use std::time::Duration;

/// A display unit: `display = native_ns * scale`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayUnit {
    pub name: String,
    pub scale: f64,
}

impl DisplayUnit {
    pub fn new(name: impl Into<String>, scale: f64) -> Self {
        Self {
            name: name.into(),
            scale,
        }
    }

    pub fn nanoseconds() -> Self {
        Self::new("ns", 1.0)
    }

    pub fn microseconds() -> Self {
        Self::new("us", 1e-3)
    }

    pub fn milliseconds() -> Self {
        Self::new("ms", 1e-6)
    }

    pub fn seconds() -> Self {
        Self::new("s", 1e-9)
    }

    /// Look up a unit by its short name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ns" => Some(Self::nanoseconds()),
            "us" | "µs" => Some(Self::microseconds()),
            "ms" => Some(Self::milliseconds()),
            "s" => Some(Self::seconds()),
            _ => None,
        }
    }

    pub fn to_display(&self, native: f64) -> f64 {
        native * self.scale
    }

    pub fn to_native(&self, display: f64) -> f64 {
        display / self.scale
    }

    pub fn convert(&self, durations: &[Duration]) -> Vec<f64> {
        durations
            .iter()
            .map(|d| self.to_display(d.as_nanos() as f64))
            .collect()
    }
}

impl Default for DisplayUnit {
    fn default() -> Self {
        Self::milliseconds()
    }
}
