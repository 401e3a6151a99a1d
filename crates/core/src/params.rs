//! Typed, forgiving access to a JSON parameter object.
//!
//! Engines are constructed from a `serde_json::Value` object. [`ParamReader`]
//! pulls typed values out of it and falls back to a default when a key is
//! missing. A key that is present but carries the wrong JSON type also falls
//! back to the default, and is reported with a `tracing` warning so a typo in
//! a params file does not go unnoticed.

use serde_json::Value;
use tracing::warn;

/// Reads typed parameters from a JSON object, never failing.
#[derive(Debug, Clone, Copy)]
pub struct ParamReader<'a> {
    params: &'a Value,
}

impl<'a> ParamReader<'a> {
    pub fn new(params: &'a Value) -> Self {
        Self { params }
    }

    fn lookup<T>(
        &self,
        name: &str,
        expected: &str,
        default: T,
        convert: impl FnOnce(&Value) -> Option<T>,
    ) -> T {
        match self.params.get(name) {
            None | Some(Value::Null) => default,
            Some(raw) => convert(raw).unwrap_or_else(|| {
                warn!(param = name, got = %raw, "expected {expected}, using default");
                default
            }),
        }
    }

    /// Reads a number as `f64`; integers are accepted.
    pub fn f64(&self, name: &str, default: f64) -> f64 {
        self.lookup(name, "a number", default, Value::as_f64)
    }

    /// Reads a number as `f32`.
    pub fn f32(&self, name: &str, default: f32) -> f32 {
        self.f64(name, f64::from(default)) as f32
    }

    /// Reads a non-negative integer as `usize`.
    pub fn usize(&self, name: &str, default: usize) -> usize {
        self.lookup(name, "a non-negative integer", default, |v| {
            v.as_u64().and_then(|n| usize::try_from(n).ok())
        })
    }

    /// Reads a signed integer that fits in `i32`.
    pub fn i32(&self, name: &str, default: i32) -> i32 {
        self.lookup(name, "a 32-bit integer", default, |v| {
            v.as_i64().and_then(|n| i32::try_from(n).ok())
        })
    }

    pub fn bool(&self, name: &str, default: bool) -> bool {
        self.lookup(name, "a boolean", default, Value::as_bool)
    }

    pub fn string(&self, name: &str, default: &str) -> String {
        self.lookup(name, "a string", default.to_owned(), |v| {
            v.as_str().map(String::from)
        })
    }
}
