//! Parameter values that flow into process nodes.
//!
//! Each node type has a known parameter schema, but the values travel
//! through a common tagged union so pipes can be edited, persisted and
//! restored uniformly. An enum keeps the set closed and lets serde handle
//! the persisted form natively; `IndexMap` preserves key order so the
//! serialized state is stable across round-trips.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered parameter map, keyed by parameter name.
pub type Params = IndexMap<String, ParamValue>;

/// A single parameter value.
///
/// Untagged serialization: a value persists as the natural JSON form
/// (`0.5`, `true`, `[0,100]`, `{...}`), matching the sidecar layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag (e.g. a mask toggle).
    Bool(bool),
    /// Scalar (EV, contrast amount, hue shift, ...).
    Float(f64),
    /// UTF-8 string (e.g. a saturation method name).
    Str(String),
    /// A two-element pair: a closed interval or an (x, y) control point.
    Pair([f64; 2]),
    /// Nested map (e.g. a color editor's `selection` / `edit` blocks).
    Map(Params),
}

impl ParamValue {
    /// Try to read this value as a float. Booleans and pairs do not coerce.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to read this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to read this value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to read this value as a pair.
    pub fn as_pair(&self) -> Option<[f64; 2]> {
        match self {
            ParamValue::Pair(p) => Some(*p),
            _ => None,
        }
    }

    /// Try to read this value as a nested map.
    pub fn as_map(&self) -> Option<&Params> {
        match self {
            ParamValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Short type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
            ParamValue::Pair(_) => "pair",
            ParamValue::Map(_) => "map",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => write!(f, "\"{}\"", s),
            ParamValue::Pair([a, b]) => write!(f, "[{}, {}]", a, b),
            ParamValue::Map(m) => write!(f, "{{{} entries}}", m.len()),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<[f64; 2]> for ParamValue {
    fn from(v: [f64; 2]) -> Self {
        ParamValue::Pair(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<Params> for ParamValue {
    fn from(v: Params) -> Self {
        ParamValue::Map(v)
    }
}

/// Build a [`Params`] map from `(name, value)` pairs, preserving order.
pub fn params_from<I, K, V>(entries: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Read a float from `params`, falling back to `default` when absent.
pub fn float_or(params: &Params, key: &str, default: f64) -> f64 {
    params.get(key).and_then(|v| v.as_float()).unwrap_or(default)
}

/// Read a bool from `params`, falling back to `default` when absent.
pub fn bool_or(params: &Params, key: &str, default: bool) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

/// Read a pair from `params`, falling back to `default` when absent.
pub fn pair_or(params: &Params, key: &str, default: [f64; 2]) -> [f64; 2] {
    params.get(key).and_then(|v| v.as_pair()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(ParamValue::Float(1.5).as_float(), Some(1.5));
        assert_eq!(ParamValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ParamValue::Pair([0.0, 100.0]).as_pair(), Some([0.0, 100.0]));
        assert_eq!(ParamValue::Float(1.5).as_bool(), None);
    }

    #[test]
    fn test_json_round_trip() {
        let params = params_from([
            ("EV", ParamValue::Float(1.25)),
            ("mask", ParamValue::Bool(false)),
            ("hue", ParamValue::Pair([0.0, 360.0])),
            (
                "edit",
                ParamValue::Map(params_from([("exposure", 0.5f64)])),
            ),
        ]);

        let json = serde_json::to_string(&params).unwrap();
        let back: Params = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
        // key order survives
        let keys: Vec<_> = back.keys().cloned().collect();
        assert_eq!(keys, vec!["EV", "mask", "hue", "edit"]);
    }

    #[test]
    fn test_defaulting_helpers() {
        let params = params_from([("contrast", 10.0f64)]);
        assert_eq!(float_or(&params, "contrast", 0.0), 10.0);
        assert_eq!(float_or(&params, "missing", -1.0), -1.0);
        assert!(!bool_or(&params, "mask", false));
        assert_eq!(pair_or(&params, "hue", [0.0, 360.0]), [0.0, 360.0]);
    }
}
