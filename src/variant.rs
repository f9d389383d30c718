//! String-keyed metadata carried with a molecule.

use std::collections::BTreeMap;

/// A dynamically typed metadata value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
    Vector3([f64; 3]),
}

impl Variant {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to reals.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector3(&self) -> Option<[f64; 3]> {
        match self {
            Self::Vector3(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Variant {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<[f64; 3]> for Variant {
    fn from(v: [f64; 3]) -> Self {
        Self::Vector3(v)
    }
}

/// Ordered map of metadata entries. Keys iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DataMap {
    entries: BTreeMap<String, Variant>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Variant>) {
        self.entries.insert(key.into(), value.into());
    }

    /// The value under `key`, or [`Variant::Null`] when absent.
    pub fn value(&self, key: &str) -> &Variant {
        static NULL: Variant = Variant::Null;
        self.entries.get(key).unwrap_or(&NULL)
    }

    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.entries.get(key)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Variant> {
        self.entries.remove(key)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
