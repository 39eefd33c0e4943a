//=========================================================================
// Shared State
//=========================================================================
//
// Dynamically-shaped values merged into a Context by `update()`.
//
// Only `StateValue::Map` is accepted as a partial update; any other value
// is ignored by the Context (degrade, don't throw).
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;

//=== StateValue ==========================================================

/// A value stored in a Context's shared state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<StateValue>),
    Map(SharedState),
}

/// Mapping merged by [`crate::core::Context::update`].
pub type SharedState = HashMap<String, StateValue>;

impl StateValue {
    /// Builds a map value from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, StateValue)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&SharedState> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

//--- Conversions ---------------------------------------------------------

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for StateValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<SharedState> for StateValue {
    fn from(m: SharedState) -> Self {
        Self::Map(m)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
