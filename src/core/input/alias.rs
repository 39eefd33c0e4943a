//=========================================================================
// Alias Map
//=========================================================================
//
// Logical input names bound to ordered lists of physical key names.
//
//   "up" → ["up", "w"]      value("up") = keys["up"] || keys["w"]
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;

//=== AliasMap ============================================================

/// Alias table queried by the keyboard aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMap {
    aliases: HashMap<String, Vec<String>>,
}

impl AliasMap {
    /// Creates an empty table.
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Binds `alias` to `keys`, replacing any previous binding.
    pub fn bind<I, K>(&mut self, alias: impl Into<String>, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.aliases
            .insert(alias.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    /// Removes a binding, returning its keys.
    pub fn unbind(&mut self, alias: &str) -> Option<Vec<String>> {
        self.aliases.remove(alias)
    }

    /// Physical key names bound to `alias`, in binding order.
    pub fn keys(&self, alias: &str) -> Option<&[String]> {
        self.aliases.get(alias).map(Vec::as_slice)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }
}

impl Default for AliasMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind("up", ["up", "w"])
            .bind("down", ["down", "s"])
            .bind("left", ["left", "a"])
            .bind("right", ["right", "d"])
            .bind(
                "control",
                [
                    "control",
                    "right command",
                    "left command",
                    "right control",
                    "left control",
                    "super",
                    "ctrl",
                    "alt",
                    "fn",
                ],
            );
        map
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_directions_and_control() {
        let map = AliasMap::default();
        assert_eq!(map.keys("up"), Some(&["up".to_owned(), "w".to_owned()][..]));
        assert_eq!(map.keys("right").map(<[String]>::len), Some(2));
        assert!(map
            .keys("control")
            .is_some_and(|keys| keys.iter().any(|k| k == "left command")));
    }

    #[test]
    fn bind_replaces_existing_alias() {
        let mut map = AliasMap::default();
        map.bind("up", ["k"]);
        assert_eq!(map.keys("up"), Some(&["k".to_owned()][..]));
    }

    #[test]
    fn unbind_removes_alias() {
        let mut map = AliasMap::default();
        assert!(map.unbind("down").is_some());
        assert!(!map.contains("down"));
        assert!(map.unbind("down").is_none());
    }
}
