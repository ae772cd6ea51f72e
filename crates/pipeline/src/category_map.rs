use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Per-category stage output, kept in the order categories were processed.
///
/// Serialises as a JSON object keyed by category label. Document order is
/// preserved on load, so a loaded checkpoint re-serialises byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for CategoryMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> CategoryMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced entry keeps its position.
    pub fn insert(&mut self, category: impl Into<String>, value: T) {
        let category = category.into();
        match self.entries.iter_mut().find(|(k, _)| *k == category) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((category, value)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(k, _)| k == category)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for CategoryMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<T: Serialize> Serialize for CategoryMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct CategoryMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for CategoryMapVisitor<T> {
    type Value = CategoryMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from category label to stage result")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = CategoryMap::new();
        while let Some((k, v)) = access.next_entry::<String, T>()? {
            map.insert(k, v);
        }
        Ok(map)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for CategoryMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CategoryMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let map: CategoryMap<u32> = [("Zeta", 1), ("Alpha", 2), ("Mid", 3)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Zeta":1,"Alpha":2,"Mid":3}"#);

        let back: CategoryMap<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.categories().collect::<Vec<_>>(), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = CategoryMap::new();
        map.insert("A", 1);
        map.insert("B", 2);
        map.insert("A", 3);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("A"), Some(&3));
        assert_eq!(map.categories().next(), Some("A"));
    }
}
