// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Flattening of nested plist dictionaries.

A nested plist is flattened into a single-level mapping whose keys are the
dot-joined paths of the nested hierarchy:

```text
{"x": {"y": {"z": 1}}, "w": [1, 2]}  ->  {"x.y.z": 1, "w": [1, 2]}
```

Only dictionaries are descended into. Arrays are terminal values, even when
they contain dictionaries. A dictionary with no entries has no reachable
leaves and therefore contributes nothing.
*/

use {
    crate::{canonical::display_string, hasher::content_digest, PlistError},
    plist::{Dictionary, Value},
};

/// Separator joining the key segments of a flattened key.
pub const KEY_SEPARATOR: char = '.';

/// A plist flattened to dot-joined keys.
///
/// Entries are held in discovery (depth-first) order. No value is a dictionary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatPlist {
    entries: Dictionary,
}

impl FlatPlist {
    /// Flatten a nested plist dictionary.
    pub fn from_nested(dict: &Dictionary) -> Self {
        flatten(dict)
    }

    /// Obtain the value of a flattened key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted lexicographically by key.
    pub fn sorted_entries(&self) -> Vec<(&str, &Value)> {
        let mut entries = self.iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        entries
    }

    /// Sorted entries with each value rendered in its display form.
    ///
    /// Unlike the digest input, data values render quoted as `b'..'`.
    pub fn display_entries(&self) -> Vec<(&str, String)> {
        self.sorted_entries()
            .into_iter()
            .map(|(k, v)| (k, display_string(v)))
            .collect()
    }

    /// Compute the hex BLAKE2b content digest of this plist.
    pub fn digest(&self) -> String {
        content_digest(self)
    }

    /// Whether two flattened plists have the same content.
    ///
    /// Keys and display forms of values must match. Entry order is irrelevant.
    pub fn content_eq(&self, other: &Self) -> bool {
        self.display_entries() == other.display_entries()
    }

    pub fn into_dictionary(self) -> Dictionary {
        self.entries
    }
}

impl TryFrom<Dictionary> for FlatPlist {
    type Error = PlistError;

    /// Adopt an already flattened dictionary.
    ///
    /// Errors if any value is a dictionary.
    fn try_from(entries: Dictionary) -> Result<Self, Self::Error> {
        if let Some((key, _)) = entries
            .iter()
            .find(|(_, v)| matches!(v, Value::Dictionary(_)))
        {
            return Err(PlistError::InvalidInput(format!(
                "{} has a dictionary value; mapping is not flattened",
                key
            )));
        }

        Ok(Self { entries })
    }
}

fn flatten_into(entries: &mut Dictionary, prefix: Option<&str>, dict: &Dictionary) {
    for (key, value) in dict.iter() {
        let path = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, KEY_SEPARATOR, key),
            None => key.clone(),
        };

        match value {
            Value::Dictionary(nested) => flatten_into(entries, Some(&path), nested),
            _ => {
                entries.insert(path, value.clone());
            }
        }
    }
}

/// Flatten a nested plist dictionary into a [FlatPlist].
pub fn flatten(dict: &Dictionary) -> FlatPlist {
    let mut entries = Dictionary::new();
    flatten_into(&mut entries, None, dict);

    FlatPlist { entries }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::testutil::*};

    #[test]
    fn flatten_nested() {
        let flat = flatten(&abc_dictionary());

        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["a", "b", "c.d.e"]);
        assert_eq!(flat.get("a"), Some(&Value::String("one".into())));
        assert_eq!(flat.get("b"), Some(&Value::Integer(2.into())));
        assert_eq!(flat.get("c.d.e"), Some(&Value::Boolean(false)));
        assert!(!flat.contains_key("c"));
        assert!(!flat.contains_key("c.d"));
    }

    #[test]
    fn empty() {
        let flat = flatten(&Dictionary::new());
        assert!(flat.is_empty());
        assert_eq!(flat, FlatPlist::default());
    }

    #[test]
    fn empty_dictionaries_dropped() {
        let mut empty_parent = Dictionary::new();
        empty_parent.insert("inner".into(), Value::Dictionary(Dictionary::new()));

        let mut root = Dictionary::new();
        root.insert("empty".into(), Value::Dictionary(Dictionary::new()));
        root.insert("nested_empty".into(), Value::Dictionary(empty_parent));
        root.insert("kept".into(), Value::Boolean(true));

        let flat = flatten(&root);
        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["kept"]);
    }

    #[test]
    fn arrays_are_leaves() {
        let mut element = Dictionary::new();
        element.insert("k".into(), Value::String("v".into()));

        let array = Value::Array(vec![
            Value::Dictionary(element),
            Value::Integer(1.into()),
        ]);

        let mut inner = Dictionary::new();
        inner.insert("list".into(), array.clone());

        let mut root = Dictionary::new();
        root.insert("outer".into(), Value::Dictionary(inner));

        let flat = flatten(&root);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("outer.list"), Some(&array));
    }

    #[test]
    fn discovery_order() {
        let mut inner = Dictionary::new();
        inner.insert("z".into(), Value::Integer(1.into()));
        inner.insert("a".into(), Value::Integer(2.into()));

        let mut root = Dictionary::new();
        root.insert("m".into(), Value::Dictionary(inner));
        root.insert("b".into(), Value::Integer(3.into()));

        let flat = flatten(&root);
        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["m.z", "m.a", "b"]);
        assert_eq!(
            flat.sorted_entries()
                .into_iter()
                .map(|(k, _)| k)
                .collect::<Vec<_>>(),
            vec!["b", "m.a", "m.z"]
        );
    }

    #[test]
    fn try_from_validates() {
        let mut flat = Dictionary::new();
        flat.insert("a.b".into(), Value::Boolean(true));
        let adopted = FlatPlist::try_from(flat.clone()).unwrap();
        assert_eq!(adopted.into_dictionary(), flat);

        assert!(matches!(
            FlatPlist::try_from(abc_dictionary()),
            Err(PlistError::InvalidInput(_))
        ));
    }

    #[test]
    fn content_eq_ignores_order() {
        let mut a = Dictionary::new();
        a.insert("x".into(), Value::Integer(1.into()));
        a.insert("y".into(), Value::String("1".into()));

        let mut b = Dictionary::new();
        b.insert("y".into(), Value::String("1".into()));
        b.insert("x".into(), Value::Integer(1.into()));

        assert!(flatten(&a).content_eq(&flatten(&b)));

        // Integer 1 and string "1" share a canonical form.
        let mut c = Dictionary::new();
        c.insert("x".into(), Value::String("1".into()));
        c.insert("y".into(), Value::Integer(1.into()));
        assert!(flatten(&a).content_eq(&flatten(&c)));

        let mut d = Dictionary::new();
        d.insert("x".into(), Value::Integer(1.into()));
        d.insert("z".into(), Value::String("1".into()));
        assert!(!flatten(&a).content_eq(&flatten(&d)));
    }

    #[test]
    fn data_not_equal_to_string() {
        let mut data = Dictionary::new();
        data.insert("k".into(), Value::Data(b"one".to_vec()));

        let mut string = Dictionary::new();
        string.insert("k".into(), Value::String("one".into()));

        let data = flatten(&data);
        let string = flatten(&string);

        assert_eq!(data.display_entries(), vec![("k", "b'one'".to_string())]);
        assert!(!data.content_eq(&string));
        assert!(!string.content_eq(&data));

        // The digest hashes raw data bytes, so both share a digest.
        assert_eq!(data.digest(), string.digest());

        let mut same = Dictionary::new();
        same.insert("k".into(), Value::Data(b"one".to_vec()));
        assert!(data.content_eq(&flatten(&same)));
    }
}
