//! Session document decoding
//!
//! The session document is YAML describing the weekend, drivers and
//! sessions. It is decoded into a [`serde_yaml_ng::Value`] tree and, by
//! default, flattened into one level with nested keys joined by `_`:
//!
//! ```rust
//! use pitlane::schema::flatten;
//!
//! let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str("a:\n  b: 1\n  c: 2\nd: 3\n").unwrap();
//! let flat = flatten(&doc);
//! assert_eq!(flat.keys().collect::<Vec<_>>(), ["a_b", "a_c", "d"]);
//! ```
//!
//! Flattening is not a bijection. When two key paths flatten to the same
//! string, the one visited last in document order wins. Sequences are leaf
//! values and are not descended into.

use std::collections::BTreeMap;

use serde_yaml_ng::Value as YamlValue;
use tracing::{debug, trace};

use crate::schema::locator::DocumentSpan;
use crate::yaml_utils::{decode_session_bytes, sanitize_session_text};
use crate::{Result, TelemetryError};

/// Separator placed between nested key segments.
pub const KEY_SEPARATOR: char = '_';

/// Extract the session document text from the region.
pub fn document_text<'a>(region: &'a [u8], span: &DocumentSpan) -> Result<std::borrow::Cow<'a, str>> {
    let bytes = region.get(span.body.clone()).ok_or_else(|| {
        TelemetryError::out_of_range(span.body.start, span.body.len(), region.len())
    })?;
    Ok(decode_session_bytes(bytes))
}

/// Parse session text into a nested value tree. Blank text yields an empty mapping.
pub fn decode(text: &str) -> Result<YamlValue> {
    let text = sanitize_session_text(text);
    if text.trim().is_empty() {
        return Ok(YamlValue::Mapping(Default::default()));
    }

    let value: YamlValue = serde_yaml_ng::from_str(&text)?;
    trace!(bytes = text.len(), "Decoded session document");
    Ok(value)
}

/// Render a mapping key as a string; only scalar keys are addressable.
fn key_string(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Join nested mapping keys with `_` into a single-level mapping.
///
/// A non-mapping root flattens to an empty mapping.
pub fn flatten(value: &YamlValue) -> BTreeMap<String, YamlValue> {
    let mut flat = BTreeMap::new();
    if let YamlValue::Mapping(_) = value {
        flatten_into(value, None, &mut flat);
    }
    flat
}

fn flatten_into(value: &YamlValue, prefix: Option<&str>, out: &mut BTreeMap<String, YamlValue>) {
    match (value, prefix) {
        (YamlValue::Mapping(mapping), _) => {
            for (key, child) in mapping {
                let Some(key) = key_string(key) else {
                    trace!(?key, "Skipping non-scalar session key");
                    continue;
                };
                let path = match prefix {
                    Some(prefix) => format!("{}{}{}", prefix, KEY_SEPARATOR, key),
                    None => key,
                };
                flatten_into(child, Some(&path), out);
            }
        }
        (leaf, Some(path)) => {
            out.insert(path.to_string(), leaf.clone());
        }
        (_, None) => {}
    }
}

/// Top-level entries of a mapping, without flattening.
fn top_level(value: &YamlValue) -> BTreeMap<String, YamlValue> {
    let mut entries = BTreeMap::new();
    if let YamlValue::Mapping(mapping) = value {
        for (key, child) in mapping {
            if let Some(key) = key_string(key) {
                entries.insert(key, child.clone());
            }
        }
    }
    entries
}

/// Decoded session document with by-key lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionDocument {
    entries: BTreeMap<String, YamlValue>,
}

impl SessionDocument {
    /// Build the lookup table from a decoded tree.
    pub fn from_value(value: &YamlValue, flatten_keys: bool) -> Self {
        let entries = if flatten_keys { flatten(value) } else { top_level(value) };
        Self { entries }
    }

    /// Parse and index session text.
    pub fn parse(text: &str, flatten_keys: bool) -> Result<Self> {
        let value = decode(text)?;
        let document = Self::from_value(&value, flatten_keys);
        debug!(keys = document.len(), flattened = flatten_keys, "Indexed session document");
        Ok(document)
    }

    /// Read the document from the region and index it.
    pub fn read(region: &[u8], span: &DocumentSpan, flatten_keys: bool) -> Result<Self> {
        let text = document_text(region, span)?;
        Self::parse(&text, flatten_keys)
    }

    pub fn get(&self, key: &str) -> Option<&YamlValue> {
        self.entries.get(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &YamlValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEKEND: &str = "\
WeekendInfo:
  TrackName: spa 2024 up
  TrackID: 163
  WeekendOptions:
    NumStarters: 24
SessionInfo:
  Sessions:
  - SessionNum: 0
    SessionType: Practice
";

    fn yaml(text: &str) -> YamlValue {
        serde_yaml_ng::from_str(text).unwrap()
    }

    #[test]
    fn flatten_joins_nested_keys() {
        let flat = flatten(&yaml("a:\n  b: 1\n  c: 2\nd: 3\n"));

        let mut expected = BTreeMap::new();
        expected.insert("a_b".to_string(), YamlValue::from(1));
        expected.insert("a_c".to_string(), YamlValue::from(2));
        expected.insert("d".to_string(), YamlValue::from(3));
        assert_eq!(flat, expected);
    }

    #[test]
    fn flatten_collisions_keep_last_in_document_order() {
        let flat = flatten(&yaml("a_b: first\na:\n  b: second\n"));
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["a_b"], YamlValue::from("second"));
    }

    #[test]
    fn sequences_are_leaves() {
        let document = SessionDocument::parse(WEEKEND, true).unwrap();
        assert!(matches!(document.get("SessionInfo_Sessions"), Some(YamlValue::Sequence(_))));
        assert_eq!(document.get("WeekendInfo_WeekendOptions_NumStarters"), Some(&YamlValue::from(24)));
        assert_eq!(document.get("WeekendInfo_TrackName"), Some(&YamlValue::from("spa 2024 up")));
    }

    #[test]
    fn unflattened_lookup_uses_top_level_keys() {
        let document = SessionDocument::parse(WEEKEND, false).unwrap();
        let keys: Vec<&String> = document.keys().collect();
        assert_eq!(keys, ["SessionInfo", "WeekendInfo"]);
        assert!(matches!(document.get("WeekendInfo"), Some(YamlValue::Mapping(_))));
        assert!(document.get("WeekendInfo_TrackName").is_none());
    }

    #[test]
    fn blank_document_is_empty() {
        assert!(SessionDocument::parse("", true).unwrap().is_empty());
        assert!(SessionDocument::parse("\x00\x00\n", true).unwrap().is_empty());
    }

    #[test]
    fn scalar_root_flattens_to_nothing() {
        assert!(flatten(&yaml("just a string")).is_empty());
    }

    #[test]
    fn numeric_keys_are_stringified() {
        let flat = flatten(&yaml("Cars:\n  1: alpha\n  2: beta\n"));
        assert_eq!(flat["Cars_1"], YamlValue::from("alpha"));
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = SessionDocument::parse("a: [1, 2\n", true).unwrap_err();
        assert!(
            matches!(err, TelemetryError::Parse { ref context, .. } if context == "Session document")
        );
    }

    #[test]
    fn reads_document_span_from_region() {
        let region = b"hdr\nA: 1\nB:\n  C: x\n...\n\0\0".to_vec();
        let span = DocumentSpan { header_len: 4, body: 4..19 };
        let document = SessionDocument::read(&region, &span, true).unwrap();
        assert_eq!(document.get("B_C"), Some(&YamlValue::from("x")));
        assert_eq!(document.get("A"), Some(&YamlValue::from(1)));
    }
}
