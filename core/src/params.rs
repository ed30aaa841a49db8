//! Request parameters and the encoding helpers shared by every endpoint.
//!
//! # Design
//! `ParameterBag` keeps keys in first-insertion order so the wire form is
//! deterministic, and overwrites in place when a key is put twice. `bool` has
//! no `ParamValue` conversion; flags go through `put_flag`, which writes the
//! literal `0`/`1` the API expects.

use std::fmt;

use crate::error::ApiError;

/// Encode a boolean the way the Weibo API expects it.
pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Join ids into a single comma-separated parameter value.
///
/// Fails with `EmptyBatch` when `ids` is empty instead of producing an empty
/// or dangling-comma string.
pub fn join_ids<T: fmt::Display>(ids: &[T]) -> Result<String, ApiError> {
    if ids.is_empty() {
        return Err(ApiError::EmptyBatch);
    }
    Ok(ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(","))
}

/// `join_ids` with an upper bound on the number of ids.
pub fn batch_ids<T: fmt::Display>(ids: &[T], max: usize) -> Result<String, ApiError> {
    if ids.len() > max {
        return Err(ApiError::BatchSizeExceeded {
            max,
            actual: ids.len(),
        });
    }
    join_ids(ids)
}

/// Binary payload for multipart uploads.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Text(String),
    Blob(Blob),
}

impl ParamValue {
    /// Text form of the value; `None` for blobs, which have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ParamValue::Int(n) => Some(n.to_string()),
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Blob(_) => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Int(i64::from(n))
    }
}

impl From<u8> for ParamValue {
    fn from(n: u8) -> Self {
        ParamValue::Int(i64::from(n))
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<Blob> for ParamValue {
    fn from(b: Blob) -> Self {
        ParamValue::Blob(b)
    }
}

/// Ordered key/value set sent as query string or request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`, replacing any earlier value for that key.
    pub fn put(&mut self, key: &str, value: impl Into<ParamValue>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    /// Insert a boolean flag as `"1"` or `"0"`.
    pub fn put_flag(&mut self, key: &str, value: bool) -> &mut Self {
        self.put(key, encode_bool(value))
    }

    /// Insert `value` only when present.
    pub fn put_opt(&mut self, key: &str, value: Option<impl Into<ParamValue>>) -> &mut Self {
        if let Some(value) = value {
            self.put(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text form of the value under `key`.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(ParamValue::as_text)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn has_blob(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, v)| matches!(v, ParamValue::Blob(_)))
    }

    /// Non-blob entries as text pairs, in insertion order.
    pub fn text_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_text().map(|text| (k.clone(), text)))
            .collect()
    }

    /// Blob entries, in insertion order.
    pub fn blobs(&self) -> Vec<(String, Blob)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| match v {
                ParamValue::Blob(b) => Some((k.clone(), b.clone())),
                _ => None,
            })
            .collect()
    }
}
