use serde_json::{Map, Value};

use crate::error::ParseError;

/// Tolerant accessor over one JSON object of a response.
///
/// Every lookup answers "absent" instead of failing when a key is missing,
/// `null`, or of an unexpected shape.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
  entity: &'static str,
  map: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
  pub fn of(entity: &'static str, value: &'a Value) -> Self {
    Self {
      entity,
      map: value.as_object(),
    }
  }

  /// Whether the underlying value is an object at all.
  pub fn exists(&self) -> bool {
    self.map.is_some()
  }

  pub fn raw(&self, key: &str) -> Option<&'a Value> {
    self.map?.get(key).filter(|v| !v.is_null())
  }

  /// Nested object under `key`.
  pub fn obj(&self, key: &str) -> Option<Fields<'a>> {
    let value = self.raw(key)?;
    value.is_object().then(|| Fields::of(self.entity, value))
  }

  /// Nested object reached by walking `keys`.
  pub fn path(&self, keys: &[&str]) -> Option<Fields<'a>> {
    let mut current = *self;
    for key in keys {
      current = current.obj(key)?;
    }
    Some(current)
  }

  /// Same object, reported under a different entity name.
  pub fn named(self, entity: &'static str) -> Self {
    Self { entity, ..self }
  }

  /// String under `key`. Numeric identifiers are rendered as strings.
  pub fn str(&self, key: &str) -> Option<String> {
    match self.raw(key)? {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }

  pub fn bool(&self, key: &str) -> Option<bool> {
    self.raw(key)?.as_bool()
  }

  pub fn i64(&self, key: &str) -> Option<i64> {
    self.raw(key)?.as_i64()
  }

  pub fn required_str(&self, key: &str) -> Result<String, ParseError> {
    self
      .str(key)
      .ok_or_else(|| ParseError::missing(self.entity, key))
  }

  /// Objects of the array under `key`.
  pub fn list(&self, key: &str) -> Vec<Fields<'a>> {
    self
      .raw(key)
      .and_then(Value::as_array)
      .map(|items| {
        items
          .iter()
          .filter(|item| item.is_object())
          .map(|item| Fields::of(self.entity, item))
          .collect()
      })
      .unwrap_or_default()
  }

  /// Items of a connection: `key.edges[]`.
  pub fn edges(&self, key: &str) -> Vec<Fields<'a>> {
    self
      .obj(key)
      .map(|connection| connection.list("edges"))
      .unwrap_or_default()
  }

  /// Nodes of a connection: `key.edges[].node`.
  pub fn nodes(&self, key: &str) -> Vec<Fields<'a>> {
    self
      .edges(key)
      .into_iter()
      .filter_map(|edge| edge.obj("node"))
      .collect()
  }

  /// Uid under `details`, failing when the entity is present without one.
  pub fn details_uid(&self) -> Result<String, ParseError> {
    self
      .obj("details")
      .and_then(|d| d.str("uid"))
      .ok_or_else(|| ParseError::missing(self.entity, "details.uid"))
  }
}
