//! Column values: typed literals, or raw SQL expressions that the renderer
//! embeds verbatim.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

/// A typed value bound into a statement as data.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
  Null,
  Bool(bool),
  Integer(i64),
  Double(f64),
  Text(String),
  TextArray(Vec<String>),
  Date(NaiveDate),
  Timestamp(DateTime<Utc>),
}

impl Literal {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// Convert a loosely-typed JSON value (as found in composite form values).
  /// Arrays become text arrays; nested objects are kept as their JSON text.
  pub fn from_json(value: &serde_json::Value) -> Self {
    use serde_json::Value as J;

    match value {
      J::Null => Self::Null,
      J::Bool(b) => Self::Bool(*b),
      J::Number(n) => match n.as_i64() {
        Some(i) => Self::Integer(i),
        None => n.as_f64().map_or(Self::Null, Self::Double),
      },
      J::String(s) => Self::Text(s.clone()),
      J::Array(items) => Self::TextArray(
        items
          .iter()
          .map(|item| match item {
            J::String(s) => s.clone(),
            other => other.to_string(),
          })
          .collect(),
      ),
      J::Object(_) => Self::Text(value.to_string()),
    }
  }
}

/// A column value as handed to the execution layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Literal(Literal),
  /// A SQL expression to be embedded as-is, never parameter-bound.
  Raw(String),
}

impl Value {
  pub const NULL: Value = Value::Literal(Literal::Null);

  pub fn raw(expr: impl Into<String>) -> Self { Self::Raw(expr.into()) }

  pub fn is_null(&self) -> bool {
    matches!(self, Self::Literal(Literal::Null))
  }
}

/// The columns of one row, in insertion order.
pub type Row = IndexMap<String, Value>;

// ─── Conversions ─────────────────────────────────────────────────────────────

impl From<Literal> for Value {
  fn from(l: Literal) -> Self { Self::Literal(l) }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Literal::Bool(b).into() }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self { Literal::Integer(i).into() }
}

impl From<usize> for Value {
  fn from(i: usize) -> Self {
    i64::try_from(i).map_or(Value::NULL, Value::from)
  }
}

impl From<f64> for Value {
  fn from(d: f64) -> Self { Literal::Double(d).into() }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Literal::Text(s).into() }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Literal::Text(s.to_string()).into() }
}

impl From<Uuid> for Value {
  fn from(id: Uuid) -> Self { Literal::Text(id.hyphenated().to_string()).into() }
}

impl From<NaiveDate> for Value {
  fn from(d: NaiveDate) -> Self { Literal::Date(d).into() }
}

impl From<DateTime<Utc>> for Value {
  fn from(t: DateTime<Utc>) -> Self { Literal::Timestamp(t).into() }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(o: Option<T>) -> Self { o.map_or(Value::NULL, Into::into) }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn json_conversion() {
    assert_eq!(Literal::from_json(&json!(null)), Literal::Null);
    assert_eq!(Literal::from_json(&json!(3)), Literal::Integer(3));
    assert_eq!(Literal::from_json(&json!(2.5)), Literal::Double(2.5));
    assert_eq!(
      Literal::from_json(&json!(["a", 1])),
      Literal::TextArray(vec!["a".into(), "1".into()])
    );
    assert_eq!(
      Literal::from_json(&json!({ "k": 1 })),
      Literal::Text(r#"{"k":1}"#.into())
    );
  }

  #[test]
  fn options_become_null() {
    let none: Option<i64> = None;
    assert!(Value::from(none).is_null());
    assert_eq!(Value::from(Some(4_i64)), Value::Literal(Literal::Integer(4)));
  }
}
