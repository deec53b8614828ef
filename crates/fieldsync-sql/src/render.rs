//! Render statement descriptors to PostgreSQL text.
//!
//! Literals are either written in place (for scripts that are concatenated and
//! shipped in batches) or replaced by `$n` placeholders collected into a
//! parameter list. Raw expressions are always written verbatim.

use crate::{
  statement::{Delete, Insert, Statement},
  value::{Literal, Value},
};

// ─── Params ──────────────────────────────────────────────────────────────────

/// Destination for literal values encountered while rendering.
pub trait Params {
  /// Write `literal` (or a placeholder standing for it) to `dst`.
  fn bind(&mut self, literal: &Literal, dst: &mut String);
}

/// Writes every literal in place, quoted.
pub struct Inline;

impl Params for Inline {
  fn bind(&mut self, literal: &Literal, dst: &mut String) {
    dst.push_str(&quote_literal(literal));
  }
}

/// Collects literals and writes 1-based `$n` placeholders.
impl Params for Vec<Literal> {
  fn bind(&mut self, literal: &Literal, dst: &mut String) {
    self.push(literal.clone());
    dst.push('$');
    dst.push_str(&self.len().to_string());
  }
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// SQL text with every literal inlined.
pub fn to_sql(statement: &Statement) -> String {
  render(statement, &mut Inline)
}

/// SQL text with `$n` placeholders, plus the parameters in order.
pub fn to_parameterized(statement: &Statement) -> (String, Vec<Literal>) {
  let mut params = Vec::new();
  let sql = render(statement, &mut params);
  (sql, params)
}

pub fn render(statement: &Statement, params: &mut impl Params) -> String {
  let mut dst = String::new();
  match statement {
    Statement::Insert(insert) => render_insert(insert, params, &mut dst),
    Statement::Delete(delete) => render_delete(delete, params, &mut dst),
  }
  dst.push(';');
  dst
}

fn render_insert(insert: &Insert, params: &mut impl Params, dst: &mut String) {
  dst.push_str("INSERT INTO ");
  dst.push_str(&quote_ident(&insert.table));

  if insert.values.is_empty() {
    dst.push_str(" DEFAULT VALUES");
    return;
  }

  let columns: Vec<String> = insert.values.keys().map(|k| quote_ident(k)).collect();
  dst.push_str(" (");
  dst.push_str(&columns.join(", "));
  dst.push_str(") VALUES (");

  for (i, value) in insert.values.values().enumerate() {
    if i > 0 {
      dst.push_str(", ");
    }
    write_value(value, params, dst);
  }
  dst.push(')');
}

fn render_delete(delete: &Delete, params: &mut impl Params, dst: &mut String) {
  dst.push_str("DELETE FROM ");
  dst.push_str(&quote_ident(&delete.table));

  for (i, (column, value)) in delete.filter.iter().enumerate() {
    dst.push_str(if i == 0 { " WHERE " } else { " AND " });
    dst.push_str(&quote_ident(column));
    if value.is_null() {
      dst.push_str(" IS NULL");
    } else {
      dst.push_str(" = ");
      write_value(value, params, dst);
    }
  }
}

fn write_value(value: &Value, params: &mut impl Params, dst: &mut String) {
  match value {
    Value::Literal(literal) => params.bind(literal, dst),
    Value::Raw(expr) => dst.push_str(expr),
  }
}

// ─── Quoting ─────────────────────────────────────────────────────────────────

/// A double-quoted identifier.
pub fn quote_ident(ident: &str) -> String {
  format!("\"{}\"", ident.replace('"', "\"\""))
}

/// A literal as SQL text. Strings containing backslashes use the `E''` form
/// so the result is correct whatever `standard_conforming_strings` is set to.
pub fn quote_literal(literal: &Literal) -> String {
  match literal {
    Literal::Null => "NULL".to_string(),
    Literal::Bool(true) => "TRUE".to_string(),
    Literal::Bool(false) => "FALSE".to_string(),
    Literal::Integer(i) => i.to_string(),
    Literal::Double(d) if d.is_finite() => d.to_string(),
    Literal::Double(_) => "NULL".to_string(),
    Literal::Text(s) => quote_string(s),
    Literal::TextArray(items) if items.is_empty() => "'{}'::text[]".to_string(),
    Literal::TextArray(items) => {
      let items: Vec<String> = items.iter().map(|s| quote_string(s)).collect();
      format!("ARRAY[{}]", items.join(","))
    }
    Literal::Date(d) => quote_string(&d.format("%Y-%m-%d").to_string()),
    Literal::Timestamp(t) => quote_string(&t.to_rfc3339()),
  }
}

fn quote_string(s: &str) -> String {
  let body = s.replace('\'', "''");
  if body.contains('\\') {
    format!("E'{}'", body.replace('\\', "\\\\"))
  } else {
    format!("'{body}'")
  }
}
