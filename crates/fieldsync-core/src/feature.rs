//! Features and form values.
//!
//! A feature is one row-producing unit: either the root of a record or one
//! item of a repeatable element. Items nest to whatever depth the form's
//! schema allows; each item is owned by the form value that lists it, so the
//! tree can never contain a cycle.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Value, json};
use uuid::Uuid;

// ─── Linkage ─────────────────────────────────────────────────────────────────

/// A reference to a related entity (project, user, changeset) by both its
/// storage-local row id and its external resource id. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linkage {
  #[serde(default)]
  pub row_id:      Option<i64>,
  #[serde(default)]
  pub resource_id: Option<Uuid>,
}

impl Linkage {
  pub fn is_set(&self) -> bool {
    self.row_id.is_some() || self.resource_id.is_some()
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

/// An explicit latitude/longitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
  pub latitude:  f64,
  pub longitude: f64,
}

/// Where the device was when a feature was created or last updated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
  #[serde(default)]
  pub latitude:  Option<f64>,
  #[serde(default)]
  pub longitude: Option<f64>,
  #[serde(default)]
  pub altitude:  Option<f64>,
  /// Horizontal accuracy in metres.
  #[serde(default)]
  pub accuracy:  Option<f64>,
}

impl LocationSnapshot {
  pub fn coordinate(&self) -> Option<Coordinate> {
    Some(Coordinate {
      latitude:  self.latitude?,
      longitude: self.longitude?,
    })
  }
}

// ─── FeatureKind ─────────────────────────────────────────────────────────────

/// Identity of a repeatable item. Linkage fields here override the record's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatableItem {
  pub resource_id: Uuid,
  /// Key of the repeatable element that owns this item.
  pub element_key: String,
  /// Position within the owning repeatable's item list.
  pub index:       usize,
  #[serde(default)]
  pub created_by:  Linkage,
  #[serde(default)]
  pub updated_by:  Linkage,
  #[serde(default)]
  pub changeset:   Linkage,
}

/// Whether a feature is a record's root or an item of a repeatable.
///
/// The root's identity and linkage live on the [`crate::Record`]; an item
/// carries its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
  Root,
  Item(RepeatableItem),
}

// ─── FormValue ───────────────────────────────────────────────────────────────

/// The content entered for one element on one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FormContent {
  /// Nothing entered; contributes no column at all.
  Empty,
  Text(String),
  Number(f64),
  /// Selected choices of a choice or classification field.
  Choices(Vec<String>),
  /// Accepts `YYYY-MM-DD` with a year of any width.
  #[serde(deserialize_with = "deserialize_date")]
  Date(NaiveDate),
  /// A value that spans several independently named columns (e.g. the parts
  /// of an address, or a photo list plus its captions).
  Composite(IndexMap<String, Value>),
  /// The nested features of a repeatable element.
  Items(Vec<Feature>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormValue {
  pub element_key: String,
  pub content:     FormContent,
}

impl FormValue {
  pub fn new(element_key: impl Into<String>, content: FormContent) -> Self {
    Self {
      element_key: element_key.into(),
      content,
    }
  }

  pub fn is_empty(&self) -> bool { matches!(self.content, FormContent::Empty) }

  /// Nested items if this value belongs to a repeatable element.
  pub fn items(&self) -> Option<&[Feature]> {
    match &self.content {
      FormContent::Items(items) => Some(items),
      _ => None,
    }
  }

  /// The individual text entries of this value, as stored one-per-row in a
  /// form's multiple-values table.
  pub fn multiple_values(&self) -> Vec<String> {
    match &self.content {
      FormContent::Text(s) => vec![s.clone()],
      FormContent::Number(n) => vec![n.to_string()],
      FormContent::Choices(choices) => choices.clone(),
      _ => Vec::new(),
    }
  }

  /// Queue the snapshot text of this value's content onto `chunks`.
  fn snapshot_chunks<'a>(&'a self, chunks: &mut Vec<Chunk<'a>>) {
    let scalar = match &self.content {
      FormContent::Empty => return,
      FormContent::Text(s) => json!(s),
      FormContent::Number(n) => json!(n),
      FormContent::Choices(choices) => json!(choices),
      FormContent::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
      FormContent::Composite(map) => json!(map),
      FormContent::Items(items) => {
        chunks.push(Chunk::Text("[".into()));
        for (n, item) in items.iter().enumerate() {
          let id = item.item().map_or(Value::Null, |i| json!(i.resource_id));
          let sep = if n == 0 { "" } else { "," };
          chunks.push(Chunk::Text(format!(r#"{sep}{{"id":{id},"form_values":"#)));
          chunks.push(Chunk::Values(item));
          chunks.push(Chunk::Text("}".into()));
        }
        chunks.push(Chunk::Text("]".into()));
        return;
      }
    };
    chunks.push(Chunk::Text(scalar.to_string()));
  }
}

/// A piece of pending snapshot output: literal JSON text, or the form values
/// of a feature still to be expanded.
enum Chunk<'a> {
  Text(String),
  Values(&'a Feature),
}

/// Parse `[+-]Y-MM-DD` where the year may have more than four digits. Years
/// outside chrono's range saturate to [`NaiveDate::MIN`] / [`NaiveDate::MAX`].
pub fn parse_date(input: &str) -> Option<NaiveDate> {
  let (negative, rest) = match input.as_bytes().first()? {
    b'+' => (false, &input[1..]),
    b'-' => (true, &input[1..]),
    _ => (false, input),
  };

  let mut parts = rest.splitn(3, '-');
  let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
  if [year, month, day]
    .iter()
    .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
  {
    return None;
  }

  let month: u32 = month.parse().ok()?;
  let day: u32 = day.parse().ok()?;
  let year: Option<i32> = year
    .parse::<i32>()
    .ok()
    .map(|y| if negative { -y } else { y });

  match year {
    Some(y) if (NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&y) => {
      NaiveDate::from_ymd_opt(y, month, day)
    }
    _ if !(1..=12).contains(&month) || !(1..=31).contains(&day) => None,
    _ if negative => Some(NaiveDate::MIN),
    _ => Some(NaiveDate::MAX),
  }
}

fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
  let raw = String::deserialize(deserializer)?;
  parse_date(&raw)
    .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a YYYY-MM-DD date"))
}

// ─── Feature ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
  pub kind:              FeatureKind,
  #[serde(default)]
  pub form_values:       Vec<FormValue>,
  /// Human-readable title computed by the collecting app.
  #[serde(default)]
  pub display_value:     Option<String>,
  #[serde(default)]
  pub coordinate:        Option<Coordinate>,
  #[serde(default)]
  pub version:           Option<i64>,

  // server-recorded timestamps
  #[serde(default)]
  pub created_at:        Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at:        Option<DateTime<Utc>>,
  // device-reported timestamps
  #[serde(default)]
  pub client_created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub client_updated_at: Option<DateTime<Utc>>,

  /// Seconds spent in the editor, per phase.
  #[serde(default)]
  pub created_duration:  Option<i64>,
  #[serde(default)]
  pub updated_duration:  Option<i64>,
  #[serde(default)]
  pub edited_duration:   Option<i64>,

  #[serde(default)]
  pub created_location:  LocationSnapshot,
  #[serde(default)]
  pub updated_location:  LocationSnapshot,
}

impl Feature {
  /// A bare feature of the given kind with every optional field unset.
  pub fn new(kind: FeatureKind) -> Self {
    Self {
      kind,
      form_values: Vec::new(),
      display_value: None,
      coordinate: None,
      version: None,
      created_at: None,
      updated_at: None,
      client_created_at: None,
      client_updated_at: None,
      created_duration: None,
      updated_duration: None,
      edited_duration: None,
      created_location: LocationSnapshot::default(),
      updated_location: LocationSnapshot::default(),
    }
  }

  pub fn is_root(&self) -> bool { matches!(self.kind, FeatureKind::Root) }

  pub fn item(&self) -> Option<&RepeatableItem> {
    match &self.kind {
      FeatureKind::Item(item) => Some(item),
      FeatureKind::Root => None,
    }
  }

  /// Client-reported creation time, falling back to the server's.
  pub fn effective_created_at(&self) -> Option<DateTime<Utc>> {
    self.client_created_at.or(self.created_at)
  }

  /// Client-reported update time, falling back to the server's.
  pub fn effective_updated_at(&self) -> Option<DateTime<Utc>> {
    self.client_updated_at.or(self.updated_at)
  }

  /// JSON snapshot of every non-empty form value keyed by element key, with
  /// repeatable items nested as `{"id", "form_values"}` objects.
  ///
  /// Written straight to text from an explicit work stack, so any nesting
  /// depth is handled without recursion.
  pub fn form_values_json(&self) -> String {
    let mut out = String::new();
    let mut stack = vec![Chunk::Values(self)];

    while let Some(chunk) = stack.pop() {
      match chunk {
        Chunk::Text(text) => out.push_str(&text),
        Chunk::Values(feature) => {
          let mut chunks = vec![Chunk::Text("{".into())];
          let present = feature.form_values.iter().filter(|fv| !fv.is_empty());
          for (n, fv) in present.enumerate() {
            let sep = if n == 0 { "" } else { "," };
            chunks.push(Chunk::Text(format!("{sep}{}:", json!(fv.element_key))));
            fv.snapshot_chunks(&mut chunks);
          }
          chunks.push(Chunk::Text("}".into()));
          stack.extend(chunks.into_iter().rev());
        }
      }
    }

    out
  }

  /// Text used for full-text indexing: every text, number and choice entry
  /// of this feature joined by single spaces.
  pub fn searchable_value(&self) -> String {
    self
      .form_values
      .iter()
      .flat_map(FormValue::multiple_values)
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }
}

// Items own their children, so the derived drop glue would recurse once per
// nesting level. Unlink the subtree onto a heap stack instead.
impl Drop for Feature {
  fn drop(&mut self) {
    let mut stack = Vec::new();
    take_items(&mut self.form_values, &mut stack);
    while let Some(mut feature) = stack.pop() {
      take_items(&mut feature.form_values, &mut stack);
    }
  }
}

fn take_items(values: &mut [FormValue], stack: &mut Vec<Feature>) {
  for fv in values {
    if let FormContent::Items(items) = &mut fv.content {
      stack.append(items);
    }
  }
}
