//! System-maintained columns: linkage, audit fields, geometry and snapshots.
//!
//! The root feature carries the record's own metadata; a repeatable item
//! carries its identity and position plus a `record_`-prefixed copy of
//! selected record fields.

use fieldsync_core::{Feature, FeatureKind, Linkage, Record, RepeatableItem};

use crate::{
  geometry,
  options::SyncOptions,
  render::quote_literal,
  value::{Literal, Row, Value},
};

/// Creator/updater id written when no linkage can be resolved.
pub const UNKNOWN_USER_ID: i64 = -1;

/// System columns for one feature's row. `parent` is the feature whose form
/// value lists `feature`; it is ignored for the root.
pub fn system_column_values_for_feature(
  feature: &Feature,
  parent: Option<&Feature>,
  record: &Record,
  options: &SyncOptions,
) -> Row {
  let mut values = Row::new();

  values.insert("record_id".into(), record.row_id.into());
  values.insert("record_resource_id".into(), record.resource_id.into());

  match &feature.kind {
    FeatureKind::Root => root_columns(&mut values, feature, record),
    FeatureKind::Item(item) => {
      let parent_id = parent.map_or(record.resource_id, |p| record.resource_id_of(p));
      item_columns(&mut values, feature, item, parent_id, record);
    }
  }

  values.insert("title".into(), feature.display_value.clone().into());
  values.insert(
    "form_values".into(),
    feature.form_values_json().into(),
  );

  setup_search(&mut values, feature, options);

  let geom = feature
    .coordinate
    .map_or(Value::NULL, |c| geometry::point(c.latitude, c.longitude));
  values.insert("the_geom".into(), geom);

  values.insert("created_at".into(), feature.effective_created_at().into());
  values.insert("updated_at".into(), feature.effective_updated_at().into());
  values.insert("version".into(), feature.version.into());

  for column in ["created_by_id", "updated_by_id"] {
    let unresolved = values.get(column).is_none_or(Value::is_null);
    if unresolved {
      values.insert(column.into(), UNKNOWN_USER_ID.into());
    }
  }

  values.insert("server_created_at".into(), feature.created_at.into());
  values.insert("server_updated_at".into(), feature.updated_at.into());

  values.insert("created_duration".into(), feature.created_duration.into());
  values.insert("updated_duration".into(), feature.updated_duration.into());
  values.insert("edited_duration".into(), feature.edited_duration.into());

  let created = &feature.created_location;
  values.insert("created_latitude".into(), created.latitude.into());
  values.insert("created_longitude".into(), created.longitude.into());
  values.insert("created_altitude".into(), created.altitude.into());
  values.insert("created_horizontal_accuracy".into(), created.accuracy.into());

  let updated = &feature.updated_location;
  values.insert("updated_latitude".into(), updated.latitude.into());
  values.insert("updated_longitude".into(), updated.longitude.into());
  values.insert("updated_altitude".into(), updated.altitude.into());
  values.insert("updated_horizontal_accuracy".into(), updated.accuracy.into());

  if options.location_geometry {
    if let Some(c) = created.coordinate() {
      values.insert(
        "created_geometry".into(),
        geometry::point(c.latitude, c.longitude),
      );
    }
    if let Some(c) = updated.coordinate() {
      values.insert(
        "updated_geometry".into(),
        geometry::point(c.latitude, c.longitude),
      );
    }
  }

  values
}

// ─── Branches ────────────────────────────────────────────────────────────────

fn root_columns(values: &mut Row, feature: &Feature, record: &Record) {
  insert_linkage(values, "project", &record.project);
  insert_linkage(values, "assigned_to", &record.assigned_to);
  insert_linkage(values, "created_by", &record.created_by);
  insert_linkage(values, "updated_by", &record.updated_by);
  insert_linkage(values, "changeset", &record.changeset);

  if let Some(status) = record.status.as_deref().filter(|s| !s.is_empty()) {
    values.insert("status".into(), status.into());
  }

  if let Some(c) = feature.coordinate {
    values.insert("latitude".into(), c.latitude.into());
    values.insert("longitude".into(), c.longitude.into());
  }

  values.insert("altitude".into(), record.altitude.into());
  values.insert("speed".into(), record.speed.into());
  values.insert("course".into(), record.course.into());
  values.insert("vertical_accuracy".into(), record.vertical_accuracy.into());
  values.insert("horizontal_accuracy".into(), record.horizontal_accuracy.into());
}

fn item_columns(
  values: &mut Row,
  feature: &Feature,
  item: &RepeatableItem,
  parent_id: uuid::Uuid,
  record: &Record,
) {
  values.insert("resource_id".into(), item.resource_id.into());
  values.insert("index".into(), item.index.into());
  values.insert("parent_resource_id".into(), parent_id.into());

  if let Some(c) = feature.coordinate {
    values.insert("latitude".into(), c.latitude.into());
    values.insert("longitude".into(), c.longitude.into());
  }

  if let Some(status) = record.status.as_deref().filter(|s| !s.is_empty()) {
    values.insert("record_status".into(), status.into());
  }
  insert_linkage(values, "record_project", &record.project);
  insert_linkage(values, "record_assigned_to", &record.assigned_to);

  insert_linkage(values, "created_by", &item.created_by);
  insert_linkage(values, "updated_by", &item.updated_by);

  let changeset = if item.changeset.is_set() {
    Some(&item.changeset)
  } else if record.changeset.row_id.is_some() {
    Some(&record.changeset)
  } else {
    None
  };
  if let Some(changeset) = changeset {
    values.insert("changeset_id".into(), changeset.row_id.into());
    values.insert("changeset_resource_id".into(), changeset.resource_id.into());
  }
}

/// `<name>_id` and `<name>_resource_id`, each only when present.
fn insert_linkage(values: &mut Row, name: &str, linkage: &Linkage) {
  if let Some(id) = linkage.row_id {
    values.insert(format!("{name}_id"), id.into());
  }
  if let Some(resource_id) = linkage.resource_id {
    values.insert(format!("{name}_resource_id"), resource_id.into());
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Full-text index columns; a no-op unless enabled.
fn setup_search(values: &mut Row, feature: &Feature, options: &SyncOptions) {
  if !options.search_index {
    return;
  }

  let text = feature.searchable_value();
  let quoted = quote_literal(&Literal::Text(text.clone()));

  values.insert("record_index_text".into(), text.into());
  values.insert("record_index".into(), Value::raw(format!("to_tsvector({quoted})")));
}
