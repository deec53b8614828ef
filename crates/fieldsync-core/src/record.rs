//! The top-level persisted unit of field collection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  feature::{Feature, FeatureKind, Linkage},
  form::Form,
};

/// A record owns exactly one root feature plus record-level metadata.
/// The record's latitude/longitude is the root feature's coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
  pub row_id:              i64,
  pub resource_id:         Uuid,
  #[serde(default)]
  pub status:              Option<String>,

  #[serde(default)]
  pub project:             Linkage,
  #[serde(default)]
  pub assigned_to:         Linkage,
  #[serde(default)]
  pub created_by:          Linkage,
  #[serde(default)]
  pub updated_by:          Linkage,
  #[serde(default)]
  pub changeset:           Linkage,

  // device telemetry at the time of the last edit
  #[serde(default)]
  pub altitude:            Option<f64>,
  #[serde(default)]
  pub speed:               Option<f64>,
  #[serde(default)]
  pub course:              Option<f64>,
  #[serde(default)]
  pub vertical_accuracy:   Option<f64>,
  #[serde(default)]
  pub horizontal_accuracy: Option<f64>,

  pub root:                Feature,
}

impl Record {
  /// A record with the given identity, an empty root feature and no metadata.
  pub fn new(row_id: i64, resource_id: Uuid) -> Self {
    Self {
      row_id,
      resource_id,
      status: None,
      project: Linkage::default(),
      assigned_to: Linkage::default(),
      created_by: Linkage::default(),
      updated_by: Linkage::default(),
      changeset: Linkage::default(),
      altitude: None,
      speed: None,
      course: None,
      vertical_accuracy: None,
      horizontal_accuracy: None,
      root: Feature::new(FeatureKind::Root),
    }
  }

  pub fn from_json(input: &str) -> Result<Self> {
    Ok(serde_json::from_str(input)?)
  }

  pub fn from_value(value: serde_json::Value) -> Result<Self> {
    Ok(serde_json::from_value(value)?)
  }

  /// External resource id of `feature` when it belongs to this record: the
  /// record's own id for the root, the item's id otherwise.
  pub fn resource_id_of(&self, feature: &Feature) -> Uuid {
    match &feature.kind {
      FeatureKind::Root => self.resource_id,
      FeatureKind::Item(item) => item.resource_id,
    }
  }

  /// Check that the feature tree fits `form`: the root is a root, and every
  /// nested item is an item of the repeatable listing it, which the form
  /// declares.
  pub fn validate_against(&self, form: &Form) -> Result<()> {
    if !self.root.is_root() {
      return Err(Error::RootFeatureIsItem);
    }

    let mut stack = vec![&self.root];

    while let Some(feature) = stack.pop() {
      for form_value in &feature.form_values {
        let Some(items) = form_value.items() else {
          continue;
        };
        let key = &form_value.element_key;

        if form.repeatable(key).is_none() {
          return Err(Error::UnknownRepeatable(key.clone()));
        }

        for (position, item) in items.iter().enumerate() {
          match item.item() {
            Some(identity) if identity.element_key == *key => stack.push(item),
            _ => {
              return Err(Error::MisplacedItem {
                key:   key.clone(),
                index: position,
              });
            }
          }
        }
      }
    }

    Ok(())
  }
}
