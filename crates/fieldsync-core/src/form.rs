//! The schema a record is collected against.
//!
//! A form is a tree of typed elements. Sections group elements for display
//! only; repeatables own a variable-length list of nested features and get a
//! table of their own.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Element ─────────────────────────────────────────────────────────────────

/// The kind of a form element. Unrecognised types deserialise as
/// [`ElementType::Unknown`] so newer schemas still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
  TextField,
  YesNoField,
  ChoiceField,
  ClassificationField,
  DateTimeField,
  TimeField,
  PhotoField,
  VideoField,
  AudioField,
  SignatureField,
  BarcodeField,
  AddressField,
  HyperlinkField,
  CalculatedField,
  RecordLinkField,
  Label,
  Section,
  Repeatable,
  #[serde(other)]
  Unknown,
}

/// One node of a form's element tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
  pub key:          String,
  #[serde(rename = "type")]
  pub element_type: ElementType,
  #[serde(default)]
  pub label:        Option<String>,
  #[serde(default)]
  pub data_name:    Option<String>,
  /// Children of a section or repeatable; empty for plain fields.
  #[serde(default)]
  pub elements:     Vec<Element>,
}

impl Element {
  pub fn is_repeatable(&self) -> bool {
    self.element_type == ElementType::Repeatable
  }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// A form definition, identified by both its own and its account's row ids
/// and resource ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
  pub row_id:              i64,
  pub resource_id:         Uuid,
  pub account_row_id:      i64,
  pub account_resource_id: Uuid,
  #[serde(default)]
  pub name:                String,
  #[serde(default)]
  pub elements:            Vec<Element>,
}

impl Form {
  pub fn from_json(input: &str) -> Result<Self> {
    Ok(serde_json::from_str(input)?)
  }

  /// All elements of `element_type`, depth-first in declaration order.
  pub fn elements_of_type(&self, element_type: ElementType) -> Vec<&Element> {
    self
      .all_elements()
      .into_iter()
      .filter(|e| e.element_type == element_type)
      .collect()
  }

  /// Every repeatable element at any depth, in declaration order.
  pub fn repeatables(&self) -> Vec<&Element> {
    self.elements_of_type(ElementType::Repeatable)
  }

  pub fn repeatable(&self, key: &str) -> Option<&Element> {
    self.repeatables().into_iter().find(|e| e.key == key)
  }

  /// Flatten the element tree, parents before children.
  fn all_elements(&self) -> Vec<&Element> {
    let mut out = Vec::new();
    let mut stack: Vec<&Element> = self.elements.iter().rev().collect();

    while let Some(element) = stack.pop() {
      out.push(element);
      stack.extend(element.elements.iter().rev());
    }

    out
  }

  /// Check that every element has a key and repeatable keys are unique.
  /// Repeatable keys become table-name suffixes, so a duplicate would route
  /// two repeatables into one table.
  pub fn validate(&self) -> Result<()> {
    let mut seen = HashSet::new();

    for element in self.all_elements() {
      if element.key.is_empty() {
        return Err(Error::EmptyElementKey);
      }
      if element.is_repeatable() && !seen.insert(element.key.as_str()) {
        return Err(Error::DuplicateRepeatableKey(element.key.clone()));
      }
    }

    Ok(())
  }
}
