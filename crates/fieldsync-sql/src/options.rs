//! Tunables for statement generation.

use serde::Deserialize;

pub const DEFAULT_TABLE_PREFIX: &str = "account_";
pub const DEFAULT_PRIMARY_KEY: &str = "cartodb_id";

/// Options shared by every statement builder. Deserialised from the `[sync]`
/// table of the CLI config; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
  /// Prefix of every table name, followed by the account row id.
  pub table_prefix:      String,
  /// Primary-key column carried on insert statements.
  pub primary_key:       String,
  /// Also write one row per multi-value entry into the `_values` table.
  pub multiple_values:   bool,
  /// Add full-text search columns to every row.
  pub search_index:      bool,
  /// Add geometry columns for the creation and update location snapshots.
  pub location_geometry: bool,
}

impl Default for SyncOptions {
  fn default() -> Self {
    Self {
      table_prefix:      DEFAULT_TABLE_PREFIX.to_string(),
      primary_key:       DEFAULT_PRIMARY_KEY.to_string(),
      multiple_values:   false,
      search_index:      false,
      location_geometry: false,
    }
  }
}
