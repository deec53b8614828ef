//! `fieldsync`: render field-collected records as PostGIS statements.
//!
//! # Usage
//!
//! ```text
//! fieldsync records --form form.json --records records.json > update.sql
//! fieldsync reset --form form.json
//! fieldsync --config fieldsync.toml tables --form form.json
//! ```
//!
//! SQL goes to stdout; logs go to stderr (`RUST_LOG` controls the level).

mod batch;
mod settings;

use std::{
  io::{self, BufWriter, Write},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use batch::BatchWriter;
use clap::{Parser, Subcommand};
use fieldsync_core::{Form, Record};
use fieldsync_sql::{
  delete_for_form_statements, delete_for_record_statements, naming,
  update_for_record_statements,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Render field records as PostGIS statements")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fieldsync.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Delete-then-insert statements for every record in a JSON array.
  Records {
    #[arg(long, value_name = "FILE")]
    form:       PathBuf,
    #[arg(long, value_name = "FILE")]
    records:    PathBuf,
    /// Statements per batch; overrides the config file.
    #[arg(long)]
    batch_size: Option<usize>,
    /// Emit `$n` placeholders with the bound values as comments.
    #[arg(long)]
    params:     bool,
  },

  /// Delete statements removing one record's rows.
  DeleteRecord {
    #[arg(long, value_name = "FILE")]
    form:   PathBuf,
    #[arg(long, value_name = "FILE")]
    record: PathBuf,
  },

  /// Delete statements emptying every table of a form.
  Reset {
    #[arg(long, value_name = "FILE")]
    form: PathBuf,
  },

  /// List the tables that hold a form's rows.
  Tables {
    #[arg(long, value_name = "FILE")]
    form: PathBuf,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = settings::load(&cli.config)?;

  let stdout = io::stdout();
  let out = BufWriter::new(stdout.lock());

  match cli.command {
    Command::Records {
      form,
      records,
      batch_size,
      params,
    } => {
      let form = load_form(&form)?;
      let batch_size = batch_size.unwrap_or(cfg.batch_size);
      let mut writer = BatchWriter::new(out, batch_size, params);

      let raw = std::fs::read_to_string(&records)
        .with_context(|| format!("failed to read {}", records.display()))?;
      let raw: Vec<serde_json::Value> =
        serde_json::from_str(&raw).context("records file must be a JSON array")?;

      let total = raw.len();
      let mut skipped = 0usize;

      for (position, value) in raw.into_iter().enumerate() {
        let record = match decode_record(value, &form) {
          Ok(record) => record,
          Err(e) => {
            tracing::warn!(position, error = %e, "skipping record");
            skipped += 1;
            continue;
          }
        };

        let statements = update_for_record_statements(&form, &record, &cfg.sync);
        writer
          .write_record(&statements)
          .context("failed to write statements")?;
      }

      let batches = writer.finish().context("failed to write statements")?;
      tracing::info!(records = total - skipped, skipped, batches, "done");
    }

    Command::DeleteRecord { form, record } => {
      let form = load_form(&form)?;
      let raw = std::fs::read_to_string(&record)
        .with_context(|| format!("failed to read {}", record.display()))?;
      let record = Record::from_json(&raw).context("failed to parse record")?;

      let mut writer = BatchWriter::new(out, cfg.batch_size, false);
      writer.write_record(&delete_for_record_statements(&form, &record, &cfg.sync))?;
      writer.finish()?;
    }

    Command::Reset { form } => {
      let form = load_form(&form)?;
      tracing::info!(form = %form.resource_id, name = %form.name, "resetting form tables");

      let mut writer = BatchWriter::new(out, cfg.batch_size, false);
      writer.write_record(&delete_for_form_statements(&form, &cfg.sync))?;
      writer.finish()?;
    }

    Command::Tables { form } => {
      let form = load_form(&form)?;
      let mut out = out;
      for table in naming::form_table_names(&cfg.sync.table_prefix, &form) {
        writeln!(out, "{table}")?;
      }
      out.flush()?;
    }
  }

  Ok(())
}

fn load_form(path: &Path) -> anyhow::Result<Form> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read {}", path.display()))?;
  let form = Form::from_json(&raw)
    .with_context(|| format!("failed to parse form {}", path.display()))?;
  form
    .validate()
    .with_context(|| format!("invalid form {}", path.display()))?;
  Ok(form)
}

/// Decode one record and check it against `form`.
fn decode_record(value: serde_json::Value, form: &Form) -> fieldsync_core::Result<Record> {
  let record = Record::from_value(value)?;
  record.validate_against(form)?;
  Ok(record)
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use uuid::Uuid;

  use super::*;

  fn form() -> Form {
    Form::from_json(
      &json!({
        "row_id": 12,
        "resource_id": Uuid::nil(),
        "account_row_id": 7,
        "account_resource_id": Uuid::nil(),
        "elements": [{ "key": "rooms", "type": "Repeatable" }]
      })
      .to_string(),
    )
    .unwrap()
  }

  #[test]
  fn decode_accepts_a_valid_record() {
    let value = json!({
      "row_id": 1,
      "resource_id": Uuid::new_v4(),
      "root": {
        "kind": { "kind": "root" },
        "form_values": [{
          "element_key": "rooms",
          "content": { "type": "items", "value": [{
            "kind": {
              "kind": "item",
              "resource_id": Uuid::new_v4(),
              "element_key": "rooms",
              "index": 0
            }
          }]}
        }]
      }
    });

    let record = decode_record(value, &form()).unwrap();
    assert_eq!(record.row_id, 1);
  }

  #[test]
  fn decode_rejects_unknown_repeatables() {
    let value = json!({
      "row_id": 1,
      "resource_id": Uuid::new_v4(),
      "root": {
        "kind": { "kind": "root" },
        "form_values": [{
          "element_key": "closets",
          "content": { "type": "items", "value": [] }
        }]
      }
    });

    assert!(decode_record(value, &form()).is_err());
  }

  #[test]
  fn far_future_dates_become_null_columns() {
    let value = json!({
      "row_id": 1,
      "resource_id": Uuid::new_v4(),
      "root": {
        "kind": { "kind": "root" },
        "form_values": [
          { "element_key": "d", "content": { "type": "date", "value": "10000-01-01" } },
          { "element_key": "e", "content": { "type": "date", "value": "2024-05-06" } }
        ]
      }
    });

    let form = form();
    let record = decode_record(value, &form).unwrap();
    let statements =
      update_for_record_statements(&form, &record, &fieldsync_sql::SyncOptions::default());
    let root = statements.iter().find_map(fieldsync_sql::Statement::as_insert).unwrap();

    assert!(root.values["fd"].is_null());
    assert!(!root.values["fe"].is_null());
  }

  #[test]
  fn decode_rejects_malformed_json() {
    assert!(decode_record(json!({ "row_id": "one" }), &form()).is_err());
  }

  #[test]
  fn cli_parses() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
  }
}
