//! Batches rendered statements for submission to a remote SQL endpoint.
//!
//! A record's statements always land in the same batch, so its deletes are
//! never separated from its inserts.

use std::io::{self, Write};

use fieldsync_sql::{Statement, render};

pub struct BatchWriter<W: Write> {
  out:        W,
  batch_size: usize,
  params:     bool,
  pending:    Vec<String>,
  batches:    usize,
}

impl<W: Write> BatchWriter<W> {
  /// `params` selects `$n` placeholders with a trailing parameter comment
  /// instead of inlined literals.
  pub fn new(out: W, batch_size: usize, params: bool) -> Self {
    Self {
      out,
      batch_size: batch_size.max(1),
      params,
      pending: Vec::new(),
      batches: 0,
    }
  }

  /// Queue one record's statements; emits a batch once the threshold is met.
  pub fn write_record(&mut self, statements: &[Statement]) -> io::Result<()> {
    for statement in statements {
      let sql = self.render(statement);
      self.pending.push(sql);
    }
    if self.pending.len() >= self.batch_size {
      self.flush_batch()?;
    }
    Ok(())
  }

  /// Emit whatever is pending and return the number of batches written.
  pub fn finish(mut self) -> io::Result<usize> {
    self.flush_batch()?;
    self.out.flush()?;
    Ok(self.batches)
  }

  fn render(&self, statement: &Statement) -> String {
    if !self.params {
      return render::to_sql(statement);
    }

    let (sql, params) = render::to_parameterized(statement);
    if params.is_empty() {
      return sql;
    }
    let params: Vec<String> = params.iter().map(render::quote_literal).collect();
    format!("{sql}\n-- params: {}", params.join(", "))
  }

  fn flush_batch(&mut self) -> io::Result<()> {
    if self.pending.is_empty() {
      return Ok(());
    }

    self.batches += 1;
    tracing::debug!(batch = self.batches, statements = self.pending.len(), "batch");

    if self.batches > 1 {
      writeln!(self.out)?;
    }
    writeln!(self.out, "-- batch {}", self.batches)?;
    for sql in self.pending.drain(..) {
      writeln!(self.out, "{sql}")?;
    }
    Ok(())
  }
}
