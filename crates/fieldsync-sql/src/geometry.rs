//! PostGIS point expressions.

use crate::value::Value;

/// Spatial reference of every geometry column (WGS84 lon/lat).
pub const SRID: u32 = 4326;

/// A 2D point geometry for `latitude`/`longitude`, as a raw expression.
/// WKT puts longitude first.
pub fn point(latitude: f64, longitude: f64) -> Value {
  let wkt = format!("POINT({longitude} {latitude})");
  Value::raw(format!(
    "ST_Force2D(ST_SetSRID(ST_GeomFromText('{wkt}'), {SRID}))"
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn longitude_comes_first() {
    let Value::Raw(expr) = point(45.0, -122.0) else {
      panic!("geometry must be a raw expression");
    };
    assert!(expr.contains("POINT(-122 45)"), "got: {expr}");
    assert!(expr.contains("4326"), "got: {expr}");
    assert!(expr.starts_with("ST_Force2D("), "got: {expr}");
  }

  #[test]
  fn fractional_degrees_keep_precision() {
    let Value::Raw(expr) = point(45.523064, -122.676483) else {
      panic!("geometry must be a raw expression");
    };
    assert!(expr.contains("POINT(-122.676483 45.523064)"), "got: {expr}");
  }
}
