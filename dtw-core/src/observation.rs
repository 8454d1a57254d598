//! Depth-to-water point observations and their CSV ingest format.
//!
//! One observation CSV is expected per processing year, with headers
//! `X,Y,DTW_BGS` (planar easting, northing, and depth-to-water below
//! ground surface). Rows with missing or non-numeric fields are skipped
//! with a logged count rather than failing the whole ingest.

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading an observation CSV.
#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("failed to read observation CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("observation CSV contains no usable rows")]
    NoUsableRows,
}

/// A single depth-to-water measurement at a planar location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthObservation {
    /// Easting in the layer's coordinate reference system.
    pub x: f64,
    /// Northing in the layer's coordinate reference system.
    pub y: f64,
    /// Depth to water below ground surface.
    pub depth_bgs: f64,
}

impl DepthObservation {
    /// Parse observation rows from CSV text with `X,Y,DTW_BGS` headers.
    ///
    /// Rows that cannot be parsed as three numeric fields are skipped
    /// and counted; an ingest that yields zero usable rows is an error.
    pub fn parse_csv(csv_data: &str) -> Result<Vec<DepthObservation>, ObservationError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut points = Vec::new();
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let x: Option<f64> = r.get(0).and_then(|s| s.trim().parse().ok());
            let y: Option<f64> = r.get(1).and_then(|s| s.trim().parse().ok());
            let depth: Option<f64> = r.get(2).and_then(|s| s.trim().parse().ok());

            match (x, y, depth) {
                (Some(x), Some(y), Some(depth_bgs)) => {
                    points.push(DepthObservation { x, y, depth_bgs })
                }
                _ => skipped += 1,
            }
        }

        log::info!(
            "observations: parsed {} points, skipped {} unusable rows",
            points.len(),
            skipped
        );

        if points.is_empty() {
            return Err(ObservationError::NoUsableRows);
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_observation_csv() {
        let csv = "\
X,Y,DTW_BGS
350000.0,4100000.0,12.5
351000.0,4100500.0,14.0
";
        let points = DepthObservation::parse_csv(csv).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].x, 350000.0);
        assert_eq!(points[1].depth_bgs, 14.0);
    }

    #[test]
    fn skips_non_numeric_rows() {
        let csv = "\
X,Y,DTW_BGS
350000.0,4100000.0,12.5
351000.0,4100500.0,---
bad,4100500.0,9.0
352000.0,4101000.0,8.25
";
        let points = DepthObservation::parse_csv(csv).unwrap();
        assert_eq!(points.len(), 2, "Non-numeric rows should be skipped");
    }

    #[test]
    fn empty_ingest_is_an_error() {
        let csv = "X,Y,DTW_BGS\n";
        assert!(matches!(
            DepthObservation::parse_csv(csv),
            Err(ObservationError::NoUsableRows)
        ));
    }
}
