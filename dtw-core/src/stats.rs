//! Zonal statistic records.

use serde::{Deserialize, Serialize};

/// One per-zone statistic as produced by the aggregation engine, before
/// it has been tagged with a processing year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonalValue {
    pub pcl: String,
    pub value: f64,
}

/// A full zonal statistic record: one row of the cumulative table.
///
/// At most one record exists per `(pcl, year)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonalRecord {
    pub pcl: String,
    pub mean: f64,
    pub year: i32,
}

impl ZonalRecord {
    /// Tag an ephemeral zonal value with its processing year.
    pub fn from_value(value: ZonalValue, year: i32) -> Self {
        Self {
            pcl: value.pcl,
            mean: value.value,
            year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagging_preserves_zone_and_value() {
        let v = ZonalValue {
            pcl: "012-345-67".to_string(),
            value: 13.25,
        };
        let record = ZonalRecord::from_value(v, 2021);
        assert_eq!(record.pcl, "012-345-67");
        assert_eq!(record.mean, 13.25);
        assert_eq!(record.year, 2021);
    }
}
