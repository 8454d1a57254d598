//! Zone (parcel) polygons used as units of spatial aggregation.

use serde::{Deserialize, Serialize};

/// Name of the zone-identifier attribute on a zone layer.
pub const ZONE_ID_FIELD: &str = "PCL";

/// A zone polygon with its parcel identifier.
///
/// `rings` holds one or more closed rings of planar (x, y) vertices; the
/// first ring is the outer boundary, any further rings are holes.
/// Containment uses the even-odd rule, so a point inside a hole counts
/// as outside the zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneFeature {
    pub pcl: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl ZoneFeature {
    /// Even-odd point-in-polygon test across all rings.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (xi, yi) = ring[i];
                let (xj, yj) = ring[j];
                if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }

    /// Bounding box (min_x, min_y, max_x, max_y), or None for a degenerate zone.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let mut vertices = self.rings.iter().flatten();
        let &(x0, y0) = vertices.next()?;
        let mut bbox = (x0, y0, x0, y0);
        for &(x, y) in vertices {
            bbox.0 = bbox.0.min(x);
            bbox.1 = bbox.1.min(y);
            bbox.2 = bbox.2.max(x);
            bbox.3 = bbox.3.max(y);
        }
        Some(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(pcl: &str) -> ZoneFeature {
        ZoneFeature {
            pcl: pcl.to_string(),
            rings: vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]],
        }
    }

    #[test]
    fn contains_interior_point() {
        let zone = square("P1");
        assert!(zone.contains(5.0, 5.0));
        assert!(!zone.contains(15.0, 5.0));
        assert!(!zone.contains(5.0, -1.0));
    }

    #[test]
    fn hole_excludes_points() {
        let mut zone = square("P1");
        zone.rings
            .push(vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]);
        assert!(!zone.contains(5.0, 5.0), "Point inside a hole is outside the zone");
        assert!(zone.contains(2.0, 2.0), "Point outside the hole is still inside");
    }

    #[test]
    fn bbox_spans_all_rings() {
        let zone = square("P1");
        assert_eq!(zone.bbox(), Some((0.0, 0.0, 10.0, 10.0)));
        let degenerate = ZoneFeature {
            pcl: "P2".to_string(),
            rings: vec![],
        };
        assert_eq!(degenerate.bbox(), None);
    }
}
