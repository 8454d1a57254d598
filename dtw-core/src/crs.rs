//! Coordinate reference system constants.

/// Well-known text for NAD83 / UTM zone 11N, the projection the point
/// layers are materialized in and the output CRS for interpolation.
pub const NAD83_UTM_ZONE_11N: &str = concat!(
    "PROJCS[\"NAD_1983_UTM_Zone_11N\",",
    "GEOGCS[\"GCS_North_American_1983\",",
    "DATUM[\"D_North_American_1983\",",
    "SPHEROID[\"GRS_1980\",6378137.0,298.257222101]],",
    "PRIMEM[\"Greenwich\",0.0],",
    "UNIT[\"Degree\",0.0174532925199433]],",
    "PROJECTION[\"Transverse_Mercator\"],",
    "PARAMETER[\"False_Easting\",500000.0],",
    "PARAMETER[\"False_Northing\",0.0],",
    "PARAMETER[\"Central_Meridian\",-117.0],",
    "PARAMETER[\"Scale_Factor\",0.9996],",
    "PARAMETER[\"Latitude_Of_Origin\",0.0],",
    "UNIT[\"Meter\",1.0]]",
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wkt_names_the_projection() {
        assert!(NAD83_UTM_ZONE_11N.starts_with("PROJCS[\"NAD_1983_UTM_Zone_11N\""));
        assert!(NAD83_UTM_ZONE_11N.contains("Transverse_Mercator"));
    }
}
