//! Great-circle distance on a spherical Earth.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in radians.
///
/// Uses the haversine formula:
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
/// `d = 2·R·asin(√a)`.
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dlon = lon2 - lon1;
    let dlat = lat2 - lat1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * a.clamp(0.0, 1.0).sqrt().asin()
}

/// East-west distance between two meridians, measured at a fixed latitude.
pub fn distance_along_parallel_km(lon1: f64, lon2: f64, lat: f64) -> f64 {
    haversine_km(lon1, lat, lon2, lat)
}

/// North-south distance between two parallels, measured along one meridian.
pub fn distance_along_meridian_km(lat1: f64, lat2: f64, lon: f64) -> f64 {
    haversine_km(lon, lat1, lon, lat2)
}
