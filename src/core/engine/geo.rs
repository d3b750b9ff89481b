//! Great-circle helpers.

use crate::core::types::BBox;

const EARTH_RADIUS_M: f64 = 6_371_008.8;
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Haversine distance in meters
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Box enclosing the circle of `radius_m` around a point
pub fn radius_bbox(lat: f64, lon: f64, radius_m: f64) -> BBox {
    let d_lat = radius_m / METERS_PER_DEGREE_LAT;
    // Guard the poles where a degree of longitude collapses
    let cos_lat = lat.to_radians().cos().max(1e-6);
    let d_lon = radius_m / (METERS_PER_DEGREE_LAT * cos_lat);

    BBox::new(
        (lon - d_lon).max(-180.0),
        (lat - d_lat).max(-90.0),
        (lon + d_lon).min(180.0),
        (lat + d_lat).min(90.0),
    )
}

pub fn valid_coordinates(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}
