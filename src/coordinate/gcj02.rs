//! GCJ-02 to WGS84 correction.
//!
//! The vendor datum adds an empirical offset to true WGS84 coordinates inside
//! a bounding region around mainland China. The offset functions below are the
//! published reference formula and must stay bit-compatible with it, so the
//! constants are reproduced as-is rather than derived.

use std::f64::consts::PI;

use super::types::{GeoPoint, SourceDatum};

/// Semi-major axis of the Krasovsky ellipsoid used by the reference formula.
const SEMI_MAJOR_AXIS: f64 = 6378245.0;

/// Eccentricity squared.
const ECCENTRICITY_SQ: f64 = 0.00669342162296594323;

/// Origin subtracted before evaluating the offset polynomials.
const ORIGIN_LNG: f64 = 105.0;
const ORIGIN_LAT: f64 = 35.0;

/// Region in which the vendor offset is applied.
///
/// | Bound   | Value    |
/// |---------|----------|
/// | min lng | 72.004   |
/// | max lng | 137.8347 |
/// | min lat | 0.8293   |
/// | max lat | 55.8271  |
const MIN_LNG: f64 = 72.004;
const MAX_LNG: f64 = 137.8347;
const MIN_LAT: f64 = 0.8293;
const MAX_LAT: f64 = 55.8271;

/// Returns true when the point lies outside the region the vendor offsets.
pub fn out_of_region(point: &GeoPoint) -> bool {
    point.longitude < MIN_LNG
        || point.longitude > MAX_LNG
        || point.latitude < MIN_LAT
        || point.latitude > MAX_LAT
}

fn latitude_offset(lng: f64, lat: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * lng + 3.0 * lat + 0.2 * lat * lat + 0.1 * lng * lat
        + 0.2 * lng.abs().sqrt();
    ret += (20.0 * (6.0 * lng * PI).sin() + 20.0 * (2.0 * lng * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (lat * PI).sin() + 40.0 * (lat / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (lat / 12.0 * PI).sin() + 320.0 * (lat * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn longitude_offset(lng: f64, lat: f64) -> f64 {
    let mut ret = 300.0 + lng + 2.0 * lat + 0.1 * lng * lng + 0.1 * lng * lat
        + 0.1 * lng.abs().sqrt();
    ret += (20.0 * (6.0 * lng * PI).sin() + 20.0 * (2.0 * lng * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (lng * PI).sin() + 40.0 * (lng / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (lng / 12.0 * PI).sin() + 300.0 * (lng / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Converts a GCJ-02 point to WGS84.
///
/// Points outside the offset region are returned unchanged. The function is
/// total over finite input and never fails.
pub fn convert(point: GeoPoint) -> GeoPoint {
    if out_of_region(&point) {
        return point;
    }

    let GeoPoint {
        longitude: lng,
        latitude: lat,
    } = point;

    let mut dlat = latitude_offset(lng - ORIGIN_LNG, lat - ORIGIN_LAT);
    let mut dlng = longitude_offset(lng - ORIGIN_LNG, lat - ORIGIN_LAT);

    // Rescale from arc at the equator to degrees at this latitude.
    let radlat = lat / 180.0 * PI;
    let mut magic = radlat.sin();
    magic = 1.0 - ECCENTRICITY_SQ * magic * magic;
    let sqrtmagic = magic.sqrt();

    dlat = (dlat * 180.0)
        / ((SEMI_MAJOR_AXIS * (1.0 - ECCENTRICITY_SQ)) / (magic * sqrtmagic) * PI);
    dlng = (dlng * 180.0) / (SEMI_MAJOR_AXIS / sqrtmagic * radlat.cos() * PI);

    let shifted_lat = lat + dlat;
    let shifted_lng = lng + dlng;

    GeoPoint {
        longitude: lng * 2.0 - shifted_lng,
        latitude: lat * 2.0 - shifted_lat,
    }
}

/// Converts a single point from the given datum.
pub fn convert_point(point: GeoPoint, datum: SourceDatum) -> GeoPoint {
    match datum {
        SourceDatum::Gcj02 => convert(point),
    }
}

/// True iff both components are in range and neither is NaN.
pub fn validate(point: &GeoPoint) -> bool {
    (-180.0..=180.0).contains(&point.longitude) && (-90.0..=90.0).contains(&point.latitude)
}

pub fn validate_all(points: &[GeoPoint]) -> Vec<bool> {
    points.iter().map(validate).collect()
}
