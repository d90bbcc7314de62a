//! Great-circle distance and random displacement helpers.
//!
//! Two displacement flavors exist on purpose. `displace` uses the
//! spherical formula and is what the legitimate stream and most fraud
//! patterns use for "near home" sampling. `displace_planar` is the
//! deliberately crude flat-plane shift (1 degree of latitude ~ 111 km)
//! that the location-anomaly pattern was tuned against; do not swap it
//! for a proper geodesic without regenerating reference datasets.

use crate::rng::PhaseRng;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// A point at a uniform distance in [0, max_km] from (lat, lon),
/// at a uniformly random bearing.
pub fn displace(rng: &mut PhaseRng, lat: f64, lon: f64, max_km: f64) -> (f64, f64) {
    let bearing = rng.next_f64() * std::f64::consts::TAU;
    let distance = rng.next_f64() * max_km;
    displace_by(lat, lon, distance, bearing)
}

/// Spherical displacement of (lat, lon) by distance_km along bearing.
pub fn displace_by(lat: f64, lon: f64, distance_km: f64, bearing: f64) -> (f64, f64) {
    let d = distance_km / EARTH_RADIUS_KM;
    let phi1 = lat.to_radians();
    let lat2 = (phi1.sin() * d.cos() + phi1.cos() * d.sin() * bearing.cos()).asin();
    let lon2 = lon.to_radians()
        + (bearing.sin() * d.sin() * phi1.cos()).atan2(d.cos() - phi1.sin() * lat2.sin());
    (lat2.to_degrees(), lon2.to_degrees())
}

/// Flat-plane displacement at a uniform distance in [min_km, max_km]
/// and uniform bearing. Inaccurate near the poles and the
/// antimeridian; kept as-is for long-range anomaly placement.
pub fn displace_planar(
    rng: &mut PhaseRng,
    lat: f64,
    lon: f64,
    min_km: f64,
    max_km: f64,
) -> (f64, f64) {
    let distance = rng.uniform(min_km, max_km);
    let bearing = rng.next_f64() * std::f64::consts::TAU;
    let lat2 = lat + (distance / 111.0) * bearing.cos();
    let lon2 = lon + (distance / (111.0 * lat.to_radians().cos())) * bearing.sin();
    (lat2, lon2)
}
