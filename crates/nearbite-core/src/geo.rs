//! Great-circle distance between coordinates.
//!
//! Haversine on a sphere of Earth's mean radius. Good to well under a percent
//! at city scale, which is all a delivery-radius check needs.

use crate::Coordinate;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates, in meters.
///
/// Symmetric, zero for identical inputs, and monotonic in angular separation.
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lng / 2.0).sin().powi(2);
    let central_angle = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_METERS * central_angle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).expect("test coordinate")
    }

    #[test]
    fn identical_coordinates_have_zero_distance() {
        let p = coord(31.8206, 117.2272);
        assert!(distance_meters(p, p).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = coord(31.8206, 117.2272);
        let b = coord(30.2672, -97.7431);
        let forward = distance_meters(a, b);
        let backward = distance_meters(b, a);
        assert!((forward - backward).abs() < 1e-6);
    }

    #[test]
    fn city_block_scale_distance() {
        // Two points a few streets apart in Hefei; expect roughly 88 m.
        let origin = coord(31.8206, 117.2272);
        let shop = coord(31.8210, 117.2280);
        let d = distance_meters(origin, shop);
        assert!(d > 80.0 && d < 95.0, "got {d}");
    }

    #[test]
    fn intercity_scale_distance() {
        // Hefei to Nanjing is roughly 140 km as the crow flies.
        let hefei = coord(31.8206, 117.2272);
        let nanjing = coord(32.0603, 118.7969);
        let d = distance_meters(hefei, nanjing);
        assert!(d > 130_000.0 && d < 155_000.0, "got {d}");
    }

    #[test]
    fn distance_grows_with_angular_separation() {
        let origin = coord(31.8206, 117.2272);
        let near = coord(31.8306, 117.2272);
        let mid = coord(31.9206, 117.2272);
        let far = coord(32.8206, 117.2272);
        let d_near = distance_meters(origin, near);
        let d_mid = distance_meters(origin, mid);
        let d_far = distance_meters(origin, far);
        assert!(d_near < d_mid && d_mid < d_far);
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 180.0);
        let d = distance_meters(a, b);
        let half_circumference = std::f64::consts::PI * 6_371_000.0;
        assert!((d - half_circumference).abs() < 1.0, "got {d}");
    }
}
