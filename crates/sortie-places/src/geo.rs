//! Great-circle distance.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates in kilometers.
#[must_use]
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert!(haversine_km(52.3676, 4.9041, 52.3676, 4.9041) < 1e-9);
    }

    #[test]
    fn amsterdam_to_rotterdam_is_about_57_km() {
        let d = haversine_km(52.3676, 4.9041, 51.9244, 4.4777);
        assert!((d - 57.0).abs() < 3.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = haversine_km(52.3676, 4.9041, 52.0907, 5.1214);
        let ba = haversine_km(52.0907, 5.1214, 52.3676, 4.9041);
        assert!((ab - ba).abs() < 1e-9);
    }
}
