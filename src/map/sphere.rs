use glam::DVec3;
use std::f64::consts::PI;

use crate::map::projection::GeoCoord;

/// Convert longitude/latitude (radians) to a point on the unit sphere.
#[inline(always)]
pub fn geo_to_xyz(g: GeoCoord) -> DVec3 {
    DVec3::new(
        g.lat.cos() * g.lon.cos(),
        g.lat.cos() * g.lon.sin(),
        g.lat.sin(),
    )
}

/// Convert a unit sphere vector back to longitude/latitude (radians).
///
/// Longitude is recovered with an explicit quadrant branch on the signs of
/// x and y. With x = +0.0 no branch fires, so both points on the y axis
/// recover lon = +π/2 through `atan(inf)`. Result longitude is in
/// (-π, π].
pub fn xyz_to_geo(u: DVec3) -> GeoCoord {
    let lat = u.z.clamp(-1.0, 1.0).asin();
    let mut lon = (u.y / u.x).abs().atan();
    if u.y < 0.0 && u.x > 0.0 {
        lon = -lon;
    } else if u.y >= 0.0 && u.x < 0.0 {
        lon = PI - lon;
    } else if u.y < 0.0 && u.x < 0.0 {
        lon -= PI;
    }
    GeoCoord::new(lon, lat)
}

/// Angle (radians, in [0, π]) between two unit vectors.
///
/// Sign/direction is the caller's problem; arccos cannot distinguish
/// clockwise from counterclockwise.
#[inline(always)]
pub fn angle(u: DVec3, v: DVec3) -> f64 {
    u.dot(v).clamp(-1.0, 1.0).acos()
}

/// Rotate `u` by `a` radians about the unit vector `axis`.
///
/// Rodrigues' rotation formula in closed matrix form: one fixed
/// matrix-vector product, no incremental accumulation.
pub fn rotate_about_axis(u: DVec3, axis: DVec3, a: f64) -> DVec3 {
    let (sin_a, cos_a) = a.sin_cos();
    let k = 1.0 - cos_a;
    let v = axis;

    DVec3::new(
        u.x * (cos_a + v.x * v.x * k)
            + u.y * (v.x * v.y * k - v.z * sin_a)
            + u.z * (v.x * v.z * k + v.y * sin_a),
        u.x * (v.x * v.y * k + v.z * sin_a)
            + u.y * (cos_a + v.y * v.y * k)
            + u.z * (v.y * v.z * k - v.x * sin_a),
        u.x * (v.x * v.z * k - v.y * sin_a)
            + u.y * (v.y * v.z * k + v.x * sin_a)
            + u.z * (cos_a + v.z * v.z * k),
    )
}

/// Rotation carrying unit vector `u` onto `v` along their great circle.
///
/// Returns `None` when the cross product degenerates (coincident or
/// antipodal points) — callers treat that frame as a no-op rather than
/// letting a zero-vector normalize poison downstream math.
pub fn rotation_between(u: DVec3, v: DVec3) -> Option<(DVec3, f64)> {
    let w = u.cross(v);
    if w.length_squared() < 1e-24 {
        return None;
    }
    Some((w.normalize(), angle(v, u)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-12;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{} != {}", a, b);
    }

    #[test]
    fn test_geo_xyz_round_trip() {
        for &(lon, lat) in &[
            (0.0, 0.0),
            (1.0, 0.5),
            (-1.0, 0.5),
            (2.5, -0.5),
            (-2.5, -1.2),
            (3.0, 1.4),
        ] {
            let g = xyz_to_geo(geo_to_xyz(GeoCoord::new(lon, lat)));
            assert_close(g.lon, lon);
            assert_close(g.lat, lat);
        }
    }

    #[test]
    fn test_xyz_to_geo_quadrants() {
        // One point per quadrant of the equatorial plane
        assert_close(xyz_to_geo(DVec3::new(1.0, 1.0, 0.0).normalize()).lon, PI / 4.0);
        assert_close(xyz_to_geo(DVec3::new(1.0, -1.0, 0.0).normalize()).lon, -PI / 4.0);
        assert_close(xyz_to_geo(DVec3::new(-1.0, 1.0, 0.0).normalize()).lon, 3.0 * PI / 4.0);
        assert_close(xyz_to_geo(DVec3::new(-1.0, -1.0, 0.0).normalize()).lon, -3.0 * PI / 4.0);
        // On the y axis x is +0.0, no sign branch fires, and atan(inf)
        // gives +π/2 for both poles of the axis
        assert_close(xyz_to_geo(DVec3::Y).lon, FRAC_PI_2);
        assert_close(xyz_to_geo(DVec3::NEG_Y).lon, FRAC_PI_2);
    }

    #[test]
    fn test_angle() {
        assert_close(angle(DVec3::X, DVec3::X), 0.0);
        assert_close(angle(DVec3::X, DVec3::Y), FRAC_PI_2);
        assert_close(angle(DVec3::X, DVec3::NEG_X), PI);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let r = rotate_about_axis(DVec3::X, DVec3::Z, FRAC_PI_2);
        assert!((r - DVec3::Y).length() < EPS);
        let r = rotate_about_axis(DVec3::Y, DVec3::X, FRAC_PI_2);
        assert!((r - DVec3::Z).length() < EPS);
    }

    #[test]
    fn test_rotate_inverse_law() {
        let u = DVec3::new(0.3, -0.5, 0.7).normalize();
        let w = DVec3::new(1.0, 2.0, -0.5).normalize();
        let a = 1.234;
        let back = rotate_about_axis(rotate_about_axis(u, w, a), w, -a);
        assert!((back - u).length() < EPS);
    }

    #[test]
    fn test_rotation_between_degenerate() {
        let u = DVec3::X;
        assert!(rotation_between(u, u).is_none());
        assert!(rotation_between(u, -u).is_none());
        let (axis, a) = rotation_between(DVec3::X, DVec3::Y).unwrap();
        assert!((axis - DVec3::Z).length() < EPS);
        assert_close(a, FRAC_PI_2);
    }
}
