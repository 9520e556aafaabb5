use glam::{DVec2, DVec3};
use std::f64::consts::PI;

use crate::map::sphere::{geo_to_xyz, xyz_to_geo};

/// Geographic coordinate in radians.
/// Longitude in (-π, π], latitude in [-π/2, π/2].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoCoord {
    pub lon: f64,
    pub lat: f64,
}

impl GeoCoord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self::new(lon.to_radians(), lat.to_radians())
    }
}

/// Declarative projection description, as found in map catalog metadata.
/// Angles are in degrees; they are converted to radians at construction.
#[derive(Clone, Copy, Debug)]
pub enum ProjectionConfig {
    Cylindrical {
        top_latitude: f64,
        bottom_latitude: f64,
        central_meridian: f64,
    },
    Azimuthal {
        center_longitude: f64,
        center_latitude: f64,
    },
}

/// A projection maps spherical coordinates to normalized map-plane
/// coordinates in [-1,1]×[-1,1] and back. `inverse` is the exact algebraic
/// inverse of `forward` over the projection's valid domain — the drag
/// transforms rely on round-tripping to floating-point precision.
#[derive(Clone, Debug)]
pub enum Projection {
    Cylindrical(Cylindrical),
    Azimuthal(Azimuthal),
}

impl Projection {
    /// Factory keyed on the config's projection kind.
    pub fn from_config(config: &ProjectionConfig) -> Self {
        match *config {
            ProjectionConfig::Cylindrical {
                top_latitude,
                bottom_latitude,
                central_meridian,
            } => Projection::Cylindrical(Cylindrical::new(
                top_latitude,
                bottom_latitude,
                central_meridian,
            )),
            ProjectionConfig::Azimuthal {
                center_longitude,
                center_latitude,
            } => Projection::Azimuthal(Azimuthal::new(center_longitude, center_latitude)),
        }
    }

    /// Spherical → map-plane.
    #[inline]
    pub fn forward(&self, g: GeoCoord) -> DVec2 {
        match self {
            Projection::Cylindrical(p) => p.forward(g),
            Projection::Azimuthal(p) => p.forward(g),
        }
    }

    /// Map-plane → spherical.
    #[inline]
    pub fn inverse(&self, p: DVec2) -> GeoCoord {
        match self {
            Projection::Cylindrical(c) => c.inverse(p),
            Projection::Azimuthal(c) => c.inverse(p),
        }
    }

    /// Whether a geographic point lies in the projection's valid domain.
    /// Used to cull base-map segments before drawing.
    #[inline]
    pub fn in_domain(&self, g: GeoCoord) -> bool {
        match self {
            Projection::Cylindrical(c) => c.in_domain(g),
            Projection::Azimuthal(c) => c.in_domain(g),
        }
    }
}

/// Cylindrical (Mercator-family) projection with configurable latitude
/// bounds and central meridian. The projection diverges at ±π/2; the
/// configured top/bottom latitudes keep the usable band finite.
#[derive(Clone, Debug)]
pub struct Cylindrical {
    v_top: f64,
    v_bottom: f64,
    h_center: f64,
}

impl Cylindrical {
    /// Arguments in degrees.
    pub fn new(top_latitude: f64, bottom_latitude: f64, central_meridian: f64) -> Self {
        Self {
            v_top: mercator_y(top_latitude.to_radians()),
            v_bottom: mercator_y(bottom_latitude.to_radians()),
            h_center: central_meridian.to_radians(),
        }
    }

    pub fn forward(&self, g: GeoCoord) -> DVec2 {
        let x = (g.lon - self.h_center) / PI;
        let y = mercator_y(g.lat);
        let y = 2.0 * (y - self.v_bottom) / (self.v_top - self.v_bottom) - 1.0;
        DVec2::new(x, y)
    }

    pub fn inverse(&self, p: DVec2) -> GeoCoord {
        let lon = p.x * PI + self.h_center;
        let y = ((p.y + 1.0) / 2.0) * (self.v_top - self.v_bottom) + self.v_bottom;
        let lat = y.sinh().atan();
        GeoCoord::new(lon, lat)
    }

    pub fn in_domain(&self, g: GeoCoord) -> bool {
        let y = mercator_y(g.lat);
        y >= self.v_bottom && y <= self.v_top
    }
}

#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    ((PI + 2.0 * lat) / 4.0).tan().ln()
}

/// Azimuthal (orthographic) projection of the hemisphere facing a
/// configured center point. Stores an orthonormal forward/right/up basis;
/// forward projection is two dot products, inverse reconstructs the
/// front-hemisphere point from the disk coordinates.
#[derive(Clone, Debug)]
pub struct Azimuthal {
    forward: DVec3,
    right: DVec3,
    up: DVec3,
}

impl Azimuthal {
    /// Arguments in degrees.
    pub fn new(center_longitude: f64, center_latitude: f64) -> Self {
        let lon = center_longitude.to_radians();
        let lat = center_latitude.to_radians();

        let forward = geo_to_xyz(GeoCoord::new(lon, lat));

        // North-pointing tangent: derivative of forward w.r.t. latitude
        let raw_up = DVec3::new(-lat.sin() * lon.cos(), -lat.sin() * lon.sin(), lat.cos());

        let right = forward.cross(raw_up).normalize();
        let up = right.cross(forward).normalize();

        Self { forward, right, up }
    }

    pub fn forward(&self, g: GeoCoord) -> DVec2 {
        let p = geo_to_xyz(g);
        DVec2::new(p.dot(self.right), p.dot(self.up))
    }

    pub fn inverse(&self, p: DVec2) -> GeoCoord {
        let z = (1.0 - p.length_squared()).max(0.0).sqrt();
        xyz_to_geo(self.right * p.x + self.up * p.y + self.forward * z)
    }

    /// Front hemisphere only; back-face points fold onto the same disk.
    pub fn in_domain(&self, g: GeoCoord) -> bool {
        geo_to_xyz(g).dot(self.forward) >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn world() -> Cylindrical {
        Cylindrical::new(82.0, -82.0, 0.0)
    }

    #[test]
    fn test_cylindrical_forward_origin() {
        let p = world().forward(GeoCoord::new(0.0, 0.0));
        assert!(p.x.abs() < EPS);
        assert!(p.y.abs() < EPS);
    }

    #[test]
    fn test_cylindrical_forward_bounds() {
        let proj = world();
        let top = proj.forward(GeoCoord::from_degrees(0.0, 82.0));
        assert!((top.y - 1.0).abs() < EPS);
        let bottom = proj.forward(GeoCoord::from_degrees(0.0, -82.0));
        assert!((bottom.y + 1.0).abs() < EPS);
        let east = proj.forward(GeoCoord::from_degrees(180.0, 0.0));
        assert!((east.x - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cylindrical_inverse_origin() {
        let g = world().inverse(DVec2::ZERO);
        assert!(g.lon.abs() < EPS);
        assert!(g.lat.abs() < EPS);
    }

    #[test]
    fn test_cylindrical_round_trip() {
        let proj = world();
        for lon_deg in [-170.0, -45.0, 0.0, 30.0, 179.0] {
            for lat_deg in [-81.0, -45.0, 0.0, 10.0, 81.0] {
                let g = GeoCoord::from_degrees(lon_deg, lat_deg);
                let back = proj.inverse(proj.forward(g));
                assert!((back.lon - g.lon).abs() < 1e-10);
                assert!((back.lat - g.lat).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_cylindrical_planar_round_trip() {
        let proj = world();
        for &(x, y) in &[(0.0, 0.0), (0.5, -0.5), (-0.99, 0.99), (1.0, -1.0)] {
            let p = DVec2::new(x, y);
            let back = proj.forward(proj.inverse(p));
            assert!((back - p).length() < 1e-10);
        }
    }

    #[test]
    fn test_cylindrical_central_meridian() {
        let proj = Cylindrical::new(82.0, -82.0, 90.0);
        let p = proj.forward(GeoCoord::from_degrees(90.0, 0.0));
        assert!(p.x.abs() < EPS);
    }

    #[test]
    fn test_azimuthal_center() {
        let proj = Azimuthal::new(10.0, 45.0);
        let p = proj.forward(GeoCoord::from_degrees(10.0, 45.0));
        assert!(p.length() < EPS);
        let g = proj.inverse(DVec2::ZERO);
        assert!((g.lon - 10f64.to_radians()).abs() < 1e-10);
        assert!((g.lat - 45f64.to_radians()).abs() < 1e-10);
    }

    #[test]
    fn test_azimuthal_round_trip() {
        // Front hemisphere points round-trip through the disk
        let proj = Azimuthal::new(0.0, 0.0);
        for lon_deg in [-80.0, -30.0, 0.0, 45.0, 85.0] {
            for lat_deg in [-60.0, 0.0, 30.0, 80.0] {
                let g = GeoCoord::from_degrees(lon_deg, lat_deg);
                let back = proj.inverse(proj.forward(g));
                assert!((back.lon - g.lon).abs() < 1e-9);
                assert!((back.lat - g.lat).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_factory_dispatch() {
        let proj = Projection::from_config(&ProjectionConfig::Cylindrical {
            top_latitude: 82.0,
            bottom_latitude: -82.0,
            central_meridian: 0.0,
        });
        let p = proj.forward(GeoCoord::new(0.0, 0.0));
        assert!(p.length() < EPS);
    }
}
